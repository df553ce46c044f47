// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Hotstring script watcher
//!
//! Uses OS-level file watching (inotify on Linux) via the notify crate.
//! The `watch` command re-imports a script each time it is written.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{channel, Receiver, RecvTimeoutError},
    time::Duration,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Script not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to watch script: {0}")]
    Notify(#[from] notify::Error),
}

/// Watches one script file for modifications
pub struct ScriptWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
}

impl ScriptWatcher {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, WatchError> {
        let path = path.into();
        if !path.exists() {
            return Err(WatchError::NotFound(path));
        }

        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        Ok(ScriptWatcher {
            path,
            _watcher: watcher,
            rx,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks for modification events (non-blocking)
    pub fn check_for_changes(&self) -> bool {
        let mut changed = false;
        while let Ok(event_result) = self.rx.try_recv() {
            changed |= is_change(&event_result);
        }
        changed
    }

    /// Blocks until the script changes or `timeout` elapses
    ///
    /// Events already queued behind the first change are drained so one
    /// save is reported once.
    pub fn wait_for_change(&self, timeout: Duration) -> bool {
        loop {
            match self.rx.recv_timeout(timeout) {
                Ok(event_result) if is_change(&event_result) => {
                    self.check_for_changes();
                    return true;
                }
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return false,
            }
        }
    }
}

fn is_change(event_result: &notify::Result<Event>) -> bool {
    matches!(
        event_result,
        Ok(Event {
            kind: EventKind::Modify(_) | EventKind::Create(_),
            ..
        })
    )
}
