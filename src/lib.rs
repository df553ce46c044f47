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

//! Hotstring Engine
//!
//! A text-expansion engine: abbreviations typed into a text field are
//! detected and replaced with expanded text or the output of a callback.
//!
//! # Features
//!
//! - **Definitions:** `:OPTIONS:TRIGGER` literals and end-anchored regex patterns
//! - **Case Conformity:** `btw`, `Btw` and `BTW` expand to matching case
//! - **Send Modes:** Instant replacement or timed typing with input lock and replay
//! - **Script Import:** Bulk loading with multiline blocks and escape sequences
//! - **Conflict Report:** Detection of triggers shadowed by earlier definitions
//!
//! # Architecture
//!
//! - **`core`:** Definition types, parser, registry, import (no host access)
//! - **`engine`:** Buffer, matcher, executor, mode state and the `Engine` surface
//! - **`host`:** The `TextHost` trait the engine edits through, plus an in-memory host
//! - **`config`:** JSON engine configuration
//! - **`watch`:** Script file watching for the CLI
//!
//! # Examples
//!
//! ## Expanding typed text
//!
//! ```
//! use hotstring_engine::{Engine, MemoryHost};
//!
//! let mut engine = Engine::new(MemoryHost::new());
//! engine.register("::btw", "by the way")?;
//!
//! engine.simulate_typing("Btw ")?;
//! assert_eq!(engine.host().text(), "By the way ");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Pattern definitions
//!
//! ```
//! use hotstring_engine::{Callback, Engine, MemoryHost, PatternOptions};
//!
//! let mut engine = Engine::new(MemoryHost::new());
//! engine.register_pattern(
//!     r"(\d+)x(\d+)=",
//!     Callback::new("multiply", |args| {
//!         let product: u64 = args.groups[0].parse::<u64>()? * args.groups[1].parse::<u64>()?;
//!         Ok(Some(product.to_string()))
//!     }),
//!     PatternOptions::default(),
//! )?;
//!
//! engine.simulate_typing("6x7=")?;
//! assert_eq!(engine.host().text(), "42");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod host;
pub mod watch;

// Re-export commonly used types for convenience
pub use crate::core::{Callback, CallbackArgs, Hotstring, PatternOptions, Replacement};
pub use engine::{Delivery, Engine, EngineError, FireOutcome};
pub use host::{EngineObserver, MemoryHost, TextHost};
