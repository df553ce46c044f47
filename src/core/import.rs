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

//! src/core/import.rs
//!
//! Bulk import of hotstring scripts
//!
//! A script holds one definition per line:
//!
//! ```text
//! ; comment
//! ::btw::by the way
//! :*C:Ts::Timestamp
//! ::sig::
//! (
//! Best Regards,
//! John Doe
//! )
//! ```
//!
//! Lines that do not look like a definition are skipped silently. A blank
//! replacement followed by a line opening with `(` starts a block that runs
//! until a line opening with `)`; block lines are taken verbatim and joined
//! with newlines. Triggers and replacements go through the escape translator
//! before registration.
//!
//! Import is not transactional: definitions registered before a failure
//! stay registered, even when the import stops on the first error.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::info;

use crate::core::escape::translate_escapes;
use crate::core::parser::{parse_hotstring, DefinitionError};
use crate::core::registry::Registry;

/// `:OPTIONS:TRIGGER::REPLACEMENT`
static DEFINITION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:([^:]*):(.+?)::(.*)$").expect("definition line pattern should be valid regex")
});

/// Why a line could not be registered
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ImportErrorKind {
    /// A `(` block never found its closing `)` line
    #[error("multiline block is never closed")]
    MultilineUnclosed,

    #[error(transparent)]
    Registration(#[from] DefinitionError),
}

/// Import error tagged with its 1-based source line
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("Import error on line {line}: {kind}")]
pub struct ImportError {
    pub line: usize,
    pub kind: ImportErrorKind,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ImportOptions {
    /// Abort at the first error instead of collecting it
    pub stop_on_error: bool,
}

/// Outcome of an import that ran to the end of the script
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ImportReport {
    /// Number of definitions registered
    pub added: usize,
    /// Recoverable errors, in line order
    pub errors: Vec<ImportError>,
}

/// Import a script into `registry`
///
/// # Returns
///
/// * `Ok(ImportReport)` - The script was fully processed; per-line errors are
///   collected in the report
/// * `Err(ImportError)` - `stop_on_error` was set and a line failed
///
/// # Example
///
/// ```
/// use hotstring_engine::core::{import::{import_script, ImportOptions}, Registry};
///
/// let mut registry = Registry::new();
/// let report = import_script(&mut registry, "::btw::by the way", ImportOptions::default())?;
/// assert_eq!(report.added, 1);
/// # Ok::<(), hotstring_engine::core::import::ImportError>(())
/// ```
pub fn import_script(
    registry: &mut Registry,
    text: &str,
    options: ImportOptions,
) -> Result<ImportReport, ImportError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut report = ImportReport::default();
    let mut index = 0;

    while index < lines.len() {
        let line_num = index + 1;
        let line_trimmed = lines[index].trim();
        index += 1;

        if line_trimmed.is_empty() || line_trimmed.starts_with(';') {
            continue;
        }

        let Some(captures) = DEFINITION_LINE.captures(line_trimmed) else {
            continue;
        };

        let options_text = &captures[1];
        let trigger = &captures[2];
        let mut replacement = captures[3].to_string();

        let opens_block = lines
            .get(index)
            .is_some_and(|next| next.trim().starts_with('('));

        if replacement.trim().is_empty() && opens_block {
            match collect_block(&lines, index + 1) {
                Some((block, next_index)) => {
                    replacement = block;
                    index = next_index;
                }
                None => {
                    let error = ImportError {
                        line: line_num,
                        kind: ImportErrorKind::MultilineUnclosed,
                    };
                    if options.stop_on_error {
                        return Err(error);
                    }
                    report.errors.push(error);
                    continue;
                }
            }
        }

        let definition = format!(":{}:{}", options_text, translate_escapes(trigger));
        let replacement = translate_escapes(&replacement);

        match parse_hotstring(&definition, replacement.into()) {
            Ok(hotstring) => {
                registry.register(hotstring);
                report.added += 1;
            }
            Err(e) => {
                let error = ImportError {
                    line: line_num,
                    kind: e.into(),
                };
                if options.stop_on_error {
                    return Err(error);
                }
                report.errors.push(error);
            }
        }
    }

    info!(
        added = report.added,
        errors = report.errors.len(),
        "hotstring import finished"
    );

    Ok(report)
}

/// Collect block lines starting at `start` up to the closing `)` line
///
/// Returns the joined block and the index just past the closing line,
/// or `None` when no closing line exists.
fn collect_block(lines: &[&str], start: usize) -> Option<(String, usize)> {
    let close = lines
        .iter()
        .skip(start)
        .position(|line| line.trim().starts_with(')'))?
        + start;

    Some((lines[start..close].join("\n"), close + 1))
}
