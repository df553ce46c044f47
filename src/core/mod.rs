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

//! src/core/mod.rs
//!
//! Core definition handling
//!
//! This module contains the data structures and parsers that turn
//! hotstring source text into registered definitions:
//! - Type definitions for hotstrings, options and replacements
//! - The `:OPTIONS:TRIGGER` definition parser
//! - Escape translation and bulk script import
//! - The ordered registry and shadowed-trigger detection
//!
//! Nothing here touches keystrokes or a text host, so all of it can be
//! unit tested in isolation.

pub mod conflict;
pub mod escape;
pub mod import;
pub mod parser;
pub mod registry;
pub mod types;

pub use conflict::{find_conflicts, Conflict};
pub use parser::DefinitionError;
pub use registry::Registry;
pub use types::*;

#[cfg(test)]
mod tests;
