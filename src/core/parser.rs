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

//! src/core/parser.rs
//!
//! Hotstring definition parser
//!
//! This module turns a definition string of the shape `:OPTIONS:TRIGGER`
//! into structured options plus the raw trigger text. It handles:
//! - The two required colon-delimited segments
//! - Case-insensitive option tokens (`*`, `?`, `B0`, `C`, `C1`, `SE`, `K10`, ...)
//! - Signed integer arguments for `K` (key delay) and `P` (priority)
//!
//! # Architecture
//! The parser uses nom combinators for composable, type-safe parsing.
//! It works in two steps:
//! 1. Tokenise the OPTIONS segment
//! 2. Resolve the token set into `DefinitionOptions` with fixed precedence
//!    (`C1` beats `C`, `SE` beats `SP`, a `0` suffix cancels its flag)
//!
//! The trigger is returned unescaped; escape translation belongs to the
//! import path.

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_until, take_while},
    character::complete::{char, i32 as signed_int, multispace1, one_of},
    combinator::{map, recognize},
    IResult, Parser,
};
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

use crate::core::types::{
    Callback, DefinitionOptions, Hotstring, HotstringKind, PatternOptions, Replacement, SendMode,
};

/// Definition errors
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DefinitionError {
    /// Input lacks the `:OPTIONS:` prefix
    #[error("Invalid definition '{0}': expected ':OPTIONS:TRIGGER'")]
    Syntax(String),

    #[error("Definition '{0}' has an empty trigger")]
    EmptyTrigger(String),

    #[error("Unknown option '{option}' in '{options}'")]
    UnknownOption { option: char, options: String },

    /// `K` or `P` without a usable signed integer
    #[error("Option '{option}' needs an integer, found '{value}'")]
    InvalidNumber { option: char, value: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Result of parsing `:OPTIONS:TRIGGER`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedDefinition {
    pub options: DefinitionOptions,
    /// OPTIONS segment exactly as written
    pub options_text: String,
    pub trigger: String,
}

/// A single lexical element of the OPTIONS segment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OptionToken<'a> {
    Flag(&'a str),
    /// `K`/`P` with its value, or the text that failed to parse as one
    Number(char, Result<i32, &'a str>),
    Space,
}

/// Parse a complete definition string
///
/// # Example
/// ```
/// use hotstring_engine::core::parser::parse_definition;
///
/// let parsed = parse_definition(":*C:btw").unwrap();
/// assert_eq!(parsed.trigger, "btw");
/// assert!(parsed.options.fire_immediately);
/// assert!(parsed.options.case_sensitive);
/// ```
pub fn parse_definition(input: &str) -> Result<ParsedDefinition, DefinitionError> {
    let (trigger, options_text) =
        definition_header(input).map_err(|_| DefinitionError::Syntax(input.to_string()))?;

    if trigger.is_empty() {
        return Err(DefinitionError::EmptyTrigger(input.to_string()));
    }

    Ok(ParsedDefinition {
        options: parse_options(options_text)?,
        options_text: options_text.to_string(),
        trigger: trigger.to_string(),
    })
}

/// Build a literal hotstring from a definition string and its replacement
///
/// The definition string becomes the hotstring's label.
pub fn parse_hotstring(
    definition: &str,
    replacement: Replacement,
) -> Result<Hotstring, DefinitionError> {
    let parsed = parse_definition(definition)?;

    Ok(Hotstring {
        kind: HotstringKind::Literal {
            trigger: parsed.trigger,
        },
        replacement,
        options: parsed.options,
        label: Some(definition.to_string()),
    })
}

/// Build a pattern hotstring
///
/// The pattern is anchored to the end of the buffer by wrapping it as
/// `(?:PATTERN)$`, so callers never write the anchor themselves.
pub fn parse_pattern(
    pattern: &str,
    callback: Callback,
    pattern_options: PatternOptions,
) -> Result<Hotstring, DefinitionError> {
    let regex = Regex::new(&format!("(?:{})$", pattern)).map_err(|e| {
        DefinitionError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        }
    })?;

    Ok(Hotstring {
        kind: HotstringKind::Pattern {
            source: pattern.to_string(),
            regex,
            options: pattern_options,
        },
        replacement: Replacement::Callback(callback),
        options: DefinitionOptions {
            priority: pattern_options.priority,
            ..DefinitionOptions::default()
        },
        label: None,
    })
}

/// Parse the `:OPTIONS:` header, returning the OPTIONS segment
///
/// The remaining input is the trigger.
pub fn definition_header(input: &str) -> IResult<&str, &str> {
    map((char(':'), take_until(":"), char(':')), |(_, options, _)| options).parse(input)
}

/// Resolve an OPTIONS segment into `DefinitionOptions`
///
/// Tokens are matched case-insensitively. Precedence is fixed by rule,
/// not by textual position, except for `K` and `P` where the last value wins.
pub fn parse_options(input: &str) -> Result<DefinitionOptions, DefinitionError> {
    let mut flags: HashSet<String> = HashSet::new();
    let mut options = DefinitionOptions::default();
    let mut rest = input;

    while !rest.is_empty() {
        let (remaining, token) = option_token(rest).map_err(|_| DefinitionError::UnknownOption {
            option: rest.chars().next().unwrap_or(' '),
            options: input.to_string(),
        })?;

        match token {
            OptionToken::Flag(flag) => {
                flags.insert(flag.to_ascii_uppercase());
            }
            OptionToken::Number(letter, parsed) => {
                let value = parsed.map_err(|raw| DefinitionError::InvalidNumber {
                    option: letter,
                    value: raw.to_string(),
                })?;

                if letter == 'K' {
                    options.key_delay = value;
                } else {
                    options.priority = value;
                }
            }
            OptionToken::Space => {}
        }

        rest = remaining;
    }

    let has = |token: &str| flags.contains(token);

    options.fire_immediately = has("*") && !has("*0");
    options.inside_word = has("?") && !has("?0");
    options.no_backspace = has("B0");
    options.no_conformity = has("C1");
    options.case_sensitive = !options.no_conformity && has("C") && !has("C0");
    options.omit_end_char = has("O") && !has("O0");
    options.raw_mode = (has("T") && !has("T0")) || (has("R") && !has("R0"));
    options.execute_as_callback = has("X");
    options.reset_after_fire = has("Z") && !has("Z0");
    options.suspend_exempt = has("S") && !has("S0");
    options.send_mode = if has("SE") {
        SendMode::EventDelayed
    } else if has("SP") {
        SendMode::PollDelayed
    } else {
        SendMode::Instant
    };

    Ok(options)
}

/// Parse one option token
///
/// Two-character tokens are tried before single letters so that `SE`
/// is never read as `S` followed by an unknown `E`.
fn option_token(input: &str) -> IResult<&str, OptionToken<'_>> {
    alt((
        map(multispace1, |_| OptionToken::Space),
        map(
            (
                one_of("KkPp"),
                alt((
                    map(signed_int, Ok),
                    map(take_while(|c: char| c == '+' || c == '-' || c.is_ascii_digit()), Err),
                )),
            ),
            |(letter, value): (char, Result<i32, &str>)| {
                OptionToken::Number(letter.to_ascii_uppercase(), value)
            },
        ),
        map(
            alt((
                tag_no_case("*0"),
                tag_no_case("?0"),
                tag_no_case("B0"),
                tag_no_case("C0"),
                tag_no_case("C1"),
                tag_no_case("O0"),
                tag_no_case("T0"),
                tag_no_case("R0"),
                tag_no_case("Z0"),
                tag_no_case("S0"),
                tag_no_case("SE"),
                tag_no_case("SP"),
                tag_no_case("SI"),
            )),
            OptionToken::Flag,
        ),
        map(recognize(one_of("*?BbCcOoTtRrXxZzSs")), OptionToken::Flag),
    ))
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_splits_options() {
        let (trigger, options) = definition_header(":*?:abc").unwrap();
        assert_eq!(options, "*?");
        assert_eq!(trigger, "abc");
    }

    #[test]
    fn test_trigger_may_contain_colons() {
        let parsed = parse_definition("::a:b").unwrap();
        assert_eq!(parsed.trigger, "a:b");
    }

    #[test]
    fn test_whitespace_between_options_is_ignored() {
        let options = parse_options("* C").unwrap();
        assert!(options.fire_immediately);
        assert!(options.case_sensitive);
    }
}
