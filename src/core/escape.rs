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

//! Escape sequence translation for imported scripts
//!
//! Scripts use a backtick followed by one character: `` `n `` is a newline,
//! `` `t `` a tab, and so on. Any other escaped character stands for itself.
//! Backslashes carry no meaning and are kept as-is.

/// Escape marker used by imported scripts
pub const ESCAPE_MARKER: char = '`';

/// Translate backtick escapes into literal characters
///
/// A marker at the very end of the input has nothing to escape and is kept.
pub fn translate_escapes(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if ch != ESCAPE_MARKER {
            output.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => output.push('\n'),
            Some('r') => output.push('\r'),
            Some('t') => output.push('\t'),
            Some('b') => output.push('\u{8}'),
            // ; , % " ' and the marker itself are all literal
            Some(other) => output.push(other),
            None => output.push(ESCAPE_MARKER),
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_escapes() {
        assert_eq!(translate_escapes("a`nb`tc`rd`be"), "a\nb\tc\rd\u{8}e");
    }

    #[test]
    fn test_punctuation_escapes() {
        assert_eq!(translate_escapes("`;`,`%`\"`'``"), ";,%\"'`");
    }

    #[test]
    fn test_unknown_escape_drops_marker() {
        assert_eq!(translate_escapes("`q`Z"), "qZ");
    }

    #[test]
    fn test_backslash_preserved() {
        assert_eq!(translate_escapes(r"C:\path\n"), r"C:\path\n");
    }

    #[test]
    fn test_trailing_marker_kept() {
        assert_eq!(translate_escapes("end`"), "end`");
    }
}
