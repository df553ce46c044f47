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

use crate::core::{
    import::*,
    parser::DefinitionError,
    registry::Registry,
    types::Replacement,
};

fn replacement_text(registry: &Registry, label: &str) -> String {
    let hotstring = registry
        .find(|h| h.label.as_deref() == Some(label))
        .unwrap();
    match &hotstring.replacement {
        Replacement::Text(text) => text.clone(),
        Replacement::Callback(_) => panic!("expected text replacement"),
    }
}

// ============================================================================
// Line handling
// ============================================================================

#[test]
fn test_import_single_lines() {
    let mut registry = Registry::new();
    let script = "\
; abbreviations
::btw::by the way

:*:omw::on my way
";
    let report = import_script(&mut registry, script, ImportOptions::default()).unwrap();

    assert_eq!(report.added, 2);
    assert!(report.errors.is_empty());
    assert_eq!(replacement_text(&registry, "::btw"), "by the way");
    assert_eq!(replacement_text(&registry, ":*:omw"), "on my way");
}

#[test]
fn test_non_definition_lines_are_skipped() {
    let mut registry = Registry::new();
    let script = "#SingleInstance\nMsgBox hello\n::ok::fine";
    let report = import_script(&mut registry, script, ImportOptions::default()).unwrap();

    assert_eq!(report.added, 1);
    assert!(report.errors.is_empty());
}

#[test]
fn test_escapes_applied_to_trigger_and_replacement() {
    let mut registry = Registry::new();
    let script = "::a`;b::line1`nline2`ttab";
    import_script(&mut registry, script, ImportOptions::default()).unwrap();

    assert_eq!(replacement_text(&registry, "::a;b"), "line1\nline2\ttab");
}

// ============================================================================
// Multiline blocks
// ============================================================================

#[test]
fn test_multiline_block() {
    let mut registry = Registry::new();
    let script = "::sig::\n(\nBest Regards,\nJohn Doe\n)\n";
    let report = import_script(&mut registry, script, ImportOptions::default()).unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(registry.len(), 1);
    assert_eq!(replacement_text(&registry, "::sig"), "Best Regards,\nJohn Doe");
}

#[test]
fn test_multiline_block_keeps_raw_indentation() {
    let mut registry = Registry::new();
    let script = "::code::\n  (\n    indented\n\tx`ty\n  )\n::after::ok";
    let report = import_script(&mut registry, script, ImportOptions::default()).unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(replacement_text(&registry, "::code"), "    indented\n\tx\ty");
}

#[test]
fn test_unclosed_multiline_is_recorded() {
    let mut registry = Registry::new();
    let script = "::ok::fine\n::sig::\n(\nBest Regards,";
    let report = import_script(&mut registry, script, ImportOptions::default()).unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(
        report.errors,
        vec![ImportError {
            line: 2,
            kind: ImportErrorKind::MultilineUnclosed,
        }]
    );
}

#[test]
fn test_blank_replacement_without_block_registers_empty_text() {
    let mut registry = Registry::new();
    let report = import_script(&mut registry, "::del::\n::x::y", ImportOptions::default()).unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(replacement_text(&registry, "::del"), "");
}

// ============================================================================
// Error policy
// ============================================================================

#[test]
fn test_registration_errors_are_collected() {
    let mut registry = Registry::new();
    let script = "::one::1\n:Q:bad::x\n:K:bad2::y\n::two::2";
    let report = import_script(&mut registry, script, ImportOptions::default()).unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.errors[0].line, 2);
    assert!(matches!(
        report.errors[0].kind,
        ImportErrorKind::Registration(DefinitionError::UnknownOption { option: 'Q', .. })
    ));
    assert_eq!(report.errors[1].line, 3);
}

#[test]
fn test_stop_on_error_keeps_earlier_registrations() {
    let mut registry = Registry::new();
    let script = "::one::1\n:Q:bad::x\n::two::2";
    let options = ImportOptions { stop_on_error: true };

    let error = import_script(&mut registry, script, options).unwrap_err();

    assert_eq!(error.line, 2);
    assert_eq!(registry.len(), 1);
    assert!(registry.find(|h| h.label.as_deref() == Some("::one")).is_some());
}

#[test]
fn test_stop_on_error_aborts_on_unclosed_block() {
    let mut registry = Registry::new();
    let script = "::sig::\n(\nnever closed\n::after::x";
    let options = ImportOptions { stop_on_error: true };

    let error = import_script(&mut registry, script, options).unwrap_err();
    assert_eq!(error.kind, ImportErrorKind::MultilineUnclosed);
    assert!(registry.is_empty());
}

#[test]
fn test_error_display_includes_line() {
    let error = ImportError {
        line: 7,
        kind: ImportErrorKind::MultilineUnclosed,
    };
    assert_eq!(
        error.to_string(),
        "Import error on line 7: multiline block is never closed"
    );
}
