//! Tests for mixed-content sanitizing.

use ead_export::sanitize::{
    Sanitized, add_xlink_prefix, classify, escape_content, handle_linebreaks, sanitize,
    strip_paragraphs,
};
use proptest::prelude::*;

#[test]
fn smart_quotes_and_breaks_are_normalized() {
    insta::assert_snapshot!(sanitize("\u{201C}Quoted\u{201D} <br>line", false), @r#""Quoted" <br/>line"#);
}

#[test]
fn linking_attributes_get_the_xlink_prefix() {
    insta::assert_snapshot!(
        add_xlink_prefix(r#"<extref href="http://example.org">site</extref>"#),
        @r#"<extref xlink:href="http://example.org">site</extref>"#
    );
}

#[test]
fn blank_lines_become_paragraphs() {
    insta::assert_snapshot!(
        handle_linebreaks("One\n\nTwo & three"),
        @"<p>One</p><p>Two &amp; three</p>"
    );
}

#[test]
fn existing_paragraphs_are_kept() {
    assert_eq!(handle_linebreaks("<p>Already</p>"), "<p>Already</p>");
}

#[test]
fn paragraphs_are_stripped_where_not_allowed() {
    assert_eq!(
        classify("<p>one</p>", false).expect("classify"),
        Sanitized::Text("one".to_string())
    );
}

#[test]
fn markup_with_raw_lt_or_cdata_end_falls_back_to_cdata() {
    assert_eq!(
        classify("The <emph render=\"a<b\">x</emph>", false).expect("classify"),
        Sanitized::CData("The <emph render=\"a<b\">x</emph>".to_string())
    );
    assert_eq!(
        classify("<emph>a]]>b</emph>", false).expect("classify"),
        Sanitized::CData("<emph>a]]>b</emph>".to_string())
    );
    assert_eq!(
        classify("<emph render=\"a&lt;b\">x</emph>", false).expect("classify"),
        Sanitized::Fragment("<emph render=\"a&lt;b\">x</emph>".to_string())
    );
}

#[test]
fn control_characters_are_rejected() {
    assert!(classify("bell \u{7}", false).is_err());
    assert_eq!(classify("null", false).expect("classify"), Sanitized::Empty);
}

proptest! {
    #[test]
    fn escaping_is_idempotent(text in "[a-z &;#0-9<>]{0,40}") {
        let once = escape_content(&text);
        prop_assert_eq!(escape_content(&once), once);
    }

    #[test]
    fn single_paragraph_round_trips(text in "[A-Za-z0-9][A-Za-z0-9 ]{0,38}[A-Za-z0-9]") {
        prop_assert_eq!(strip_paragraphs(&handle_linebreaks(&text)), text);
    }

    #[test]
    fn plain_text_never_leaks_angle_brackets(text in "[a-z<& ]{0,40}") {
        if let Ok(Sanitized::Text(escaped)) = classify(&text, false) {
            prop_assert!(!escaped.contains('<'));
        }
    }
}
