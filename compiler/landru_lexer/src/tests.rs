#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;

fn render(source: &str) -> Vec<String> {
    let tape = read(source).unwrap();
    tape.tokens()
        .iter()
        .map(|t| format!("{}:{}", t.kind.describe(), tape.describe_token(t)))
        .collect()
}

#[test]
fn test_reads_machine_definition() {
    assert_eq!(
        render("(machine m (state main ()))"),
        vec![
            "list-open:(",
            "atom:machine",
            "atom:m",
            "list-open:(",
            "atom:state",
            "atom:main",
            "list-open:(",
            "list-close:)",
            "list-close:)",
            "list-close:)",
        ]
    );
}

#[test]
fn test_reads_numbers() {
    assert_eq!(
        render("3 -4 3.0 +2.5 1e3"),
        vec!["integer:3", "integer:-4", "float:3.0", "float:2.5", "float:1000.0"]
    );
}

#[test]
fn test_sign_without_digit_is_atom() {
    assert_eq!(render("- +"), vec!["atom:-", "atom:+"]);
}

#[test]
fn test_dotted_atom() {
    assert_eq!(render("(io.print x)")[1], "atom:io.print");
}

#[test]
fn test_string_escapes() {
    let tape = read(r#""a\"b\n""#).unwrap();
    let TokenKind::Str(name) = tape.tokens()[0].kind else {
        panic!("expected string token");
    };
    assert_eq!(tape.interner().lookup(name), "a\"b\n");
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        render("; header\n(launch m) ; trailing"),
        vec!["list-open:(", "atom:launch", "atom:m", "list-close:)"]
    );
}

#[test]
fn test_offsets_point_at_token_start() {
    let tape = read("  (goto b)").unwrap();
    let offsets: Vec<u32> = tape.tokens().iter().map(|t| t.offset).collect();
    assert_eq!(offsets, vec![2, 3, 8, 9]);
}

#[test]
fn test_unbalanced_close_is_not_a_read_error() {
    assert_eq!(read(")(").unwrap().len(), 2);
}

#[test]
fn test_unterminated_string() {
    assert_eq!(
        read("(io.print \"oops").unwrap_err(),
        ReadError::UnterminatedString { offset: 10 }
    );
}

#[test]
fn test_unknown_escape() {
    assert_eq!(
        read(r#""\q""#).unwrap_err(),
        ReadError::UnknownEscape {
            escape: 'q',
            offset: 1
        }
    );
}

#[test]
fn test_malformed_number() {
    assert!(matches!(
        read("12abc").unwrap_err(),
        ReadError::MalformedNumber { .. }
    ));
}
