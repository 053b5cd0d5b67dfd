//! Bracket matching over the token tape.
//!
//! Independent of the compiler on purpose: the compiler uses it to check
//! that every recursive compile consumed exactly its bracketed region.

use landru_ir::{TapeCursor, TokenKind, TokenTape};

/// Find the `ListClose` matching the `ListOpen` at `open`.
///
/// Returns `None` if `open` is not a `ListOpen` or the tape ends first.
pub fn match_paren(tape: &TokenTape, open: TapeCursor) -> Option<TapeCursor> {
    if tape.get(open)?.kind != TokenKind::ListOpen {
        return None;
    }
    let mut depth = 0usize;
    for (i, token) in tape.tokens().iter().enumerate().skip(open.index()) {
        match token.kind {
            TokenKind::ListOpen => depth += 1,
            TokenKind::ListClose => {
                depth -= 1;
                if depth == 0 {
                    return Some(TapeCursor::new(i));
                }
            }
            _ => {}
        }
    }
    None
}

/// Whole-tape bracket balance: depth never negative and zero at the end.
pub fn is_balanced(tape: &TokenTape) -> bool {
    let mut depth = 0usize;
    for token in tape.tokens() {
        match token.kind {
            TokenKind::ListOpen => depth += 1,
            TokenKind::ListClose => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}
