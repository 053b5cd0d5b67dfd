//! S-expression reader for Landru source text.
//!
//! Produces the flat `TokenTape` the compiler consumes. The reader is purely
//! lexical: it does not check bracket balance (the compiler does, with its
//! own paren matcher) and it does not know any keywords.
//!
//! Lexical rules:
//! - whitespace separates tokens; `;` starts a comment running to end of line
//! - `(` and `)` are list brackets
//! - `"..."` is a string with `\"`, `\\`, `\n`, `\t` escapes
//! - a token starting with a digit, or a sign followed by a digit, is a number;
//!   it is a float if it contains `.` or an exponent
//! - anything else up to the next delimiter is an atom (`io.print`, `-`)

use landru_ir::{StringInterner, TokenKind, TokenTape};
use thiserror::Error;

/// Errors produced while reading source text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("unterminated string starting at byte {offset}")]
    UnterminatedString { offset: usize },
    #[error("unknown escape `\\{escape}` at byte {offset}")]
    UnknownEscape { escape: char, offset: usize },
    #[error("malformed number `{text}` at byte {offset}")]
    MalformedNumber { text: String, offset: usize },
    #[error("source exceeds {} bytes", u32::MAX)]
    SourceTooLarge,
}

/// Read `source` into a new tape with a fresh interner.
pub fn read(source: &str) -> Result<TokenTape, ReadError> {
    read_with(source, StringInterner::new())
}

/// Read `source` into a new tape, reusing `interner`.
pub fn read_with(source: &str, interner: StringInterner) -> Result<TokenTape, ReadError> {
    if u32::try_from(source.len()).is_err() {
        return Err(ReadError::SourceTooLarge);
    }
    let mut reader = Reader {
        source,
        bytes: source.as_bytes(),
        pos: 0,
        tape: TokenTape::new(interner),
    };
    reader.run()?;
    Ok(reader.tape)
}

struct Reader<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tape: TokenTape,
}

impl Reader<'_> {
    fn run(&mut self) -> Result<(), ReadError> {
        while let Some(&b) = self.bytes.get(self.pos) {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b';' => self.skip_comment(),
                b'(' => {
                    self.tape.push(TokenKind::ListOpen, self.offset());
                    self.pos += 1;
                }
                b')' => {
                    self.tape.push(TokenKind::ListClose, self.offset());
                    self.pos += 1;
                }
                b'"' => self.read_string()?,
                _ => self.read_word()?,
            }
        }
        Ok(())
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "source length is checked against u32::MAX before reading starts"
    )]
    fn offset(&self) -> u32 {
        self.pos as u32
    }

    fn skip_comment(&mut self) {
        match memchr::memchr(b'\n', &self.bytes[self.pos..]) {
            Some(len) => self.pos += len + 1,
            None => self.pos = self.bytes.len(),
        }
    }

    fn read_string(&mut self) -> Result<(), ReadError> {
        let start = self.pos;
        let offset = self.offset();
        self.pos += 1;
        let mut text = String::new();
        loop {
            let rest = &self.bytes[self.pos..];
            let Some(stop) = memchr::memchr2(b'"', b'\\', rest) else {
                return Err(ReadError::UnterminatedString { offset: start });
            };
            text.push_str(&self.source[self.pos..self.pos + stop]);
            self.pos += stop;
            if self.bytes[self.pos] == b'"' {
                self.pos += 1;
                break;
            }
            let escape_at = self.pos;
            let Some(escape) = self.source[self.pos + 1..].chars().next() else {
                return Err(ReadError::UnterminatedString { offset: start });
            };
            text.push(match escape {
                '"' => '"',
                '\\' => '\\',
                'n' => '\n',
                't' => '\t',
                other => {
                    return Err(ReadError::UnknownEscape {
                        escape: other,
                        offset: escape_at,
                    })
                }
            });
            self.pos += 1 + escape.len_utf8();
        }
        self.tape.push_str(&text, offset);
        Ok(())
    }

    fn read_word(&mut self) -> Result<(), ReadError> {
        let start = self.pos;
        let offset = self.offset();
        while let Some(&b) = self.bytes.get(self.pos) {
            if is_delimiter(b) {
                break;
            }
            self.pos += 1;
        }
        let text = &self.source[start..self.pos];
        if looks_numeric(text) {
            let kind = parse_number(text).ok_or_else(|| ReadError::MalformedNumber {
                text: text.to_string(),
                offset: start,
            })?;
            self.tape.push(kind, offset);
        } else {
            self.tape.push_atom(text, offset);
        }
        Ok(())
    }
}

fn is_delimiter(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'(' | b')' | b'"' | b';')
}

fn looks_numeric(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    digits.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

fn parse_number(text: &str) -> Option<TokenKind> {
    if text.contains(['.', 'e', 'E']) {
        text.parse::<f64>().ok().map(TokenKind::Float)
    } else {
        text.parse::<i64>().ok().map(TokenKind::Int)
    }
}

#[cfg(test)]
mod tests;
