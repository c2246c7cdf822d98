use alloc::string::String;

use crate::error::{ErrorKind, ParseError, ParseResult};

const EOL: char = '\n';
const SPECIAL_LINE_START_CHARS: [char; 4] = ['}', '.', '[', '*'];

/// Cursor over Fluent source with an independent peek cursor.
///
/// `index` is the committed byte offset; `peek_offset` is a byte distance
/// ahead of it. A CRLF pair reads as a single `'\n'` and every step over it
/// moves two bytes, so slices stay valid for `[start, end)` ranges. `None`
/// stands for end of input.
#[derive(Debug, Clone)]
pub struct ParserStream<'s> {
    source: &'s str,
    index: usize,
    peek_offset: usize,
}

impl<'s> ParserStream<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            index: 0,
            peek_offset: 0,
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn peek_offset(&self) -> usize {
        self.peek_offset
    }

    pub fn slice(&self, start: usize, end: usize) -> &'s str {
        &self.source[start..end]
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        let rest = self.source.get(offset..)?;
        if rest.starts_with("\r\n") {
            return Some(EOL);
        }
        rest.chars().next()
    }

    fn width_at(&self, offset: usize) -> usize {
        match self.source.get(offset..) {
            Some(rest) if rest.starts_with("\r\n") => 2,
            Some(rest) => rest.chars().next().map(char::len_utf8).unwrap_or(0),
            None => 0,
        }
    }

    pub fn current_char(&self) -> Option<char> {
        self.char_at(self.index)
    }

    pub fn current_peek(&self) -> Option<char> {
        self.char_at(self.index + self.peek_offset)
    }

    pub fn next(&mut self) -> Option<char> {
        self.peek_offset = 0;
        self.index += self.width_at(self.index);
        self.current_char()
    }

    pub fn peek(&mut self) -> Option<char> {
        self.peek_offset += self.width_at(self.index + self.peek_offset);
        self.current_peek()
    }

    pub fn reset_peek(&mut self, offset: usize) {
        self.peek_offset = offset;
    }

    pub fn skip_to_peek(&mut self) {
        self.index += self.peek_offset;
        self.peek_offset = 0;
    }

    pub fn peek_blank_inline(&mut self) -> &'s str {
        let start = self.index + self.peek_offset;
        while self.current_peek() == Some(' ') {
            self.peek();
        }
        &self.source[start..self.index + self.peek_offset]
    }

    pub fn skip_blank_inline(&mut self) -> &'s str {
        let blank = self.peek_blank_inline();
        self.skip_to_peek();
        blank
    }

    /// Peek over whole blank lines and return one `'\n'` per line. A blank
    /// line at the end of input still counts as part of the block.
    pub fn peek_blank_block(&mut self) -> String {
        let mut blank = String::new();
        loop {
            let line_start = self.peek_offset;
            self.peek_blank_inline();
            match self.current_peek() {
                Some(EOL) => {
                    blank.push(EOL);
                    self.peek();
                }
                None => return blank,
                Some(_) => {
                    self.reset_peek(line_start);
                    return blank;
                }
            }
        }
    }

    pub fn skip_blank_block(&mut self) -> String {
        let blank = self.peek_blank_block();
        self.skip_to_peek();
        blank
    }

    pub fn peek_blank(&mut self) {
        while matches!(self.current_peek(), Some(' ') | Some(EOL)) {
            self.peek();
        }
    }

    pub fn skip_blank(&mut self) {
        self.peek_blank();
        self.skip_to_peek();
    }

    pub fn expect_char(&mut self, ch: char) -> ParseResult<()> {
        if self.current_char() == Some(ch) {
            self.next();
            return Ok(());
        }
        Err(ParseError::new(ErrorKind::ExpectedToken(ch), self.index))
    }

    /// End of input is a valid line end.
    pub fn expect_line_end(&mut self) -> ParseResult<()> {
        match self.current_char() {
            None => Ok(()),
            Some(EOL) => {
                self.next();
                Ok(())
            }
            // U+2424 SYMBOL FOR NEWLINE
            Some(_) => Err(ParseError::new(
                ErrorKind::ExpectedToken('\u{2424}'),
                self.index,
            )),
        }
    }

    /// Take the current character if it satisfies `f`. Returns `None`
    /// without advancing on a mismatch or at end of input.
    pub fn take_char(&mut self, f: impl Fn(char) -> bool) -> Option<char> {
        let ch = self.current_char()?;
        if f(ch) {
            self.next();
            Some(ch)
        } else {
            None
        }
    }

    pub fn is_identifier_start(&self) -> bool {
        is_char_id_start(self.current_peek())
    }

    pub fn is_number_start(&mut self) -> bool {
        let ch = if self.current_char() == Some('-') {
            self.peek()
        } else {
            self.current_char()
        };
        self.reset_peek(0);
        matches!(ch, Some(c) if c.is_ascii_digit())
    }

    /// Inline patterns may start with any character.
    pub fn is_value_start(&self) -> bool {
        !matches!(self.current_peek(), Some(EOL) | None)
    }

    /// Whether the peeked line continues a pattern. Restores the peek cursor
    /// to the start of the line on success only.
    pub fn is_value_continuation(&mut self) -> bool {
        let column1 = self.peek_offset;
        self.peek_blank_inline();

        if self.current_peek() == Some('{') {
            self.reset_peek(column1);
            return true;
        }

        if self.peek_offset == column1 {
            return false;
        }

        if is_char_pattern_continuation(self.current_peek()) {
            self.reset_peek(column1);
            return true;
        }

        false
    }

    /// Whether the next line is a comment line of the same `level` (0 for
    /// `#`, 1 for `##`, 2 for `###`).
    pub fn is_next_line_comment(&mut self, level: usize) -> bool {
        if self.current_char() != Some(EOL) {
            return false;
        }

        for _ in 0..=level {
            if self.peek() != Some('#') {
                self.reset_peek(0);
                return false;
            }
        }

        let ch = self.peek();
        self.reset_peek(0);
        matches!(ch, Some(' ') | Some(EOL))
    }

    pub fn is_variant_start(&mut self) -> bool {
        let current_peek_offset = self.peek_offset;
        if self.current_peek() == Some('*') {
            self.peek();
        }
        let is_start = self.current_peek() == Some('[');
        self.reset_peek(current_peek_offset);
        is_start
    }

    pub fn is_attribute_start(&self) -> bool {
        self.current_peek() == Some('.')
    }

    /// Move to the beginning of the next line that looks like an entry start.
    /// Rewinds to the start of the broken line first when that line begins
    /// after `junk_start`, so the same entry is never resumed twice.
    pub fn skip_to_next_entry_start(&mut self, junk_start: usize) {
        let last_newline = if self.source[self.index..].starts_with(EOL) {
            Some(self.index)
        } else {
            self.source[..self.index].rfind(EOL)
        };

        if let Some(last_newline) = last_newline {
            if junk_start < last_newline {
                self.index = last_newline;
                self.peek_offset = 0;
            }
        }

        while let Some(ch) = self.current_char() {
            if ch != EOL {
                self.next();
                continue;
            }

            let first = self.next();
            if is_char_id_start(first) || matches!(first, Some('-') | Some('#')) {
                break;
            }
        }
    }

    pub fn take_id_start(&mut self) -> ParseResult<char> {
        match self.current_char() {
            Some(ch) if ch.is_ascii_alphabetic() => {
                self.next();
                Ok(ch)
            }
            _ => Err(ParseError::new(
                ErrorKind::ExpectedCharRange("a-zA-Z"),
                self.index,
            )),
        }
    }

    pub fn take_id_char(&mut self) -> Option<char> {
        self.take_char(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    }

    pub fn take_digit(&mut self) -> Option<char> {
        self.take_char(|ch| ch.is_ascii_digit())
    }

    pub fn take_hex_digit(&mut self) -> Option<char> {
        self.take_char(|ch| ch.is_ascii_hexdigit())
    }
}

pub fn is_char_id_start(ch: Option<char>) -> bool {
    matches!(ch, Some(c) if c.is_ascii_alphabetic())
}

fn is_char_pattern_continuation(ch: Option<char>) -> bool {
    match ch {
        None => false,
        Some(c) => !SPECIAL_LINE_START_CHARS.contains(&c),
    }
}
