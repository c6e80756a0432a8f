//! The tokenizer.
//!
//! Advances the state record one token at a time. All progress lives in the
//! state record, so snapshotting the record is all a caller needs to attempt
//! a speculative scan and back out of it.

use crate::char_codes::{
    is_identifier_part, is_identifier_start, is_line_break, is_whitespace_single_line,
};
use crate::context::TokenContext;
use crate::options::Options;
use crate::state::State;
use crate::token::{TokenKind, TokenValue};
use esparse_core::{position_at, Comment, CommentKind, SourceLocation, TokenRecord};
use esparse_diagnostics::{format_message, messages, ParseResult, SyntaxError};

/// The result of decoding one escape sequence.
enum EscapedChar {
    Char(char),
    /// A line continuation: contributes nothing to the cooked text.
    Empty,
    /// An invalid escape inside a template; recorded in the state record
    /// instead of raising.
    Invalid,
}

/// The tokenizer. Owns the input and the state record it advances.
pub struct Lexer {
    chars: Vec<char>,
    pub state: State,
    pub options: Options,
    is_lookahead: bool,
    primed: bool,
}

impl Lexer {
    pub fn new(options: Options, input: &str) -> Self {
        let state = State::init(&options);
        Self {
            chars: input.chars().collect(),
            state,
            options,
            is_lookahead: false,
            primed: false,
        }
    }

    // ========================================================================
    // Public surface
    // ========================================================================

    /// Advance to the next token. The first call reads the first token; each
    /// later call records the previous token's extent (and, when enabled,
    /// pushes it onto the token buffer) before reading.
    pub fn next(&mut self) -> ParseResult<()> {
        if self.primed {
            if self.options.tokens && !self.is_lookahead && self.state.kind != TokenKind::Eof {
                self.push_token_record();
            }
            self.state.last_token_end = self.state.end;
            self.state.last_token_start = self.state.start;
            self.state.last_token_end_loc = self.state.end_loc;
            self.state.last_token_start_loc = self.state.start_loc;
        } else {
            self.primed = true;
        }
        self.next_token()
    }

    /// Advance one token on a cheap clone of the state and hand the advanced
    /// clone back, leaving the current state untouched.
    ///
    /// The clone shares the append-only buffers with the original
    /// (`State::clone(true)`); recording is suppressed while the lookahead
    /// runs so the shared buffers are not grown by the speculative advance.
    pub fn lookahead(&mut self) -> ParseResult<State> {
        let snapshot = self.state.clone(true);
        self.is_lookahead = true;
        let result = self.next();
        self.is_lookahead = false;
        let advanced = std::mem::replace(&mut self.state, snapshot);
        result?;
        Ok(advanced)
    }

    /// The raw source text between two offsets.
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    pub fn input_len(&self) -> usize {
        self.chars.len()
    }

    /// Whether a line break occurs between two offsets.
    pub fn has_line_break(&self, from: usize, to: usize) -> bool {
        self.chars[from..to].iter().copied().any(is_line_break)
    }

    /// Whether a line break precedes the current token.
    pub fn has_line_break_before_current(&self) -> bool {
        self.has_line_break(self.state.last_token_end, self.state.start)
    }

    /// Build a syntax error at an arbitrary offset.
    pub fn raise(&self, pos: usize, message: &str) -> SyntaxError {
        SyntaxError::new(pos as u32, position_at(&self.chars, pos), message)
    }

    // ========================================================================
    // Cursor helpers
    // ========================================================================

    #[inline]
    fn cur(&self) -> Option<char> {
        self.chars.get(self.state.pos).copied()
    }

    #[inline]
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.state.pos + offset).copied()
    }

    fn newline(&mut self, ch: char) {
        self.state.pos += 1;
        if ch == '\r' && self.cur() == Some('\n') {
            self.state.pos += 1;
        }
        self.state.cur_line += 1;
        self.state.line_start = self.state.pos;
    }

    fn push_token_record(&mut self) {
        let record = TokenRecord {
            label: self.state.kind.label(),
            value: self.state.value.to_record_string(),
            start: self.state.start as u32,
            end: self.state.end as u32,
            loc: SourceLocation::new(self.state.start_loc, self.state.end_loc),
        };
        self.state.buffers.tokens.borrow_mut().push(record);
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    fn next_token(&mut self) -> ParseResult<()> {
        let ctx = self.state.cur_context();
        if !ctx.preserve_space() {
            self.skip_space()?;
        }
        self.state.start = self.state.pos;
        self.state.start_loc = self.state.cur_position();
        if self.state.pos >= self.chars.len() {
            if ctx.preserve_space() {
                return Err(self.raise(self.state.pos, messages::UNTERMINATED_TEMPLATE));
            }
            self.finish_token(TokenKind::Eof, TokenValue::None);
            return Ok(());
        }
        if ctx.preserve_space() {
            self.read_template_token()
        } else {
            self.read_token()
        }
    }

    fn finish_token(&mut self, kind: TokenKind, value: TokenValue) {
        self.state.end = self.state.pos;
        self.state.end_loc = self.state.cur_position();
        let prev = self.state.kind;
        self.state.kind = kind;
        self.state.value = value;
        self.update_context(prev);
    }

    fn finish_op(&mut self, kind: TokenKind, op: &'static str, size: usize) {
        self.state.pos += size;
        self.finish_token(kind, TokenValue::Op(op));
    }

    fn read_token(&mut self) -> ParseResult<()> {
        let ch = self.cur().expect("read_token called at end of input");
        if is_identifier_start(ch) || ch == '\\' {
            return self.read_word();
        }
        match ch {
            '0'..='9' => self.read_number(false),
            '"' | '\'' => self.read_string(ch),
            '(' => Ok(self.finish_op_none(TokenKind::ParenL, 1)),
            ')' => Ok(self.finish_op_none(TokenKind::ParenR, 1)),
            '[' => Ok(self.finish_op_none(TokenKind::BracketL, 1)),
            ']' => Ok(self.finish_op_none(TokenKind::BracketR, 1)),
            '{' => Ok(self.finish_op_none(TokenKind::BraceL, 1)),
            '}' => Ok(self.finish_op_none(TokenKind::BraceR, 1)),
            ',' => Ok(self.finish_op_none(TokenKind::Comma, 1)),
            ';' => Ok(self.finish_op_none(TokenKind::Semi, 1)),
            ':' => Ok(self.finish_op_none(TokenKind::Colon, 1)),
            '?' => Ok(self.finish_op_none(TokenKind::Question, 1)),
            '@' => Ok(self.finish_op_none(TokenKind::At, 1)),
            '`' => Ok(self.finish_op_none(TokenKind::BackQuote, 1)),
            '.' => {
                if self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.read_number(true)
                } else if self.peek(1) == Some('.') && self.peek(2) == Some('.') {
                    Ok(self.finish_op_none(TokenKind::Ellipsis, 3))
                } else {
                    Ok(self.finish_op_none(TokenKind::Dot, 1))
                }
            }
            '/' => {
                if self.state.expr_allowed {
                    self.read_regexp()
                } else if self.peek(1) == Some('=') {
                    Ok(self.finish_op(TokenKind::Assign, "/=", 2))
                } else {
                    Ok(self.finish_op(TokenKind::Slash, "/", 1))
                }
            }
            '*' => Ok(match (self.peek(1), self.peek(2)) {
                (Some('*'), Some('=')) => self.finish_op(TokenKind::Assign, "**=", 3),
                (Some('*'), _) => self.finish_op(TokenKind::Exponent, "**", 2),
                (Some('='), _) => self.finish_op(TokenKind::Assign, "*=", 2),
                _ => self.finish_op(TokenKind::Star, "*", 1),
            }),
            '%' => Ok(if self.peek(1) == Some('=') {
                self.finish_op(TokenKind::Assign, "%=", 2)
            } else {
                self.finish_op(TokenKind::Modulo, "%", 1)
            }),
            '+' => Ok(match self.peek(1) {
                Some('+') => self.finish_op(TokenKind::IncDec, "++", 2),
                Some('=') => self.finish_op(TokenKind::Assign, "+=", 2),
                _ => self.finish_op(TokenKind::PlusMin, "+", 1),
            }),
            '-' => Ok(match self.peek(1) {
                Some('-') => self.finish_op(TokenKind::IncDec, "--", 2),
                Some('=') => self.finish_op(TokenKind::Assign, "-=", 2),
                _ => self.finish_op(TokenKind::PlusMin, "-", 1),
            }),
            '&' => Ok(match self.peek(1) {
                Some('&') => self.finish_op(TokenKind::LogicalAnd, "&&", 2),
                Some('=') => self.finish_op(TokenKind::Assign, "&=", 2),
                _ => self.finish_op(TokenKind::BitwiseAnd, "&", 1),
            }),
            '|' => Ok(match self.peek(1) {
                Some('|') => self.finish_op(TokenKind::LogicalOr, "||", 2),
                Some('=') => self.finish_op(TokenKind::Assign, "|=", 2),
                _ => self.finish_op(TokenKind::BitwiseOr, "|", 1),
            }),
            '^' => Ok(if self.peek(1) == Some('=') {
                self.finish_op(TokenKind::Assign, "^=", 2)
            } else {
                self.finish_op(TokenKind::BitwiseXor, "^", 1)
            }),
            '<' => Ok(match (self.peek(1), self.peek(2)) {
                (Some('<'), Some('=')) => self.finish_op(TokenKind::Assign, "<<=", 3),
                (Some('<'), _) => self.finish_op(TokenKind::BitShift, "<<", 2),
                (Some('='), _) => self.finish_op(TokenKind::Relational, "<=", 2),
                _ => self.finish_op(TokenKind::Relational, "<", 1),
            }),
            '>' => Ok(match (self.peek(1), self.peek(2), self.peek(3)) {
                (Some('>'), Some('>'), Some('=')) => {
                    self.finish_op(TokenKind::Assign, ">>>=", 4)
                }
                (Some('>'), Some('>'), _) => self.finish_op(TokenKind::BitShift, ">>>", 3),
                (Some('>'), Some('='), _) => self.finish_op(TokenKind::Assign, ">>=", 3),
                (Some('>'), _, _) => self.finish_op(TokenKind::BitShift, ">>", 2),
                (Some('='), _, _) => self.finish_op(TokenKind::Relational, ">=", 2),
                _ => self.finish_op(TokenKind::Relational, ">", 1),
            }),
            '=' => Ok(match (self.peek(1), self.peek(2)) {
                (Some('>'), _) => self.finish_op_none(TokenKind::Arrow, 2),
                (Some('='), Some('=')) => self.finish_op(TokenKind::Equality, "===", 3),
                (Some('='), _) => self.finish_op(TokenKind::Equality, "==", 2),
                _ => self.finish_op(TokenKind::Eq, "=", 1),
            }),
            '!' => Ok(match (self.peek(1), self.peek(2)) {
                (Some('='), Some('=')) => self.finish_op(TokenKind::Equality, "!==", 3),
                (Some('='), _) => self.finish_op(TokenKind::Equality, "!=", 2),
                _ => self.finish_op(TokenKind::Prefix, "!", 1),
            }),
            '~' => Ok(self.finish_op(TokenKind::Prefix, "~", 1)),
            _ => Err(self.raise(
                self.state.pos,
                &format_message(messages::UNEXPECTED_CHARACTER, &[&ch.to_string()]),
            )),
        }
    }

    fn finish_op_none(&mut self, kind: TokenKind, size: usize) {
        self.state.pos += size;
        self.finish_token(kind, TokenValue::None);
    }

    // ========================================================================
    // Whitespace and comments
    // ========================================================================

    fn skip_space(&mut self) -> ParseResult<()> {
        while let Some(ch) = self.cur() {
            if is_line_break(ch) {
                self.newline(ch);
            } else if ch == '/' && self.peek(1) == Some('/') {
                self.skip_line_comment(2);
            } else if ch == '/' && self.peek(1) == Some('*') {
                self.skip_block_comment()?;
            } else if is_whitespace_single_line(ch) {
                self.state.pos += 1;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn skip_line_comment(&mut self, start_skip: usize) {
        let start = self.state.pos;
        let start_loc = self.state.cur_position();
        self.state.pos += start_skip;
        while let Some(ch) = self.cur() {
            if is_line_break(ch) {
                break;
            }
            self.state.pos += 1;
        }
        let value = self.slice(start + start_skip, self.state.pos);
        self.add_comment(CommentKind::CommentLine, value, start, start_loc);
    }

    fn skip_block_comment(&mut self) -> ParseResult<()> {
        let start = self.state.pos;
        let start_loc = self.state.cur_position();
        self.state.pos += 2;
        loop {
            match self.cur() {
                None => return Err(self.raise(start, messages::UNTERMINATED_COMMENT)),
                Some('*') if self.peek(1) == Some('/') => {
                    self.state.pos += 2;
                    break;
                }
                Some(ch) if is_line_break(ch) => self.newline(ch),
                Some(_) => self.state.pos += 1,
            }
        }
        let value = self.slice(start + 2, self.state.pos - 2);
        self.add_comment(CommentKind::CommentBlock, value, start, start_loc);
        Ok(())
    }

    fn add_comment(
        &mut self,
        kind: CommentKind,
        value: String,
        start: usize,
        start_loc: esparse_core::Position,
    ) {
        if self.is_lookahead {
            return;
        }
        let comment = Comment {
            kind,
            value,
            start: start as u32,
            end: self.state.pos as u32,
            loc: SourceLocation::new(start_loc, self.state.cur_position()),
        };
        if self.options.tokens {
            self.state.buffers.tokens.borrow_mut().push(TokenRecord {
                label: match kind {
                    CommentKind::CommentLine => "CommentLine",
                    CommentKind::CommentBlock => "CommentBlock",
                },
                value: Some(comment.value.clone()),
                start: comment.start,
                end: comment.end,
                loc: comment.loc,
            });
        }
        self.state.buffers.comments.borrow_mut().push(comment.clone());
        self.state.buffers.trailing_comments.borrow_mut().push(comment);
    }

    // ========================================================================
    // Words and keywords
    // ========================================================================

    fn read_word(&mut self) -> ParseResult<()> {
        self.state.contains_esc = false;
        let mut word = String::new();
        let mut first = true;
        while let Some(ch) = self.cur() {
            if is_identifier_part(ch) {
                word.push(ch);
                self.state.pos += 1;
            } else if ch == '\\' {
                self.state.contains_esc = true;
                let esc_start = self.state.pos;
                self.state.pos += 1;
                if self.cur() != Some('u') {
                    return Err(self.raise(esc_start, messages::EXPECTED_UNICODE_ESCAPE));
                }
                self.state.pos += 1;
                let code = self
                    .read_code_point()?
                    .ok_or_else(|| self.raise(esc_start, messages::INVALID_UNICODE_ESCAPE))?;
                let valid = if first {
                    is_identifier_start(code)
                } else {
                    is_identifier_part(code)
                };
                if !valid {
                    return Err(self.raise(esc_start, messages::INVALID_UNICODE_ESCAPE));
                }
                word.push(code);
            } else {
                break;
            }
            first = false;
        }
        // Words containing escape sequences must not be interpreted as
        // keywords.
        let kind = if self.state.contains_esc {
            TokenKind::Name
        } else {
            TokenKind::keyword(&word).unwrap_or(TokenKind::Name)
        };
        self.finish_token(kind, TokenValue::Word(word));
        Ok(())
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    fn read_decimal_digits(&mut self) {
        while self.cur().is_some_and(|c| c.is_ascii_digit()) {
            self.state.pos += 1;
        }
    }

    fn check_identifier_after_number(&self) -> ParseResult<()> {
        if self.cur().is_some_and(is_identifier_start) {
            return Err(self.raise(self.state.pos, messages::IDENTIFIER_AFTER_NUMBER));
        }
        Ok(())
    }

    fn read_number(&mut self, starts_with_dot: bool) -> ParseResult<()> {
        let start = self.state.pos;
        if starts_with_dot {
            self.state.pos += 1;
            self.read_decimal_digits();
        } else {
            if self.cur() == Some('0') {
                match self.peek(1) {
                    Some('x') | Some('X') => return self.read_radix_number(16),
                    Some('o') | Some('O') => return self.read_radix_number(8),
                    Some('b') | Some('B') => return self.read_radix_number(2),
                    Some(c) if c.is_ascii_digit() => return self.read_legacy_octal(),
                    _ => {}
                }
            }
            self.read_decimal_digits();
            if self.cur() == Some('.') {
                self.state.pos += 1;
                self.read_decimal_digits();
            }
        }
        if matches!(self.cur(), Some('e') | Some('E')) {
            self.state.pos += 1;
            if matches!(self.cur(), Some('+') | Some('-')) {
                self.state.pos += 1;
            }
            if !self.cur().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.raise(start, messages::INVALID_NUMBER));
            }
            self.read_decimal_digits();
        }
        self.check_identifier_after_number()?;
        let text = self.slice(start, self.state.pos);
        let value = text
            .parse::<f64>()
            .map_err(|_| self.raise(start, messages::INVALID_NUMBER))?;
        self.finish_token(TokenKind::Num, TokenValue::Num(value));
        Ok(())
    }

    fn read_radix_number(&mut self, radix: u32) -> ParseResult<()> {
        let start = self.state.pos;
        self.state.pos += 2;
        let digits_start = self.state.pos;
        while self.cur().is_some_and(|c| c.is_digit(radix)) {
            self.state.pos += 1;
        }
        if self.state.pos == digits_start {
            return Err(self.raise(
                start,
                &format_message(messages::EXPECTED_NUMBER_IN_RADIX, &[&radix.to_string()]),
            ));
        }
        self.check_identifier_after_number()?;
        let text = self.slice(digits_start, self.state.pos);
        let value = u64::from_str_radix(&text, radix)
            .map_err(|_| self.raise(start, messages::INVALID_NUMBER))? as f64;
        self.finish_token(TokenKind::Num, TokenValue::Num(value));
        Ok(())
    }

    /// A `0`-prefixed digit run: interpreted base 8 unless it contains an
    /// `8` or `9`, and rejected outright in strict mode.
    fn read_legacy_octal(&mut self) -> ParseResult<()> {
        let start = self.state.pos;
        self.read_decimal_digits();
        if self.state.strict {
            return Err(self.raise(start, messages::INVALID_NUMBER));
        }
        self.check_identifier_after_number()?;
        let text = self.slice(start, self.state.pos);
        let value = if text.bytes().any(|b| b == b'8' || b == b'9') {
            text.parse::<f64>()
                .map_err(|_| self.raise(start, messages::INVALID_NUMBER))?
        } else {
            u64::from_str_radix(&text, 8)
                .map_err(|_| self.raise(start, messages::INVALID_NUMBER))? as f64
        };
        self.finish_token(TokenKind::Num, TokenValue::Num(value));
        Ok(())
    }

    // ========================================================================
    // Strings, escapes, templates
    // ========================================================================

    fn read_string(&mut self, quote: char) -> ParseResult<()> {
        let start = self.state.pos;
        self.state.pos += 1;
        let mut out = String::new();
        loop {
            match self.cur() {
                None => return Err(self.raise(start, messages::UNTERMINATED_STRING)),
                Some(ch) if ch == quote => {
                    self.state.pos += 1;
                    break;
                }
                Some('\\') => match self.read_escaped_char(false)? {
                    EscapedChar::Char(c) => out.push(c),
                    EscapedChar::Empty => {}
                    EscapedChar::Invalid => unreachable!("invalid escapes raise outside templates"),
                },
                // Paragraph and line separators are legal in strings.
                Some(ch @ ('\u{2028}' | '\u{2029}')) => {
                    out.push(ch);
                    self.newline(ch);
                }
                Some(ch) if is_line_break(ch) => {
                    return Err(self.raise(start, messages::UNTERMINATED_STRING))
                }
                Some(ch) => {
                    out.push(ch);
                    self.state.pos += 1;
                }
            }
        }
        self.finish_token(TokenKind::String, TokenValue::Str(out));
        Ok(())
    }

    /// Decode one escape sequence with the cursor on the backslash. In
    /// template mode invalid escapes do not raise: the invalid position is
    /// recorded on the state and the cooked text is poisoned instead.
    fn read_escaped_char(&mut self, in_template: bool) -> ParseResult<EscapedChar> {
        let escape_start = self.state.pos;
        self.state.pos += 1;
        let Some(ch) = self.cur() else {
            return Err(self.raise(escape_start, messages::UNTERMINATED_STRING));
        };
        self.state.pos += 1;
        match ch {
            'n' => Ok(EscapedChar::Char('\n')),
            'r' => Ok(EscapedChar::Char('\r')),
            't' => Ok(EscapedChar::Char('\t')),
            'b' => Ok(EscapedChar::Char('\u{8}')),
            'v' => Ok(EscapedChar::Char('\u{b}')),
            'f' => Ok(EscapedChar::Char('\u{c}')),
            'x' => {
                let Some(code) = self.read_hex_digits(2) else {
                    return self.invalid_escape(in_template, escape_start);
                };
                Ok(EscapedChar::Char(
                    char::from_u32(code).expect("two hex digits are always a valid char"),
                ))
            }
            'u' => match self.read_code_point()? {
                Some(c) => Ok(EscapedChar::Char(c)),
                None => self.invalid_escape(in_template, escape_start),
            },
            '\n' | '\r' | '\u{2028}' | '\u{2029}' => {
                // Line continuation.
                self.state.pos -= 1;
                self.newline(ch);
                Ok(EscapedChar::Empty)
            }
            '0'..='7' => {
                let mut value = ch as u32 - '0' as u32;
                let mut len = 1;
                while len < 3 {
                    let Some(d) = self.cur().and_then(|c| c.to_digit(8)) else {
                        break;
                    };
                    if value * 8 + d > 255 {
                        break;
                    }
                    value = value * 8 + d;
                    self.state.pos += 1;
                    len += 1;
                }
                let is_bare_zero =
                    value == 0 && len == 1 && !self.cur().is_some_and(|c| c.is_ascii_digit());
                if !is_bare_zero {
                    if in_template {
                        return self.invalid_escape(true, escape_start);
                    }
                    if self.state.strict {
                        return Err(self.raise(escape_start, messages::OCTAL_IN_STRICT_MODE));
                    }
                    self.state.contains_octal = true;
                    if self.state.octal_position.is_none() {
                        self.state.octal_position = Some(escape_start);
                    }
                }
                Ok(EscapedChar::Char(
                    char::from_u32(value).expect("octal escapes are at most 0xFF"),
                ))
            }
            _ => Ok(EscapedChar::Char(ch)),
        }
    }

    fn invalid_escape(&mut self, in_template: bool, pos: usize) -> ParseResult<EscapedChar> {
        if in_template {
            if self.state.invalid_template_escape_position.is_none() {
                self.state.invalid_template_escape_position = Some(pos);
            }
            Ok(EscapedChar::Invalid)
        } else {
            Err(self.raise(pos, messages::BAD_CHARACTER_ESCAPE))
        }
    }

    /// Read exactly `len` hex digits; `None` if any is missing.
    fn read_hex_digits(&mut self, len: usize) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..len {
            let d = self.cur().and_then(|c| c.to_digit(16))?;
            value = value * 16 + d;
            self.state.pos += 1;
        }
        Some(value)
    }

    /// Read a `\u` payload with the cursor after the `u`: either four hex
    /// digits or a braced code point.
    fn read_code_point(&mut self) -> ParseResult<Option<char>> {
        if self.cur() == Some('{') {
            let brace = self.state.pos;
            self.state.pos += 1;
            let digits_start = self.state.pos;
            let mut value = 0u32;
            while let Some(d) = self.cur().and_then(|c| c.to_digit(16)) {
                value = value.saturating_mul(16).saturating_add(d);
                self.state.pos += 1;
            }
            if self.state.pos == digits_start || self.cur() != Some('}') {
                return Ok(None);
            }
            self.state.pos += 1;
            if value > 0x10FFFF {
                return Err(self.raise(brace, messages::CODE_POINT_OUT_OF_BOUNDS));
            }
            Ok(char::from_u32(value))
        } else {
            Ok(self.read_hex_digits(4).and_then(char::from_u32))
        }
    }

    fn read_template_token(&mut self) -> ParseResult<()> {
        let mut out = String::new();
        let mut contains_invalid = false;
        let chunk_start = self.state.pos;
        loop {
            let Some(ch) = self.cur() else {
                return Err(self.raise(self.state.start, messages::UNTERMINATED_TEMPLATE));
            };
            if ch == '`' || (ch == '$' && self.peek(1) == Some('{')) {
                if self.state.pos == self.state.start && self.state.kind == TokenKind::Template {
                    if ch == '$' {
                        self.finish_op_none(TokenKind::DollarBraceL, 2);
                    } else {
                        self.finish_op_none(TokenKind::BackQuote, 1);
                    }
                    return Ok(());
                }
                let raw = self.slice(chunk_start, self.state.pos);
                self.finish_token(
                    TokenKind::Template,
                    TokenValue::Template {
                        cooked: if contains_invalid { None } else { Some(out) },
                        raw,
                    },
                );
                return Ok(());
            }
            if ch == '\\' {
                match self.read_escaped_char(true)? {
                    EscapedChar::Char(c) => out.push(c),
                    EscapedChar::Empty => {}
                    EscapedChar::Invalid => contains_invalid = true,
                }
            } else if is_line_break(ch) {
                self.newline(ch);
                out.push('\n');
            } else {
                out.push(ch);
                self.state.pos += 1;
            }
        }
    }

    // ========================================================================
    // Regular expressions
    // ========================================================================

    fn read_regexp(&mut self) -> ParseResult<()> {
        let start = self.state.pos;
        self.state.pos += 1;
        let content_start = self.state.pos;
        let mut escaped = false;
        let mut in_class = false;
        loop {
            let Some(ch) = self.cur() else {
                return Err(self.raise(start, messages::UNTERMINATED_REGEXP));
            };
            if is_line_break(ch) {
                return Err(self.raise(start, messages::UNTERMINATED_REGEXP));
            }
            if escaped {
                escaped = false;
            } else {
                match ch {
                    '[' => in_class = true,
                    ']' if in_class => in_class = false,
                    '/' if !in_class => break,
                    '\\' => escaped = true,
                    _ => {}
                }
            }
            self.state.pos += 1;
        }
        let pattern = self.slice(content_start, self.state.pos);
        self.state.pos += 1;
        let flags_start = self.state.pos;
        while let Some(ch) = self.cur() {
            if !is_identifier_part(ch) {
                break;
            }
            if !matches!(ch, 'g' | 'i' | 'm' | 's' | 'u' | 'y') {
                return Err(self.raise(flags_start, messages::INVALID_REGEXP_FLAG));
            }
            if self.slice(flags_start, self.state.pos).contains(ch) {
                return Err(self.raise(flags_start, messages::DUPLICATE_REGEXP_FLAG));
            }
            self.state.pos += 1;
        }
        let flags = self.slice(flags_start, self.state.pos);
        self.finish_token(TokenKind::Regexp, TokenValue::Regex { pattern, flags });
        Ok(())
    }

    // ========================================================================
    // Context tracking
    // ========================================================================

    /// Decide whether a `{` after `prev` opens a block or an object literal.
    fn brace_is_block(&self, prev: TokenKind) -> bool {
        let cur = self.state.cur_context();
        match prev {
            TokenKind::Colon
                if matches!(
                    cur,
                    TokenContext::BraceStatement | TokenContext::BraceExpression
                ) =>
            {
                !cur.is_expr()
            }
            TokenKind::Return => {
                self.has_line_break(self.state.last_token_end, self.state.start)
            }
            TokenKind::Else | TokenKind::Semi | TokenKind::Eof | TokenKind::ParenR => true,
            TokenKind::BraceL => cur == TokenContext::BraceStatement,
            _ => !self.state.expr_allowed,
        }
    }

    fn update_context(&mut self, prev: TokenKind) {
        match self.state.kind {
            TokenKind::BraceR => {
                if self.state.context.len() == 1 {
                    self.state.expr_allowed = true;
                    return;
                }
                let out = self.state.context.pop().expect("context stack is never empty");
                if out == TokenContext::BraceStatement
                    && self.state.cur_context() == TokenContext::FunctionExpression
                {
                    self.state.context.pop();
                    self.state.expr_allowed = false;
                } else if out == TokenContext::TemplateQuasi {
                    self.state.expr_allowed = true;
                } else {
                    self.state.expr_allowed = !out.is_expr();
                }
            }
            TokenKind::BraceL => {
                let ctx = if self.brace_is_block(prev) {
                    TokenContext::BraceStatement
                } else {
                    TokenContext::BraceExpression
                };
                self.state.context.push(ctx);
                self.state.expr_allowed = true;
            }
            TokenKind::DollarBraceL => {
                self.state.context.push(TokenContext::TemplateQuasi);
                self.state.expr_allowed = true;
            }
            TokenKind::ParenL => {
                let ctx = if matches!(
                    prev,
                    TokenKind::If | TokenKind::For | TokenKind::With | TokenKind::While
                ) {
                    TokenContext::ParenStatement
                } else {
                    TokenContext::ParenExpression
                };
                self.state.context.push(ctx);
                self.state.expr_allowed = true;
            }
            TokenKind::IncDec => {
                // Leaves expr_allowed untouched.
            }
            TokenKind::Function => {
                if prev.before_expr()
                    && prev != TokenKind::Semi
                    && prev != TokenKind::Else
                    && !(prev == TokenKind::Return
                        && self.has_line_break(self.state.last_token_end, self.state.start))
                    && !(matches!(prev, TokenKind::Colon | TokenKind::BraceL)
                        && self.state.cur_context() == TokenContext::BraceStatement)
                {
                    self.state.context.push(TokenContext::FunctionExpression);
                }
                self.state.expr_allowed = false;
            }
            TokenKind::BackQuote => {
                if self.state.cur_context() == TokenContext::Template {
                    self.state.context.pop();
                } else {
                    self.state.context.push(TokenContext::Template);
                }
                self.state.expr_allowed = false;
            }
            kind => {
                self.state.expr_allowed = kind.before_expr();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Lexer {
        Lexer::new(Options::default(), input)
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut lexer = lex(input);
        let mut out = Vec::new();
        loop {
            lexer.next().unwrap();
            if lexer.state.kind == TokenKind::Eof {
                break;
            }
            out.push(lexer.state.kind);
        }
        out
    }

    #[test]
    fn test_scan_simple_tokens() {
        assert_eq!(
            kinds("( ) { } [ ] ; , :"),
            vec![
                TokenKind::ParenL,
                TokenKind::ParenR,
                TokenKind::BraceL,
                TokenKind::BraceR,
                TokenKind::BracketL,
                TokenKind::BracketR,
                TokenKind::Semi,
                TokenKind::Comma,
                TokenKind::Colon,
            ]
        );
    }

    #[test]
    fn test_scan_operators() {
        assert_eq!(
            kinds("= == === => ++ += ** *"),
            vec![
                TokenKind::Eq,
                TokenKind::Equality,
                TokenKind::Equality,
                TokenKind::Arrow,
                TokenKind::IncDec,
                TokenKind::Assign,
                TokenKind::Exponent,
                TokenKind::Star,
            ]
        );
    }

    #[test]
    fn test_scan_identifier_and_keyword() {
        let mut lexer = lex("let x = 42;");
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Let);
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Name);
        assert_eq!(lexer.state.value.as_word(), Some("x"));
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Eq);
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Num);
        assert_eq!(lexer.state.value, TokenValue::Num(42.0));
    }

    #[test]
    fn test_escaped_word_is_not_a_keyword() {
        let mut lexer = lex("\\u0069f");
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Name);
        assert!(lexer.state.contains_esc);
        assert_eq!(lexer.state.value.as_word(), Some("if"));
    }

    #[test]
    fn test_scan_string_literal() {
        let mut lexer = lex(r#""hello\n" 'wor\x6Cd'"#);
        lexer.next().unwrap();
        assert_eq!(lexer.state.value, TokenValue::Str("hello\n".to_string()));
        lexer.next().unwrap();
        assert_eq!(lexer.state.value, TokenValue::Str("world".to_string()));
    }

    #[test]
    fn test_octal_escape_sets_marker() {
        let mut lexer = lex(r#""a\07b""#);
        lexer.next().unwrap();
        assert!(lexer.state.contains_octal);
        assert_eq!(lexer.state.octal_position, Some(2));
    }

    #[test]
    fn test_octal_escape_raises_in_strict() {
        let mut lexer = Lexer::new(
            Options {
                strict_mode: Some(true),
                ..Options::default()
            },
            r#""a\07b""#,
        );
        let err = lexer.next().unwrap_err();
        assert_eq!(err.message, "Octal literal in strict mode");
    }

    #[test]
    fn test_scan_number_formats() {
        let mut lexer = lex("42 3.14 0xff 0b1010 0o777 .5 1e3");
        let expected = [42.0, 3.14, 255.0, 10.0, 511.0, 0.5, 1000.0];
        for value in expected {
            lexer.next().unwrap();
            assert_eq!(lexer.state.kind, TokenKind::Num);
            assert_eq!(lexer.state.value, TokenValue::Num(value));
        }
    }

    #[test]
    fn test_legacy_octal_number() {
        let mut lexer = lex("0123");
        lexer.next().unwrap();
        assert_eq!(lexer.state.value, TokenValue::Num(83.0));
    }

    #[test]
    fn test_scan_comments_are_buffered() {
        let mut lexer = lex("// line\nlet /* block */ x");
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Let);
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Name);
        let comments = lexer.state.buffers.comments.borrow();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].value, " line");
        assert_eq!(comments[1].value, " block ");
    }

    #[test]
    fn test_regex_vs_divide() {
        let mut lexer = lex("a / b");
        lexer.next().unwrap();
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Slash);

        let mut lexer = lex("a = /b/g");
        lexer.next().unwrap();
        lexer.next().unwrap();
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Regexp);
        assert_eq!(
            lexer.state.value,
            TokenValue::Regex {
                pattern: "b".to_string(),
                flags: "g".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_regexp_flag() {
        let mut lexer = lex("x = /a/q");
        lexer.next().unwrap();
        lexer.next().unwrap();
        let err = lexer.next().unwrap_err();
        assert_eq!(err.message, "Invalid regular expression flag");
    }

    #[test]
    fn test_line_tracking() {
        let mut lexer = lex("a\nbb\n  c");
        lexer.next().unwrap();
        lexer.next().unwrap();
        assert_eq!(lexer.state.start_loc.line, 2);
        lexer.next().unwrap();
        assert_eq!(lexer.state.start_loc.line, 3);
        assert_eq!(lexer.state.start_loc.column, 2);
    }

    #[test]
    fn test_lookahead_restores_cursor() {
        let mut lexer = lex("let x = 1;");
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Let);
        let ahead = lexer.lookahead().unwrap();
        assert_eq!(ahead.kind, TokenKind::Name);
        // The current token is unchanged.
        assert_eq!(lexer.state.kind, TokenKind::Let);
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Name);
    }

    #[test]
    fn test_lookahead_does_not_record_comments() {
        let mut lexer = lex("a /* c */ b");
        lexer.next().unwrap();
        let _ = lexer.lookahead().unwrap();
        assert_eq!(lexer.state.buffers.comments.borrow().len(), 0);
        lexer.next().unwrap();
        assert_eq!(lexer.state.buffers.comments.borrow().len(), 1);
    }

    #[test]
    fn test_token_recording() {
        let mut lexer = Lexer::new(
            Options {
                tokens: true,
                ..Options::default()
            },
            "a + 1",
        );
        for _ in 0..4 {
            lexer.next().unwrap();
        }
        assert_eq!(lexer.state.kind, TokenKind::Eof);
        let tokens = lexer.state.buffers.tokens.borrow();
        let labels: Vec<&str> = tokens.iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["name", "+/-", "num"]);
    }

    #[test]
    fn test_template_tokens() {
        let mut lexer = lex("`a${b}c`");
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::BackQuote);
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Template);
        match &lexer.state.value {
            TokenValue::Template { cooked, raw } => {
                assert_eq!(cooked.as_deref(), Some("a"));
                assert_eq!(raw, "a");
            }
            other => panic!("unexpected value {:?}", other),
        }
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::DollarBraceL);
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Name);
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::BraceR);
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Template);
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::BackQuote);
    }

    #[test]
    fn test_template_invalid_escape_is_recorded_not_raised() {
        let mut lexer = lex("`\\u{ZZ}`");
        lexer.next().unwrap();
        lexer.next().unwrap();
        assert_eq!(lexer.state.kind, TokenKind::Template);
        match &lexer.state.value {
            TokenValue::Template { cooked, .. } => assert!(cooked.is_none()),
            other => panic!("unexpected value {:?}", other),
        }
        assert!(lexer.state.invalid_template_escape_position.is_some());
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = lex("\"abc");
        let err = lexer.next().unwrap_err();
        assert_eq!(err.message, "Unterminated string constant");
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = lex("#");
        let err = lexer.next().unwrap_err();
        assert_eq!(err.message, "Unexpected character '#'");
        assert_eq!(err.pos, 0);
    }
}
