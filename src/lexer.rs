//! Lexical grammar: a position-tracking cursor and literal recognizers.
//!
//! Each recognizer looks at the current position and either
//!
//! - returns `Ok(None)` without consuming anything when the token does not
//!   have its shape, so the caller can try the next alternative,
//! - returns `Ok(Some(..))` with the decoded literal, or
//! - returns `Err(..)` once the token has committed to the form but is
//!   malformed (bad escape, overflow, impossible date, ...).

use crate::error::LexicalError;
use crate::{Error, Result, Value};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Characters TOML forbids in strings and comments.
///
/// Tab, line feed and carriage return are handled separately by each context.
#[inline]
pub(crate) fn is_disallowed_control(ch: char) -> bool {
    matches!(ch, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{7F}')
}

/// Characters allowed in a bare key.
#[inline]
pub(crate) fn is_bare_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Checkpoint {
    pos: usize,
    line: usize,
    col: usize,
}

/// Cursor over the document text, tracking 1-based line and column.
pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        // A leading byte-order mark is not part of the document.
        let pos = if input.starts_with('\u{feff}') { 3 } else { 0 };
        Cursor {
            input,
            pos,
            line: 1,
            col: 1,
        }
    }

    #[inline]
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    #[inline]
    pub(crate) fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    #[inline]
    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    #[inline]
    pub(crate) fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    #[inline]
    pub(crate) fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    pub(crate) fn next_char(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    pub(crate) fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.next_char();
            true
        } else {
            false
        }
    }

    /// Consumes `s` if the input continues with it. `s` must not contain newlines.
    pub(crate) fn eat_str(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            self.col += s.chars().count();
            true
        } else {
            false
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.line = checkpoint.line;
        self.col = checkpoint.col;
    }

    /// Syntax error at the current position.
    pub(crate) fn error(&self, msg: impl Into<String>) -> Error {
        Error::syntax(self.line, self.col, msg)
    }

    /// Describes the next token for "expected X, found Y" messages.
    pub(crate) fn describe_next(&self) -> String {
        match self.peek() {
            None => "end of input".to_string(),
            Some('\n') | Some('\r') => "newline".to_string(),
            Some(ch) => format!("`{}`", ch.escape_debug()),
        }
    }

    /// Skips spaces and tabs.
    pub(crate) fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.next_char();
        }
    }

    /// Consumes a comment up to (not including) the line terminator.
    pub(crate) fn eat_comment(&mut self) -> Result<bool> {
        if self.peek() != Some('#') {
            return Ok(false);
        }
        self.next_char();
        while let Some(ch) = self.peek() {
            if ch == '\n' || ch == '\r' {
                break;
            }
            if is_disallowed_control(ch) {
                return Err(Error::lexical(
                    self.line,
                    LexicalError::ControlCharacter(ch),
                ));
            }
            self.next_char();
        }
        Ok(true)
    }

    /// Consumes `\n` or `\r\n`. A carriage return on its own is an error.
    pub(crate) fn eat_newline(&mut self) -> Result<bool> {
        match self.peek() {
            Some('\n') => {
                self.next_char();
                Ok(true)
            }
            Some('\r') => {
                if self.peek_nth(1) == Some('\n') {
                    self.next_char();
                    self.next_char();
                    Ok(true)
                } else {
                    Err(self.error("carriage return must be followed by a newline"))
                }
            }
            _ => Ok(false),
        }
    }

    /// Skips whitespace, comments and newlines.
    pub(crate) fn skip_trivia(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace();
            self.eat_comment()?;
            if !self.eat_newline()? {
                return Ok(());
            }
        }
    }

    /// Requires the rest of the line to be whitespace and an optional comment.
    pub(crate) fn expect_line_end(&mut self) -> Result<()> {
        self.skip_whitespace();
        self.eat_comment()?;
        if self.at_end() || self.eat_newline()? {
            Ok(())
        } else {
            Err(self.error(format!(
                "expected newline or end of input, found {}",
                self.describe_next()
            )))
        }
    }

    fn lex_error(&self, cause: LexicalError) -> Error {
        Error::lexical(self.line, cause)
    }

    // -- booleans ------------------------------------------------------------

    pub(crate) fn boolean(&mut self) -> Option<bool> {
        let value = if self.starts_with("true") {
            true
        } else if self.starts_with("false") {
            false
        } else {
            return None;
        };
        let len = if value { 4 } else { 5 };
        if self.rest()[len..].starts_with(is_bare_key_char) {
            return None;
        }
        self.eat_str(if value { "true" } else { "false" });
        Some(value)
    }

    // -- strings -------------------------------------------------------------

    /// Recognizes any of the four string forms.
    ///
    /// Multi-line forms are refused with a syntax error when
    /// `allow_multiline` is false (keys).
    pub(crate) fn string(&mut self, allow_multiline: bool) -> Result<Option<String>> {
        let (delim, multiline) = match self.peek() {
            Some('"') => ('"', self.starts_with("\"\"\"")),
            Some('\'') => ('\'', self.starts_with("'''")),
            _ => return Ok(None),
        };
        if multiline && !allow_multiline {
            return Err(self.error("multi-line strings are not allowed here"));
        }
        let text = match (delim, multiline) {
            ('"', false) => self.basic_string()?,
            ('"', true) => self.multiline_string(true)?,
            (_, false) => self.literal_string()?,
            (_, true) => self.multiline_string(false)?,
        };
        Ok(Some(text))
    }

    fn basic_string(&mut self) -> Result<String> {
        self.next_char();
        let mut out = String::new();
        loop {
            match self.peek() {
                None | Some('\n') | Some('\r') => {
                    return Err(self.lex_error(LexicalError::UnterminatedString))
                }
                Some('"') => {
                    self.next_char();
                    return Ok(out);
                }
                Some('\\') => {
                    self.next_char();
                    out.push(self.escape()?);
                }
                Some(ch) if is_disallowed_control(ch) => {
                    return Err(self.lex_error(LexicalError::ControlCharacter(ch)))
                }
                Some(ch) => {
                    self.next_char();
                    out.push(ch);
                }
            }
        }
    }

    fn literal_string(&mut self) -> Result<String> {
        self.next_char();
        let mut out = String::new();
        loop {
            match self.peek() {
                None | Some('\n') | Some('\r') => {
                    return Err(self.lex_error(LexicalError::UnterminatedString))
                }
                Some('\'') => {
                    self.next_char();
                    return Ok(out);
                }
                Some(ch) if is_disallowed_control(ch) => {
                    return Err(self.lex_error(LexicalError::ControlCharacter(ch)))
                }
                Some(ch) => {
                    self.next_char();
                    out.push(ch);
                }
            }
        }
    }

    /// `"""…"""` when `basic`, `'''…'''` otherwise.
    ///
    /// A newline right after the opening delimiter is dropped. Up to two
    /// quotes directly before the closing delimiter belong to the content.
    fn multiline_string(&mut self, basic: bool) -> Result<String> {
        let delim = if basic { '"' } else { '\'' };
        for _ in 0..3 {
            self.next_char();
        }
        self.eat_newline()?;

        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.lex_error(LexicalError::UnterminatedString)),
                Some(ch) if ch == delim => {
                    let run = self.rest().chars().take_while(|&c| c == delim).count();
                    if run >= 3 {
                        if run > 5 {
                            return Err(self.error(format!(
                                "too many `{}` closing a multi-line string",
                                delim
                            )));
                        }
                        out.extend(std::iter::repeat(delim).take(run - 3));
                        for _ in 0..run {
                            self.next_char();
                        }
                        return Ok(out);
                    }
                    out.extend(std::iter::repeat(delim).take(run));
                    for _ in 0..run {
                        self.next_char();
                    }
                }
                Some('\\') if basic => {
                    self.next_char();
                    if matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
                        self.line_continuation()?;
                    } else {
                        out.push(self.escape()?);
                    }
                }
                Some('\n') => {
                    self.next_char();
                    out.push('\n');
                }
                Some('\r') => {
                    if self.peek_nth(1) != Some('\n') {
                        return Err(self.lex_error(LexicalError::ControlCharacter('\r')));
                    }
                    self.next_char();
                    self.next_char();
                    out.push_str("\r\n");
                }
                Some(ch) if is_disallowed_control(ch) => {
                    return Err(self.lex_error(LexicalError::ControlCharacter(ch)))
                }
                Some(ch) => {
                    self.next_char();
                    out.push(ch);
                }
            }
        }
    }

    /// After a `\` in a multi-line basic string: trailing whitespace, one
    /// newline, then every following whitespace character and newline are
    /// dropped.
    fn line_continuation(&mut self) -> Result<()> {
        self.skip_whitespace();
        if !self.eat_newline()? {
            return Err(self.lex_error(LexicalError::InvalidEscape("\\ ".to_string())));
        }
        loop {
            self.skip_whitespace();
            if !self.eat_newline()? {
                return Ok(());
            }
        }
    }

    /// Decodes the escape following a consumed backslash.
    fn escape(&mut self) -> Result<char> {
        let line = self.line;
        let ch = self
            .next_char()
            .ok_or_else(|| Error::lexical(line, LexicalError::UnterminatedString))?;
        match ch {
            'b' => Ok('\u{8}'),
            't' => Ok('\t'),
            'n' => Ok('\n'),
            'f' => Ok('\u{C}'),
            'r' => Ok('\r'),
            '"' => Ok('"'),
            '\\' => Ok('\\'),
            'u' => self.unicode_escape('u', 4),
            'U' => self.unicode_escape('U', 8),
            other => Err(Error::lexical(
                line,
                LexicalError::InvalidEscape(format!("\\{}", other.escape_debug())),
            )),
        }
    }

    fn unicode_escape(&mut self, marker: char, len: usize) -> Result<char> {
        let line = self.line;
        let digits: String = self.rest().chars().take(len).collect();
        if digits.chars().count() != len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::lexical(
                line,
                LexicalError::InvalidEscape(format!("\\{}{}", marker, digits.escape_debug())),
            ));
        }
        self.eat_str(&digits);
        let code = u32::from_str_radix(&digits, 16).map_err(|_| {
            Error::lexical(
                line,
                LexicalError::InvalidEscape(format!("\\{}{}", marker, digits)),
            )
        })?;
        if (0xD800..=0xDFFF).contains(&code) {
            return Err(Error::lexical(line, LexicalError::SurrogateEscape(code)));
        }
        char::from_u32(code)
            .ok_or_else(|| Error::lexical(line, LexicalError::InvalidUnicodeScalar(code)))
    }

    // -- numbers -------------------------------------------------------------

    /// Recognizes an integer or float.
    ///
    /// The candidate token is the run of characters numbers can contain.
    /// Prefixed integers are tried first, then floats, then decimal integers.
    pub(crate) fn number(&mut self) -> Result<Option<Value>> {
        let token: &str = {
            let rest = self.rest();
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-' | '.')))
                .unwrap_or(rest.len());
            &rest[..end]
        };
        let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
        let looks_numeric = unsigned.starts_with(|c: char| c.is_ascii_digit())
            || unsigned == "inf"
            || unsigned == "nan";
        if !looks_numeric {
            return Ok(None);
        }

        let value = if unsigned.starts_with("0x")
            || unsigned.starts_with("0o")
            || unsigned.starts_with("0b")
        {
            integer_literal(token).map_err(|e| self.lex_error(e))?
        } else if let Some(f) = float_literal(token).map_err(|e| self.lex_error(e))? {
            Some(Value::Float(f))
        } else {
            integer_literal(token).map_err(|e| self.lex_error(e))?
        };

        match value {
            Some(value) => {
                self.eat_str(token);
                Ok(Some(value))
            }
            None => Err(self.lex_error(LexicalError::InvalidInteger(token.to_string()))),
        }
    }

    // -- date-times ----------------------------------------------------------

    /// Recognizes the four date/time shapes.
    ///
    /// The token commits once it starts with `DDDD-` or `DD:`; any later
    /// mismatch, and any impossible calendar or clock value, is an error.
    pub(crate) fn datetime(&mut self) -> Result<Option<Value>> {
        let bytes = self.rest().as_bytes();
        let digit = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
        let date_shape = (0..4).all(digit) && bytes.get(4) == Some(&b'-');
        let time_shape = (0..2).all(digit) && bytes.get(2) == Some(&b':');
        if !date_shape && !time_shape {
            return Ok(None);
        }

        let start = self.checkpoint();
        let parsed = if date_shape {
            self.date_and_time()
        } else {
            self.time_of_day().flatten().map(Value::LocalTime)
        };
        match parsed {
            Some(value) => Ok(Some(value)),
            None => {
                let text = self.datetime_text(start);
                Err(Error::lexical(start.line, LexicalError::InvalidDateTime(text)))
            }
        }
    }

    fn date_and_time(&mut self) -> Option<Value> {
        let year = self.fixed_digits(4)?;
        self.eat('-').then_some(())?;
        let month = self.fixed_digits(2)?;
        self.eat('-').then_some(())?;
        let day = self.fixed_digits(2)?;
        let date = NaiveDate::from_ymd_opt(year as i32, month, day)?;

        let has_time = match self.peek() {
            Some('T') | Some('t') => true,
            Some(' ') => {
                let after: Vec<char> = self.rest().chars().skip(1).take(3).collect();
                after.len() == 3
                    && after[0].is_ascii_digit()
                    && after[1].is_ascii_digit()
                    && after[2] == ':'
            }
            _ => false,
        };
        if !has_time {
            return Some(Value::LocalDate(date));
        }
        self.next_char();
        let time = self.time_of_day()??;
        let local = NaiveDateTime::new(date, time);

        let offset = match self.peek() {
            Some('Z') | Some('z') => {
                self.next_char();
                FixedOffset::east_opt(0)?
            }
            Some(sign @ ('+' | '-')) => {
                self.next_char();
                let hours = self.fixed_digits(2)?;
                self.eat(':').then_some(())?;
                let minutes = self.fixed_digits(2)?;
                if hours > 23 || minutes > 59 {
                    return None;
                }
                let seconds = (hours * 3600 + minutes * 60) as i32;
                FixedOffset::east_opt(if sign == '-' { -seconds } else { seconds })?
            }
            _ => return Some(Value::LocalDateTime(local)),
        };
        offset
            .from_local_datetime(&local)
            .single()
            .map(Value::OffsetDateTime)
    }

    /// `HH:MM:SS` with optional fractional seconds.
    ///
    /// Outer `None` means the shape is wrong; inner `None` means the clock
    /// value is impossible. Both are reported the same way by the caller.
    fn time_of_day(&mut self) -> Option<Option<NaiveTime>> {
        let hour = self.fixed_digits(2)?;
        self.eat(':').then_some(())?;
        let minute = self.fixed_digits(2)?;
        self.eat(':').then_some(())?;
        let second = self.fixed_digits(2)?;

        let mut nanos = 0u32;
        if self.peek() == Some('.') {
            let fraction: String = self
                .rest()
                .chars()
                .skip(1)
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if fraction.is_empty() {
                return None;
            }
            self.next_char();
            self.eat_str(&fraction);
            // Precision beyond nanoseconds is truncated.
            for (i, digit) in fraction.bytes().take(9).enumerate() {
                nanos += u32::from(digit - b'0') * 10u32.pow(8 - i as u32);
            }
        }

        // chrono represents a leap second as second 59 with an extra second of nanos.
        let time = if second == 60 {
            NaiveTime::from_hms_nano_opt(hour, minute, 59, 1_000_000_000 + nanos)
        } else {
            NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
        };
        Some(time)
    }

    fn fixed_digits(&mut self, n: usize) -> Option<u32> {
        let bytes = self.rest().as_bytes();
        if bytes.len() < n || !bytes[..n].iter().all(u8::is_ascii_digit) {
            return None;
        }
        let value = bytes[..n]
            .iter()
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
        self.pos += n;
        self.col += n;
        Some(value)
    }

    /// The offending date-time text for error messages.
    fn datetime_text(&self, start: Checkpoint) -> String {
        let from = &self.input[start.pos..];
        let mut text: String = from
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '+' | '-'))
            .collect();
        // Include a space-separated time part when the date part was complete.
        if text.len() == 10 && from[10..].starts_with(' ') {
            let time: String = from[11..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '+' | '-'))
                .collect();
            if !time.is_empty() {
                text.push(' ');
                text.push_str(&time);
            }
        }
        text
    }
}

/// `1_000`-style digit runs: non-empty, digits only, every `_` between digits.
fn digit_run(s: &str, is_digit: impl Fn(char) -> bool) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s.chars().all(|c| c == '_' || is_digit(c))
}

fn decimal_run(s: &str) -> bool {
    digit_run(s, |c| c.is_ascii_digit())
}

/// Decodes an integer literal.
///
/// Prefixed forms (`0x`, `0o`, `0b`) are unsigned and commit on the prefix.
/// A decimal token that is not integer-shaped yields `Ok(None)`.
pub(crate) fn integer_literal(token: &str) -> std::result::Result<Option<Value>, LexicalError> {
    let invalid = || LexicalError::InvalidInteger(token.to_string());
    let overflow = || LexicalError::IntegerOverflow(token.to_string());

    let prefixed = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| token.strip_prefix(prefix).map(|body| (body, radix)));
    if let Some((body, radix)) = prefixed {
        if !digit_run(body, |c| c.is_digit(radix)) {
            return Err(invalid());
        }
        let digits = body.replace('_', "");
        return i64::from_str_radix(&digits, radix)
            .map(|i| Some(Value::Integer(i)))
            .map_err(|_| overflow());
    }

    let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
    if !decimal_run(unsigned) {
        return Ok(None);
    }
    if unsigned.len() > 1 && unsigned.starts_with('0') {
        return Err(invalid());
    }
    token
        .replace('_', "")
        .parse::<i64>()
        .map(|i| Some(Value::Integer(i)))
        .map_err(|_| overflow())
}

/// Decodes a float literal.
///
/// Returns `Ok(None)` for tokens with neither a fraction nor an exponent,
/// which are left to the integer recognizer.
pub(crate) fn float_literal(token: &str) -> std::result::Result<Option<f64>, LexicalError> {
    let negative = token.starts_with('-');
    let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
    match unsigned {
        "inf" => return Ok(Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY })),
        "nan" => return Ok(Some(if negative { -f64::NAN } else { f64::NAN })),
        _ => {}
    }

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(i) => (&unsigned[..i], Some(&unsigned[i + 1..])),
        None => (unsigned, None),
    };
    let (int_part, fraction) = match mantissa.find('.') {
        Some(i) => (&mantissa[..i], Some(&mantissa[i + 1..])),
        None => (mantissa, None),
    };
    if fraction.is_none() && exponent.is_none() {
        return Ok(None);
    }

    let invalid = || LexicalError::InvalidFloat(token.to_string());
    if !decimal_run(int_part) || (int_part.len() > 1 && int_part.starts_with('0')) {
        return Err(invalid());
    }
    if let Some(fraction) = fraction {
        if !decimal_run(fraction) {
            return Err(invalid());
        }
    }
    if let Some(exponent) = exponent {
        let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        if !decimal_run(digits) {
            return Err(invalid());
        }
    }
    let value = token
        .replace('_', "")
        .parse::<f64>()
        .map_err(|_| invalid())?;
    // `inf` has its own spelling; a finite literal must not round to it.
    if value.is_infinite() {
        return Err(LexicalError::FloatOverflow(token.to_string()));
    }
    Ok(Some(value))
}
