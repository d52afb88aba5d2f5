//! Structural grammar: keys, values, arrays, inline tables, headers and
//! the statement sequence of a document.
//!
//! The parser turns text into [`Statement`]s and feeds them to a
//! [`DocumentBuilder`], which enforces the table-definition rules. Inline
//! tables are assembled by a nested builder of their own, so duplicate and
//! conflicting keys inside `{ ... }` are caught the same way as at the top
//! level.

use crate::builder::DocumentBuilder;
use crate::lexer::{is_bare_key_char, Cursor};
use crate::{Result, Table, Value};

/// One line-level construct of a document.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Statement {
    /// `a.b.c = value`
    KeyValue { keys: Vec<String>, value: Value },
    /// `[a.b.c]`
    Table(Vec<String>),
    /// `[[a.b.c]]`
    ArrayTable(Vec<String>),
}

pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
}

/// Parses a complete document into its root table.
pub(crate) fn parse_document(input: &str) -> Result<Table> {
    let mut parser = Parser::new(input);
    let mut builder = DocumentBuilder::new();
    while let Some((line, statement)) = parser.next_statement()? {
        builder.apply(line, statement)?;
    }
    Ok(builder.build())
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Parser {
            cursor: Cursor::new(input),
        }
    }

    /// Reads the next statement and the line it starts on, skipping blank
    /// lines and comments. Returns `None` at end of input.
    pub(crate) fn next_statement(&mut self) -> Result<Option<(usize, Statement)>> {
        self.cursor.skip_trivia()?;
        if self.cursor.at_end() {
            return Ok(None);
        }
        let line = self.cursor.line();

        let statement = if self.cursor.eat('[') {
            let array = self.cursor.eat('[');
            self.cursor.skip_whitespace();
            let keys = self.key()?;
            self.cursor.skip_whitespace();
            self.expect(']')?;
            if array {
                if !self.cursor.eat(']') {
                    return Err(self.cursor.error(format!(
                        "expected `]]` to close array-of-tables header, found {}",
                        self.cursor.describe_next()
                    )));
                }
                Statement::ArrayTable(keys)
            } else {
                Statement::Table(keys)
            }
        } else {
            let (keys, value) = self.key_value()?;
            Statement::KeyValue { keys, value }
        };

        self.cursor.expect_line_end()?;
        Ok(Some((line, statement)))
    }

    fn expect(&mut self, ch: char) -> Result<()> {
        if self.cursor.eat(ch) {
            Ok(())
        } else {
            Err(self.cursor.error(format!(
                "expected `{}`, found {}",
                ch,
                self.cursor.describe_next()
            )))
        }
    }

    fn key_value(&mut self) -> Result<(Vec<String>, Value)> {
        let keys = self.key()?;
        self.cursor.skip_whitespace();
        self.expect('=')?;
        self.cursor.skip_whitespace();
        let value = self.value()?;
        Ok((keys, value))
    }

    /// A dotted key: simple keys separated by `.`, with optional whitespace
    /// around each dot.
    fn key(&mut self) -> Result<Vec<String>> {
        let mut keys = vec![self.simple_key()?];
        loop {
            let checkpoint = self.cursor.checkpoint();
            self.cursor.skip_whitespace();
            if !self.cursor.eat('.') {
                self.cursor.restore(checkpoint);
                return Ok(keys);
            }
            self.cursor.skip_whitespace();
            keys.push(self.simple_key()?);
        }
    }

    fn simple_key(&mut self) -> Result<String> {
        if let Some(quoted) = self.cursor.string(false)? {
            return Ok(quoted);
        }
        let bare: String = self
            .cursor
            .rest()
            .chars()
            .take_while(|&c| is_bare_key_char(c))
            .collect();
        if bare.is_empty() {
            return Err(self.cursor.error(format!(
                "expected a key, found {}",
                self.cursor.describe_next()
            )));
        }
        self.cursor.eat_str(&bare);
        Ok(bare)
    }

    fn value(&mut self) -> Result<Value> {
        match self.cursor.peek() {
            Some('"') | Some('\'') => match self.cursor.string(true)? {
                Some(s) => Ok(Value::String(s)),
                None => Err(self.expected_value()),
            },
            Some('[') => self.array(),
            Some('{') => self.inline_table(),
            Some('t') | Some('f') => self
                .cursor
                .boolean()
                .map(Value::Bool)
                .ok_or_else(|| self.expected_value()),
            _ => {
                if let Some(datetime) = self.cursor.datetime()? {
                    return Ok(datetime);
                }
                if let Some(number) = self.cursor.number()? {
                    return Ok(number);
                }
                Err(self.expected_value())
            }
        }
    }

    fn expected_value(&self) -> crate::Error {
        self.cursor.error(format!(
            "expected a value, found {}",
            self.cursor.describe_next()
        ))
    }

    /// `[ v, v, ... ]`. Newlines and comments may appear between elements,
    /// and a trailing comma is allowed.
    fn array(&mut self) -> Result<Value> {
        self.cursor.next_char();
        let mut items = Vec::new();
        loop {
            self.cursor.skip_trivia()?;
            if self.cursor.eat(']') {
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.cursor.skip_trivia()?;
            if self.cursor.eat(',') {
                continue;
            }
            if self.cursor.eat(']') {
                return Ok(Value::Array(items));
            }
            return Err(self.cursor.error(format!(
                "expected `,` or `]` in array, found {}",
                self.cursor.describe_next()
            )));
        }
    }

    /// `{ k = v, ... }` on a single line, without a trailing comma.
    fn inline_table(&mut self) -> Result<Value> {
        self.cursor.next_char();
        let mut builder = DocumentBuilder::new();

        self.cursor.skip_whitespace();
        if self.cursor.eat('}') {
            return Ok(Value::Table(builder.build()));
        }
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.peek() == Some('}') {
                return Err(self
                    .cursor
                    .error("trailing comma is not allowed in an inline table"));
            }
            let line = self.cursor.line();
            let (keys, value) = self.key_value()?;
            builder.apply(line, Statement::KeyValue { keys, value })?;

            self.cursor.skip_whitespace();
            if self.cursor.eat(',') {
                continue;
            }
            if self.cursor.eat('}') {
                return Ok(Value::Table(builder.build()));
            }
            return Err(self.cursor.error(format!(
                "expected `,` or `}}` in inline table, found {}",
                self.cursor.describe_next()
            )));
        }
    }
}
