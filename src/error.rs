//! Error types for TOML parsing and serialization.
//!
//! Every failure is reported through [`Error`]. Parse-side variants carry the
//! 1-based line on which the problem was found; malformed literals additionally
//! chain the underlying [`LexicalError`] as their source.
//!
//! ## Error Categories
//!
//! - **Lexical errors**: a literal that looks like an integer, float, string or
//!   date-time but is malformed ([`Error::Lexical`])
//! - **Syntax errors**: tokens in the wrong place ([`Error::Syntax`])
//! - **Structural errors**: redefining keys or tables, extending inline
//!   collections, using a value as a table or array-of-tables
//! - **Serialization errors**: disallowed characters in output strings, or a
//!   document that is not rooted in a table
//!
//! ## Examples
//!
//! ```rust
//! use serde_tomlet::{parse, Error};
//!
//! let err = parse("a = 1\na = 2\n").unwrap_err();
//! assert!(matches!(err, Error::AlreadyDefined { line: 2, .. }));
//! assert_eq!(err.line(), Some(2));
//! ```

use std::fmt;
use thiserror::Error;

/// A malformed literal.
///
/// Produced by the lexical grammar once a token has committed to a literal
/// form; wrapped into [`Error::Lexical`] together with the source line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexicalError {
    #[error("invalid integer `{0}`")]
    InvalidInteger(String),

    #[error("integer `{0}` does not fit in a 64-bit signed integer")]
    IntegerOverflow(String),

    #[error("invalid float `{0}`")]
    InvalidFloat(String),

    #[error("float `{0}` is out of the 64-bit range")]
    FloatOverflow(String),

    #[error("invalid escape sequence `{0}`")]
    InvalidEscape(String),

    #[error("escape sequence names surrogate code point U+{0:04X}")]
    SurrogateEscape(u32),

    #[error("U+{0:X} is not a unicode scalar value")]
    InvalidUnicodeScalar(u32),

    #[error("control character U+{:04X} is not allowed here", *.0 as u32)]
    ControlCharacter(char),

    #[error("invalid date-time `{0}`")]
    InvalidDateTime(String),

    #[error("unterminated string")]
    UnterminatedString,
}

/// Represents all possible errors that can occur while parsing or writing TOML.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// A literal could not be decoded
    #[error("{source} at line {line}")]
    Lexical {
        line: usize,
        #[source]
        source: LexicalError,
    },

    /// Unexpected or missing token
    #[error("syntax error at line {line}, column {col}: {msg}")]
    Syntax { line: usize, col: usize, msg: String },

    /// A key or table was defined twice
    #[error("`{key}` at line {line} is already defined")]
    AlreadyDefined { line: usize, key: String },

    /// A non-table value was used where a table is required
    #[error("`{key}` at line {line} is not a table")]
    NotATable { line: usize, key: String },

    /// An array-of-tables header names something that is not an array of tables
    #[error("`{key}` at line {line} is not an array of tables")]
    NotAList { line: usize, key: String },

    /// An inline table or array was extended after its literal closed
    #[error("`{key}` at line {line} is an inline collection and cannot be extended")]
    ExtendingInlineCollection { line: usize, key: String },

    /// A string handed to the serializer holds a character TOML cannot carry
    #[error("cannot serialize control character U+{:04X}", *.0 as u32)]
    DisallowedCharacter(char),

    /// A document must be a table at its root
    #[error("a TOML document must be a table, found {0}")]
    RootNotTable(String),

    /// The value has no TOML representation
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// `None` cannot be written as a value, only omitted
    #[error("TOML has no null value")]
    UnsupportedNone,

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Wraps a lexical failure with the line it occurred on.
    pub fn lexical(line: usize, source: LexicalError) -> Self {
        Error::Lexical { line, source }
    }

    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tomlet::Error;
    ///
    /// let err = Error::syntax(10, 5, "expected `=`");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: impl Into<String>) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.into(),
        }
    }

    pub fn already_defined(line: usize, key: impl Into<String>) -> Self {
        Error::AlreadyDefined {
            line,
            key: key.into(),
        }
    }

    pub fn not_a_table(line: usize, key: impl Into<String>) -> Self {
        Error::NotATable {
            line,
            key: key.into(),
        }
    }

    pub fn not_a_list(line: usize, key: impl Into<String>) -> Self {
        Error::NotAList {
            line,
            key: key.into(),
        }
    }

    pub fn extending_inline(line: usize, key: impl Into<String>) -> Self {
        Error::ExtendingInlineCollection {
            line,
            key: key.into(),
        }
    }

    /// Creates an unsupported type error for values TOML cannot represent.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tomlet::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// The 1-based source line of a parse error, if this is one.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Lexical { line, .. }
            | Error::Syntax { line, .. }
            | Error::AlreadyDefined { line, .. }
            | Error::NotATable { line, .. }
            | Error::NotAList { line, .. }
            | Error::ExtendingInlineCollection { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
