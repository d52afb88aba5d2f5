//! Configuration options for TOML serialization.
//!
//! - [`SerializerOptions`]: main configuration struct
//! - [`ListWrap`]: when arrays are broken over several lines
//! - [`CollectionStyle`]: whether tables and arrays of tables prefer inline
//!   literals or `[header]` / `[[header]]` sections
//!
//! ## Examples
//!
//! ```rust
//! use serde_tomlet::{to_toml_string_with_options, toml, CollectionStyle, ListWrap, SerializerOptions};
//!
//! let doc = toml!({ "server": { "ports": [8000, 8001] } });
//!
//! let options = SerializerOptions::new()
//!     .with_table_style(CollectionStyle::Inline)
//!     .with_list_wrap(ListWrap::SingleLine);
//! let text = to_toml_string_with_options(&doc, options).unwrap();
//! assert_eq!(text, "server = { ports = [8000, 8001] }\n");
//! ```

/// Line-wrapping policy for arrays written in inline `[...]` syntax.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ListWrap {
    /// Every array on a single line.
    SingleLine,
    /// Every non-empty array with one element per line, indented.
    MultiLine,
    /// One element per line only when some element is itself an array or
    /// table, and only where newlines are allowed (never inside an inline
    /// table).
    #[default]
    Adaptive,
}

/// Preferred syntax for a collection kind.
///
/// For tables, `Header` writes top-level tables as `[path]` sections and
/// nested tables as dotted keys; `Inline` writes them as `{ ... }`.
/// For arrays of tables, `Header` writes `[[path]]` sections; `Inline` writes
/// `[{ ... }, ...]`. A section is still used wherever its content requires
/// one, and an array holding any non-table element is always inline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CollectionStyle {
    Inline,
    #[default]
    Header,
}

/// Configuration options for TOML serialization.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::{CollectionStyle, ListWrap, SerializerOptions};
///
/// let options = SerializerOptions::new()
///     .with_indent(4)
///     .with_list_wrap(ListWrap::MultiLine)
///     .with_list_style(CollectionStyle::Inline);
/// assert_eq!(options.indent, 4);
/// assert_eq!(options.table_style, CollectionStyle::Header);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializerOptions {
    /// Spaces per nesting level inside multi-line arrays.
    pub indent: usize,
    pub list_wrap: ListWrap,
    pub table_style: CollectionStyle,
    pub list_style: CollectionStyle,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        SerializerOptions {
            indent: 2,
            list_wrap: ListWrap::default(),
            table_style: CollectionStyle::Header,
            list_style: CollectionStyle::Header,
        }
    }
}

impl SerializerOptions {
    /// Creates default options: adaptive wrapping, header syntax for tables
    /// and arrays of tables, 2-space indent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that spread every array over several lines.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tomlet::{ListWrap, SerializerOptions};
    ///
    /// assert_eq!(SerializerOptions::pretty().list_wrap, ListWrap::MultiLine);
    /// ```
    #[must_use]
    pub fn pretty() -> Self {
        SerializerOptions {
            list_wrap: ListWrap::MultiLine,
            ..Default::default()
        }
    }

    /// Options that keep everything as short as possible: single-line arrays
    /// and inline tables wherever TOML allows them.
    #[must_use]
    pub fn compact() -> Self {
        SerializerOptions {
            list_wrap: ListWrap::SingleLine,
            table_style: CollectionStyle::Inline,
            list_style: CollectionStyle::Inline,
            ..Default::default()
        }
    }

    /// Sets the indentation size (number of spaces per level).
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_list_wrap(mut self, list_wrap: ListWrap) -> Self {
        self.list_wrap = list_wrap;
        self
    }

    #[must_use]
    pub fn with_table_style(mut self, style: CollectionStyle) -> Self {
        self.table_style = style;
        self
    }

    #[must_use]
    pub fn with_list_style(mut self, style: CollectionStyle) -> Self {
        self.list_style = style;
        self
    }
}
