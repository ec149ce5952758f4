//! Render-time configuration for SQL and Pure generation.
//!
//! Both configs are plain values passed explicitly to every lowering
//! call; nothing is registered globally.

use crate::sql::dialect::Dialect;

/// Configuration for `to_sql_query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToSqlConfig {
    pub dialect: Dialect,
    pub pretty: bool,
}

impl Default for FrameToSqlConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Postgres,
            pretty: true,
        }
    }
}

impl FrameToSqlConfig {
    pub fn new(dialect: Dialect, pretty: bool) -> Self {
        Self { dialect, pretty }
    }

    /// Single-line output.
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Self::default()
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

/// Configuration for `to_pure_query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToPureConfig {
    pub pretty: bool,
    pub indent: usize,
    pub indent_step: usize,
}

impl Default for FrameToPureConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: 0,
            indent_step: 2,
        }
    }
}

impl FrameToPureConfig {
    pub fn new(pretty: bool) -> Self {
        Self {
            pretty,
            ..Self::default()
        }
    }

    /// Line break plus indentation `n` levels below the current one, or
    /// nothing when not pretty.
    pub fn separator(&self, n: usize) -> String {
        if self.pretty {
            format!("\n{}", " ".repeat(self.indent_step * (self.indent + n)))
        } else {
            String::new()
        }
    }

    /// Like [`separator`](Self::separator) but a single space when not
    /// pretty, for list elements.
    pub fn separator_or_space(&self, n: usize) -> String {
        if self.pretty {
            self.separator(n)
        } else {
            " ".to_string()
        }
    }

    /// Copy with the indent pushed `n` levels deeper.
    pub fn push_indent(&self, n: usize) -> Self {
        Self {
            indent: self.indent + n,
            ..*self
        }
    }
}
