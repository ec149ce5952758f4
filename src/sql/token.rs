//! SQL tokens, the atoms the emitter writes.
//!
//! Keywords, punctuation and operators have one spelling in every
//! dialect. Identifiers, literals and function names are spelled by the
//! dialect when the stream is written out.

use std::fmt::Write;

use super::dialect::{Dialect, SqlDialect};

/// One element of emitted SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Clauses ===
    Select,
    Distinct,
    Top,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Desc,
    Limit,
    Offset,
    Fetch,
    Next,
    Rows,
    Only,
    Union,
    All,

    // === Joins ===
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    On,
    As,

    // === Expressions ===
    And,
    Or,
    Not,
    Case,
    When,
    Then,
    Else,
    End,
    Cast,
    Like,
    IsNull,
    IsNotNull,

    // === Windows ===
    Over,
    PartitionBy,
    Range,
    Between,
    Unbounded,
    Preceding,
    Following,
    CurrentRow,

    // === Punctuation and Operators ===
    Comma,
    Dot,
    LParen,
    RParen,
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    Plus,
    Minus,
    Mul,
    Div,

    // === Layout ===
    Space,
    Newline,
    /// Four spaces per level.
    Indent(usize),

    // === Dialect-Spelled ===
    /// Alias chosen by the compiler; always quoted.
    Ident(String),
    /// Schema, table or column name from the user; quoted when the
    /// dialect needs it.
    Name(String),
    LitInt(i64),
    LitFloat(f64),
    LitString(String),
    LitBool(bool),
    LitNull,
    /// Function name, remapped per dialect, case kept otherwise.
    FunctionName(String),

    /// Trusted static text (type names, interval units). Never user data.
    Raw(String),
}

impl Token {
    /// Spelling shared by every dialect, if this token has one.
    fn fixed(&self) -> Option<&'static str> {
        let text = match self {
            Token::Select => "SELECT",
            Token::Distinct => "DISTINCT",
            Token::Top => "TOP",
            Token::From => "FROM",
            Token::Where => "WHERE",
            Token::GroupBy => "GROUP BY",
            Token::Having => "HAVING",
            Token::OrderBy => "ORDER BY",
            Token::Desc => "DESC",
            Token::Limit => "LIMIT",
            Token::Offset => "OFFSET",
            Token::Fetch => "FETCH",
            Token::Next => "NEXT",
            Token::Rows => "ROWS",
            Token::Only => "ONLY",
            Token::Union => "UNION",
            Token::All => "ALL",

            Token::Join => "JOIN",
            Token::Inner => "INNER",
            Token::Left => "LEFT",
            Token::Right => "RIGHT",
            Token::Full => "FULL",
            Token::Outer => "OUTER",
            Token::Cross => "CROSS",
            Token::On => "ON",
            Token::As => "AS",

            Token::And => "AND",
            Token::Or => "OR",
            Token::Not => "NOT",
            Token::Case => "CASE",
            Token::When => "WHEN",
            Token::Then => "THEN",
            Token::Else => "ELSE",
            Token::End => "END",
            Token::Cast => "CAST",
            Token::Like => "LIKE",
            Token::IsNull => "IS NULL",
            Token::IsNotNull => "IS NOT NULL",

            Token::Over => "OVER",
            Token::PartitionBy => "PARTITION BY",
            Token::Range => "RANGE",
            Token::Between => "BETWEEN",
            Token::Unbounded => "UNBOUNDED",
            Token::Preceding => "PRECEDING",
            Token::Following => "FOLLOWING",
            Token::CurrentRow => "CURRENT ROW",

            Token::Comma => ",",
            Token::Dot => ".",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Eq => "=",
            Token::Ne => "<>",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Lte => "<=",
            Token::Gte => ">=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Mul => "*",
            Token::Div => "/",

            Token::Space => " ",
            Token::Newline => "\n",
            Token::LitNull => "NULL",
            _ => return None,
        };
        Some(text)
    }

    /// Append this token's text for `dialect` to `out`.
    pub fn write_to(&self, out: &mut String, dialect: Dialect) {
        if let Some(text) = self.fixed() {
            out.push_str(text);
            return;
        }
        match self {
            Token::Indent(depth) => {
                for _ in 0..*depth {
                    out.push_str("    ");
                }
            }
            Token::Ident(name) => out.push_str(&dialect.quote_identifier(name)),
            Token::Name(name) => out.push_str(&dialect.format_identifier(name)),
            Token::LitInt(n) => {
                let _ = write!(out, "{n}");
            }
            Token::LitFloat(f) if f.is_finite() => {
                out.push_str(ryu::Buffer::new().format_finite(*f));
            }
            Token::LitFloat(f) => out.push_str(&dialect.format_special_float(*f)),
            Token::LitString(s) => out.push_str(&dialect.quote_string(s)),
            Token::LitBool(b) => out.push_str(dialect.format_bool(*b)),
            Token::FunctionName(name) => {
                out.push_str(dialect.remap_function(name).unwrap_or(name.as_str()))
            }
            Token::Raw(s) => out.push_str(s),
            _ => {}
        }
    }

    pub fn serialize(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        self.write_to(&mut out, dialect);
        out
    }
}

/// An ordered run of tokens, built with chained pushes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend_from_slice(&other.tokens);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The SQL text of the whole stream.
    pub fn serialize(&self, dialect: Dialect) -> String {
        let mut out = String::with_capacity(self.tokens.len() * 6);
        for token in &self.tokens {
            token.write_to(&mut out, dialect);
        }
        out
    }

    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }

    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }

    pub fn indent(&mut self, depth: usize) -> &mut Self {
        self.push(Token::Indent(depth))
    }

    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }

    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }

    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}

impl From<Token> for TokenStream {
    fn from(token: Token) -> Self {
        Self {
            tokens: vec![token],
        }
    }
}
