//! Template token model
//!
//! Tokens are produced by the template lexer and consumed by the region
//! preprocessor and the template parser. Data tokens carry literal template
//! text; everything else is the content of a `{{ }}` or `{% %}` tag.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    // === TEMPLATE TEXT ===
    /// Literal text outside of any tag
    Data(String),

    // === TAG DELIMITERS ===
    BlockBegin,    // {%
    BlockEnd,      // %}
    VariableBegin, // {{
    VariableEnd,   // }}

    // === TAG CONTENT ===
    /// Identifier inside a tag (function, variable or tag name)
    Name(String),
    /// Quoted string literal with escapes already processed
    StringLiteral(String),
    /// Integer literal (64-bit signed)
    Integer(i64),

    // === PUNCTUATION ===
    LParen, // (
    RParen, // )
    Comma,  // ,
    Assign, // =
    Minus,  // -

    /// End of input marker
    Eof,
}

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// Literal template text
    Data,
    /// Tag open/close markers
    Delimiter,
    /// String and integer literals
    Literal,
    Identifier,
    Punctuation,
    /// End of input
    Special,
}

impl Token {
    pub fn token_class(&self) -> TokenClass {
        match self {
            Self::Data(_) => TokenClass::Data,
            Self::BlockBegin | Self::BlockEnd | Self::VariableBegin | Self::VariableEnd => {
                TokenClass::Delimiter
            }
            Self::StringLiteral(_) | Self::Integer(_) => TokenClass::Literal,
            Self::Name(_) => TokenClass::Identifier,
            Self::LParen | Self::RParen | Self::Comma | Self::Assign | Self::Minus => {
                TokenClass::Punctuation
            }
            Self::Eof => TokenClass::Special,
        }
    }

    /// Whether this is the name token `name`
    pub fn is_name(&self, name: &str) -> bool {
        matches!(self, Self::Name(n) if n == name)
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Short description used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            Self::Data(_) => "template data".to_string(),
            Self::BlockBegin => "'{%'".to_string(),
            Self::BlockEnd => "'%}'".to_string(),
            Self::VariableBegin => "'{{'".to_string(),
            Self::VariableEnd => "'}}'".to_string(),
            Self::Name(name) => format!("name '{}'", name),
            Self::StringLiteral(_) => "string literal".to_string(),
            Self::Integer(value) => format!("integer {}", value),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Assign => "'='".to_string(),
            Self::Minus => "'-'".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }

    /// Template source representation of this token
    pub fn as_template_string(&self) -> String {
        match self {
            Self::Data(text) => text.clone(),
            Self::BlockBegin => "{%".to_string(),
            Self::BlockEnd => "%}".to_string(),
            Self::VariableBegin => "{{".to_string(),
            Self::VariableEnd => "}}".to_string(),
            Self::Name(name) => name.clone(),
            Self::StringLiteral(value) => format!("{:?}", value),
            Self::Integer(value) => value.to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
            Self::Comma => ",".to_string(),
            Self::Assign => "=".to_string(),
            Self::Minus => "-".to_string(),
            Self::Eof => String::new(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
