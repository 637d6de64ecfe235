//! Values passed to and returned from dialect operations

use serde::{Deserialize, Serialize};
use std::fmt;

/// A deferred placeholder resolved once the region has been fully rendered
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Thunk {
    /// Set the program counter to a label's address
    JumpTo(String),
    /// Set the program counter to the final program counter of the region
    Exit,
}

impl fmt::Display for Thunk {
    /// Readable marker used when intermediate output is inspected
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Thunk::JumpTo(label) => write!(f, "{{{{ _jump_thunk({:?}) }}}}", label),
            Thunk::Exit => write!(f, "{{{{ _exit_thunk() }}}}"),
        }
    }
}

/// Output of a dialect operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Thunk(Thunk),
}

impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Fragment::Text(text.into())
    }

    pub fn empty() -> Self {
        Fragment::Text(String::new())
    }
}

/// Template runtime value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    /// Result of an operation that is only known after pass 1
    Deferred(Thunk),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "integer",
            Value::Deferred(_) => "deferred value",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Text spliced into generated code; `None` for deferred values
    pub fn to_code(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Int(n) => Some(n.to_string()),
            Value::Deferred(_) => None,
        }
    }
}

impl From<Fragment> for Value {
    fn from(fragment: Fragment) -> Self {
        match fragment {
            Fragment::Text(text) => Value::Str(text),
            Fragment::Thunk(thunk) => Value::Deferred(thunk),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}
