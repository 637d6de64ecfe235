//! Template syntax tree

use crate::utils::Span;
use serde::{Deserialize, Serialize};

/// A parsed template
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Template {
    pub nodes: Vec<Node>,
}

impl Template {
    /// Number of regions at the top level
    pub fn region_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Region { .. }))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Literal text
    Data { text: String, span: Span },
    /// `{{ expr }}`
    Output { expr: Expr, span: Span },
    /// `{% sqlvm %} body {% endsqlvm %}`; `span` covers the opening tag
    Region { body: Vec<Node>, span: Span },
    /// `{% set name = expr %}`
    Set { name: String, value: Expr, span: Span },
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Data { span, .. }
            | Node::Output { span, .. }
            | Node::Region { span, .. }
            | Node::Set { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Str { value: String, span: Span },
    Int { value: i64, span: Span },
    Var { name: String, span: Span },
    Call { name: String, args: Vec<Expr>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Str { span, .. }
            | Expr::Int { span, .. }
            | Expr::Var { span, .. }
            | Expr::Call { span, .. } => *span,
        }
    }
}
