//! Recursive-descent template parser

use crate::config::compile_time::syntax::MAX_NESTING_DEPTH;
use crate::preprocess::{REGION_CLOSE_TAG, REGION_OPEN_TAG};
use crate::syntax::ast::{Expr, Node, Template};
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::tokens::{SpannedToken, Token, TokenStream};
use crate::utils::Span;

/// What ends the node list currently being parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    EndOfInput,
    RegionClose { open: Span },
}

pub struct TemplateParser {
    tokens: TokenStream,
    depth: usize,
}

impl TemplateParser {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        Self {
            tokens: TokenStream::new(tokens),
            depth: 0,
        }
    }

    pub fn parse_template(&mut self) -> SyntaxResult<Template> {
        let nodes = self.parse_nodes(Terminator::EndOfInput)?;
        Ok(Template { nodes })
    }

    fn parse_nodes(&mut self, terminator: Terminator) -> SyntaxResult<Vec<Node>> {
        let mut nodes = Vec::new();

        loop {
            let Some(current) = self.tokens.current().cloned() else {
                return self.end_of_input(terminator, nodes);
            };

            match current.value {
                Token::Eof => return self.end_of_input(terminator, nodes),
                Token::Data(text) => {
                    self.tokens.advance();
                    nodes.push(Node::Data {
                        text,
                        span: current.span,
                    });
                }
                Token::VariableBegin => nodes.push(self.parse_output()?),
                Token::BlockBegin => {
                    let tag = self.tokens.peek().cloned();
                    match tag {
                        Some(tag) if tag.value.is_name(REGION_CLOSE_TAG) => {
                            return match terminator {
                                Terminator::RegionClose { .. } => {
                                    self.expect_block_tag(REGION_CLOSE_TAG)?;
                                    Ok(nodes)
                                }
                                Terminator::EndOfInput => Err(SyntaxError::UnmatchedRegionClose {
                                    span: current.span.to(tag.span),
                                }),
                            };
                        }
                        _ => nodes.push(self.parse_block(terminator)?),
                    }
                }
                other => {
                    return Err(SyntaxError::unexpected_token(
                        "template data or tag",
                        &other.describe(),
                        current.span,
                    ))
                }
            }
        }
    }

    fn end_of_input(&self, terminator: Terminator, nodes: Vec<Node>) -> SyntaxResult<Vec<Node>> {
        match terminator {
            Terminator::EndOfInput => Ok(nodes),
            Terminator::RegionClose { open } => Err(SyntaxError::UnclosedRegion { span: open }),
        }
    }

    /// `{{ expr }}`
    fn parse_output(&mut self) -> SyntaxResult<Node> {
        let begin = self.tokens.expect_token(Token::VariableBegin)?;
        let expr = self.parse_expr()?;
        let end = self.tokens.expect_token(Token::VariableEnd)?;
        Ok(Node::Output {
            expr,
            span: begin.span.to(end.span),
        })
    }

    /// `{% name ... %}` other than a region close
    fn parse_block(&mut self, terminator: Terminator) -> SyntaxResult<Node> {
        let begin = self.tokens.expect_token(Token::BlockBegin)?;
        let name = self.tokens.expect_token(Token::Name(String::new()))?;
        let Token::Name(tag) = &name.value else {
            return Err(SyntaxError::unexpected_token("tag name", &name.value.describe(), name.span));
        };

        match tag.as_str() {
            REGION_OPEN_TAG => {
                let end = self.tokens.expect_token(Token::BlockEnd)?;
                let span = begin.span.to(end.span);
                if matches!(terminator, Terminator::RegionClose { .. }) {
                    return Err(SyntaxError::NestedRegion { span });
                }
                self.enter(span)?;
                let body = self.parse_nodes(Terminator::RegionClose { open: span })?;
                self.depth -= 1;
                Ok(Node::Region { body, span })
            }
            "set" => {
                let target = self.tokens.expect_token(Token::Name(String::new()))?;
                let Token::Name(variable) = target.value else {
                    return Err(SyntaxError::unexpected_token(
                        "variable name",
                        &target.value.describe(),
                        target.span,
                    ));
                };
                self.tokens.expect_token(Token::Assign)?;
                let value = self.parse_expr()?;
                let end = self.tokens.expect_token(Token::BlockEnd)?;
                Ok(Node::Set {
                    name: variable,
                    value,
                    span: begin.span.to(end.span),
                })
            }
            other => Err(SyntaxError::UnknownTag {
                name: other.to_string(),
                span: name.span,
            }),
        }
    }

    fn expect_block_tag(&mut self, tag: &str) -> SyntaxResult<Span> {
        let begin = self.tokens.expect_token(Token::BlockBegin)?;
        let name = self.tokens.expect_token(Token::Name(String::new()))?;
        if !name.value.is_name(tag) {
            return Err(SyntaxError::unexpected_token(tag, &name.value.describe(), name.span));
        }
        let end = self.tokens.expect_token(Token::BlockEnd)?;
        Ok(begin.span.to(end.span))
    }

    fn parse_expr(&mut self) -> SyntaxResult<Expr> {
        let Some(current) = self.tokens.current().cloned() else {
            return Err(SyntaxError::UnexpectedEndOfInput {
                expected: "expression".to_string(),
                span: self.tokens.end_span(),
            });
        };

        match current.value {
            Token::StringLiteral(value) => {
                self.tokens.advance();
                Ok(Expr::Str {
                    value,
                    span: current.span,
                })
            }
            Token::Integer(value) => {
                self.tokens.advance();
                Ok(Expr::Int {
                    value,
                    span: current.span,
                })
            }
            Token::Minus => {
                self.tokens.advance();
                let literal = self.tokens.expect_token(Token::Integer(0))?;
                let Token::Integer(value) = literal.value else {
                    return Err(SyntaxError::unexpected_token(
                        "integer",
                        &literal.value.describe(),
                        literal.span,
                    ));
                };
                Ok(Expr::Int {
                    value: -value,
                    span: current.span.to(literal.span),
                })
            }
            Token::Name(name) => {
                self.tokens.advance();
                if self.tokens.check_token(&Token::LParen) {
                    self.parse_call(name, current.span)
                } else {
                    Ok(Expr::Var {
                        name,
                        span: current.span,
                    })
                }
            }
            Token::Eof => Err(SyntaxError::UnexpectedEndOfInput {
                expected: "expression".to_string(),
                span: current.span,
            }),
            other => Err(SyntaxError::unexpected_token(
                "expression",
                &other.describe(),
                current.span,
            )),
        }
    }

    /// `name(arg, ...)`, cursor on `(`
    fn parse_call(&mut self, name: String, name_span: Span) -> SyntaxResult<Expr> {
        self.enter(name_span)?;
        self.tokens.expect_token(Token::LParen)?;

        let mut args = Vec::new();
        if !self.tokens.check_token(&Token::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.tokens.advance_if_matches(&Token::Comma) {
                    break;
                }
            }
        }

        let close = self.tokens.expect_token(Token::RParen)?;
        self.depth -= 1;
        Ok(Expr::Call {
            name,
            args,
            span: name_span.to(close.span),
        })
    }

    fn enter(&mut self, span: Span) -> SyntaxResult<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(SyntaxError::MaxNestingDepth { span });
        }
        self.depth += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use assert_matches::assert_matches;

    fn parse(source: &str) -> SyntaxResult<Template> {
        TemplateParser::new(tokenize(source).unwrap()).parse_template()
    }

    #[test]
    fn test_data_and_output() {
        let template = parse("a{{ jump(\"loop\") }}b").unwrap();
        assert_eq!(template.nodes.len(), 3);
        assert_matches!(&template.nodes[1], Node::Output { expr: Expr::Call { name, args, .. }, .. } => {
            assert_eq!(name, "jump");
            assert_matches!(&args[..], [Expr::Str { value, .. }] if value == "loop");
        });
    }

    #[test]
    fn test_region_and_set() {
        let template =
            parse("{% set n = -3 %}{% sqlvm %}\n{{ alloc(n) }}\n{% endsqlvm %}tail").unwrap();
        assert_eq!(template.region_count(), 1);
        assert_matches!(&template.nodes[0], Node::Set { name, value: Expr::Int { value: -3, .. }, .. } if name == "n");
        assert_matches!(&template.nodes[1], Node::Region { body, span } => {
            assert_eq!(body.len(), 3);
            assert_eq!(span.start.offset, 16);
        });
        assert_matches!(&template.nodes[2], Node::Data { text, .. } if text == "tail");
    }

    #[test]
    fn test_nested_calls_and_arguments() {
        let template = parse("{{ store(load('@a', 1), 2) }}").unwrap();
        assert_matches!(&template.nodes[0], Node::Output { expr: Expr::Call { args, .. }, .. } => {
            assert_eq!(args.len(), 2);
            assert_matches!(&args[0], Expr::Call { name, args, .. } if name == "load" && args.len() == 2);
        });
    }

    #[test]
    fn test_structure_errors() {
        assert_matches!(parse("{% endsqlvm %}"), Err(SyntaxError::UnmatchedRegionClose { .. }));
        assert_matches!(parse("{% sqlvm %}x"), Err(SyntaxError::UnclosedRegion { .. }));
        assert_matches!(
            parse("{% sqlvm %}{% sqlvm %}{% endsqlvm %}{% endsqlvm %}"),
            Err(SyntaxError::NestedRegion { .. })
        );
        assert_matches!(parse("{% for x %}"), Err(SyntaxError::UnknownTag { name, .. }) if name == "for");
    }

    #[test]
    fn test_expression_errors() {
        assert_matches!(parse("{{ nop( }}"), Err(SyntaxError::UnexpectedToken { .. }));
        assert_matches!(parse("{{ }}"), Err(SyntaxError::UnexpectedToken { .. }));
        assert_matches!(parse("{{ nop() nop() }}"), Err(SyntaxError::UnexpectedToken { .. }));
        assert_matches!(parse("{{ -'x' }}"), Err(SyntaxError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_nesting_limit() {
        let depth = MAX_NESTING_DEPTH + 1;
        let source = format!("{{{{ {}{} }}}}", "f(".repeat(depth), ")".repeat(depth));
        assert_matches!(parse(&source), Err(SyntaxError::MaxNestingDepth { .. }));
    }
}
