//! Cursor over a lexed or instrumented token sequence

use crate::{
    tokens::token::Token,
    utils::{Span, Spanned},
};

/// A token with span information
pub type SpannedToken = Spanned<Token>;

/// Token cursor with lookahead. The sequence always ends
/// with [`Token::Eof`].
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<SpannedToken>,
    position: usize,
}

impl TokenStream {
    /// Create a stream, appending an end marker when the input lacks one
    pub fn new(mut tokens: Vec<SpannedToken>) -> Self {
        if !tokens.last().is_some_and(|t| t.value.is_eof()) {
            let span = tokens
                .last()
                .map(|t| Span::point(t.span.end))
                .unwrap_or_else(Span::dummy);
            tokens.push(Spanned::new(Token::Eof, span));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    // === CORE NAVIGATION ===

    /// Current token; `None` only once the cursor moved past the end marker
    pub fn current(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.position)
    }

    pub fn current_token(&self) -> Option<&Token> {
        self.current().map(|spanned| &spanned.value)
    }

    pub fn current_span(&self) -> Option<Span> {
        self.current().map(|spanned| spanned.span)
    }

    /// Peek at the next token without advancing
    pub fn peek(&self) -> Option<&SpannedToken> {
        self.peek_ahead(1)
    }

    pub fn peek_ahead(&self, n: usize) -> Option<&SpannedToken> {
        self.tokens.get(self.position + n)
    }

    /// Advance and return the token that was current
    pub fn advance(&mut self) -> Option<SpannedToken> {
        let token = self.current().cloned();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    /// Span of the last token, used for end-of-input diagnostics
    pub fn end_span(&self) -> Span {
        self.tokens
            .last()
            .map(|t| t.span)
            .unwrap_or_else(Span::dummy)
    }

    // === MATCHING ===

    pub fn check_token(&self, expected: &Token) -> bool {
        self.current_token()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    /// Advance past the current token if it has the same kind as `expected`
    pub fn advance_if_matches(&mut self, expected: &Token) -> bool {
        if self.check_token(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Expect a token of the same kind as `expected`
    pub fn expect_token(&mut self, expected: Token) -> Result<SpannedToken, TokenStreamError> {
        match self.current() {
            Some(current)
                if std::mem::discriminant(&current.value)
                    == std::mem::discriminant(&expected) =>
            {
                let result = current.clone();
                self.position += 1;
                Ok(result)
            }
            Some(current) if current.value.is_eof() => Err(TokenStreamError::UnexpectedEndOfStream {
                expected: expected.describe(),
                span: current.span,
            }),
            Some(current) => Err(TokenStreamError::UnexpectedToken {
                expected: expected.describe(),
                found: current.value.describe(),
                span: current.span,
            }),
            None => Err(TokenStreamError::UnexpectedEndOfStream {
                expected: expected.describe(),
                span: self.end_span(),
            }),
        }
    }
}

/// Token stream errors with span
#[derive(Debug, Clone, PartialEq)]
pub enum TokenStreamError {
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    UnexpectedEndOfStream {
        expected: String,
        span: Span,
    },
}

impl TokenStreamError {
    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. } | Self::UnexpectedEndOfStream { span, .. } => *span,
        }
    }
}

impl std::fmt::Display for TokenStreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken {
                expected,
                found,
                span,
            } => write!(f, "Expected {}, found {} at {}", expected, found, span),
            Self::UnexpectedEndOfStream { expected, .. } => {
                write!(f, "Expected {}, but reached end of input", expected)
            }
        }
    }
}

impl std::error::Error for TokenStreamError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn spanned(token: Token, offset: usize) -> SpannedToken {
        let start = Position::new(offset, 1, offset as u32 + 1);
        let end = Position::new(offset + 1, 1, offset as u32 + 2);
        Spanned::new(token, Span::new(start, end))
    }

    #[test]
    fn test_stream_appends_eof() {
        let mut stream = TokenStream::new(vec![spanned(Token::VariableBegin, 0)]);
        assert_eq!(stream.peek().map(|t| &t.value), Some(&Token::Eof));
        assert_eq!(stream.end_span(), Span::point(Position::new(1, 1, 2)));

        stream.advance();
        assert!(stream.check_token(&Token::Eof));
        stream.advance();
        assert!(stream.current().is_none());
    }

    #[test]
    fn test_navigation() {
        let mut stream = TokenStream::new(vec![
            spanned(Token::Name("nop".into()), 0),
            spanned(Token::LParen, 3),
            spanned(Token::RParen, 4),
        ]);

        assert!(stream.current_token().is_some_and(|t| t.is_name("nop")));
        assert_eq!(stream.peek().map(|t| &t.value), Some(&Token::LParen));

        assert_eq!(stream.peek_ahead(2).map(|t| &t.value), Some(&Token::RParen));

        stream.advance();
        assert!(!stream.advance_if_matches(&Token::RParen));
        assert!(stream.advance_if_matches(&Token::LParen));
        assert!(stream.check_token(&Token::RParen));
        assert_eq!(stream.current_span().map(|s| s.start.offset), Some(4));
    }

    #[test]
    fn test_expect_token_errors() {
        let mut stream = TokenStream::new(vec![spanned(Token::Comma, 0)]);

        let err = stream.expect_token(Token::RParen).unwrap_err();
        assert!(matches!(err, TokenStreamError::UnexpectedToken { .. }));
        assert_eq!(err.span().start.offset, 0);

        assert!(stream.expect_token(Token::Comma).is_ok());
        assert!(stream.check_token(&Token::Eof));
        assert!(matches!(
            stream.expect_token(Token::RParen),
            Err(TokenStreamError::UnexpectedEndOfStream { .. })
        ));
    }
}
