//! Template lexer
//!
//! Splits template text into data runs and tag content. Three openers are
//! recognised in data mode: `{{` (expression), `{%` (block) and `{#`
//! (comment, dropped). A `-` directly inside an opener or closer trims the
//! whitespace of the adjacent data.

use crate::config::compile_time::lexical::*;
use crate::logging::codes;
use crate::tokens::{SpannedToken, Token};
use crate::utils::{Position, Span, Spanned};
use crate::{log_debug, log_error};

/// Lexical analysis errors with compile-time limits
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Unexpected character '{character}' inside tag at {}", .span.start)]
    UnexpectedCharacter { character: char, span: Span },

    #[error("Unterminated string literal starting at {}", .span.start)]
    UnterminatedString { span: Span },

    #[error("Tag opened at {} is never closed", .span.start)]
    UnterminatedTag { span: Span },

    #[error("Comment opened at {} is never closed", .span.start)]
    UnterminatedComment { span: Span },

    #[error("Invalid integer literal '{text}'")]
    InvalidNumber { text: String, span: Span },

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize, span: Span },

    #[error("String too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize, span: Span },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize, span: Span },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::UnexpectedCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::UnterminatedTag { .. } => codes::lexical::UNTERMINATED_TAG,
            LexerError::UnterminatedComment { .. } => codes::lexical::UNTERMINATED_COMMENT,
            LexerError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            LexerError::UnexpectedCharacter { span, .. }
            | LexerError::UnterminatedString { span }
            | LexerError::UnterminatedTag { span }
            | LexerError::UnterminatedComment { span }
            | LexerError::InvalidNumber { span, .. }
            | LexerError::IdentifierTooLong { span, .. }
            | LexerError::StringTooLarge { span, .. }
            | LexerError::TooManyTokens { span, .. } => *span,
        }
    }
}

/// Counters collected during one tokenization
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub data_tokens: usize,
    pub expression_tags: usize,
    pub block_tags: usize,
    pub comments: usize,
    pub max_string_length: usize,
}

impl LexicalMetrics {
    fn record_token(&mut self, token: &Token) {
        self.total_tokens += 1;
        match token {
            Token::Data(_) => self.data_tokens += 1,
            Token::VariableBegin => self.expression_tags += 1,
            Token::BlockBegin => self.block_tags += 1,
            Token::StringLiteral(value) => {
                self.max_string_length = self.max_string_length.max(value.len());
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Variable,
    Block,
}

impl TagKind {
    fn closer(self) -> &'static str {
        match self {
            TagKind::Variable => "}}",
            TagKind::Block => "%}",
        }
    }

    fn end_token(self) -> Token {
        match self {
            TagKind::Variable => Token::VariableEnd,
            TagKind::Block => Token::BlockEnd,
        }
    }
}

/// Character cursor that keeps line/column positions current
struct Scanner<'a> {
    source: &'a str,
    pos: Position,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: Position::start(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        self.rest().starts_with(pattern)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos = self.pos.advance(ch);
        Some(ch)
    }

    fn bump_str(&mut self, s: &str) {
        self.pos = self.pos.advance_str(s);
    }

    fn is_done(&self) -> bool {
        self.pos.offset >= self.source.len()
    }
}

/// Template lexer with logging and compile-time limits
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    tokens: Vec<SpannedToken>,
    /// Set by a `-` closer; trims leading whitespace of the next data run
    trim_next_data: bool,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            tokens: Vec::new(),
            trim_next_data: false,
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Tokenize a whole template. The result always ends with `Token::Eof`.
    pub fn tokenize(&mut self, source: &str) -> Result<Vec<SpannedToken>, LexerError> {
        self.metrics = LexicalMetrics::default();
        self.tokens = Vec::new();
        self.trim_next_data = false;

        let result = self.scan(source);
        if let Err(error) = &result {
            log_error!(error.error_code(), &error.to_string(),
                span = error.span(),
                "tokens_so_far" => self.tokens.len()
            );
        }
        result?;

        log_debug!("Template tokenized",
            "tokens" => self.metrics.total_tokens,
            "data_runs" => self.metrics.data_tokens,
            "expression_tags" => self.metrics.expression_tags,
            "block_tags" => self.metrics.block_tags,
            "comments" => self.metrics.comments
        );

        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan(&mut self, source: &str) -> Result<(), LexerError> {
        let mut scanner = Scanner::new(source);

        while !scanner.is_done() {
            let data_start = scanner.pos;
            let opener = scanner
                .rest()
                .match_indices('{')
                .map(|(i, _)| i)
                .find(|&i| matches!(scanner.rest().as_bytes().get(i + 1), Some(b'{' | b'%' | b'#')));

            let data_len = opener.unwrap_or(scanner.rest().len());
            let data = &scanner.rest()[..data_len];
            scanner.bump_str(data);
            let trims_before = opener.is_some() && scanner.rest()[2..].starts_with('-');
            self.push_data(data, Span::new(data_start, scanner.pos), trims_before)?;

            if opener.is_none() {
                break;
            }

            let open_start = scanner.pos;
            let marker = &scanner.rest()[..2];
            scanner.bump_str(marker);
            if scanner.starts_with("-") {
                scanner.bump();
            }
            let open_span = Span::new(open_start, scanner.pos);

            match marker {
                "{{" => {
                    self.push(Token::VariableBegin, open_span)?;
                    self.scan_tag(&mut scanner, TagKind::Variable, open_span)?;
                }
                "{%" => {
                    self.push(Token::BlockBegin, open_span)?;
                    self.scan_tag(&mut scanner, TagKind::Block, open_span)?;
                }
                _ => self.skip_comment(&mut scanner, open_span)?,
            }
        }

        let end = scanner.pos;
        self.push(Token::Eof, Span::point(end))
    }

    fn push_data(&mut self, data: &str, span: Span, trim_end: bool) -> Result<(), LexerError> {
        let mut text = data;
        let mut start = span.start;
        if std::mem::take(&mut self.trim_next_data) {
            text = text.trim_start();
            start = start.advance_str(&data[..data.len() - text.len()]);
        }
        if trim_end {
            text = text.trim_end();
        }
        if text.is_empty() {
            return Ok(());
        }
        let end = start.advance_str(text);
        self.push(Token::Data(text.to_string()), Span::new(start, end))
    }

    fn push(&mut self, token: Token, span: Span) -> Result<(), LexerError> {
        if self.tokens.len() >= MAX_TOKEN_COUNT {
            return Err(LexerError::TooManyTokens {
                count: self.tokens.len() + 1,
                span,
            });
        }
        self.metrics.record_token(&token);
        self.tokens.push(Spanned::new(token, span));
        Ok(())
    }

    fn skip_comment(&mut self, scanner: &mut Scanner<'_>, open_span: Span) -> Result<(), LexerError> {
        let Some(end) = scanner.rest().find("#}") else {
            return Err(LexerError::UnterminatedComment { span: open_span });
        };
        let body = &scanner.rest()[..end];
        self.trim_next_data = body.ends_with('-');
        scanner.bump_str(body);
        scanner.bump_str("#}");
        self.metrics.comments += 1;
        Ok(())
    }

    fn scan_tag(
        &mut self,
        scanner: &mut Scanner<'_>,
        kind: TagKind,
        open_span: Span,
    ) -> Result<(), LexerError> {
        loop {
            while scanner.peek().is_some_and(char::is_whitespace) {
                scanner.bump();
            }

            let start = scanner.pos;
            let Some(ch) = scanner.peek() else {
                return Err(LexerError::UnterminatedTag { span: open_span });
            };

            if scanner.starts_with(kind.closer()) {
                scanner.bump_str(kind.closer());
                return self.push(kind.end_token(), Span::new(start, scanner.pos));
            }

            if ch == '-' && scanner.rest()[1..].starts_with(kind.closer()) {
                scanner.bump();
                scanner.bump_str(kind.closer());
                self.trim_next_data = true;
                return self.push(kind.end_token(), Span::new(start, scanner.pos));
            }

            let token = match ch {
                'a'..='z' | 'A'..='Z' | '_' => self.scan_name(scanner)?,
                '0'..='9' => self.scan_integer(scanner)?,
                '"' | '\'' => self.scan_string(scanner)?,
                '(' | ')' | ',' | '=' | '-' => {
                    scanner.bump();
                    match ch {
                        '(' => Token::LParen,
                        ')' => Token::RParen,
                        ',' => Token::Comma,
                        '=' => Token::Assign,
                        _ => Token::Minus,
                    }
                }
                other => {
                    scanner.bump();
                    return Err(LexerError::UnexpectedCharacter {
                        character: other,
                        span: Span::new(start, scanner.pos),
                    });
                }
            };

            self.push(token, Span::new(start, scanner.pos))?;
        }
    }

    fn scan_name(&mut self, scanner: &mut Scanner<'_>) -> Result<Token, LexerError> {
        let start = scanner.pos;
        let len = scanner
            .rest()
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(scanner.rest().len());
        let word = &scanner.rest()[..len];
        scanner.bump_str(word);

        if word.len() > MAX_IDENTIFIER_LENGTH {
            return Err(LexerError::IdentifierTooLong {
                length: word.len(),
                span: Span::new(start, scanner.pos),
            });
        }
        Ok(Token::Name(word.to_string()))
    }

    fn scan_integer(&mut self, scanner: &mut Scanner<'_>) -> Result<Token, LexerError> {
        let start = scanner.pos;
        let len = scanner
            .rest()
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(scanner.rest().len());
        let text = &scanner.rest()[..len];
        scanner.bump_str(text);

        text.parse::<i64>()
            .map(Token::Integer)
            .map_err(|_| LexerError::InvalidNumber {
                text: text.to_string(),
                span: Span::new(start, scanner.pos),
            })
    }

    fn scan_string(&mut self, scanner: &mut Scanner<'_>) -> Result<Token, LexerError> {
        let start = scanner.pos;
        let quote = scanner.bump();
        let mut content = String::new();

        loop {
            let Some(ch) = scanner.bump() else {
                return Err(LexerError::UnterminatedString {
                    span: Span::new(start, scanner.pos),
                });
            };
            match ch {
                c if Some(c) == quote => break,
                '\\' => match scanner.bump() {
                    Some('n') => content.push('\n'),
                    Some('t') => content.push('\t'),
                    Some('r') => content.push('\r'),
                    Some(other) => content.push(other),
                    None => {
                        return Err(LexerError::UnterminatedString {
                            span: Span::new(start, scanner.pos),
                        })
                    }
                },
                c => content.push(c),
            }

            if content.len() > MAX_STRING_SIZE {
                return Err(LexerError::StringTooLarge {
                    size: content.len(),
                    span: Span::new(start, scanner.pos),
                });
            }
        }

        Ok(Token::StringLiteral(content))
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
