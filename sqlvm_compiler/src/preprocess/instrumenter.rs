//! Pull-based token stream instrumenter
//!
//! Walks the lexed template one token at a time and yields the same tokens
//! with synthetic `{{ hook() }}` call-sites spliced in at region and
//! statement boundaries.

use super::error::{PreprocessError, PreprocessResult};
use super::{HookNames, REGION_CLOSE_TAG, REGION_OPEN_TAG};
use crate::tokens::{SpannedToken, Token, TokenStream};
use crate::utils::{Position, Span, Spanned};
use std::collections::VecDeque;

/// Preprocessor context for one traversal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationState {
    /// Inside a region
    pub processing: bool,
    /// An effectful line is waiting for its `statement()` call
    pub statement_started: bool,
    /// Opening tag of the region currently being processed
    pub region_start: Option<Span>,
}

/// Counters reported after instrumentation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentationSummary {
    pub regions: usize,
    pub statement_sites: usize,
    pub injected_tokens: usize,
}

pub struct Preprocessor<'h> {
    stream: TokenStream,
    hooks: &'h HookNames,
    state: CompilationState,
    pending: VecDeque<SpannedToken>,
    summary: InstrumentationSummary,
    done: bool,
}

impl<'h> Preprocessor<'h> {
    pub fn new(tokens: Vec<SpannedToken>, hooks: &'h HookNames) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            hooks,
            state: CompilationState::default(),
            pending: VecDeque::new(),
            summary: InstrumentationSummary::default(),
            done: false,
        }
    }

    pub fn state(&self) -> &CompilationState {
        &self.state
    }

    pub fn summary(&self) -> &InstrumentationSummary {
        &self.summary
    }

    /// Visit exactly one source token, queueing zero or more output tokens
    fn visit(&mut self) -> PreprocessResult<()> {
        let Some(current) = self.stream.current().cloned() else {
            self.done = true;
            return Ok(());
        };

        match &current.value {
            Token::BlockBegin => self.visit_block_begin(),
            Token::Data(text) if self.state.processing => {
                self.visit_data(text, current.span);
                Ok(())
            }
            Token::VariableBegin => {
                if self.state.processing {
                    self.state.statement_started = true;
                }
                self.pass_along();
                Ok(())
            }
            Token::Eof => {
                if self.state.processing {
                    let span = self.state.region_start.unwrap_or(current.span);
                    return Err(PreprocessError::UnclosedRegion { span });
                }
                self.pass_along();
                self.done = true;
                Ok(())
            }
            _ => {
                self.pass_along();
                Ok(())
            }
        }
    }

    fn visit_block_begin(&mut self) -> PreprocessResult<()> {
        let next = self.stream.peek().map(|t| t.value.clone());

        match next {
            Some(token) if token.is_name(REGION_OPEN_TAG) => self.open_region(),
            Some(token) if token.is_name(REGION_CLOSE_TAG) => self.close_region(),
            _ => {
                self.pass_along();
                Ok(())
            }
        }
    }

    fn open_region(&mut self) -> PreprocessResult<()> {
        let begin_span = self.stream.current_span().unwrap_or_else(Span::dummy);
        let tag_span = self
            .stream
            .peek_ahead(2)
            .map(|t| begin_span.to(t.span))
            .unwrap_or(begin_span);

        if self.state.processing {
            return Err(PreprocessError::NestedRegion {
                span: tag_span,
                open: self.state.region_start.unwrap_or_else(Span::dummy),
            });
        }
        self.state.processing = true;
        self.state.statement_started = true;
        self.state.region_start = Some(tag_span);
        self.summary.regions += 1;

        let expected = [
            Token::BlockBegin,
            Token::Name(REGION_OPEN_TAG.to_string()),
            Token::BlockEnd,
        ];
        let mut last_end = begin_span.end;
        for wanted in expected {
            let current = self.stream.current().cloned();
            match current {
                Some(token) if token.value == wanted => {
                    last_end = token.span.end;
                    self.pass_along();
                }
                other => {
                    let (found, span) = other
                        .map(|t| (t.value.describe(), t.span))
                        .unwrap_or_else(|| ("end of input".to_string(), self.stream.end_span()));
                    return Err(PreprocessError::MalformedBoundary {
                        expected: wanted.describe(),
                        found,
                        span,
                    });
                }
            }
        }

        let hooks = self.hooks;
        self.emit_call(&hooks.prologue, last_end);
        Ok(())
    }

    fn close_region(&mut self) -> PreprocessResult<()> {
        let span = self.stream.current_span().unwrap_or_else(Span::dummy);
        if !self.state.processing {
            return Err(PreprocessError::UnmatchedClose { span });
        }
        self.state.processing = false;
        self.state.region_start = None;

        let hooks = self.hooks;
        self.emit_call(&hooks.epilogue, span.start);
        self.pass_along();
        Ok(())
    }

    fn visit_data(&mut self, text: &str, span: Span) {
        let hooks = self.hooks;
        let mut position = span.start;
        let mut lines = text.split('\n').peekable();

        while let Some(line) = lines.next() {
            let line_end = position.advance_str(line);

            if lines.peek().is_none() {
                self.emit(Token::Data(line.to_string()), Span::new(position, line_end));
                break;
            }

            if !line.trim().is_empty() {
                self.emit(Token::Data(line.to_string()), Span::new(position, line_end));
                self.state.statement_started = true;
            }

            if self.state.statement_started {
                self.emit_call(&hooks.statement, line_end);
                self.state.statement_started = false;
                self.summary.statement_sites += 1;
            }

            position = line_end.advance('\n');
        }

        self.stream.advance();
    }

    fn pass_along(&mut self) {
        if let Some(token) = self.stream.advance() {
            self.pending.push_back(token);
        }
    }

    fn emit(&mut self, token: Token, span: Span) {
        self.pending.push_back(Spanned::new(token, span));
    }

    /// Queue `{{ name() }}` at a zero-width span
    fn emit_call(&mut self, name: &str, at: Position) {
        let span = Span::point(at);
        for token in [
            Token::VariableBegin,
            Token::Name(name.to_string()),
            Token::LParen,
            Token::RParen,
            Token::VariableEnd,
        ] {
            self.emit(token, span);
        }
        self.summary.injected_tokens += 5;
    }
}

impl Iterator for Preprocessor<'_> {
    type Item = PreprocessResult<SpannedToken>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.done {
                return None;
            }
            if let Err(error) = self.visit() {
                self.done = true;
                self.pending.clear();
                return Some(Err(error));
            }
        }
    }
}
