//! Pass 2: thunk resolution
//!
//! Runs once the dialect state of a region is final, so a jump placed before
//! its label resolves exactly like one placed after it.

use crate::config::CompilerPreferences;
use crate::dialect::{Dialect, DialectError, DialectState, Thunk};
use crate::log_warning;
use crate::logging::{codes, Code};
use crate::render::{Rendered, Segment};
use crate::utils::Span;

pub type ResolveResult<T> = Result<T, ResolveError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("Jump to undefined label '{name}' at {span}")]
    UndefinedLabel { name: String, span: Span },

    #[error("Cannot resolve deferred value at {span}: {source}")]
    Dialect { source: DialectError, span: Span },
}

impl ResolveError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::UndefinedLabel { .. } => codes::resolve::UNDEFINED_LABEL,
            Self::Dialect { source, .. } => source.error_code(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UndefinedLabel { span, .. } | Self::Dialect { span, .. } => *span,
        }
    }
}

/// What to do with a jump whose label was never defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndefinedLabelPolicy {
    /// Render the label name itself and log a warning
    #[default]
    Fallback,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    pub thunks_resolved: usize,
    pub fallbacks: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThunkResolver {
    policy: UndefinedLabelPolicy,
}

impl ThunkResolver {
    pub fn new(policy: UndefinedLabelPolicy) -> Self {
        Self { policy }
    }

    pub fn from_preferences(preferences: &CompilerPreferences) -> Self {
        Self::new(if preferences.strict_labels {
            UndefinedLabelPolicy::Error
        } else {
            UndefinedLabelPolicy::Fallback
        })
    }

    pub fn policy(&self) -> UndefinedLabelPolicy {
        self.policy
    }

    pub fn resolve(
        &self,
        dialect: &dyn Dialect,
        state: &DialectState,
        rendered: &Rendered,
    ) -> ResolveResult<Resolution> {
        let mut resolution = Resolution::default();

        for segment in rendered.segments() {
            match segment {
                Segment::Text(text) => resolution.text.push_str(text),
                Segment::Thunk { thunk, span } => {
                    if let Thunk::JumpTo(name) = thunk {
                        if state.label_address(name).is_none() {
                            self.undefined_label(name, *span)?;
                            resolution.fallbacks.push(name.clone());
                        }
                    }
                    let text = dialect
                        .resolve(state, thunk)
                        .map_err(|source| ResolveError::Dialect {
                            source,
                            span: *span,
                        })?;
                    resolution.text.push_str(&text);
                    resolution.thunks_resolved += 1;
                }
            }
        }

        Ok(resolution)
    }

    fn undefined_label(&self, name: &str, span: Span) -> ResolveResult<()> {
        match self.policy {
            UndefinedLabelPolicy::Error => Err(ResolveError::UndefinedLabel {
                name: name.to_string(),
                span,
            }),
            UndefinedLabelPolicy::Fallback => {
                log_warning!(
                    codes::resolve::UNDEFINED_LABEL_FALLBACK,
                    &format!("Jump to undefined label '{}' uses the name as target", name),
                    span = span,
                    "label" => name
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MySqlDialect;
    use assert_matches::assert_matches;

    fn rendered_with_jump(label: &str) -> Rendered {
        let mut rendered = Rendered::new();
        rendered.push_text("WHEN 0 THEN ");
        rendered.push_thunk(Thunk::JumpTo(label.to_string()), Span::dummy());
        rendered.push_text(" WHEN 1 THEN ");
        rendered.push_thunk(Thunk::Exit, Span::dummy());
        rendered
    }

    fn finished_state() -> DialectState {
        let mut state = DialectState::new();
        state.advance();
        state.define_label("top").unwrap();
        state.advance();
        state
    }

    #[test]
    fn test_resolves_defined_labels_and_exit() {
        let resolution = ThunkResolver::default()
            .resolve(&MySqlDialect, &finished_state(), &rendered_with_jump("top"))
            .unwrap();
        assert_eq!(resolution.text, "WHEN 0 THEN @pc:=0 WHEN 1 THEN @pc:=1");
        assert_eq!(resolution.thunks_resolved, 2);
        assert!(resolution.fallbacks.is_empty());
    }

    #[test]
    fn test_fallback_uses_label_name() {
        let resolution = ThunkResolver::new(UndefinedLabelPolicy::Fallback)
            .resolve(&MySqlDialect, &finished_state(), &rendered_with_jump("done"))
            .unwrap();
        assert_eq!(resolution.text, "WHEN 0 THEN @pc:=done WHEN 1 THEN @pc:=1");
        assert_eq!(resolution.fallbacks, vec!["done".to_string()]);
    }

    #[test]
    fn test_strict_policy_rejects_undefined_label() {
        let resolver = ThunkResolver::new(UndefinedLabelPolicy::Error);
        let error = resolver
            .resolve(&MySqlDialect, &finished_state(), &rendered_with_jump("done"))
            .unwrap_err();
        assert_matches!(&error, ResolveError::UndefinedLabel { name, .. } if name == "done");
        assert_eq!(error.error_code(), codes::resolve::UNDEFINED_LABEL);
    }

    #[test]
    fn test_policy_from_preferences() {
        let preferences = CompilerPreferences {
            strict_labels: true,
            ..CompilerPreferences::default()
        };
        assert_eq!(
            ThunkResolver::from_preferences(&preferences).policy(),
            UndefinedLabelPolicy::Error
        );
    }
}
