//! Dialect registry and extension maps

use super::error::{DialectError, DialectResult};
use super::mysql::MySqlDialect;
use super::state::DialectState;
use super::value::{Fragment, Value};
use super::{Dialect, Operation};
use crate::log_debug;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type ExtensionFn = fn(&mut DialectState, &[Value]) -> DialectResult<Fragment>;

/// Dialect-specific template function
#[derive(Clone, Copy)]
pub struct Extension {
    pub name: &'static str,
    pub arity: usize,
    pub func: ExtensionFn,
}

impl std::fmt::Debug for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtensionMap {
    entries: BTreeMap<&'static str, Extension>,
}

impl ExtensionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, extension: Extension) -> Self {
        self.insert(extension);
        self
    }

    pub fn insert(&mut self, extension: Extension) {
        self.entries.insert(extension.name, extension);
    }

    pub fn get(&self, name: &str) -> Option<&Extension> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Name → dialect lookup
#[derive(Default)]
pub struct DialectRegistry {
    dialects: BTreeMap<String, Arc<dyn Dialect>>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every dialect shipped with the compiler
    pub fn with_builtin() -> DialectResult<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(MySqlDialect))?;
        Ok(registry)
    }

    pub fn register(&mut self, dialect: Arc<dyn Dialect>) -> DialectResult<()> {
        let name = dialect.name().to_string();
        if self.dialects.contains_key(&name) {
            return Err(DialectError::DuplicateDialect { name });
        }

        let extensions = dialect.extensions();
        if let Some(shadowed) = extensions
            .names()
            .find(|ext| Operation::from_name(ext).is_some())
        {
            return Err(DialectError::ShadowedOperation {
                dialect: name,
                name: shadowed.to_string(),
            });
        }

        log_debug!("Registered dialect",
            "dialect" => name.as_str(),
            "extensions" => extensions.len()
        );
        self.dialects.insert(name, dialect);
        Ok(())
    }

    pub fn get(&self, name: &str) -> DialectResult<Arc<dyn Dialect>> {
        self.dialects
            .get(name)
            .cloned()
            .ok_or_else(|| DialectError::UnknownDialect {
                name: name.to_string(),
                available: self.names().into_iter().map(String::from).collect(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dialects.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.dialects.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Thunk;
    use assert_matches::assert_matches;

    struct ShadowingDialect;

    fn noop(_: &mut DialectState, _: &[Value]) -> DialectResult<Fragment> {
        Ok(Fragment::empty())
    }

    impl Dialect for ShadowingDialect {
        fn name(&self) -> &str {
            "shadow"
        }
        fn prologue(&self, _: &mut DialectState) -> DialectResult<Fragment> {
            Ok(Fragment::empty())
        }
        fn epilogue(&self, _: &mut DialectState) -> DialectResult<Fragment> {
            Ok(Fragment::empty())
        }
        fn statement(&self, _: &mut DialectState) -> DialectResult<Fragment> {
            Ok(Fragment::empty())
        }
        fn label(&self, _: &mut DialectState, _: &str) -> DialectResult<Fragment> {
            Ok(Fragment::empty())
        }
        fn jump(&self, _: &mut DialectState, name: &str) -> DialectResult<Fragment> {
            Ok(Fragment::Thunk(Thunk::JumpTo(name.to_string())))
        }
        fn exit(&self, _: &mut DialectState) -> DialectResult<Fragment> {
            Ok(Fragment::Thunk(Thunk::Exit))
        }
        fn load(&self, _: &mut DialectState, _: &Value, _: &Value) -> DialectResult<Fragment> {
            Ok(Fragment::empty())
        }
        fn store(&self, _: &mut DialectState, _: &Value, _: &Value) -> DialectResult<Fragment> {
            Ok(Fragment::empty())
        }
        fn alloc(&self, _: &mut DialectState, _: &Value) -> DialectResult<Fragment> {
            Ok(Fragment::empty())
        }
        fn nop(&self, _: &mut DialectState) -> DialectResult<Fragment> {
            Ok(Fragment::empty())
        }
        fn resolve(&self, _: &DialectState, _: &Thunk) -> DialectResult<String> {
            Ok(String::new())
        }
        fn extensions(&self) -> ExtensionMap {
            ExtensionMap::new().with(Extension {
                name: "jump",
                arity: 1,
                func: noop,
            })
        }
    }

    #[test]
    fn test_builtin_lookup() {
        let registry = DialectRegistry::with_builtin().unwrap();
        assert_eq!(registry.names(), vec!["mysql"]);
        assert_eq!(registry.get("mysql").unwrap().name(), "mysql");
    }

    #[test]
    fn test_unknown_dialect_lists_available() {
        let registry = DialectRegistry::with_builtin().unwrap();
        let error = registry.get("oracle").err().unwrap();
        assert_matches!(&error, DialectError::UnknownDialect { available, .. } if available == &vec!["mysql".to_string()]);
        assert!(error.to_string().contains("mysql"));
    }

    #[test]
    fn test_registration_is_validated() {
        let mut registry = DialectRegistry::with_builtin().unwrap();
        assert_matches!(
            registry.register(Arc::new(MySqlDialect)),
            Err(DialectError::DuplicateDialect { name }) if name == "mysql"
        );
        assert_matches!(
            registry.register(Arc::new(ShadowingDialect)),
            Err(DialectError::ShadowedOperation { name, .. }) if name == "jump"
        );
        assert!(!registry.contains("shadow"));
    }
}
