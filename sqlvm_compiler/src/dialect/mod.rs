//! Dialect contract and dispatch
//!
//! A dialect is a stateless code generator for one SQL target. Every
//! operation receives the compilation's [`DialectState`] explicitly; the
//! dialect value itself can be shared between concurrent compilations.
//!
//! Core operations are listed by [`Operation`]. Dialect-specific extras are
//! exposed through [`Dialect::extensions`] and may not reuse a core name.

mod error;
pub mod mysql;
mod registry;
mod state;
mod value;

pub use error::{DialectError, DialectResult};
pub use mysql::MySqlDialect;
pub use registry::{DialectRegistry, Extension, ExtensionFn, ExtensionMap};
pub use state::DialectState;
pub use value::{Fragment, Thunk, Value};

/// Code generator for one SQL target
pub trait Dialect: Send + Sync {
    /// Name used to select the dialect (`-l` on the command line)
    fn name(&self) -> &str;

    /// Opens a program. Must reset the counter and the label table.
    fn prologue(&self, state: &mut DialectState) -> DialectResult<Fragment>;
    fn epilogue(&self, state: &mut DialectState) -> DialectResult<Fragment>;
    /// Starts the next instruction
    fn statement(&self, state: &mut DialectState) -> DialectResult<Fragment>;

    fn label(&self, state: &mut DialectState, name: &str) -> DialectResult<Fragment>;
    fn jump(&self, state: &mut DialectState, name: &str) -> DialectResult<Fragment>;
    fn exit(&self, state: &mut DialectState) -> DialectResult<Fragment>;

    fn load(&self, state: &mut DialectState, dst: &Value, src: &Value) -> DialectResult<Fragment>;
    fn store(
        &self,
        state: &mut DialectState,
        value: &Value,
        address: &Value,
    ) -> DialectResult<Fragment>;
    fn alloc(&self, state: &mut DialectState, count: &Value) -> DialectResult<Fragment>;
    fn nop(&self, state: &mut DialectState) -> DialectResult<Fragment>;

    /// Render a thunk against the finished program state.
    /// A jump to an undefined label renders the label name itself.
    fn resolve(&self, state: &DialectState, thunk: &Thunk) -> DialectResult<String>;

    fn extensions(&self) -> ExtensionMap {
        ExtensionMap::new()
    }
}

/// Core dialect operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Prologue,
    Epilogue,
    Statement,
    Label,
    Jump,
    Exit,
    Load,
    Store,
    Alloc,
    Nop,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::Prologue,
        Operation::Epilogue,
        Operation::Statement,
        Operation::Label,
        Operation::Jump,
        Operation::Exit,
        Operation::Load,
        Operation::Store,
        Operation::Alloc,
        Operation::Nop,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Prologue => "prologue",
            Operation::Epilogue => "epilogue",
            Operation::Statement => "statement",
            Operation::Label => "label",
            Operation::Jump => "jump",
            Operation::Exit => "exit",
            Operation::Load => "load",
            Operation::Store => "store",
            Operation::Alloc => "alloc",
            Operation::Nop => "nop",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn arity(&self) -> usize {
        match self {
            Operation::Prologue
            | Operation::Epilogue
            | Operation::Statement
            | Operation::Exit
            | Operation::Nop => 0,
            Operation::Label | Operation::Jump | Operation::Alloc => 1,
            Operation::Load | Operation::Store => 2,
        }
    }

    /// Call this operation on `dialect`. The caller has checked the arity.
    pub fn invoke(
        &self,
        dialect: &dyn Dialect,
        state: &mut DialectState,
        args: &[Value],
    ) -> DialectResult<Fragment> {
        match (self, args) {
            (Operation::Prologue, []) => dialect.prologue(state),
            (Operation::Epilogue, []) => dialect.epilogue(state),
            (Operation::Statement, []) => dialect.statement(state),
            (Operation::Exit, []) => dialect.exit(state),
            (Operation::Nop, []) => dialect.nop(state),
            (Operation::Label, [name]) => dialect.label(state, label_name(*self, name)?),
            (Operation::Jump, [name]) => dialect.jump(state, label_name(*self, name)?),
            (Operation::Alloc, [count]) => dialect.alloc(state, count),
            (Operation::Load, [dst, src]) => dialect.load(state, dst, src),
            (Operation::Store, [value, address]) => dialect.store(state, value, address),
            _ => Err(DialectError::invalid_argument(
                self.name(),
                format!("expected {} argument(s), got {}", self.arity(), args.len()),
            )),
        }
    }
}

fn label_name(operation: Operation, value: &Value) -> DialectResult<&str> {
    value.as_str().ok_or_else(|| {
        DialectError::invalid_argument(
            operation.name(),
            format!("label name must be a string, got {}", value.type_name()),
        )
    })
}
