//! MySQL dialect
//!
//! A region compiles to one query. The inner `SELECT` walks the steps table;
//! each row evaluates `CASE @pc`, whose branches are the program's
//! instructions, and bumps `@pc`. The outer query keeps the last row's
//! output. Instructions communicate through session variables: `@pc`
//! (program counter), `@mem` (memory) and `@out` (result).

mod memory;
pub mod steps;

use crate::dialect::error::{DialectError, DialectResult};
use crate::dialect::registry::{Extension, ExtensionMap};
use crate::dialect::state::DialectState;
use crate::dialect::value::{Fragment, Thunk, Value};
use crate::dialect::Dialect;

const PROLOGUE: &str = "SELECT o FROM (
    SELECT 0 v, '' o, 0 pc FROM (SELECT @pc:=0, @mem:='', @out:='') i UNION ALL
    SELECT v,
    CASE @pc";

#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    pub const NAME: &'static str = "mysql";
}

/// `set_lg_steps(k)`: run the program for at most `2^k` steps
fn set_lg_steps(state: &mut DialectState, args: &[Value]) -> DialectResult<Fragment> {
    match args {
        [Value::Int(bits)] => {
            state.set_step_bits(*bits)?;
            Ok(Fragment::empty())
        }
        [other] => Err(DialectError::invalid_argument(
            "set_lg_steps",
            format!("expected an integer, got {}", other.type_name()),
        )),
        _ => Err(DialectError::invalid_argument(
            "set_lg_steps",
            "expected exactly one argument",
        )),
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn prologue(&self, state: &mut DialectState) -> DialectResult<Fragment> {
        state.begin_program();
        Ok(Fragment::text(PROLOGUE))
    }

    fn epilogue(&self, state: &mut DialectState) -> DialectResult<Fragment> {
        Ok(Fragment::Text(format!(
            "0\n    ELSE @out END,\n    @pc:=@pc+1\n    FROM {}) q ORDER BY v DESC LIMIT 1",
            steps::steps_table(state.step_bits())
        )))
    }

    fn statement(&self, state: &mut DialectState) -> DialectResult<Fragment> {
        let pc = state.advance();
        Ok(Fragment::Text(format!("\n        WHEN {} THEN ", pc)))
    }

    /// Labels sit in statement position, so they render a no-op body
    fn label(&self, state: &mut DialectState, name: &str) -> DialectResult<Fragment> {
        state.define_label(name)?;
        Ok(Fragment::text("0"))
    }

    fn jump(&self, _state: &mut DialectState, name: &str) -> DialectResult<Fragment> {
        Ok(Fragment::Thunk(Thunk::JumpTo(name.to_string())))
    }

    fn exit(&self, _state: &mut DialectState) -> DialectResult<Fragment> {
        Ok(Fragment::Thunk(Thunk::Exit))
    }

    fn load(&self, _state: &mut DialectState, dst: &Value, src: &Value) -> DialectResult<Fragment> {
        memory::load(dst, src).map(Fragment::Text)
    }

    fn store(
        &self,
        _state: &mut DialectState,
        value: &Value,
        address: &Value,
    ) -> DialectResult<Fragment> {
        memory::store(value, address).map(Fragment::Text)
    }

    fn alloc(&self, _state: &mut DialectState, count: &Value) -> DialectResult<Fragment> {
        memory::alloc(count).map(Fragment::Text)
    }

    fn nop(&self, _state: &mut DialectState) -> DialectResult<Fragment> {
        Ok(Fragment::text("0"))
    }

    fn resolve(&self, state: &DialectState, thunk: &Thunk) -> DialectResult<String> {
        Ok(match thunk {
            Thunk::JumpTo(name) => match state.label_address(name) {
                Some(address) => format!("@pc:={}", address),
                None => format!("@pc:={}", name),
            },
            Thunk::Exit => format!("@pc:={}", state.final_counter()),
        })
    }

    fn extensions(&self) -> ExtensionMap {
        ExtensionMap::new().with(Extension {
            name: "set_lg_steps",
            arity: 1,
            func: set_lg_steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn text(fragment: DialectResult<Fragment>) -> String {
        match fragment.unwrap() {
            Fragment::Text(text) => text,
            Fragment::Thunk(thunk) => panic!("unexpected thunk {}", thunk),
        }
    }

    #[test]
    fn test_program_frame() {
        let dialect = MySqlDialect;
        let mut state = DialectState::new();
        state.set_step_bits(1).unwrap();

        let prologue = text(dialect.prologue(&mut state));
        assert!(prologue.starts_with("SELECT o FROM (\n    SELECT 0 v, '' o, 0 pc FROM"));
        assert!(prologue.ends_with("\n    CASE @pc"));

        assert_eq!(text(dialect.statement(&mut state)), "\n        WHEN 0 THEN ");
        assert_eq!(text(dialect.statement(&mut state)), "\n        WHEN 1 THEN ");

        assert_eq!(
            text(dialect.epilogue(&mut state)),
            "0\n    ELSE @out END,\n    @pc:=@pc+1\n    \
             FROM (SELECT (E0.v) v FROM (SELECT 0 v UNION ALL SELECT 1 v) E0 ORDER BY v) s) q \
             ORDER BY v DESC LIMIT 1"
        );
    }

    #[test]
    fn test_prologue_resets_program() {
        let dialect = MySqlDialect;
        let mut state = DialectState::new();
        dialect.statement(&mut state).unwrap();
        dialect.label(&mut state, "a").unwrap();

        dialect.prologue(&mut state).unwrap();
        assert_eq!(state.program_counter(), -1);
        assert_eq!(state.label_address("a"), None);
    }

    #[test]
    fn test_jump_resolution() {
        let dialect = MySqlDialect;
        let mut state = DialectState::new();
        dialect.prologue(&mut state).unwrap();

        let forward = dialect.jump(&mut state, "loop").unwrap();
        dialect.statement(&mut state).unwrap();
        dialect.statement(&mut state).unwrap();
        assert_eq!(text(dialect.label(&mut state, "loop")), "0");
        let backward = dialect.jump(&mut state, "loop").unwrap();
        dialect.statement(&mut state).unwrap();

        let resolve = |fragment: &Fragment| match fragment {
            Fragment::Thunk(thunk) => dialect.resolve(&state, thunk).unwrap(),
            Fragment::Text(text) => panic!("expected thunk, got {}", text),
        };
        assert_eq!(resolve(&forward), "@pc:=1");
        assert_eq!(resolve(&forward), resolve(&backward));
        assert_eq!(
            dialect.resolve(&state, &Thunk::JumpTo("nowhere".into())).unwrap(),
            "@pc:=nowhere"
        );
        assert_eq!(dialect.resolve(&state, &Thunk::Exit).unwrap(), "@pc:=2");
    }

    #[test]
    fn test_duplicate_label() {
        let dialect = MySqlDialect;
        let mut state = DialectState::new();
        dialect.prologue(&mut state).unwrap();
        dialect.label(&mut state, "x").unwrap();
        assert_matches!(
            dialect.label(&mut state, "x"),
            Err(DialectError::DuplicateLabel { name, .. }) if name == "x"
        );
    }

    #[test]
    fn test_set_lg_steps_extension() {
        let dialect = MySqlDialect;
        let mut state = DialectState::new();
        let extension = *dialect.extensions().get("set_lg_steps").unwrap();

        assert_eq!(text((extension.func)(&mut state, &[Value::Int(3)])), "");
        assert_eq!(state.step_bits(), 3);

        dialect.prologue(&mut state).unwrap();
        assert_eq!(state.step_bits(), 3);
        assert!(text(dialect.epilogue(&mut state)).contains("SELECT 4 v) E2 ORDER BY v"));

        assert_matches!(
            (extension.func)(&mut state, &[Value::from("3")]),
            Err(DialectError::InvalidArgument { .. })
        );
        assert_matches!(
            (extension.func)(&mut state, &[Value::Int(99)]),
            Err(DialectError::StepBudgetOutOfRange { requested: 99 })
        );
    }
}
