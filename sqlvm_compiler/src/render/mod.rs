//! Pass 1: template evaluation
//!
//! Walks the parsed template in document order. Text is copied, `{{ }}`
//! expressions are evaluated and dialect operations are invoked with the
//! compilation's [`DialectState`]. Each region is resolved (pass 2) as soon
//! as its closing tag has been rendered; thunks produced outside any region
//! are resolved after the whole template.

mod error;
mod output;

pub use error::{RenderError, RenderResult};
pub use output::{RegionReport, Rendered, Segment};

use crate::dialect::{Dialect, DialectState, ExtensionMap, Fragment, Operation, Value};
use crate::logging::codes;
use crate::resolve::ThunkResolver;
use crate::syntax::{Expr, Node, Template};
use crate::utils::Span;
use crate::{log_debug, log_error, log_success};
use std::collections::HashMap;

/// Final text and per-region reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub text: String,
    pub regions: Vec<RegionReport>,
}

pub struct Renderer<'a> {
    dialect: &'a dyn Dialect,
    state: &'a mut DialectState,
    extensions: ExtensionMap,
    resolver: ThunkResolver,
    variables: HashMap<String, Value>,
    regions: Vec<RegionReport>,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect, state: &'a mut DialectState, resolver: ThunkResolver) -> Self {
        Self {
            extensions: dialect.extensions(),
            dialect,
            state,
            resolver,
            variables: HashMap::new(),
            regions: Vec::new(),
        }
    }

    /// Predefine a template variable
    pub fn with_variable(mut self, name: &str, value: Value) -> Self {
        self.variables.insert(name.to_string(), value);
        self
    }

    pub fn render(mut self, template: &Template) -> RenderResult<RenderOutput> {
        let mut top_level = Rendered::new();
        for node in &template.nodes {
            self.render_node(node, &mut top_level)?;
        }

        let resolution = self.resolver.resolve(self.dialect, self.state, &top_level)?;
        Ok(RenderOutput {
            text: resolution.text,
            regions: self.regions,
        })
    }

    fn render_node(&mut self, node: &Node, out: &mut Rendered) -> RenderResult<()> {
        match node {
            Node::Data { text, .. } => out.push_text(text),
            Node::Output { expr, .. } => match self.eval(expr)? {
                Value::Deferred(thunk) => out.push_thunk(thunk, expr.span()),
                value => out.push_text(&value.to_code().unwrap_or_default()),
            },
            Node::Set { name, value, .. } => {
                let value = self.eval(value)?;
                self.variables.insert(name.clone(), value);
            }
            Node::Region { body, span } => {
                let text = self.render_region(body, *span)?;
                out.push_text(&text);
            }
        }
        Ok(())
    }

    fn render_region(&mut self, body: &[Node], span: Span) -> RenderResult<String> {
        log_debug!("Rendering region", "at" => span);

        let mut rendered = Rendered::new();
        for node in body {
            self.render_node(node, &mut rendered)?;
        }

        let resolution = self.resolver.resolve(self.dialect, self.state, &rendered)?;
        let report = RegionReport {
            span,
            final_counter: self.state.final_counter(),
            labels: self.state.labels().clone(),
            thunks_resolved: resolution.thunks_resolved,
            fallbacks: resolution.fallbacks,
        };

        log_success!(codes::success::REGION_COMPILED, "Region compiled",
            "at" => span,
            "instructions" => report.instruction_count(),
            "labels" => report.labels.len(),
            "thunks" => report.thunks_resolved
        );

        self.regions.push(report);
        Ok(resolution.text)
    }

    fn eval(&mut self, expr: &Expr) -> RenderResult<Value> {
        match expr {
            Expr::Str { value, .. } => Ok(Value::Str(value.clone())),
            Expr::Int { value, .. } => Ok(Value::Int(*value)),
            Expr::Var { name, span } => {
                self.variables
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RenderError::UndefinedVariable {
                        name: name.clone(),
                        span: *span,
                    })
            }
            Expr::Call { name, args, span } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    match self.eval(arg)? {
                        Value::Deferred(_) => {
                            return Err(RenderError::DeferredArgument {
                                function: name.clone(),
                                span: arg.span(),
                            })
                        }
                        value => values.push(value),
                    }
                }
                self.call(name, &values, *span).map(Value::from)
            }
        }
    }

    fn call(&mut self, name: &str, args: &[Value], span: Span) -> RenderResult<Fragment> {
        let (arity, result) = if let Some(operation) = Operation::from_name(name) {
            check_arity(name, operation.arity(), args, span)?;
            (
                operation.arity(),
                operation.invoke(self.dialect, self.state, args),
            )
        } else if let Some(extension) = self.extensions.get(name).copied() {
            check_arity(name, extension.arity, args, span)?;
            (extension.arity, (extension.func)(self.state, args))
        } else {
            return Err(RenderError::UnknownFunction {
                name: name.to_string(),
                span,
            });
        };

        log_debug!("Called dialect function",
            "function" => name,
            "arity" => arity,
            "pc" => self.state.program_counter()
        );
        result.map_err(|source| RenderError::Dialect { source, span })
    }
}

fn check_arity(name: &str, expected: usize, args: &[Value], span: Span) -> RenderResult<()> {
    if args.len() != expected {
        return Err(RenderError::ArgumentCount {
            function: name.to_string(),
            expected,
            found: args.len(),
            span,
        });
    }
    Ok(())
}

/// Render a parsed template against `dialect`, logging any failure
pub fn render_template(
    template: &Template,
    dialect: &dyn Dialect,
    state: &mut DialectState,
    resolver: ThunkResolver,
) -> RenderResult<RenderOutput> {
    let result = Renderer::new(dialect, state, resolver).render(template);
    if let Err(error) = &result {
        log_error!(error.error_code(), &error.to_string(), span = error.span());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{DialectError, MySqlDialect};
    use crate::preprocess::{instrument, HookNames};
    use crate::resolve::{ResolveError, UndefinedLabelPolicy};
    use crate::syntax::parse_template;
    use assert_matches::assert_matches;

    fn render_with(source: &str, policy: UndefinedLabelPolicy) -> RenderResult<RenderOutput> {
        let tokens = crate::lexical::tokenize(source).unwrap();
        let instrumented = instrument(tokens, &HookNames::default()).unwrap();
        let template = parse_template(instrumented.tokens).unwrap();
        let mut state = DialectState::new();
        Renderer::new(&MySqlDialect, &mut state, ThunkResolver::new(policy)).render(&template)
    }

    fn render(source: &str) -> RenderResult<RenderOutput> {
        render_with(source, UndefinedLabelPolicy::Fallback)
    }

    fn branches(text: &str) -> usize {
        text.matches(" THEN ").count()
    }

    #[test]
    fn test_counters_follow_source_order() {
        let output = render("{% sqlvm %}\n@a:=1\n@b:=2\n@c:=3\n{% endsqlvm %}").unwrap();
        let positions: Vec<_> = (0..4)
            .map(|pc| output.text.find(&format!("WHEN {} THEN ", pc)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(output.text.contains("WHEN 0 THEN @a:=1"));
        assert!(output.text.contains("WHEN 2 THEN @c:=3"));
        assert_eq!(output.regions[0].final_counter, 3);
    }

    #[test]
    fn test_two_statements_give_two_branches() {
        let output = render("{% sqlvm %}\nA\nB{% endsqlvm %}").unwrap();
        assert_eq!(branches(&output.text), 2);
        assert!(output.text.contains("WHEN 0 THEN A\n        WHEN 1 THEN B0\n    ELSE @out END"));
    }

    #[test]
    fn test_backward_jump_targets_label() {
        let output = render(
            "{% sqlvm %}\n{{ label(\"loop\") }}\n@out:=CONCAT(@out,'x')\n{{ jump(\"loop\") }}\n{% endsqlvm %}",
        )
        .unwrap();
        assert!(output.text.contains("WHEN 0 THEN 0"));
        assert!(output.text.contains("WHEN 1 THEN @out:=CONCAT(@out,'x')"));
        assert!(output.text.contains("WHEN 2 THEN @pc:=0"));
        assert_eq!(output.regions[0].labels.get("loop"), Some(&0));
        assert_eq!(output.regions[0].thunks_resolved, 1);
    }

    #[test]
    fn test_forward_and_backward_jumps_agree() {
        let output = render(
            "{% sqlvm %}\n{{ jump(\"mid\") }}\n{{ label(\"mid\") }}\n{{ jump(\"mid\") }}\n{{ exit() }}\n{% endsqlvm %}",
        )
        .unwrap();
        assert!(output.text.contains("WHEN 0 THEN @pc:=1"));
        assert!(output.text.contains("WHEN 2 THEN @pc:=1"));
        assert!(output.text.contains("WHEN 3 THEN @pc:=4"));
        assert!(output.text.contains("WHEN 4 THEN 0\n    ELSE"));
    }

    #[test]
    fn test_undefined_label_policies() {
        let source = "{% sqlvm %}\n{{ jump(\"done\") }}\n{% endsqlvm %}";

        let output = render(source).unwrap();
        assert!(output.text.contains("@pc:=done"));
        assert_eq!(output.regions[0].fallbacks, vec!["done".to_string()]);

        assert_matches!(
            render_with(source, UndefinedLabelPolicy::Error),
            Err(RenderError::Resolve(ResolveError::UndefinedLabel { name, span }))
                if name == "done" && span.start.line == 2
        );
    }

    #[test]
    fn test_labels_do_not_leak_between_regions() {
        let output = render(
            "{% sqlvm %}\n{{ label(\"a\") }}\n{% endsqlvm %}\n{% sqlvm %}\n{{ jump(\"a\") }}\n{% endsqlvm %}",
        )
        .unwrap();
        assert_eq!(output.regions.len(), 2);
        assert_eq!(output.regions[1].fallbacks, vec!["a".to_string()]);
    }

    #[test]
    fn test_duplicate_label_fails() {
        assert_matches!(
            render("{% sqlvm %}\n{{ label(\"x\") }}\n{{ label(\"x\") }}\n{% endsqlvm %}"),
            Err(RenderError::Dialect { source: DialectError::DuplicateLabel { .. }, span })
                if span.start.line == 3
        );
    }

    #[test]
    fn test_variables_and_extensions() {
        let output = render(
            "{% set cells = 4 %}{% sqlvm %}\n{{ set_lg_steps(2) }}{{ alloc(cells) }}\n{% endsqlvm %}",
        )
        .unwrap();
        assert!(output.text.contains("@mem:=CONCAT(@mem,REPEAT('<m></m>',4))"));
        assert!(output.text.contains("SELECT 2 v) E1 ORDER BY v) s"));
        assert!(!output.text.contains("E2"));
    }

    #[test]
    fn test_evaluation_errors() {
        assert_matches!(
            render("{{ launch() }}"),
            Err(RenderError::UnknownFunction { name, .. }) if name == "launch"
        );
        assert_matches!(
            render("{{ load(1) }}"),
            Err(RenderError::ArgumentCount { expected: 2, found: 1, .. })
        );
        assert_matches!(
            render("{{ alloc(n) }}"),
            Err(RenderError::UndefinedVariable { name, .. }) if name == "n"
        );
        assert_matches!(
            render("{{ store(exit(), 1) }}"),
            Err(RenderError::DeferredArgument { function, .. }) if function == "store"
        );
        assert_matches!(
            render("{% sqlvm %}\n{{ alloc(-2) }}\n{% endsqlvm %}"),
            Err(RenderError::Dialect { source: DialectError::NegativeAllocation { count: -2 }, .. })
        );
    }

    #[test]
    fn test_text_outside_regions_passes_through() {
        let output = render("-- header\n{% sqlvm %}\nA\n{% endsqlvm %}\n-- footer").unwrap();
        assert!(output.text.starts_with("-- header\nSELECT o FROM ("));
        assert!(output.text.ends_with("LIMIT 1\n-- footer"));
    }
}
