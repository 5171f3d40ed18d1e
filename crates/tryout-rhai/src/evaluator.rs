// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `Evaluator` and `OutputCapture` on top of a rhai `Engine`.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rhai::{Dynamic, Engine, Scope, AST};
use tryout_engine::{CapturedOutput, Evaluator, ExecutionOutcome, Fragment, OutputCapture, RaisedError};

use crate::error::{self, CaughtError};
use crate::output::OutputBuffers;
use crate::source::strip_hash_comments;
use crate::types;

/// Default limit on nested function calls before a stack overflow.
const DEFAULT_MAX_CALL_LEVELS: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct RhaiConfig {
    /// Wall-clock limit per fragment. None for no limit.
    pub timeout: Option<Duration>,
    pub max_call_levels: usize,
    /// Operation budget per fragment. 0 for unlimited.
    pub max_operations: u64,
}

impl Default for RhaiConfig {
    fn default() -> Self {
        Self { timeout: None, max_call_levels: DEFAULT_MAX_CALL_LEVELS, max_operations: 0 }
    }
}

/// Bindings and script-defined functions carried between fragments.
#[derive(Debug)]
pub struct RhaiContext {
    scope: Scope<'static>,
    functions: AST,
}

/// A deep copy. Variables captured by a closure are shared values in rhai;
/// the copy gets its own unshared value for each of them.
impl Clone for RhaiContext {
    fn clone(&self) -> Self {
        let mut scope = Scope::new();
        for (name, constant, value) in self.scope.iter_raw() {
            if constant {
                scope.push_constant_dynamic(name.to_string(), value.flatten_clone());
            } else {
                scope.push_dynamic(name.to_string(), value.flatten_clone());
            }
        }
        Self { scope, functions: self.functions.clone() }
    }
}

impl RhaiContext {
    /// Current value of a variable.
    pub fn get(&self, name: &str) -> Option<Dynamic> {
        self.scope.get(name).map(Dynamic::flatten_clone)
    }

    pub fn len(&self) -> usize {
        self.scope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scope.is_empty()
    }
}

/// Deadline shared with the engine's progress callback.
#[derive(Debug, Default)]
struct Deadline {
    at: Cell<Option<Instant>>,
    hit: Cell<bool>,
}

pub struct RhaiEvaluator {
    engine: Engine,
    output: Rc<OutputBuffers>,
    deadline: Rc<Deadline>,
    config: RhaiConfig,
}

impl RhaiEvaluator {
    pub fn new() -> Self {
        Self::with_config(RhaiConfig::default())
    }

    pub fn with_config(config: RhaiConfig) -> Self {
        let mut engine = Engine::new();
        engine.set_max_call_levels(config.max_call_levels);
        if config.max_operations > 0 {
            engine.set_max_operations(config.max_operations);
        }

        let output = Rc::new(OutputBuffers::default());
        let out = Rc::clone(&output);
        engine.on_print(move |text| out.write_stdout(text));
        let err = Rc::clone(&output);
        engine.on_debug(move |text, _source, _pos| err.write_stderr(text));
        let err = Rc::clone(&output);
        engine.register_fn("eprint", move |value: Dynamic| err.write_stderr(&value.to_string()));

        let deadline = Rc::new(Deadline::default());
        let watch = Rc::clone(&deadline);
        engine.on_progress(move |_ops| match watch.at.get() {
            Some(limit) if Instant::now() >= limit => {
                watch.hit.set(true);
                Some(Dynamic::from("timeout"))
            }
            _ => None,
        });

        error::register(&mut engine);

        Self { engine, output, deadline, config }
    }

    pub fn config(&self) -> &RhaiConfig {
        &self.config
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    fn arm(&self) {
        self.deadline.hit.set(false);
        self.deadline.at.set(self.config.timeout.map(|t| Instant::now() + t));
    }

    /// Returns whether the deadline stopped the script.
    fn disarm(&self) -> bool {
        self.deadline.at.set(None);
        self.deadline.hit.replace(false)
    }

    fn caught(value: &Dynamic) -> Option<CaughtError> {
        value.clone().try_cast::<CaughtError>()
    }
}

impl Default for RhaiEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for RhaiEvaluator {
    type Value = Dynamic;
    type Context = RhaiContext;

    fn create_context(&self) -> RhaiContext {
        RhaiContext { scope: Scope::new(), functions: AST::empty() }
    }

    fn evaluate(&self, ctx: &mut RhaiContext, fragment: &Fragment<'_>) -> ExecutionOutcome<Dynamic> {
        let code = strip_hash_comments(fragment.code);
        let ast = match self.engine.compile_with_scope(&ctx.scope, &code) {
            Ok(ast) => ast,
            Err(err) => return error::outcome_from_parse_error(&err, fragment.first_line),
        };
        // Functions from earlier fragments stay callable.
        let program = ctx.functions.merge(&ast);

        self.arm();
        let result = self.engine.eval_ast_with_scope::<Dynamic>(&mut ctx.scope, &program);
        let timed_out = self.disarm();

        ctx.functions = ctx.functions.merge(&ast.clone_functions_only());

        match result {
            Ok(value) => ExecutionOutcome::Completed(value),
            Err(err) => {
                tracing::trace!(line = fragment.first_line + 1, error = %err, "rhai error");
                error::outcome_from_error(err, fragment.first_line, timed_out, self.config.timeout)
            }
        }
    }

    fn bind(&self, ctx: &mut RhaiContext, name: &str, value: Dynamic) {
        ctx.scope.set_or_push(name.to_string(), value);
    }

    fn values_equal(&self, a: &Dynamic, b: &Dynamic) -> bool {
        let mut scope = Scope::new();
        scope.push_dynamic("__left", a.clone());
        scope.push_dynamic("__right", b.clone());
        match self.engine.eval_with_scope::<bool>(&mut scope, "__left == __right") {
            Ok(equal) => equal,
            // No `==` for these types: compare their debug forms.
            Err(_) => format!("{:?}", a) == format!("{:?}", b),
        }
    }

    fn type_matches(&self, value: &Dynamic, type_name: &str) -> bool {
        if let Some(caught) = Self::caught(value) {
            return caught.is_a(type_name) || types::type_matches("Error", type_name);
        }
        types::type_matches(&self.type_name(value), type_name)
    }

    fn type_name(&self, value: &Dynamic) -> String {
        self.engine.map_type_name(value.type_name()).to_string()
    }

    fn to_text(&self, value: &Dynamic) -> String {
        match Self::caught(value) {
            Some(caught) => caught.to_string(),
            None => value.to_string(),
        }
    }

    fn inspect(&self, value: &Dynamic) -> String {
        match Self::caught(value) {
            Some(caught) => format!("#<{}: {}>", caught.kind, caught.message),
            None => format!("{:?}", value),
        }
    }

    fn as_bool(&self, value: &Dynamic) -> Option<bool> {
        value.as_bool().ok()
    }

    fn is_truthy(&self, value: &Dynamic) -> bool {
        match value.as_bool() {
            Ok(b) => b,
            Err(_) => !value.is_unit(),
        }
    }

    fn is_nil(&self, value: &Dynamic) -> bool {
        value.is_unit()
    }

    fn as_number(&self, value: &Dynamic) -> Option<f64> {
        value.as_int().map(|i| i as f64).ok().or_else(|| value.as_float().ok())
    }

    fn error_value(&self, error: &RaisedError<Dynamic>) -> Dynamic {
        Dynamic::from(error::caught_error(error))
    }

    fn number(&self, n: f64) -> Dynamic {
        Dynamic::from(n)
    }
}

impl OutputCapture for RhaiEvaluator {
    fn begin(&self) {
        self.output.begin();
    }

    fn finish(&self) -> CapturedOutput {
        self.output.finish()
    }
}
