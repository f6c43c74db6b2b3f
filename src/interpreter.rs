use std::fmt::{self, Display};

use log::{debug, warn};
use thiserror::Error;

use crate::builtin;
use crate::config::{ConditionMode, Config};
use crate::environment::{Environment, OutputLog};
use crate::parser::{ArithOp, Expr, Name, Program, Statement};

pub const UNDEFINED_VARIABLE: &str = "Undefined variable found!";
pub const LOOP_VARIABLE_MISMATCH: &str = "looping error: for loop variable is not identical";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    /// Only produced by comparisons.
    Bool(bool),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bool(_) => "boolean",
        }
    }

    /// Non-zero numbers and non-empty text are true, so the text `"false"`
    /// is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Bool(b) => *b,
        }
    }

    /// The form used inside a rendered output list: text is quoted.
    pub fn repr(&self) -> Repr<'_> {
        Repr(self)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) if n.is_nan() => write!(f, "nan"),
            Value::Float(n) if n.is_infinite() => {
                write!(f, "{}", if *n > 0.0 { "inf" } else { "-inf" })
            }
            Value::Float(n) => write_float(f, *n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Debug keeps the trailing `.0` on whole numbers and switches to an
/// exponent outside `1e-4..1e16`; the exponent is written signed and at
/// least two digits wide.
fn write_float(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    let debug = format!("{:?}", n);
    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            write!(f, "{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => f.write_str(&debug),
    }
}

pub struct Repr<'a>(&'a Value);

impl Display for Repr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self.0 {
            Value::Text(s) => s,
            other => return write!(f, "{}", other),
        };
        let quote = if s.contains('\'') && !s.contains('"') {
            '"'
        } else {
            '\''
        };
        write!(f, "{}", quote)?;
        for c in s.chars() {
            match c {
                '\\' => f.write_str("\\\\")?,
                '\t' => f.write_str("\\t")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                c if c == quote => write!(f, "\\{}", c)?,
                c if c.is_ascii_control() => write!(f, "\\x{:02x}", c as u32)?,
                c => write!(f, "{}", c)?,
            }
        }
        write!(f, "{}", quote)
    }
}

/// Formats an output log as a bracketed list, e.g. `[1, 'ab', 2.0]`.
pub fn render_output(values: &[Value]) -> String {
    let items = values
        .iter()
        .map(|v| v.repr().to_string())
        .collect::<Vec<_>>();
    format!("[{}]", items.join(", "))
}

/// Conditions that do not stop a run. Their text stands in for the value
/// that could not be produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SoftError {
    #[error("{}", UNDEFINED_VARIABLE)]
    UndefinedVariable(String),
    #[error("{}", LOOP_VARIABLE_MISMATCH)]
    LoopVariableMismatch { var: String, closing: String },
}

impl SoftError {
    pub fn detail(&self) -> String {
        match self {
            SoftError::UndefinedVariable(name) => format!("`{}` read before assignment", name),
            SoftError::LoopVariableMismatch { var, closing } => {
                format!("FOR {} closed by NEXT {}", var, closing)
            }
        }
    }
}

/// Conditions that abort the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("cannot apply `{op}` to {left} and {right}")]
    TypeMismatch {
        op: String,
        left: &'static str,
        right: &'static str,
    },
    #[error("cannot apply `{op}` to {operand}")]
    BadOperand {
        op: &'static str,
        operand: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in `{0}`")]
    Overflow(ArithOp),
    #[error("FOR loop bounds must be integers, got {0}")]
    NonIntegerRange(&'static str),
    #[error("FOR loop step cannot be zero")]
    ZeroStep,
    #[error("step limit of {0} loop iterations exceeded")]
    StepLimit(u64),
}

/// What a statement produced, if anything.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Value(Value),
    Soft(SoftError),
}

impl Completion {
    pub fn into_value(self) -> Value {
        match self {
            Completion::Value(v) => v,
            Completion::Soft(e) => Value::Text(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub output: Vec<Value>,
    /// Completion of the last top-level statement.
    pub result: Option<Completion>,
    pub diagnostics: Vec<SoftError>,
}

pub struct State<'c> {
    pub env: Environment,
    pub output: OutputLog,
    diagnostics: Vec<SoftError>,
    config: &'c Config,
    steps: u64,
}

impl<'c> State<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self {
            env: Environment::new(),
            output: OutputLog::default(),
            diagnostics: Vec::new(),
            config,
            steps: 0,
        }
    }

    fn tick(&mut self) -> Result<(), RuntimeError> {
        self.steps += 1;
        match self.config.max_steps {
            Some(limit) if self.steps > limit => Err(RuntimeError::StepLimit(limit)),
            _ => Ok(()),
        }
    }

    fn soft(&mut self, error: SoftError) -> Completion {
        warn!("{}: {}", error, error.detail());
        self.diagnostics.push(error.clone());
        Completion::Soft(error)
    }
}

pub fn interpret(program: &Program, config: &Config) -> Result<Report, RuntimeError> {
    let mut state = State::new(config);
    debug!(
        "running {} top-level statements with {:?}",
        program.body.len(),
        config
    );
    let result = execute_block(&program.body, &mut state)?;
    debug!(
        "finished after {} loop iterations, {} outputs",
        state.steps,
        state.output.len()
    );
    Ok(Report {
        output: state.output.into_values(),
        result,
        diagnostics: state.diagnostics,
    })
}

pub fn evaluate_expr(expr: &Expr, state: &mut State) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Int(n) => Ok(Value::Int(*n)),
        Expr::Float(n) => Ok(Value::Float(*n)),
        Expr::Bool(b) => Ok(Value::Text(b.to_string())),
        Expr::Str(s) => Ok(Value::Text(s.clone())),
        Expr::Var(name) => match state.env.get(name).cloned() {
            Some(value) => Ok(value),
            None => Ok(state
                .soft(SoftError::UndefinedVariable(name.as_str().to_string()))
                .into_value()),
        },
        Expr::Concat(left, right) => {
            let left = evaluate_expr(left, state)?;
            let right = evaluate_expr(right, state)?;
            builtin::concatenate(left, right)
        }
        Expr::Binary { op, left, right } => {
            let left = evaluate_expr(left, state)?;
            let right = evaluate_expr(right, state)?;
            builtin::arithmetic(*op, left, right)
        }
        Expr::Negate(operand) => builtin::negate(evaluate_expr(operand, state)?),
        Expr::Compare { op, left, right } => {
            let left = evaluate_expr(left, state)?;
            let right = evaluate_expr(right, state)?;
            Ok(Value::Bool(builtin::compare(*op, &left, &right)?))
        }
    }
}

fn truthy(condition: &Expr, state: &mut State) -> Result<bool, RuntimeError> {
    Ok(evaluate_expr(condition, state)?.is_truthy())
}

pub fn execute_block(
    body: &[Statement],
    state: &mut State,
) -> Result<Option<Completion>, RuntimeError> {
    let mut last = None;
    for statement in body {
        last = execute(statement, state)?;
    }
    Ok(last)
}

pub fn execute(
    statement: &Statement,
    state: &mut State,
) -> Result<Option<Completion>, RuntimeError> {
    match statement {
        Statement::Assign { name, value } => {
            let value = evaluate_expr(value, state)?;
            state.env.set(name.clone(), value);
            Ok(Some(Completion::Value(Value::Text(name.as_str().to_string()))))
        }
        Statement::Output(expr) => {
            let value = evaluate_expr(expr, state)?;
            state.output.push(value);
            Ok(None)
        }
        Statement::If {
            condition,
            then,
            otherwise,
        } => {
            if truthy(condition, state)? {
                execute_block(then, state)
            } else if let Some(otherwise) = otherwise {
                execute_block(otherwise, state)
            } else {
                Ok(None)
            }
        }
        Statement::For {
            var,
            start,
            end,
            step,
            body,
            closing,
        } => execute_for(var, start, end, step.as_ref(), body, closing, state),
        Statement::While { condition, body } => match state.config.conditions {
            ConditionMode::Once => {
                if !truthy(condition, state)? {
                    return Ok(None);
                }
                debug!("WHILE condition held once and is not checked again");
                // only an error, such as the step limit, ends this loop
                loop {
                    state.tick()?;
                    execute_block(body, state)?;
                }
            }
            ConditionMode::EveryIteration => {
                let mut result = None;
                while truthy(condition, state)? {
                    state.tick()?;
                    result = execute_block(body, state)?;
                }
                Ok(result)
            }
        },
        Statement::RepeatUntil { body, condition } => match state.config.conditions {
            ConditionMode::Once => {
                let stop = truthy(condition, state)?;
                state.tick()?;
                let result = execute_block(body, state)?;
                debug!("REPEAT body ran once (condition was {})", stop);
                Ok(result)
            }
            ConditionMode::EveryIteration => loop {
                state.tick()?;
                let result = execute_block(body, state)?;
                if truthy(condition, state)? {
                    break Ok(result);
                }
            },
        },
    }
}

fn range_bound(value: Value) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(n) => Ok(n),
        Value::Bool(b) => Ok(b as i64),
        other => Err(RuntimeError::NonIntegerRange(other.type_name())),
    }
}

fn execute_for(
    var: &Name,
    start: &Expr,
    end: &Expr,
    step: Option<&Expr>,
    body: &[Statement],
    closing: &Name,
    state: &mut State,
) -> Result<Option<Completion>, RuntimeError> {
    if var != closing {
        return Ok(Some(state.soft(SoftError::LoopVariableMismatch {
            var: var.as_str().to_string(),
            closing: closing.as_str().to_string(),
        })));
    }

    let start = evaluate_expr(start, state)?;
    state.env.set(var.clone(), start.clone());
    let end = evaluate_expr(end, state)?;
    let step = match step {
        Some(step) => evaluate_expr(step, state)?,
        None => Value::Int(1),
    };
    let (mut current, end, step) = (range_bound(start)?, range_bound(end)?, range_bound(step)?);
    if step == 0 {
        return Err(RuntimeError::ZeroStep);
    }
    debug!(
        "FOR {} from {} to {} step {}",
        var.as_str(),
        current,
        end,
        step
    );

    let mut result = None;
    while (step > 0 && current < end) || (step < 0 && current > end) {
        state.tick()?;
        state.env.set(var.clone(), Value::Int(current));
        result = execute_block(body, state)?;
        current = match current.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    state.env.remove(var);
    Ok(result)
}
