//! Tree-walking interpreter.
//!
//! One [`Interp`] is one isolated engine instance: it owns its native
//! registry, its variable environment, and the cancellation token wired in at
//! construction. Instances share no mutable state, so a fresh instance per
//! run gives full isolation.
//!
//! Cancellation is cooperative. The interpreter polls the token at statement
//! boundaries and loop iterations; the poll is amortized through a local
//! counter so the hot path stays a single increment and mask. A fired token
//! aborts evaluation with [`EngineError::Cancelled`] through the normal
//! error return path.

use crate::ast::{BinaryOp, Expr, Function, Stmt, UnaryOp};
use crate::cancel::CancelToken;
use crate::error::{EngineError, EngineResult};
use crate::native::{NativeCtx, NativeFunctionRegistry};
use crate::parser;
use crate::value::Value;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Poll the cancel token every 64th checkpoint.
const CHECK_MASK: u32 = 0x3F;

/// Maximum user-function call depth.
const MAX_CALL_DEPTH: usize = 200;

/// Control-flow signal produced by statement execution.
enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

type Scope = FxHashMap<String, Value>;

/// A call frame: a stack of block scopes. Functions see only their own
/// frame; there is no dynamic scoping into the caller.
struct Frame {
    scopes: Vec<Scope>,
}

impl Frame {
    fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }
}

/// An isolated evaluator instance.
pub struct Interp {
    registry: NativeFunctionRegistry,
    ctx: NativeCtx,
    cancel: CancelToken,
    functions: FxHashMap<String, Arc<Function>>,
    frames: Vec<Frame>,
    check_counter: u32,
    depth: usize,
}

impl Interp {
    /// Create an instance with the given capability registry and
    /// cancellation token.
    pub fn new(registry: NativeFunctionRegistry, cancel: CancelToken) -> Self {
        Self {
            registry,
            ctx: NativeCtx::new(cancel.clone()),
            cancel,
            functions: FxHashMap::default(),
            frames: Vec::new(),
            check_counter: 0,
            depth: 0,
        }
    }

    /// The cancellation token bound to this instance.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Parse and execute `source` to completion.
    ///
    /// Returns the value of a top-level `return`, or null if execution falls
    /// off the end. Blocking call; cancellation aborts it at the next
    /// cooperative checkpoint.
    pub fn run(&mut self, source: &str) -> EngineResult<Value> {
        if self.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let program = parser::parse(source)?;

        self.functions.clear();
        for function in program.functions {
            let name = function.name.clone();
            if self
                .functions
                .insert(name.clone(), Arc::new(function))
                .is_some()
            {
                return Err(EngineError::Runtime(format!(
                    "duplicate function '{}'",
                    name
                )));
            }
        }

        self.frames = vec![Frame::new()];
        self.check_counter = 0;
        self.depth = 0;

        match self.exec_stmts(&program.statements)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
            Flow::Break => Err(EngineError::Runtime("'break' outside of a loop".to_string())),
            Flow::Continue => Err(EngineError::Runtime(
                "'continue' outside of a loop".to_string(),
            )),
        }
    }

    fn checkpoint(&mut self) -> EngineResult<()> {
        self.check_counter = self.check_counter.wrapping_add(1);
        if self.check_counter & CHECK_MASK != 0 {
            return Ok(());
        }
        if self.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Environment
    // ------------------------------------------------------------------

    fn frame(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("no active frame")
    }

    fn push_scope(&mut self) {
        self.frame().scopes.push(Scope::default());
    }

    fn pop_scope(&mut self) {
        self.frame().scopes.pop();
    }

    fn declare(&mut self, name: &str, value: Value) {
        self.frame()
            .scopes
            .last_mut()
            .expect("no active scope")
            .insert(name.to_string(), value);
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        let frame = self.frames.last()?;
        frame.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn assign(&mut self, name: &str, value: Value) -> EngineResult<()> {
        let frame = self.frames.last_mut().expect("no active frame");
        for scope in frame.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return Ok(());
            }
        }
        Err(EngineError::Runtime(format!(
            "assignment to undefined variable '{}'",
            name
        )))
    }

    fn is_variable(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn exec_stmts(&mut self, stmts: &[Stmt]) -> EngineResult<Flow> {
        for stmt in stmts {
            match self.exec_stmt(stmt)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> EngineResult<Flow> {
        self.push_scope();
        let result = self.exec_stmts(stmts);
        self.pop_scope();
        result
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> EngineResult<Flow> {
        self.checkpoint()?;
        match stmt {
            Stmt::Let { name, value } => {
                let value = self.eval_expr(value)?;
                self.declare(name, value);
                Ok(Flow::Normal)
            }
            Stmt::Assign { name, value } => {
                let value = self.eval_expr(value)?;
                self.assign(name, value)?;
                Ok(Flow::Normal)
            }
            Stmt::Expr(expr) => {
                self.eval_expr(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                if self.eval_condition(cond)? {
                    self.exec_block(then_block)
                } else if let Some(else_block) = else_block {
                    self.exec_block(else_block)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { cond, body } => {
                loop {
                    self.checkpoint()?;
                    if !self.eval_condition(cond)? {
                        break;
                    }
                    match self.exec_block(body)? {
                        Flow::Normal | Flow::Continue => {}
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Break => Ok(Flow::Break),
            Stmt::Continue => Ok(Flow::Continue),
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    fn eval_condition(&mut self, cond: &Expr) -> EngineResult<bool> {
        match self.eval_expr(cond)? {
            Value::Bool(b) => Ok(b),
            other => Err(EngineError::Type(format!(
                "condition must be a bool, got {}",
                other.type_name()
            ))),
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn eval_expr(&mut self, expr: &Expr) -> EngineResult<Value> {
        match expr {
            Expr::Null => Ok(Value::Null),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Int(v) => Ok(Value::Int(*v)),
            Expr::Float(v) => Ok(Value::Float(*v)),
            Expr::Str(s) => Ok(Value::str(s)),
            Expr::Array(elems) => {
                let mut items = Vec::with_capacity(elems.len());
                for elem in elems {
                    items.push(self.eval_expr(elem)?);
                }
                Ok(Value::array(items))
            }
            Expr::Map(entries) => {
                let mut map = BTreeMap::new();
                for (key, value) in entries {
                    map.insert(key.clone(), self.eval_expr(value)?);
                }
                Ok(Value::map(map))
            }
            Expr::Ident(name) => match self.lookup(name) {
                Some(value) => Ok(value.clone()),
                None => Err(EngineError::Runtime(format!(
                    "undefined variable '{}'",
                    name
                ))),
            },
            Expr::Member { object, field } => {
                let object = self.eval_expr(object)?;
                match object {
                    Value::Map(entries) => {
                        Ok(entries.get(field).cloned().unwrap_or(Value::Null))
                    }
                    other => Err(EngineError::Type(format!(
                        "cannot access field '{}' on {}",
                        field,
                        other.type_name()
                    ))),
                }
            }
            Expr::Index { object, index } => self.eval_index(object, index),
            Expr::Call { callee, args } => self.eval_call(callee, args),
            Expr::Unary { op, expr } => {
                let value = self.eval_expr(expr)?;
                match (op, value) {
                    (UnaryOp::Neg, Value::Int(v)) => Ok(Value::Int(
                        v.checked_neg()
                            .ok_or_else(|| EngineError::Runtime("integer overflow".to_string()))?,
                    )),
                    (UnaryOp::Neg, Value::Float(v)) => Ok(Value::Float(-v)),
                    (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (UnaryOp::Neg, other) => Err(EngineError::Type(format!(
                        "cannot negate {}",
                        other.type_name()
                    ))),
                    (UnaryOp::Not, other) => Err(EngineError::Type(format!(
                        "'!' requires a bool, got {}",
                        other.type_name()
                    ))),
                }
            }
            Expr::Binary { op, left, right } => match op {
                BinaryOp::And => {
                    let left = self.eval_bool_operand(left, "&&")?;
                    if !left {
                        return Ok(Value::Bool(false));
                    }
                    Ok(Value::Bool(self.eval_bool_operand(right, "&&")?))
                }
                BinaryOp::Or => {
                    let left = self.eval_bool_operand(left, "||")?;
                    if left {
                        return Ok(Value::Bool(true));
                    }
                    Ok(Value::Bool(self.eval_bool_operand(right, "||")?))
                }
                _ => {
                    let left = self.eval_expr(left)?;
                    let right = self.eval_expr(right)?;
                    self.eval_binary(*op, left, right)
                }
            },
        }
    }

    fn eval_bool_operand(&mut self, expr: &Expr, op: &str) -> EngineResult<bool> {
        match self.eval_expr(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(EngineError::Type(format!(
                "'{}' requires bool operands, got {}",
                op,
                other.type_name()
            ))),
        }
    }

    fn eval_index(&mut self, object: &Expr, index: &Expr) -> EngineResult<Value> {
        let object = self.eval_expr(object)?;
        let index = self.eval_expr(index)?;
        match (&object, &index) {
            (Value::Array(items), Value::Int(i)) => {
                let i = *i;
                if i < 0 || i as usize >= items.len() {
                    return Err(EngineError::Runtime(format!(
                        "array index {} out of bounds (len {})",
                        i,
                        items.len()
                    )));
                }
                Ok(items[i as usize].clone())
            }
            (Value::Map(entries), Value::Str(key)) => {
                Ok(entries.get(key.as_ref()).cloned().unwrap_or(Value::Null))
            }
            (Value::Array(_), other) => Err(EngineError::Type(format!(
                "array index must be an int, got {}",
                other.type_name()
            ))),
            (Value::Map(_), other) => Err(EngineError::Type(format!(
                "map key must be a string, got {}",
                other.type_name()
            ))),
            (other, _) => Err(EngineError::Type(format!(
                "cannot index {}",
                other.type_name()
            ))),
        }
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> EngineResult<Value> {
        let mut argv = Vec::with_capacity(args.len());
        for arg in args {
            argv.push(self.eval_expr(arg)?);
        }

        match callee {
            Expr::Ident(name) => {
                if let Some(function) = self.functions.get(name).cloned() {
                    return self.call_function(&function, argv);
                }
                self.registry.call(name, &self.ctx, &argv)
            }
            Expr::Member { object, field } => {
                if let Expr::Ident(module) = object.as_ref() {
                    if !self.is_variable(module) {
                        let symbol = format!("{}.{}", module, field);
                        return self.registry.call(&symbol, &self.ctx, &argv);
                    }
                }
                Err(EngineError::Type("expression is not callable".to_string()))
            }
            _ => Err(EngineError::Type("expression is not callable".to_string())),
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: Value, right: Value) -> EngineResult<Value> {
        use BinaryOp::*;
        match op {
            Eq => return Ok(Value::Bool(left.equals(&right))),
            NotEq => return Ok(Value::Bool(!left.equals(&right))),
            _ => {}
        }

        // String operations
        if let (Value::Str(a), Value::Str(b)) = (&left, &right) {
            return match op {
                Add => Ok(Value::str(format!("{}{}", a, b))),
                Lt => Ok(Value::Bool(a < b)),
                LtEq => Ok(Value::Bool(a <= b)),
                Gt => Ok(Value::Bool(a > b)),
                GtEq => Ok(Value::Bool(a >= b)),
                _ => Err(self.binary_type_error(op, &left, &right)),
            };
        }

        // Integer arithmetic stays integral
        if let (Value::Int(a), Value::Int(b)) = (&left, &right) {
            let (a, b) = (*a, *b);
            return match op {
                Add => self.checked_int(a.checked_add(b)),
                Sub => self.checked_int(a.checked_sub(b)),
                Mul => self.checked_int(a.checked_mul(b)),
                Div => {
                    if b == 0 {
                        Err(EngineError::Runtime("division by zero".to_string()))
                    } else {
                        self.checked_int(a.checked_div(b))
                    }
                }
                Rem => {
                    if b == 0 {
                        Err(EngineError::Runtime("division by zero".to_string()))
                    } else {
                        self.checked_int(a.checked_rem(b))
                    }
                }
                Lt => Ok(Value::Bool(a < b)),
                LtEq => Ok(Value::Bool(a <= b)),
                Gt => Ok(Value::Bool(a > b)),
                GtEq => Ok(Value::Bool(a >= b)),
                _ => Err(self.binary_type_error(op, &left, &right)),
            };
        }

        // Mixed numeric promotes to float
        if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
            return match op {
                Add => Ok(Value::Float(a + b)),
                Sub => Ok(Value::Float(a - b)),
                Mul => Ok(Value::Float(a * b)),
                Div => Ok(Value::Float(a / b)),
                Rem => Ok(Value::Float(a % b)),
                Lt => Ok(Value::Bool(a < b)),
                LtEq => Ok(Value::Bool(a <= b)),
                Gt => Ok(Value::Bool(a > b)),
                GtEq => Ok(Value::Bool(a >= b)),
                _ => Err(self.binary_type_error(op, &left, &right)),
            };
        }

        Err(self.binary_type_error(op, &left, &right))
    }

    fn checked_int(&self, value: Option<i64>) -> EngineResult<Value> {
        value
            .map(Value::Int)
            .ok_or_else(|| EngineError::Runtime("integer overflow".to_string()))
    }

    fn binary_type_error(&self, op: BinaryOp, left: &Value, right: &Value) -> EngineError {
        let symbol = match op {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        EngineError::Type(format!(
            "cannot apply '{}' to {} and {}",
            symbol,
            left.type_name(),
            right.type_name()
        ))
    }

    fn call_function(&mut self, function: &Function, argv: Vec<Value>) -> EngineResult<Value> {
        self.checkpoint()?;
        if self.depth >= MAX_CALL_DEPTH {
            return Err(EngineError::StackOverflow);
        }
        if argv.len() != function.params.len() {
            return Err(EngineError::Runtime(format!(
                "function '{}' expects {} arguments, got {}",
                function.name,
                function.params.len(),
                argv.len()
            )));
        }

        let mut frame = Frame::new();
        for (param, value) in function.params.iter().zip(argv) {
            frame.scopes[0].insert(param.clone(), value);
        }

        self.frames.push(frame);
        self.depth += 1;
        let result = self.exec_stmts(&function.body);
        self.depth -= 1;
        self.frames.pop();

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
            Flow::Break => Err(EngineError::Runtime("'break' outside of a loop".to_string())),
            Flow::Continue => Err(EngineError::Runtime(
                "'continue' outside of a loop".to_string(),
            )),
        }
    }
}
