//! Tree-walking evaluator.
//!
//! Every statement, loop iteration and function call costs one step; a run
//! that exceeds its budget stops with [`ScriptError::BudgetExceeded`].

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use chrono::{Datelike, NaiveDate};

use super::ast::{AssignOp, BinaryOp, Expr, Function, FunctionBody, LogicalOp, Stmt, TemplatePart, UnaryOp};
use super::value::{join, number_to_string, parse_float, parse_int, Closure, Host, Native, Value, MAX_STRING_LEN};
use super::ScriptError;
use crate::context::{DrawingContext, Gradient, GradientShape, Paint, Surface, TextAlign, TextBaseline};

/// Deepest allowed chain of script function calls.
pub const MAX_CALL_DEPTH: usize = 32;

/// Longest array a script may create.
const MAX_ARRAY_LEN: usize = 100_000;

const RANDOM_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Default)]
pub struct Scope {
    vars: HashMap<String, Value>,
    parent: Option<Env>,
}

pub type Env = Rc<RefCell<Scope>>;

impl Scope {
    fn root() -> Env {
        Rc::new(RefCell::new(Scope::default()))
    }

    fn child(parent: &Env) -> Env {
        Rc::new(RefCell::new(Scope {
            vars: HashMap::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }
}

fn lookup(env: &Env, name: &str) -> Option<Value> {
    let scope = env.borrow();
    match scope.vars.get(name) {
        Some(value) => Some(value.clone()),
        None => scope.parent.as_ref().and_then(|parent| lookup(parent, name)),
    }
}

/// Assign to an existing binding. Hands the value back if `name` is unbound.
fn assign(env: &Env, name: &str, value: Value) -> Option<Value> {
    let parent = {
        let mut scope = env.borrow_mut();
        if let Some(slot) = scope.vars.get_mut(name) {
            *slot = value;
            return None;
        }
        scope.parent.clone()
    };
    match parent {
        Some(parent) => assign(&parent, name, value),
        None => Some(value),
    }
}

fn declare(env: &Env, name: &str, value: Value) {
    env.borrow_mut().vars.insert(name.to_string(), value);
}

enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

fn runtime(kind: &str, message: impl std::fmt::Display) -> ScriptError {
    ScriptError::Runtime(format!("{kind}: {message}"))
}

fn type_error(message: impl std::fmt::Display) -> ScriptError {
    runtime("TypeError", message)
}

fn range_error(message: impl std::fmt::Display) -> ScriptError {
    runtime("RangeError", message)
}

fn check_string_len(len: usize) -> Result<(), ScriptError> {
    if len > MAX_STRING_LEN {
        return Err(range_error("Invalid string length"));
    }
    Ok(())
}

fn capped_str(out: String) -> Result<Value, ScriptError> {
    check_string_len(out.len())?;
    Ok(Value::str(out))
}

fn array_index(n: f64) -> Option<usize> {
    (n >= 0.0 && n.fract() == 0.0 && n < MAX_ARRAY_LEN as f64).then_some(n as usize)
}

/// Resolve a possibly negative `slice` index against `len`.
fn relative_index(n: f64, len: usize) -> usize {
    if n.is_nan() {
        return 0;
    }
    let len_f = len as f64;
    let resolved = if n < 0.0 { (len_f + n).max(0.0) } else { n.min(len_f) };
    resolved as usize
}

fn arg_number(args: &[Value], index: usize) -> f64 {
    args.get(index).map_or(f64::NAN, Value::to_number)
}

/// Argument `index`, or `default` when missing or `undefined`.
fn arg_or(args: &[Value], index: usize, default: f64) -> f64 {
    match args.get(index) {
        None | Some(Value::Undefined) => default,
        Some(value) => value.to_number(),
    }
}

fn arg_string(args: &[Value], index: usize) -> String {
    args.get(index)
        .map_or_else(|| "undefined".to_string(), Value::to_display)
}

fn binary(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, ScriptError> {
    let n = |f: fn(f64, f64) -> f64| Ok(Value::Number(f(a.to_number(), b.to_number())));
    match op {
        BinaryOp::Add => {
            if a.is_primitive_non_string() && b.is_primitive_non_string() {
                return n(|x, y| x + y);
            }
            let (left, right) = (a.to_display(), b.to_display());
            check_string_len(left.len() + right.len())?;
            Ok(Value::str(left + &right))
        }
        BinaryOp::Sub => n(|x, y| x - y),
        BinaryOp::Mul => n(|x, y| x * y),
        BinaryOp::Div => n(|x, y| x / y),
        BinaryOp::Rem => n(|x, y| x % y),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => {
            let ordering = match (a, b) {
                (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
                _ => a.to_number().partial_cmp(&b.to_number()),
            };
            let result = ordering.is_some_and(|o| match op {
                BinaryOp::Lt => o.is_lt(),
                BinaryOp::Gt => o.is_gt(),
                BinaryOp::LtEq => o.is_le(),
                _ => o.is_ge(),
            });
            Ok(Value::Bool(result))
        }
        BinaryOp::Eq => Ok(Value::Bool(a.loose_equals(b))),
        BinaryOp::NotEq => Ok(Value::Bool(!a.loose_equals(b))),
        BinaryOp::StrictEq => Ok(Value::Bool(a.strict_equals(b))),
        BinaryOp::StrictNotEq => Ok(Value::Bool(!a.strict_equals(b))),
    }
}

fn js_round(n: f64) -> f64 {
    (n + 0.5).floor()
}

fn js_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

fn js_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

fn math_constant(name: &str) -> Option<f64> {
    use std::f64::consts;
    Some(match name {
        "PI" => consts::PI,
        "E" => consts::E,
        "LN2" => consts::LN_2,
        "LN10" => consts::LN_10,
        "LOG2E" => consts::LOG2_E,
        "LOG10E" => consts::LOG10_E,
        "SQRT2" => consts::SQRT_2,
        "SQRT1_2" => consts::FRAC_1_SQRT_2,
        _ => return None,
    })
}

/// Canvas state readable through `ctx.<prop>` before a script sets it.
fn ctx_default(name: &str) -> Value {
    match name {
        "fillStyle" | "strokeStyle" => Value::str("#000000"),
        "lineWidth" | "globalAlpha" => Value::Number(1.0),
        "miterLimit" => Value::Number(10.0),
        "font" => Value::str("10px sans-serif"),
        "textAlign" => Value::str("start"),
        "textBaseline" => Value::str("alphabetic"),
        "shadowColor" => Value::str("rgba(0, 0, 0, 0)"),
        "shadowBlur" | "shadowOffsetX" | "shadowOffsetY" | "lineDashOffset" => Value::Number(0.0),
        "lineCap" => Value::str("butt"),
        "lineJoin" => Value::str("miter"),
        "globalCompositeOperation" => Value::str("source-over"),
        _ => Value::Undefined,
    }
}

fn paint_from(value: &Value) -> Option<Paint> {
    match value {
        Value::Str(color) => Some(Paint::Color(color.to_string())),
        Value::Gradient(gradient) => Some(Paint::Gradient(gradient.borrow().clone())),
        _ => None,
    }
}

fn finite(value: &Value) -> Option<f64> {
    let n = value.to_number();
    n.is_finite().then_some(n)
}

fn call_native(native: Native, args: &[Value]) -> Value {
    match native {
        Native::String => Value::str(args.first().map(Value::to_display).unwrap_or_default()),
        Native::Number => Value::Number(args.first().map_or(0.0, Value::to_number)),
        Native::ParseInt => Value::Number(parse_int(&arg_string(args, 0))),
        Native::ParseFloat => Value::Number(parse_float(&arg_string(args, 0))),
        Native::IsNaN => Value::Bool(arg_number(args, 0).is_nan()),
    }
}

fn new_date(today: NaiveDate, args: &[Value]) -> Result<NaiveDate, ScriptError> {
    match args {
        [] => Ok(today),
        [Value::Date(date)] => Ok(*date),
        [Value::Str(text)] => {
            let prefix: String = text.chars().take(10).collect();
            NaiveDate::parse_from_str(&prefix, "%Y-%m-%d").map_err(|_| range_error("Invalid Date"))
        }
        [year, month, rest @ ..] => {
            let (year, month) = (year.to_number(), month.to_number());
            let day = rest.first().map_or(1.0, Value::to_number);
            if !(0.0..12.0).contains(&month) || !year.is_finite() || !day.is_finite() {
                return Err(range_error("Invalid Date"));
            }
            NaiveDate::from_ymd_opt(year as i32, month as u32 + 1, day as u32)
                .ok_or_else(|| range_error("Invalid Date"))
        }
        _ => Err(range_error("Invalid Date")),
    }
}

fn locale_date(date: NaiveDate, options: Option<&Value>) -> String {
    let option = |key: &str| match options {
        Some(Value::Object(props)) => props.borrow().get(key).map(Value::to_display),
        _ => None,
    };
    let body = match option("month").as_deref() {
        Some("long") => date.format("%B %-d, %Y").to_string(),
        Some("short") => date.format("%b %-d, %Y").to_string(),
        _ => date.format("%-m/%-d/%Y").to_string(),
    };
    match option("weekday").as_deref() {
        Some("long") => format!("{}, {body}", date.format("%A")),
        Some("short") => format!("{}, {body}", date.format("%a")),
        _ => body,
    }
}

fn date_method(date: NaiveDate, name: &str, args: &[Value]) -> Result<Value, ScriptError> {
    let number = |n: u32| Ok(Value::Number(f64::from(n)));
    let text = match name {
        "toLocaleDateString" => locale_date(date, args.get(1)),
        "toDateString" => date.format("%a %b %d %Y").to_string(),
        "toISOString" | "toJSON" => date.format("%Y-%m-%dT00:00:00.000Z").to_string(),
        "toLocaleString" => format!("{}, 12:00:00 AM", date.format("%-m/%-d/%Y")),
        "toString" => Value::Date(date).to_display(),
        "getFullYear" => return Ok(Value::Number(f64::from(date.year()))),
        "getMonth" => return number(date.month0()),
        "getDate" => return number(date.day()),
        "getDay" => return number(date.weekday().num_days_from_sunday()),
        _ => return Err(type_error(format!("date.{name} is not a function"))),
    };
    Ok(Value::str(text))
}

fn string_method(s: &Rc<str>, name: &str, args: &[Value]) -> Result<Value, ScriptError> {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let slice = |start: usize, end: usize| -> Value {
        if start >= end {
            Value::str("")
        } else {
            Value::str(chars[start..end].iter().collect::<String>())
        }
    };
    let char_offset = |byte: Option<usize>| {
        Value::Number(byte.map_or(-1.0, |b| s[..b].chars().count() as f64))
    };

    Ok(match name {
        "toUpperCase" | "toLocaleUpperCase" => Value::str(s.to_uppercase()),
        "toLowerCase" | "toLocaleLowerCase" => Value::str(s.to_lowercase()),
        "trim" => Value::str(s.trim()),
        "toString" | "valueOf" => Value::Str(Rc::clone(s)),
        "charAt" => {
            let index = arg_or(args, 0, 0.0);
            match array_index(index.trunc()) {
                Some(i) if i < len => slice(i, i + 1),
                _ => Value::str(""),
            }
        }
        "slice" => {
            let start = relative_index(arg_or(args, 0, 0.0), len);
            let end = relative_index(arg_or(args, 1, len as f64), len);
            slice(start, end)
        }
        "substring" => {
            let clamp = |n: f64| if n.is_nan() { 0 } else { n.clamp(0.0, len as f64) as usize };
            let start = clamp(arg_or(args, 0, 0.0));
            let end = clamp(arg_or(args, 1, len as f64));
            slice(start.min(end), start.max(end))
        }
        "includes" => Value::Bool(s.contains(arg_string(args, 0).as_str())),
        "startsWith" => Value::Bool(s.starts_with(arg_string(args, 0).as_str())),
        "endsWith" => Value::Bool(s.ends_with(arg_string(args, 0).as_str())),
        "indexOf" => char_offset(s.find(arg_string(args, 0).as_str())),
        "lastIndexOf" => char_offset(s.rfind(arg_string(args, 0).as_str())),
        "split" => match args.first() {
            None | Some(Value::Undefined) => Value::array(vec![Value::Str(Rc::clone(s))]),
            Some(separator) => {
                let separator = separator.to_display();
                let parts = if separator.is_empty() {
                    chars.iter().map(|c| Value::str(c.to_string())).collect()
                } else {
                    s.split(separator.as_str()).map(Value::str).collect()
                };
                Value::array(parts)
            }
        },
        "repeat" => {
            let count = arg_or(args, 0, 0.0);
            if !(count >= 0.0 && count.is_finite()) {
                return Err(range_error(format!("Invalid count value: {}", number_to_string(count))));
            }
            if s.len() as f64 * count > MAX_STRING_LEN as f64 {
                return Err(range_error("Invalid string length"));
            }
            Value::str(s.repeat(count as usize))
        }
        "padStart" | "padEnd" => {
            let target = arg_or(args, 0, 0.0);
            let pad = match args.get(1) {
                None | Some(Value::Undefined) => " ".to_string(),
                Some(value) => value.to_display(),
            };
            if target.is_nan() || target <= len as f64 || pad.is_empty() || target > MAX_STRING_LEN as f64 {
                return Ok(Value::Str(Rc::clone(s)));
            }
            let filler: String = pad.chars().cycle().take(target as usize - len).collect();
            if name == "padStart" {
                Value::str(format!("{filler}{s}"))
            } else {
                Value::str(format!("{s}{filler}"))
            }
        }
        "replace" => Value::str(s.replacen(arg_string(args, 0).as_str(), &arg_string(args, 1), 1)),
        "concat" => {
            let mut out = s.to_string();
            for arg in args {
                out.push_str(&arg.to_display());
                check_string_len(out.len())?;
            }
            Value::str(out)
        }
        _ => return Err(type_error(format!("\"{s}\".{name} is not a function"))),
    })
}

fn number_method(n: f64, name: &str, args: &[Value]) -> Result<Value, ScriptError> {
    match name {
        "toFixed" => {
            let digits = arg_or(args, 0, 0.0);
            if !(0.0..=100.0).contains(&digits) {
                return Err(range_error("toFixed() digits argument must be between 0 and 100"));
            }
            if !n.is_finite() {
                return Ok(Value::str(number_to_string(n)));
            }
            Ok(Value::str(format!("{:.*}", digits as usize, n)))
        }
        "toString" | "toLocaleString" | "valueOf" => Ok(Value::str(number_to_string(n))),
        _ => Err(type_error(format!("{}.{name} is not a function", number_to_string(n)))),
    }
}

/// What a script sees as its global scope.
pub struct Interpreter<'a> {
    ctx: &'a mut dyn DrawingContext,
    surface: &'a mut Surface,
    today: NaiveDate,
    budget: u64,
    steps: u64,
    depth: usize,
    rng: u64,
    /// Last value assigned to each `ctx` property, so scripts can read it back.
    ctx_props: HashMap<String, Value>,
    saved_props: Vec<HashMap<String, Value>>,
    line_dash: Vec<f64>,
    globals: Env,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        ctx: &'a mut dyn DrawingContext,
        surface: &'a mut Surface,
        category: &str,
        today: NaiveDate,
        budget: u64,
    ) -> Self {
        let globals = Scope::root();
        for (name, value) in [
            ("ctx", Value::Host(Host::Ctx)),
            ("canvas", Value::Host(Host::Canvas)),
            ("category", Value::str(category)),
            ("Math", Value::Host(Host::Math)),
            ("console", Value::Host(Host::Console)),
            ("String", Value::Native(Native::String)),
            ("Number", Value::Native(Native::Number)),
            ("parseInt", Value::Native(Native::ParseInt)),
            ("parseFloat", Value::Native(Native::ParseFloat)),
            ("isNaN", Value::Native(Native::IsNaN)),
            ("Infinity", Value::Number(f64::INFINITY)),
            ("NaN", Value::Number(f64::NAN)),
        ] {
            declare(&globals, name, value);
        }

        Self {
            ctx,
            surface,
            today,
            budget,
            steps: 0,
            depth: 0,
            rng: RANDOM_SEED,
            ctx_props: HashMap::new(),
            saved_props: Vec::new(),
            line_dash: Vec::new(),
            globals,
        }
    }

    /// Steps consumed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn run(&mut self, program: &[Stmt]) -> Result<(), ScriptError> {
        let globals = Rc::clone(&self.globals);
        match self.exec_block(program, &globals)? {
            Flow::Normal | Flow::Return(_) => Ok(()),
            Flow::Break | Flow::Continue => Err(runtime("SyntaxError", "Illegal break or continue statement")),
        }
    }

    fn tick(&mut self) -> Result<(), ScriptError> {
        self.steps += 1;
        if self.steps > self.budget {
            return Err(ScriptError::BudgetExceeded(self.budget));
        }
        Ok(())
    }

    // ---- statements ----

    fn exec_block(&mut self, stmts: &[Stmt], env: &Env) -> Result<Flow, ScriptError> {
        // Function declarations are visible to the whole block.
        for stmt in stmts {
            if let Stmt::Function(function) = stmt {
                if let Some(name) = &function.name {
                    declare(env, name, closure(function, env));
                }
            }
        }
        for stmt in stmts {
            let flow = self.exec(stmt, env)?;
            if !matches!(flow, Flow::Normal) {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, stmt: &Stmt, env: &Env) -> Result<Flow, ScriptError> {
        self.tick()?;
        match stmt {
            Stmt::Declare(decls) => {
                for (name, init) in decls {
                    let value = match init {
                        Some(expr) => self.eval(expr, env)?,
                        None => Value::Undefined,
                    };
                    declare(env, name, value);
                }
                Ok(Flow::Normal)
            }
            Stmt::Expr(expr) => {
                self.eval(expr, env)?;
                Ok(Flow::Normal)
            }
            Stmt::If(test, then, otherwise) => {
                if self.eval(test, env)?.truthy() {
                    self.exec(then, env)
                } else if let Some(otherwise) = otherwise {
                    self.exec(otherwise, env)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                let scope = Scope::child(env);
                if let Some(init) = init {
                    self.exec(init, &scope)?;
                }
                loop {
                    if let Some(test) = test {
                        if !self.eval(test, &scope)?.truthy() {
                            break;
                        }
                    }
                    match self.exec(body, &scope)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                    if let Some(update) = update {
                        self.eval(update, &scope)?;
                    }
                    self.tick()?;
                }
                Ok(Flow::Normal)
            }
            Stmt::ForOf {
                name,
                iterable,
                body,
            } => {
                let items = match self.eval(iterable, env)? {
                    Value::Array(items) => items.borrow().clone(),
                    Value::Str(s) => s.chars().map(|c| Value::str(c.to_string())).collect(),
                    other => {
                        return Err(type_error(format!("{} is not iterable", other.to_display())))
                    }
                };
                for item in items {
                    self.tick()?;
                    let scope = Scope::child(env);
                    declare(&scope, name, item);
                    match self.exec(body, &scope)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::While(test, body) => {
                while self.eval(test, env)?.truthy() {
                    match self.exec(body, env)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                    self.tick()?;
                }
                Ok(Flow::Normal)
            }
            Stmt::Block(stmts) => self.exec_block(stmts, &Scope::child(env)),
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval(expr, env)?,
                    None => Value::Undefined,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Break => Ok(Flow::Break),
            Stmt::Continue => Ok(Flow::Continue),
            Stmt::Function(_) | Stmt::Empty => Ok(Flow::Normal),
        }
    }

    // ---- expressions ----

    fn eval(&mut self, expr: &Expr, env: &Env) -> Result<Value, ScriptError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::str(s)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Undefined => Ok(Value::Undefined),
            Expr::Template(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Text(text) => out.push_str(text),
                        TemplatePart::Expr(expr) => out.push_str(&self.eval(expr, env)?.to_display()),
                    }
                    check_string_len(out.len())?;
                }
                Ok(Value::str(out))
            }
            Expr::Ident(name) => {
                lookup(env, name).ok_or_else(|| runtime("ReferenceError", format!("{name} is not defined")))
            }
            Expr::Array(items) => {
                let values = self.eval_args(items, env)?;
                Ok(Value::array(values))
            }
            Expr::Object(props) => {
                let mut map = BTreeMap::new();
                for (key, value) in props {
                    map.insert(key.clone(), self.eval(value, env)?);
                }
                Ok(Value::object(map))
            }
            Expr::Member(object, name) => {
                let target = self.eval(object, env)?;
                self.get_property(&target, name)
            }
            Expr::Index(object, index) => {
                let target = self.eval(object, env)?;
                let key = self.eval(index, env)?;
                self.get_index(&target, &key)
            }
            Expr::Call(callee, args) => self.eval_call(callee, args, env),
            Expr::New(class, args) => {
                let args = self.eval_args(args, env)?;
                self.construct(class, &args)
            }
            Expr::Unary(op, operand) => {
                if let (UnaryOp::TypeOf, Expr::Ident(name)) = (op, operand.as_ref()) {
                    if lookup(env, name).is_none() {
                        return Ok(Value::str("undefined"));
                    }
                }
                let value = self.eval(operand, env)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!value.truthy()),
                    UnaryOp::Neg => Value::Number(-value.to_number()),
                    UnaryOp::Plus => Value::Number(value.to_number()),
                    UnaryOp::TypeOf => Value::str(value.type_of()),
                })
            }
            Expr::Update {
                increment,
                prefix,
                target,
            } => {
                let old = self.eval(target, env)?.to_number();
                let new = if *increment { old + 1.0 } else { old - 1.0 };
                self.assign_to(target, Value::Number(new), env)?;
                Ok(Value::Number(if *prefix { new } else { old }))
            }
            Expr::Binary(op, left, right) => {
                let a = self.eval(left, env)?;
                let b = self.eval(right, env)?;
                binary(*op, &a, &b)
            }
            Expr::Logical(op, left, right) => {
                let a = self.eval(left, env)?;
                let short_circuit = match op {
                    LogicalOp::And => !a.truthy(),
                    LogicalOp::Or => a.truthy(),
                    LogicalOp::Nullish => !matches!(a, Value::Undefined | Value::Null),
                };
                if short_circuit {
                    Ok(a)
                } else {
                    self.eval(right, env)
                }
            }
            Expr::Conditional(test, then, otherwise) => {
                if self.eval(test, env)?.truthy() {
                    self.eval(then, env)
                } else {
                    self.eval(otherwise, env)
                }
            }
            Expr::Assign { op, target, value } => {
                let value = match op {
                    AssignOp::Assign => self.eval(value, env)?,
                    AssignOp::Compound(op) => {
                        let current = self.eval(target, env)?;
                        let rhs = self.eval(value, env)?;
                        binary(*op, &current, &rhs)?
                    }
                };
                self.assign_to(target, value.clone(), env)?;
                Ok(value)
            }
            Expr::Function(function) => Ok(closure(function, env)),
        }
    }

    fn eval_args(&mut self, args: &[Expr], env: &Env) -> Result<Vec<Value>, ScriptError> {
        args.iter().map(|arg| self.eval(arg, env)).collect()
    }

    fn assign_to(&mut self, target: &Expr, value: Value, env: &Env) -> Result<(), ScriptError> {
        match target {
            Expr::Ident(name) => {
                // Sloppy-mode scripts create globals on assignment.
                if let Some(value) = assign(env, name, value) {
                    declare(&self.globals, name, value);
                }
                Ok(())
            }
            Expr::Member(object, name) => {
                let object = self.eval(object, env)?;
                self.set_property(&object, name, value)
            }
            Expr::Index(object, index) => {
                let object = self.eval(object, env)?;
                let key = self.eval(index, env)?;
                if let (Value::Array(items), Value::Number(n)) = (&object, &key) {
                    let index = array_index(*n).ok_or_else(|| range_error("Invalid array index"))?;
                    let mut items = items.borrow_mut();
                    if index >= items.len() {
                        items.resize(index + 1, Value::Undefined);
                    }
                    items[index] = value;
                    return Ok(());
                }
                self.set_property(&object, &key.to_display(), value)
            }
            _ => Err(runtime("SyntaxError", "Invalid left-hand side in assignment")),
        }
    }

    fn get_index(&mut self, target: &Value, key: &Value) -> Result<Value, ScriptError> {
        match (target, key) {
            (Value::Array(items), Value::Number(n)) => Ok(array_index(*n)
                .and_then(|i| items.borrow().get(i).cloned())
                .unwrap_or(Value::Undefined)),
            (Value::Str(s), Value::Number(n)) => Ok(array_index(*n)
                .and_then(|i| s.chars().nth(i))
                .map_or(Value::Undefined, |c| Value::str(c.to_string()))),
            _ => self.get_property(target, &key.to_display()),
        }
    }

    fn get_property(&mut self, target: &Value, name: &str) -> Result<Value, ScriptError> {
        Ok(match target {
            Value::Undefined | Value::Null => {
                return Err(type_error(format!(
                    "Cannot read properties of {} (reading '{name}')",
                    target.to_display()
                )))
            }
            Value::Str(s) if name == "length" => Value::Number(s.chars().count() as f64),
            Value::Array(items) if name == "length" => Value::Number(items.borrow().len() as f64),
            Value::Object(props) => props.borrow().get(name).cloned().unwrap_or(Value::Undefined),
            Value::Host(Host::Canvas) => match name {
                "width" => Value::Number(self.surface.width),
                "height" => Value::Number(self.surface.height),
                _ => Value::Undefined,
            },
            Value::Host(Host::Ctx) if name == "canvas" => Value::Host(Host::Canvas),
            Value::Host(Host::Ctx) => self
                .ctx_props
                .get(name)
                .cloned()
                .unwrap_or_else(|| ctx_default(name)),
            Value::Host(Host::Math) => math_constant(name).map_or(Value::Undefined, Value::Number),
            _ => Value::Undefined,
        })
    }

    fn set_property(&mut self, target: &Value, name: &str, value: Value) -> Result<(), ScriptError> {
        match target {
            Value::Undefined | Value::Null => Err(type_error(format!(
                "Cannot set properties of {} (setting '{name}')",
                target.to_display()
            ))),
            Value::Host(Host::Ctx) => {
                self.set_ctx_property(name, value);
                Ok(())
            }
            Value::Host(Host::Canvas) => {
                if let Some(size) = finite(&value).filter(|n| *n >= 0.0) {
                    match name {
                        "width" => self.surface.width = size.floor(),
                        "height" => self.surface.height = size.floor(),
                        _ => {}
                    }
                }
                Ok(())
            }
            Value::Object(props) => {
                props.borrow_mut().insert(name.to_string(), value);
                Ok(())
            }
            Value::Array(items) if name == "length" => {
                let len = array_index(value.to_number()).ok_or_else(|| range_error("Invalid array length"))?;
                items.borrow_mut().resize(len, Value::Undefined);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Apply a `ctx.<name> = value` assignment. Invalid values are ignored,
    /// as a browser canvas does.
    fn set_ctx_property(&mut self, name: &str, value: Value) {
        let applied = match name {
            "fillStyle" | "strokeStyle" => match paint_from(&value) {
                Some(paint) if name == "fillStyle" => {
                    self.ctx.set_fill_style(paint);
                    true
                }
                Some(paint) => {
                    self.ctx.set_stroke_style(paint);
                    true
                }
                None => false,
            },
            "lineWidth" => match finite(&value) {
                Some(width) if width > 0.0 => {
                    self.ctx.set_line_width(width);
                    true
                }
                _ => false,
            },
            "font" => {
                self.ctx.set_font(&value.to_display());
                true
            }
            "textAlign" => match TextAlign::parse(&value.to_display()) {
                Some(align) => {
                    self.ctx.set_text_align(align);
                    true
                }
                None => false,
            },
            "textBaseline" => match TextBaseline::parse(&value.to_display()) {
                Some(baseline) => {
                    self.ctx.set_text_baseline(baseline);
                    true
                }
                None => false,
            },
            "globalAlpha" => match finite(&value) {
                Some(alpha) if (0.0..=1.0).contains(&alpha) => {
                    self.ctx.set_global_alpha(alpha);
                    true
                }
                _ => false,
            },
            "shadowColor" => {
                self.ctx.set_shadow_color(&value.to_display());
                true
            }
            "shadowBlur" => match finite(&value) {
                Some(blur) if blur >= 0.0 => {
                    self.ctx.set_shadow_blur(blur);
                    true
                }
                _ => false,
            },
            // Remembered for reads, no effect on drawing.
            _ => true,
        };
        if applied {
            self.ctx_props.insert(name.to_string(), value);
        }
    }

    // ---- calls ----

    fn eval_call(&mut self, callee: &Expr, args: &[Expr], env: &Env) -> Result<Value, ScriptError> {
        match callee {
            Expr::Member(object, name) => {
                let target = self.eval(object, env)?;
                let args = self.eval_args(args, env)?;
                self.call_method(&target, name, &args)
            }
            Expr::Index(object, index) => {
                let target = self.eval(object, env)?;
                let name = self.eval(index, env)?.to_display();
                let args = self.eval_args(args, env)?;
                self.call_method(&target, &name, &args)
            }
            _ => {
                let function = self.eval(callee, env)?;
                let args = self.eval_args(args, env)?;
                let name = match callee {
                    Expr::Ident(name) => name.as_str(),
                    _ => "expression",
                };
                self.call_value(&function, &args, name)
            }
        }
    }

    fn call_method(&mut self, target: &Value, name: &str, args: &[Value]) -> Result<Value, ScriptError> {
        match target {
            Value::Host(Host::Ctx) => self.call_ctx(name, args),
            Value::Host(Host::Canvas) => match name {
                "getContext" if arg_string(args, 0) == "2d" => Ok(Value::Host(Host::Ctx)),
                "getContext" => Ok(Value::Null),
                _ => Err(type_error(format!("canvas.{name} is not a function"))),
            },
            Value::Host(Host::Math) => self.call_math(name, args),
            Value::Host(Host::Console) => match name {
                "log" | "info" | "warn" | "error" | "debug" => {
                    let line: Vec<String> = args.iter().map(Value::to_display).collect();
                    tracing::debug!(method = name, output = %line.join(" "), "Script console output");
                    Ok(Value::Undefined)
                }
                _ => Err(type_error(format!("console.{name} is not a function"))),
            },
            Value::Gradient(gradient) if name == "addColorStop" => {
                if args.len() < 2 {
                    return Err(type_error(format!(
                        "Failed to execute 'addColorStop' on 'CanvasGradient': 2 arguments required, but only {} present.",
                        args.len()
                    )));
                }
                let offset = args[0].to_number();
                if !(0.0..=1.0).contains(&offset) {
                    return Err(runtime(
                        "IndexSizeError",
                        format!("The provided value ({}) is outside the range (0.0, 1.0).", number_to_string(offset)),
                    ));
                }
                gradient.borrow_mut().add_color_stop(offset, args[1].to_display());
                Ok(Value::Undefined)
            }
            Value::Date(date) => date_method(*date, name, args),
            Value::Str(s) => string_method(s, name, args),
            Value::Number(n) => number_method(*n, name, args),
            Value::Array(items) => self.call_array(items, name, args),
            Value::Undefined | Value::Null => Err(type_error(format!(
                "Cannot read properties of {} (reading '{name}')",
                target.to_display()
            ))),
            _ => {
                let property = self.get_property(target, name)?;
                self.call_value(&property, args, name)
            }
        }
    }

    fn call_value(&mut self, function: &Value, args: &[Value], name: &str) -> Result<Value, ScriptError> {
        match function {
            Value::Function(closure) => self.call_closure(Rc::clone(closure), args),
            Value::Native(native) => Ok(call_native(*native, args)),
            _ => Err(type_error(format!("{name} is not a function"))),
        }
    }

    fn call_closure(&mut self, closure: Rc<Closure>, args: &[Value]) -> Result<Value, ScriptError> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(range_error("Maximum call stack size exceeded"));
        }
        self.tick()?;

        let scope = Scope::child(&closure.env);
        for (i, param) in closure.function.params.iter().enumerate() {
            declare(&scope, param, args.get(i).cloned().unwrap_or(Value::Undefined));
        }

        self.depth += 1;
        let result = match &closure.function.body {
            FunctionBody::Block(body) => self.exec_block(body, &scope).map(|flow| match flow {
                Flow::Return(value) => value,
                _ => Value::Undefined,
            }),
            FunctionBody::Expr(expr) => self.eval(expr, &scope),
        };
        self.depth -= 1;
        result
    }

    fn construct(&mut self, class: &str, args: &[Value]) -> Result<Value, ScriptError> {
        match class {
            "Date" => new_date(self.today, args).map(Value::Date),
            "Array" => match args {
                [Value::Number(n)] => {
                    let len = array_index(*n).ok_or_else(|| range_error("Invalid array length"))?;
                    Ok(Value::array(vec![Value::Undefined; len]))
                }
                _ => Ok(Value::array(args.to_vec())),
            },
            "Object" => Ok(Value::object(BTreeMap::new())),
            _ => Err(type_error(format!("{class} is not a constructor"))),
        }
    }

    fn call_array(
        &mut self,
        items: &Rc<RefCell<Vec<Value>>>,
        name: &str,
        args: &[Value],
    ) -> Result<Value, ScriptError> {
        match name {
            "push" => {
                let mut items = items.borrow_mut();
                if items.len() + args.len() > MAX_ARRAY_LEN {
                    return Err(range_error("Invalid array length"));
                }
                items.extend(args.iter().cloned());
                Ok(Value::Number(items.len() as f64))
            }
            "pop" => Ok(items.borrow_mut().pop().unwrap_or(Value::Undefined)),
            "join" => {
                let separator = match args.first() {
                    None | Some(Value::Undefined) => ",".to_string(),
                    Some(value) => value.to_display(),
                };
                capped_str(join(items, &separator))
            }
            "indexOf" | "includes" => {
                let needle = args.first().cloned().unwrap_or(Value::Undefined);
                let position = items.borrow().iter().position(|item| item.strict_equals(&needle));
                Ok(if name == "includes" {
                    Value::Bool(position.is_some())
                } else {
                    Value::Number(position.map_or(-1.0, |p| p as f64))
                })
            }
            "slice" => {
                let items = items.borrow();
                let start = relative_index(arg_or(args, 0, 0.0), items.len());
                let end = relative_index(arg_or(args, 1, items.len() as f64), items.len());
                Ok(Value::array(items.get(start..end).map(<[Value]>::to_vec).unwrap_or_default()))
            }
            "forEach" | "map" | "filter" => {
                let callback = args.first().cloned().unwrap_or(Value::Undefined);
                let snapshot = items.borrow().clone();
                let mut out = Vec::new();
                for (i, item) in snapshot.into_iter().enumerate() {
                    let call_args = [item.clone(), Value::Number(i as f64), Value::Array(Rc::clone(items))];
                    let result = self.call_value(&callback, &call_args, "callback")?;
                    match name {
                        "map" => out.push(result),
                        "filter" if result.truthy() => out.push(item),
                        _ => {}
                    }
                }
                Ok(if name == "forEach" {
                    Value::Undefined
                } else {
                    Value::array(out)
                })
            }
            _ => Err(type_error(format!("array.{name} is not a function"))),
        }
    }

    fn call_math(&mut self, name: &str, args: &[Value]) -> Result<Value, ScriptError> {
        let x = arg_number(args, 0);
        let result = match name {
            "abs" => x.abs(),
            "floor" => x.floor(),
            "ceil" => x.ceil(),
            "round" => js_round(x),
            "trunc" => x.trunc(),
            "sign" if x.is_nan() || x == 0.0 => x,
            "sign" => x.signum(),
            "sqrt" => x.sqrt(),
            "cbrt" => x.cbrt(),
            "exp" => x.exp(),
            "log" => x.ln(),
            "log10" => x.log10(),
            "log2" => x.log2(),
            "sin" => x.sin(),
            "cos" => x.cos(),
            "tan" => x.tan(),
            "asin" => x.asin(),
            "acos" => x.acos(),
            "atan" => x.atan(),
            "atan2" => x.atan2(arg_number(args, 1)),
            "pow" => x.powf(arg_number(args, 1)),
            "hypot" => args.iter().map(|v| v.to_number().powi(2)).sum::<f64>().sqrt(),
            "min" => args.iter().map(Value::to_number).fold(f64::INFINITY, js_min),
            "max" => args.iter().map(Value::to_number).fold(f64::NEG_INFINITY, js_max),
            "random" => self.next_random(),
            _ => return Err(type_error(format!("Math.{name} is not a function"))),
        };
        Ok(Value::Number(result))
    }

    /// xorshift64* in `[0, 1)`. Seeded identically for every run so a
    /// script always draws the same picture.
    fn next_random(&mut self) -> f64 {
        let mut x = self.rng;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.rng = x;
        let bits = x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }

    fn call_ctx(&mut self, name: &str, args: &[Value]) -> Result<Value, ScriptError> {
        let required = match name {
            "measureText" | "rotate" | "setLineDash" => 1,
            "moveTo" | "lineTo" | "translate" | "scale" => 2,
            "fillText" | "strokeText" => 3,
            "clearRect" | "fillRect" | "strokeRect" | "rect" | "roundRect" | "quadraticCurveTo"
            | "createLinearGradient" => 4,
            "arc" | "arcTo" => 5,
            "bezierCurveTo" | "createRadialGradient" => 6,
            "ellipse" => 7,
            _ => 0,
        };
        if args.len() < required {
            return Err(type_error(format!(
                "Failed to execute '{name}' on 'CanvasRenderingContext2D': {required} arguments required, but only {} present.",
                args.len()
            )));
        }
        let n = |i: usize| arg_number(args, i);

        match name {
            "clearRect" => self.ctx.clear_rect(n(0), n(1), n(2), n(3)),
            "fillRect" => self.ctx.fill_rect(n(0), n(1), n(2), n(3)),
            "strokeRect" => self.ctx.stroke_rect(n(0), n(1), n(2), n(3)),
            "fillText" => {
                let text = args[0].to_display();
                self.ctx.fill_text(&text, n(1), n(2), args.get(3).map(Value::to_number));
            }
            "strokeText" => {
                let text = args[0].to_display();
                self.ctx.stroke_text(&text, n(1), n(2), args.get(3).map(Value::to_number));
            }
            "measureText" => {
                let width = self.ctx.measure_text(&args[0].to_display());
                let metrics = BTreeMap::from([("width".to_string(), Value::Number(width))]);
                return Ok(Value::object(metrics));
            }
            "beginPath" => self.ctx.begin_path(),
            "closePath" => self.ctx.close_path(),
            "moveTo" => self.ctx.move_to(n(0), n(1)),
            "lineTo" => self.ctx.line_to(n(0), n(1)),
            "quadraticCurveTo" => self.ctx.quadratic_curve_to(n(0), n(1), n(2), n(3)),
            "bezierCurveTo" => self.ctx.bezier_curve_to(n(0), n(1), n(2), n(3), n(4), n(5)),
            "arc" => {
                if n(2) < 0.0 {
                    return Err(runtime("IndexSizeError", format!("The radius provided ({}) is negative.", number_to_string(n(2)))));
                }
                self.ctx.arc(n(0), n(1), n(2), n(3), n(4), args.get(5).is_some_and(Value::truthy));
            }
            // Corner approximated by a straight segment to its control point.
            "arcTo" => self.ctx.line_to(n(0), n(1)),
            "ellipse" => self.ctx.ellipse(
                n(0),
                n(1),
                n(2),
                n(3),
                n(4),
                n(5),
                n(6),
                args.get(7).is_some_and(Value::truthy),
            ),
            "rect" => self.ctx.rect(n(0), n(1), n(2), n(3)),
            "roundRect" => self.round_rect(n(0), n(1), n(2), n(3), args.get(4)),
            "fill" => self.ctx.fill(),
            "stroke" => self.ctx.stroke(),
            "save" => {
                self.saved_props.push(self.ctx_props.clone());
                self.ctx.save();
            }
            "restore" => {
                if let Some(props) = self.saved_props.pop() {
                    self.ctx_props = props;
                }
                self.ctx.restore();
            }
            "reset" => {
                self.saved_props.clear();
                self.ctx_props.clear();
                self.ctx.reset();
            }
            "translate" => self.ctx.translate(n(0), n(1)),
            "rotate" => self.ctx.rotate(n(0)),
            "scale" => self.ctx.scale(n(0), n(1)),
            "setLineDash" => {
                let segments: Vec<f64> = match &args[0] {
                    Value::Array(items) => items.borrow().iter().map(Value::to_number).collect(),
                    _ => return Err(type_error("Failed to execute 'setLineDash': The provided value cannot be converted to a sequence.")),
                };
                if segments.iter().all(|s| s.is_finite() && *s >= 0.0) {
                    self.line_dash = segments.clone();
                    self.ctx.set_line_dash(segments);
                }
            }
            "getLineDash" => {
                return Ok(Value::array(self.line_dash.iter().map(|s| Value::Number(*s)).collect()));
            }
            "createLinearGradient" => {
                let shape = GradientShape::Linear {
                    x0: n(0),
                    y0: n(1),
                    x1: n(2),
                    y1: n(3),
                };
                return Ok(Value::Gradient(Rc::new(RefCell::new(Gradient::new(shape)))));
            }
            "createRadialGradient" => {
                if n(2) < 0.0 || n(5) < 0.0 {
                    return Err(runtime("IndexSizeError", "The radius provided is negative."));
                }
                let shape = GradientShape::Radial {
                    x0: n(0),
                    y0: n(1),
                    r0: n(2),
                    x1: n(3),
                    y1: n(4),
                    r1: n(5),
                };
                return Ok(Value::Gradient(Rc::new(RefCell::new(Gradient::new(shape)))));
            }
            _ => return Err(type_error(format!("ctx.{name} is not a function"))),
        }
        Ok(Value::Undefined)
    }

    /// `roundRect` traced with quadratic corners.
    fn round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radii: Option<&Value>) {
        let radius = match radii {
            Some(Value::Array(items)) => items.borrow().first().map_or(0.0, Value::to_number),
            Some(value) => value.to_number(),
            None => 0.0,
        };
        let limit = w.abs().min(h.abs()) / 2.0;
        let r = if radius.is_finite() { radius.clamp(0.0, limit) } else { 0.0 };

        let ctx = &mut *self.ctx;
        ctx.move_to(x + r, y);
        ctx.line_to(x + w - r, y);
        ctx.quadratic_curve_to(x + w, y, x + w, y + r);
        ctx.line_to(x + w, y + h - r);
        ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
        ctx.line_to(x + r, y + h);
        ctx.quadratic_curve_to(x, y + h, x, y + h - r);
        ctx.line_to(x, y + r);
        ctx.quadratic_curve_to(x, y, x + r, y);
        ctx.close_path();
    }
}

fn closure(function: &Rc<Function>, env: &Env) -> Value {
    Value::Function(Rc::new(Closure {
        function: Rc::clone(function),
        env: Rc::clone(env),
    }))
}
