//! Runtime values and the JavaScript-style conversions between them.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use chrono::NaiveDate;

use super::ast::Function;
use super::interp::Env;
use crate::context::Gradient;

/// Objects provided by the host rather than created by the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    Ctx,
    Canvas,
    Math,
    Console,
}

/// Built-in global functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Native {
    String,
    Number,
    ParseInt,
    ParseFloat,
    IsNaN,
}

impl Native {
    fn name(self) -> &'static str {
        match self {
            Native::String => "String",
            Native::Number => "Number",
            Native::ParseInt => "parseInt",
            Native::ParseFloat => "parseFloat",
            Native::IsNaN => "isNaN",
        }
    }
}

/// A function value closed over its defining scope.
pub struct Closure {
    pub function: Rc<Function>,
    pub env: Env,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.function.name)
            .field("params", &self.function.params)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<BTreeMap<String, Value>>>),
    Function(Rc<Closure>),
    Native(Native),
    Gradient(Rc<RefCell<Gradient>>),
    Date(NaiveDate),
    Host(Host),
}

impl Value {
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object(props: BTreeMap<String, Value>) -> Self {
        Value::Object(Rc::new(RefCell::new(props)))
    }

    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Function(_) | Value::Native(_) => "function",
            _ => "object",
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::Str(s) => string_to_number(s),
            Value::Array(_) => string_to_number(&self.to_display()),
            _ => f64::NAN,
        }
    }

    /// Primitives stay as they are in `+`; everything else becomes a string.
    pub fn is_primitive_non_string(&self) -> bool {
        matches!(
            self,
            Value::Undefined | Value::Null | Value::Bool(_) | Value::Number(_)
        )
    }

    /// The value as `String(value)` would print it.
    pub fn to_display(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::Str(s) => s.to_string(),
            Value::Array(items) => join(items, ","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Function(closure) => format!(
                "function {}() {{ [code] }}",
                closure.function.name.as_deref().unwrap_or("")
            ),
            Value::Native(native) => format!("function {}() {{ [native code] }}", native.name()),
            Value::Gradient(_) => "[object CanvasGradient]".to_string(),
            Value::Date(date) => date
                .format("%a %b %d %Y 00:00:00 GMT+0000 (Coordinated Universal Time)")
                .to_string(),
            Value::Host(Host::Ctx) => "[object CanvasRenderingContext2D]".to_string(),
            Value::Host(Host::Canvas) => "[object HTMLCanvasElement]".to_string(),
            Value::Host(Host::Math) => "[object Math]".to_string(),
            Value::Host(Host::Console) => "[object console]".to_string(),
        }
    }

    /// `===`
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Gradient(a), Value::Gradient(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => a == b,
            (Value::Host(a), Value::Host(b)) => a == b,
            _ => false,
        }
    }

    /// `==`
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::Number(_) | Value::Str(_) | Value::Bool(_), Value::Number(_) | Value::Bool(_))
            | (Value::Number(_) | Value::Bool(_), Value::Str(_)) => {
                self.to_number() == other.to_number()
            }
            _ => self.strict_equals(other),
        }
    }
}

/// Longest string a script may build.
pub const MAX_STRING_LEN: usize = 1 << 20;

/// Arrays nested deeper than this print as empty strings.
const MAX_JOIN_DEPTH: usize = 32;

type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// `Array.prototype.join`: holes and nullish items print as empty strings,
/// and so does an array nested inside itself.
///
/// Stops appending once the output passes [`MAX_STRING_LEN`]; callers that
/// build script-visible strings reject anything over the limit.
pub fn join(array: &ArrayRef, separator: &str) -> String {
    let mut out = String::new();
    let mut seen = vec![Rc::as_ptr(array)];
    join_into(&array.borrow(), separator, &mut out, &mut seen);
    out
}

fn join_into(items: &[Value], separator: &str, out: &mut String, seen: &mut Vec<*const RefCell<Vec<Value>>>) {
    for (index, item) in items.iter().enumerate() {
        if out.len() > MAX_STRING_LEN {
            return;
        }
        if index > 0 {
            out.push_str(separator);
        }
        match item {
            Value::Undefined | Value::Null => {}
            Value::Array(inner) => {
                let ptr = Rc::as_ptr(inner);
                if seen.len() >= MAX_JOIN_DEPTH || seen.contains(&ptr) {
                    continue;
                }
                seen.push(ptr);
                join_into(&inner.borrow(), ",", out, seen);
                seen.pop();
            }
            other => out.push_str(&other.to_display()),
        }
    }
}

/// JavaScript `Number.prototype.toString()` for the values scripts produce.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.abs() >= 1e21 {
        let exp = format!("{n:e}");
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        };
    }
    if n.fract() == 0.0 {
        return format!("{}", n as i128);
    }
    format!("{n}")
}

/// `Number(string)`: whitespace-trimmed, empty is zero, garbage is NaN.
fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |n| n as f64);
    }
    // Rust accepts "inf"/"nan" spellings that JavaScript does not.
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

/// `parseInt(string)` in base 10 (or 16 with a `0x` prefix).
pub fn parse_int(s: &str) -> f64 {
    let s = s.trim_start();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, rest) = match rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, rest),
    };
    let digits: String = rest.chars().take_while(|c| c.is_digit(radix)).collect();
    if digits.is_empty() {
        return f64::NAN;
    }
    let value = digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d));
    if negative {
        -value
    } else {
        value
    }
}

/// `parseFloat(string)`: the longest numeric prefix.
pub fn parse_float(s: &str) -> f64 {
    let s = s.trim_start();
    if s.starts_with("Infinity") || s.starts_with("+Infinity") {
        return f64::INFINITY;
    }
    if s.starts_with("-Infinity") {
        return f64::NEG_INFINITY;
    }
    let candidate: String = s
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        .collect();
    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_print_like_javascript() {
        assert_eq!(number_to_string(400.0), "400");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(0.5), "0.5");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(number_to_string(1e21), "1e+21");
    }

    #[test]
    fn string_to_number_conversions() {
        assert_eq!(Value::str(" 42 ").to_number(), 42.0);
        assert_eq!(Value::str("").to_number(), 0.0);
        assert!(Value::str("12px").to_number().is_nan());
        assert!(Value::str("inf").to_number().is_nan());
        assert_eq!(Value::str("0xff").to_number(), 255.0);
    }

    #[test]
    fn parse_helpers_take_prefixes() {
        assert_eq!(parse_int("32px"), 32.0);
        assert_eq!(parse_int("-7.9"), -7.0);
        assert!(parse_int("px").is_nan());
        assert_eq!(parse_float("1.5em"), 1.5);
        assert_eq!(parse_float("3e2x"), 300.0);
        assert!(parse_float("abc").is_nan());
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Number(f64::NAN).truthy());
        assert!(!Value::str("").truthy());
        assert!(Value::array(vec![]).truthy());
        assert!(!Value::Null.truthy());
    }

    #[test]
    fn equality_rules() {
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(!Value::Null.strict_equals(&Value::Undefined));
        assert!(Value::str("1").loose_equals(&Value::Number(1.0)));
        assert!(!Value::str("1").strict_equals(&Value::Number(1.0)));
        let array = Value::array(vec![]);
        assert!(array.strict_equals(&array.clone()));
        assert!(!array.strict_equals(&Value::array(vec![])));
    }

    #[test]
    fn arrays_join_with_commas() {
        let array = Value::array(vec![Value::Number(1.0), Value::Null, Value::str("x")]);
        assert_eq!(array.to_display(), "1,,x");
    }

    #[test]
    fn self_containing_array_prints_once() {
        let array = Value::array(vec![Value::Number(1.0)]);
        let Value::Array(items) = &array else { unreachable!() };
        items.borrow_mut().push(array.clone());
        assert_eq!(array.to_display(), "1,");
    }

    #[test]
    fn deeply_nested_arrays_stop_printing() {
        let mut array = Value::array(vec![Value::str("core")]);
        for _ in 0..100 {
            array = Value::array(vec![array]);
        }
        assert_eq!(array.to_display(), "");
    }

    #[test]
    fn join_stops_past_the_length_limit() {
        let chunk = Value::str("x".repeat(1 << 16));
        let array = Value::array(vec![chunk; 1_000]);
        let Value::Array(items) = &array else { unreachable!() };
        let joined = join(items, "");
        assert!(joined.len() > MAX_STRING_LEN);
        assert!(joined.len() <= MAX_STRING_LEN + (1 << 16));
    }
}
