//! A small writer for canvas drawing scripts.
//!
//! Fallback templates are built through [`ScriptWriter`] rather than by
//! pasting user text into string templates: every user-supplied string goes
//! through [`js_string_literal`], so quotes and backslashes in a category
//! cannot change the structure of the emitted script.

use std::fmt::Write as _;

/// One argument in an emitted call or assignment.
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    /// A numeric literal.
    Num(f64),
    /// A string literal (escaped on output).
    Str(&'a str),
    /// A trusted expression emitted as-is, e.g. `canvas.width / 2`.
    Expr(&'a str),
}

impl From<f64> for Arg<'_> {
    fn from(n: f64) -> Self {
        Arg::Num(n)
    }
}

impl From<i32> for Arg<'_> {
    fn from(n: i32) -> Self {
        Arg::Num(f64::from(n))
    }
}

impl std::fmt::Display for Arg<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Num(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Arg::Num(n) => write!(f, "{n}"),
            Arg::Str(s) => f.write_str(&js_string_literal(s)),
            Arg::Expr(e) => f.write_str(e),
        }
    }
}

/// Shorthand for [`Arg::Str`].
pub fn lit(s: &str) -> Arg<'_> {
    Arg::Str(s)
}

/// Shorthand for [`Arg::Expr`].
pub fn expr(e: &str) -> Arg<'_> {
    Arg::Expr(e)
}

/// Quote `s` as a single-quoted JavaScript string literal.
pub fn js_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Line-oriented builder for a drawing script body.
#[derive(Debug, Default)]
pub struct ScriptWriter {
    buf: String,
}

impl ScriptWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comment(&mut self, text: &str) -> &mut Self {
        let _ = writeln!(self.buf, "// {text}");
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    /// `const name = value;`
    pub fn declare(&mut self, name: &str, value: Arg<'_>) -> &mut Self {
        let _ = writeln!(self.buf, "const {name} = {value};");
        self
    }

    /// `target.prop = value;`
    pub fn set(&mut self, target: &str, prop: &str, value: Arg<'_>) -> &mut Self {
        let _ = writeln!(self.buf, "{target}.{prop} = {value};");
        self
    }

    /// `target.method(args...);`
    pub fn call(&mut self, target: &str, method: &str, args: &[Arg<'_>]) -> &mut Self {
        let joined = args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(self.buf, "{target}.{method}({joined});");
        self
    }

    /// `ctx.prop = value;`
    pub fn ctx_set(&mut self, prop: &str, value: Arg<'_>) -> &mut Self {
        self.set("ctx", prop, value)
    }

    /// `ctx.method(args...);`
    pub fn ctx(&mut self, method: &str, args: &[Arg<'_>]) -> &mut Self {
        self.call("ctx", method, args)
    }

    /// Clear the whole canvas.
    pub fn clear_canvas(&mut self) -> &mut Self {
        self.ctx(
            "clearRect",
            &[0.into(), 0.into(), expr("canvas.width"), expr("canvas.height")],
        )
    }

    pub fn finish(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }
}
