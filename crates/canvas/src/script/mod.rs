//! The drawing-script language.
//!
//! Design code is a JavaScript function body written against an HTML canvas
//! (`ctx`, `canvas`). Rather than hand it to a JavaScript engine, it is
//! parsed and run by a small interpreter that understands the subset of the
//! language certificate drawings use: declarations, arithmetic, strings and
//! template literals, loops, conditionals, functions, arrays and objects,
//! `Math`, `new Date()` and the canvas 2D API. Anything outside that subset
//! is an error, and the caller falls back to a built-in drawing.

pub mod ast;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod value;

use chrono::NaiveDate;

pub use crate::error::ScriptError;
use crate::context::{DrawingContext, Surface};
use interp::Interpreter;

/// Steps a script may take before it is stopped.
pub const DEFAULT_STEP_BUDGET: u64 = 100_000;

/// Inputs a script runs with besides the drawing target.
#[derive(Debug, Clone)]
pub struct ScriptEnv<'a> {
    /// Bound to the global `category`.
    pub category: &'a str,
    /// What `new Date()` returns.
    pub today: NaiveDate,
    pub step_budget: u64,
}

impl<'a> ScriptEnv<'a> {
    pub fn new(category: &'a str, today: NaiveDate) -> Self {
        Self {
            category,
            today,
            step_budget: DEFAULT_STEP_BUDGET,
        }
    }

    pub fn with_step_budget(mut self, step_budget: u64) -> Self {
        self.step_budget = step_budget;
        self
    }
}

/// Parse `source` and run it against `ctx`. Returns the steps consumed.
///
/// Drawing calls made before an error stay on `ctx`; callers that need a
/// clean picture should clear it before drawing anything else.
pub fn run_script(
    source: &str,
    ctx: &mut dyn DrawingContext,
    surface: &mut Surface,
    env: &ScriptEnv<'_>,
) -> Result<u64, ScriptError> {
    let program = parser::parse(lexer::tokenize(source)?)?;
    let mut interpreter = Interpreter::new(ctx, surface, env.category, env.today, env.step_budget);
    interpreter.run(&program)?;
    Ok(interpreter.steps())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::context::{GradientShape, Paint};
    use crate::recording::{DrawCommand, RecordingContext};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn run(source: &str) -> (Result<u64, ScriptError>, RecordingContext, Surface) {
        let mut ctx = RecordingContext::new();
        let mut surface = Surface::certificate();
        let result = run_script(source, &mut ctx, &mut surface, &ScriptEnv::new("Rust", today()));
        (result, ctx, surface)
    }

    fn texts(source: &str) -> Vec<String> {
        let (result, ctx, _) = run(source);
        result.unwrap();
        ctx.filled_text().into_iter().map(str::to_string).collect()
    }

    #[test]
    fn draws_basic_shapes() {
        let (result, ctx, _) = run(
            "ctx.fillStyle = '#fff';\n\
             ctx.fillRect(0, 0, canvas.width, canvas.height);\n\
             ctx.strokeRect(20, 20, canvas.width - 40, canvas.height - 40);",
        );
        result.unwrap();
        assert_eq!(
            ctx.commands(),
            &[
                DrawCommand::SetFillStyle { paint: Paint::Color("#fff".into()) },
                DrawCommand::FillRect { x: 0.0, y: 0.0, w: 800.0, h: 600.0 },
                DrawCommand::StrokeRect { x: 20.0, y: 20.0, w: 760.0, h: 560.0 },
            ]
        );
    }

    #[test]
    fn category_and_template_literals() {
        assert_eq!(
            texts("ctx.fillText(`Awarded in ${category}!`, 400, 300);"),
            ["Awarded in Rust!"]
        );
    }

    #[test]
    fn dates_use_the_injected_day() {
        assert_eq!(
            texts(
                "const d = new Date();\n\
                 ctx.fillText(d.toLocaleDateString(), 0, 0);\n\
                 ctx.fillText('Date: ' + d.toLocaleDateString('en-US', { year: 'numeric', month: 'long', day: 'numeric' }), 0, 0);\n\
                 ctx.fillText(d.getFullYear(), 0, 0);"
            ),
            ["3/9/2024", "Date: March 9, 2024", "2024"]
        );
    }

    #[test]
    fn gradients_collect_their_stops() {
        let (result, ctx, _) = run(
            "const g = ctx.createLinearGradient(0, 0, canvas.width, 0);\n\
             g.addColorStop(0, '#667eea');\n\
             g.addColorStop(1, '#764ba2');\n\
             ctx.fillStyle = g;",
        );
        result.unwrap();
        let DrawCommand::SetFillStyle { paint: Paint::Gradient(gradient) } = &ctx.commands()[0] else {
            panic!("expected a gradient fill, got {:?}", ctx.commands());
        };
        assert_eq!(gradient.shape, GradientShape::Linear { x0: 0.0, y0: 0.0, x1: 800.0, y1: 0.0 });
        assert_eq!(gradient.stops.len(), 2);
        assert_eq!(gradient.stops[1].color, "#764ba2");
    }

    #[test]
    fn loops_functions_and_arrays() {
        let source = "
            function star(x, y) {
                ctx.beginPath();
                ctx.arc(x, y, 5, 0, Math.PI * 2);
                ctx.fill();
            }
            const points = [];
            for (let i = 0; i < 4; i++) {
                if (i % 2 === 0) continue;
                points.push(i * 100);
            }
            points.forEach((x) => star(x, 50));
            const labels = points.map(p => `#${p}`).join(', ');
            ctx.fillText(labels, 0, 0);
        ";
        let (result, ctx, _) = run(source);
        result.unwrap();
        let arcs = ctx
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Arc { .. }))
            .count();
        assert_eq!(arcs, 2);
        assert_eq!(ctx.filled_text(), ["#100, #300"]);
    }

    #[test]
    fn ctx_properties_read_back_and_follow_save_restore() {
        assert_eq!(
            texts(
                "ctx.font = 'bold 20px serif';\n\
                 ctx.save();\n\
                 ctx.font = '12px serif';\n\
                 ctx.restore();\n\
                 ctx.fillText(ctx.font, 0, 0);\n\
                 ctx.fillText(ctx.textAlign, 0, 0);"
            ),
            ["bold 20px serif", "start"]
        );
    }

    #[test]
    fn measure_text_returns_width() {
        let (result, ctx, _) = run(
            "ctx.font = '20px serif';\n\
             const w = ctx.measureText('abcd').width;\n\
             ctx.fillRect(0, 0, w, 1);",
        );
        result.unwrap();
        assert_matches!(ctx.commands()[1], DrawCommand::FillRect { w, .. } if (w - 44.0).abs() < 1e-9);
    }

    #[test]
    fn canvas_can_be_resized_and_fetched_from_ctx() {
        let (result, _, surface) = run("ctx.canvas.width = 400; canvas.height = 300.7;");
        result.unwrap();
        assert_eq!((surface.width, surface.height), (400.0, 300.0));
    }

    #[test]
    fn math_random_is_deterministic() {
        let source = "ctx.fillText(String(Math.random()), 0, 0); ctx.fillText(String(Math.random()), 0, 0);";
        let first = texts(source);
        assert_eq!(first, texts(source));
        assert_ne!(first[0], first[1]);
        let value: f64 = first[0].parse().unwrap();
        assert!((0.0..1.0).contains(&value));
    }

    #[test]
    fn number_formatting_matches_javascript() {
        assert_eq!(
            texts("ctx.fillText(10 / 4, 0, 0); ctx.fillText(800 / 2, 0, 0); ctx.fillText((2 / 3).toFixed(2), 0, 0);"),
            ["2.5", "400", "0.67"]
        );
    }

    #[test]
    fn unknown_identifier_is_reference_error() {
        let (result, _, _) = run("drawBorder();");
        assert_matches!(result, Err(ScriptError::Runtime(msg)) if msg == "ReferenceError: drawBorder is not defined");
    }

    #[test]
    fn unsupported_ctx_method_is_type_error() {
        let (result, _, _) = run("ctx.drawImage(img, 0, 0);");
        assert_matches!(result, Err(ScriptError::Runtime(msg)) if msg.starts_with("ReferenceError"));
        let (result, _, _) = run("ctx.drawImage(null, 0, 0);");
        assert_matches!(result, Err(ScriptError::Runtime(msg)) if msg == "TypeError: ctx.drawImage is not a function");
    }

    #[test]
    fn missing_arguments_are_type_errors() {
        let (result, _, _) = run("ctx.fillRect(0, 0);");
        assert_matches!(result, Err(ScriptError::Runtime(msg)) if msg.contains("4 arguments required"));
    }

    #[test]
    fn infinite_loop_exhausts_budget() {
        let mut ctx = RecordingContext::new();
        let mut surface = Surface::certificate();
        let env = ScriptEnv::new("Rust", today()).with_step_budget(500);
        let result = run_script("while (true) { ctx.stroke(); }", &mut ctx, &mut surface, &env);
        assert_matches!(result, Err(ScriptError::BudgetExceeded(500)));
    }

    #[test]
    fn runaway_recursion_is_stopped() {
        let (result, _, _) = run("function f() { return f(); } f();");
        assert_matches!(result, Err(ScriptError::Runtime(msg)) if msg.contains("Maximum call stack size exceeded"));
    }

    #[test]
    fn syntax_errors_surface_before_drawing() {
        let (result, ctx, _) = run("ctx.fillRect(0, 0, 10, 10);\nctx.fillText('x' 1, 2);");
        assert_matches!(result, Err(ScriptError::Syntax { line: 2, .. }));
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn every_string_builder_respects_the_length_limit() {
        for grow in ["s + s", "s.concat(s)", "`${s}${s}`", "[s, s].join('')", "`${[s, s]}`"] {
            let source = format!("let s = 'xxxxxxxx';\nfor (let i = 0; i < 40; i++) {{ s = {grow}; }}");
            let (result, _, _) = run(&source);
            assert_matches!(
                result,
                Err(ScriptError::Runtime(ref msg)) if msg == "RangeError: Invalid string length",
                "{grow}"
            );
        }
    }

    #[test]
    fn strings_up_to_the_limit_are_fine() {
        let (result, ctx, _) = run(
            "let s = 'xxxxxxxx';\n\
             for (let i = 0; i < 17; i++) { s = s.concat(s); }\n\
             ctx.fillText(String(s.length), 0, 0);",
        );
        result.unwrap();
        assert_eq!(ctx.filled_text(), ["1048576"]);
    }

    #[test]
    fn self_referencing_array_prints_without_recursing() {
        assert_eq!(texts("const a = [1]; a.push(a); ctx.fillText(String(a), 0, 0);"), ["1,"]);
    }

    #[test]
    fn color_stop_out_of_range_throws() {
        let (result, _, _) = run("const g = ctx.createLinearGradient(0, 0, 1, 1); g.addColorStop(2, 'red');");
        assert_matches!(result, Err(ScriptError::Runtime(msg)) if msg.starts_with("IndexSizeError"));
    }

    #[test]
    fn invalid_style_values_are_ignored() {
        let (result, ctx, _) = run("ctx.lineWidth = -3; ctx.textAlign = 'middle'; ctx.fillStyle = 5;");
        result.unwrap();
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn runs_every_fallback_template() {
        for style in certgen_core::style::Style::ALL {
            let source = certgen_core::fallback::fallback_script(style, "Machine Learning");
            let (result, ctx, _) = run(&source);
            assert!(result.is_ok(), "{style}: {result:?}");
            assert!(ctx.has_text("Machine Learning"), "{style}: category not drawn");
            assert!(ctx.has_text("3/9/2024"), "{style}: date not drawn");
            assert_eq!(ctx.stroked_lines(), 1, "{style}: signature line not drawn");
        }
    }
}
