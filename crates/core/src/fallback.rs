//! Deterministic fallback drawing scripts, one per style.
//!
//! Used whenever external generation fails for a style. Each template is a
//! pure function of the category.

use crate::script::{expr, lit, ScriptWriter};
use crate::style::Style;

/// Expression the rendered script evaluates to today's date.
const DATE_EXPR: &str = "new Date().toLocaleDateString()";

/// Fallback script for `style`, with `category` drawn as text.
pub fn fallback_script(style: Style, category: &str) -> String {
    let template: fn(&str) -> String = match style {
        Style::Classic => classic,
        Style::Modern => modern,
        Style::Elegant => elegant,
        Style::Professional => professional,
        Style::Creative => creative,
    };
    template(category)
}

fn signature_line(w: &mut ScriptWriter, color: &str, from_x: i32, to_x: i32, y: i32) {
    w.comment("Signature line")
        .ctx_set("strokeStyle", lit(color))
        .ctx_set("lineWidth", 2.into())
        .ctx("beginPath", &[])
        .ctx("moveTo", &[from_x.into(), y.into()])
        .ctx("lineTo", &[to_x.into(), y.into()])
        .ctx("stroke", &[])
        .blank();
}

fn classic(category: &str) -> String {
    let mut w = ScriptWriter::new();
    w.comment("Classic Certificate Design").clear_canvas().blank();

    w.comment("Background")
        .declare("gradient", expr("ctx.createLinearGradient(0, 0, 0, canvas.height)"))
        .call("gradient", "addColorStop", &[0.into(), lit("#f8f9fa")])
        .call("gradient", "addColorStop", &[1.into(), lit("#e9ecef")])
        .ctx_set("fillStyle", expr("gradient"))
        .ctx("fillRect", &[0.into(), 0.into(), expr("canvas.width"), expr("canvas.height")])
        .blank();

    w.comment("Border")
        .ctx_set("strokeStyle", lit("#2c3e50"))
        .ctx_set("lineWidth", 8.into())
        .ctx("strokeRect", &[30.into(), 30.into(), expr("canvas.width - 60"), expr("canvas.height - 60")])
        .blank();

    w.comment("Title")
        .ctx_set("fillStyle", lit("#2c3e50"))
        .ctx_set("font", lit("bold 48px serif"))
        .ctx_set("textAlign", lit("center"))
        .ctx("fillText", &[lit("CERTIFICATE"), expr("canvas.width / 2"), 150.into()])
        .blank();

    w.comment("Category")
        .ctx_set("font", lit("bold 32px serif"))
        .ctx_set("fillStyle", lit("#e74c3c"))
        .ctx("fillText", &[lit(category), expr("canvas.width / 2"), 250.into()])
        .blank();

    w.comment("Description")
        .ctx_set("font", lit("18px serif"))
        .ctx_set("fillStyle", lit("#34495e"))
        .ctx("fillText", &[lit("This is to certify successful completion of"), expr("canvas.width / 2"), 320.into()])
        .blank();

    signature_line(&mut w, "#2c3e50", 200, 350, 450);

    w.comment("Date")
        .ctx_set("font", lit("16px serif"))
        .ctx("fillText", &[expr(DATE_EXPR), 275.into(), 480.into()]);
    w.finish()
}

fn modern(category: &str) -> String {
    let mut w = ScriptWriter::new();
    w.comment("Modern Certificate Design").clear_canvas().blank();

    w.comment("Modern gradient")
        .declare("gradient", expr("ctx.createLinearGradient(0, 0, canvas.width, canvas.height)"))
        .call("gradient", "addColorStop", &[0.into(), lit("#667eea")])
        .call("gradient", "addColorStop", &[1.into(), lit("#764ba2")])
        .ctx_set("fillStyle", expr("gradient"))
        .ctx("fillRect", &[0.into(), 0.into(), expr("canvas.width"), expr("canvas.height")])
        .blank();

    w.comment("White content area")
        .ctx_set("fillStyle", lit("#ffffff"))
        .ctx("fillRect", &[60.into(), 60.into(), expr("canvas.width - 120"), expr("canvas.height - 120")])
        .blank();

    w.comment("Title")
        .ctx_set("fillStyle", lit("#2d3748"))
        .ctx_set("font", lit("bold 42px sans-serif"))
        .ctx_set("textAlign", lit("center"))
        .ctx("fillText", &[lit("CERTIFICATE"), expr("canvas.width / 2"), 140.into()])
        .blank();

    w.comment("Category")
        .ctx_set("fillStyle", lit("#667eea"))
        .ctx("fillRect", &[200.into(), 200.into(), 400.into(), 50.into()])
        .ctx_set("fillStyle", lit("#ffffff"))
        .ctx_set("font", lit("bold 24px sans-serif"))
        .ctx("fillText", &[lit(category), expr("canvas.width / 2"), 230.into()])
        .blank();

    w.comment("Description")
        .ctx_set("fillStyle", lit("#4a5568"))
        .ctx_set("font", lit("16px sans-serif"))
        .ctx("fillText", &[lit("Certificate of Completion"), expr("canvas.width / 2"), 300.into()])
        .blank();

    signature_line(&mut w, "#2d3748", 325, 475, 410);

    w.comment("Date")
        .ctx_set("fillStyle", lit("#2d3748"))
        .ctx_set("font", lit("16px sans-serif"))
        .ctx("fillText", &[expr(DATE_EXPR), expr("canvas.width / 2"), 450.into()]);
    w.finish()
}

fn elegant(category: &str) -> String {
    let mut w = ScriptWriter::new();
    w.comment("Elegant Certificate Design").clear_canvas().blank();

    w.comment("Elegant background")
        .ctx_set("fillStyle", lit("#faf7f0"))
        .ctx("fillRect", &[0.into(), 0.into(), expr("canvas.width"), expr("canvas.height")])
        .blank();

    w.comment("Ornate border")
        .ctx_set("strokeStyle", lit("#8b4513"))
        .ctx_set("lineWidth", 3.into())
        .ctx("strokeRect", &[40.into(), 40.into(), expr("canvas.width - 80"), expr("canvas.height - 80")])
        .blank();

    w.comment("Title")
        .ctx_set("fillStyle", lit("#8b4513"))
        .ctx_set("font", lit("bold 44px serif"))
        .ctx_set("textAlign", lit("center"))
        .ctx("fillText", &[lit("CERTIFICATE"), expr("canvas.width / 2"), 150.into()])
        .blank();

    w.comment("Category")
        .ctx_set("font", lit("bold 28px serif"))
        .ctx_set("fillStyle", lit("#2f4f4f"))
        .ctx("fillText", &[lit(category), expr("canvas.width / 2"), 250.into()])
        .blank();

    w.comment("Description")
        .ctx_set("font", lit("18px serif"))
        .ctx("fillText", &[lit("Presented in recognition of excellence"), expr("canvas.width / 2"), 320.into()])
        .blank();

    signature_line(&mut w, "#8b4513", 325, 475, 410);

    w.comment("Date")
        .ctx_set("font", lit("16px serif"))
        .ctx("fillText", &[expr(DATE_EXPR), expr("canvas.width / 2"), 450.into()]);
    w.finish()
}

fn professional(category: &str) -> String {
    let mut w = ScriptWriter::new();
    w.comment("Professional Certificate Design").clear_canvas().blank();

    w.comment("White background")
        .ctx_set("fillStyle", lit("#ffffff"))
        .ctx("fillRect", &[0.into(), 0.into(), expr("canvas.width"), expr("canvas.height")])
        .blank();

    w.comment("Header")
        .ctx_set("fillStyle", lit("#1a365d"))
        .ctx("fillRect", &[0.into(), 0.into(), expr("canvas.width"), 80.into()])
        .blank();

    w.comment("Title")
        .ctx_set("fillStyle", lit("#ffffff"))
        .ctx_set("font", lit("bold 36px sans-serif"))
        .ctx_set("textAlign", lit("center"))
        .ctx("fillText", &[lit("CERTIFICATE"), expr("canvas.width / 2"), 50.into()])
        .blank();

    w.comment("Border")
        .ctx_set("strokeStyle", lit("#1a365d"))
        .ctx_set("lineWidth", 2.into())
        .ctx("strokeRect", &[50.into(), 50.into(), expr("canvas.width - 100"), expr("canvas.height - 100")])
        .blank();

    w.comment("Category")
        .ctx_set("fillStyle", lit("#2d3748"))
        .ctx_set("font", lit("bold 32px sans-serif"))
        .ctx("fillText", &[lit(category), expr("canvas.width / 2"), 180.into()])
        .blank();

    w.comment("Description")
        .ctx_set("fillStyle", lit("#718096"))
        .ctx_set("font", lit("16px sans-serif"))
        .ctx("fillText", &[lit("Certificate of Professional Completion"), expr("canvas.width / 2"), 280.into()])
        .blank();

    signature_line(&mut w, "#1a365d", 325, 475, 410);

    w.comment("Date")
        .ctx_set("fillStyle", lit("#2d3748"))
        .ctx("fillText", &[expr(DATE_EXPR), expr("canvas.width / 2"), 450.into()]);
    w.finish()
}

fn creative(category: &str) -> String {
    let mut w = ScriptWriter::new();
    w.comment("Creative Certificate Design").clear_canvas().blank();

    w.comment("Creative background")
        .declare(
            "gradient",
            expr("ctx.createRadialGradient(canvas.width / 2, canvas.height / 2, 0, canvas.width / 2, canvas.height / 2, 400)"),
        )
        .call("gradient", "addColorStop", &[0.into(), lit("#ff6b6b")])
        .call("gradient", "addColorStop", &[0.5.into(), lit("#4ecdc4")])
        .call("gradient", "addColorStop", &[1.into(), lit("#45b7d1")])
        .ctx_set("fillStyle", expr("gradient"))
        .ctx("fillRect", &[0.into(), 0.into(), expr("canvas.width"), expr("canvas.height")])
        .blank();

    w.comment("White overlay")
        .ctx_set("fillStyle", lit("rgba(255, 255, 255, 0.9)"))
        .ctx("fillRect", &[50.into(), 50.into(), expr("canvas.width - 100"), expr("canvas.height - 100")])
        .blank();

    w.comment("Title")
        .ctx_set("fillStyle", lit("#2c3e50"))
        .ctx_set("font", lit("bold 40px sans-serif"))
        .ctx_set("textAlign", lit("center"))
        .ctx("fillText", &[lit("CREATIVE CERTIFICATE"), expr("canvas.width / 2"), 140.into()])
        .blank();

    w.comment("Category")
        .ctx_set("fillStyle", lit("#ff6b6b"))
        .ctx_set("font", lit("bold 30px sans-serif"))
        .ctx("fillText", &[lit(category), expr("canvas.width / 2"), 220.into()])
        .blank();

    w.comment("Description")
        .ctx_set("fillStyle", lit("#34495e"))
        .ctx_set("font", lit("18px sans-serif"))
        .ctx("fillText", &[lit("\u{1F3A8} Awarded for creative excellence"), expr("canvas.width / 2"), 300.into()])
        .blank();

    signature_line(&mut w, "#2c3e50", 325, 475, 410);

    w.comment("Date")
        .ctx_set("fillStyle", lit("#2c3e50"))
        .ctx_set("font", lit("16px sans-serif"))
        .ctx("fillText", &[expr(DATE_EXPR), expr("canvas.width / 2"), 450.into()]);
    w.finish()
}
