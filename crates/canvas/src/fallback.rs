//! The renderer's own certificate, drawn when a design script cannot run.

use certgen_core::style::Style;
use chrono::NaiveDate;

use crate::context::{DrawingContext, Gradient, GradientShape, Paint, Surface, TextAlign};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Solid(&'static str),
    /// Diagonal gradient from the top-left to the bottom-right corner.
    Diagonal(&'static str, &'static str),
}

/// Colors of the fallback certificate for one style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Background,
    pub border: &'static str,
    pub text: &'static str,
}

const DARK: &str = "#333";

pub fn palette(style: Style) -> Palette {
    let (background, border, text) = match style {
        Style::Classic => (Background::Solid("#f8f9fa"), DARK, DARK),
        Style::Modern => (Background::Diagonal("#667eea", "#764ba2"), DARK, DARK),
        Style::Elegant => (Background::Solid("#1a1a2e"), "#ffd700", "#ffffff"),
        Style::Professional => (Background::Solid("#ffffff"), DARK, DARK),
        Style::Creative => (Background::Solid("#ff6b6b"), DARK, DARK),
    };
    Palette {
        background,
        border,
        text,
    }
}

/// Paint a complete certificate for `category` over whatever is on `ctx`.
pub fn draw_fallback(
    ctx: &mut dyn DrawingContext,
    surface: &Surface,
    category: &str,
    style: Style,
    today: NaiveDate,
) {
    let Palette {
        background,
        border,
        text,
    } = palette(style);
    let (width, height) = (surface.width, surface.height);
    let center = width / 2.0;

    ctx.clear_rect(0.0, 0.0, width, height);

    let paint = match background {
        Background::Solid(color) => Paint::from(color),
        Background::Diagonal(from, to) => {
            let mut gradient = Gradient::new(GradientShape::Linear {
                x0: 0.0,
                y0: 0.0,
                x1: width,
                y1: height,
            });
            gradient.add_color_stop(0.0, from);
            gradient.add_color_stop(1.0, to);
            Paint::Gradient(gradient)
        }
    };
    ctx.set_fill_style(paint);
    ctx.fill_rect(0.0, 0.0, width, height);

    ctx.set_stroke_style(border.into());
    ctx.set_line_width(8.0);
    ctx.stroke_rect(20.0, 20.0, width - 40.0, height - 40.0);

    ctx.set_fill_style(text.into());
    ctx.set_font("bold 36px Georgia");
    ctx.set_text_align(TextAlign::Center);
    ctx.fill_text("CERTIFICATE", center, 120.0, None);

    ctx.set_font("24px Georgia");
    ctx.fill_text("of Achievement", center, 160.0, None);

    ctx.set_font("bold 32px Georgia");
    ctx.fill_text(category, center, 280.0, None);

    ctx.set_font("18px Georgia");
    ctx.fill_text("This certificate is awarded in recognition of", center, 320.0, None);
    ctx.fill_text("outstanding achievement and dedication", center, 345.0, None);

    ctx.set_stroke_style(border.into());
    ctx.set_line_width(2.0);
    ctx.begin_path();
    ctx.move_to(center - 100.0, 450.0);
    ctx.line_to(center + 100.0, 450.0);
    ctx.stroke();

    ctx.set_fill_style(text.into());
    ctx.set_font("16px Georgia");
    ctx.fill_text("Signature", center, 470.0, None);

    let date = today.format("%-m/%-d/%Y");
    ctx.fill_text(&format!("Date: {date}"), center, 520.0, None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawCommand, RecordingContext};

    fn draw(style: Style) -> RecordingContext {
        let mut ctx = RecordingContext::new();
        let today = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        draw_fallback(&mut ctx, &Surface::certificate(), "Data Science", style, today);
        ctx
    }

    #[test]
    fn draws_every_certificate_element() {
        let ctx = draw(Style::Classic);
        assert_eq!(
            ctx.filled_text(),
            [
                "CERTIFICATE",
                "of Achievement",
                "Data Science",
                "This certificate is awarded in recognition of",
                "outstanding achievement and dedication",
                "Signature",
                "Date: 12/1/2025",
            ]
        );
        assert_eq!(ctx.stroked_lines(), 1);
    }

    #[test]
    fn starts_by_clearing_the_whole_surface() {
        let ctx = draw(Style::Creative);
        assert_eq!(
            ctx.commands()[0],
            DrawCommand::ClearRect { x: 0.0, y: 0.0, w: 800.0, h: 600.0 }
        );
        assert_eq!(
            ctx.commands()[1],
            DrawCommand::SetFillStyle { paint: Paint::Color("#ff6b6b".into()) }
        );
    }

    #[test]
    fn modern_background_is_a_gradient() {
        let ctx = draw(Style::Modern);
        let DrawCommand::SetFillStyle { paint: Paint::Gradient(gradient) } = &ctx.commands()[1] else {
            panic!("expected gradient background");
        };
        assert_eq!(gradient.stops[0].color, "#667eea");
        assert_eq!(gradient.stops[1].color, "#764ba2");
    }

    #[test]
    fn elegant_uses_gold_border_and_white_text() {
        let ctx = draw(Style::Elegant);
        assert!(ctx.commands().contains(&DrawCommand::SetStrokeStyle {
            paint: Paint::Color("#ffd700".into())
        }));
        assert!(ctx.commands().contains(&DrawCommand::SetFillStyle {
            paint: Paint::Color("#ffffff".into())
        }));
    }

    #[test]
    fn non_elegant_styles_use_dark_border_and_text() {
        for style in [Style::Classic, Style::Professional, Style::Creative] {
            assert_eq!(palette(style).border, "#333");
            assert_eq!(palette(style).text, "#333");
        }
    }
}
