//! A [`DrawingContext`] that records every call instead of rasterizing.
//!
//! Used by tests to assert what a script drew, and by callers that want to
//! ship the drawing to another renderer as JSON.

use serde::Serialize;

use crate::context::{font_size_px, DrawingContext, Paint, TextAlign, TextBaseline};

/// A recorded drawing command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    ClearRect { x: f64, y: f64, w: f64, h: f64 },
    FillRect { x: f64, y: f64, w: f64, h: f64 },
    StrokeRect { x: f64, y: f64, w: f64, h: f64 },
    FillText { text: String, x: f64, y: f64, max_width: Option<f64> },
    StrokeText { text: String, x: f64, y: f64, max_width: Option<f64> },
    BeginPath,
    ClosePath,
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    QuadraticCurveTo { cpx: f64, cpy: f64, x: f64, y: f64 },
    BezierCurveTo { cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64 },
    Arc { x: f64, y: f64, radius: f64, start: f64, end: f64, anticlockwise: bool },
    Ellipse {
        x: f64,
        y: f64,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
    },
    Rect { x: f64, y: f64, w: f64, h: f64 },
    Fill,
    Stroke,
    Save,
    Restore,
    Reset,
    Translate { x: f64, y: f64 },
    Rotate { angle: f64 },
    Scale { x: f64, y: f64 },
    SetFillStyle { paint: Paint },
    SetStrokeStyle { paint: Paint },
    SetLineWidth { width: f64 },
    SetFont { font: String },
    SetTextAlign { align: TextAlign },
    SetTextBaseline { baseline: TextBaseline },
    SetGlobalAlpha { alpha: f64 },
    SetShadowColor { color: String },
    SetShadowBlur { blur: f64 },
    SetLineDash { segments: Vec<f64> },
}

/// Records commands in call order.
#[derive(Debug, Clone)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    /// Font stack mirrored so `measure_text` can follow `save`/`restore`.
    fonts: Vec<String>,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            fonts: vec!["10px sans-serif".to_string()],
        }
    }
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    /// All text drawn with `fill_text`, in order.
    pub fn filled_text(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether any filled text contains `needle`.
    pub fn has_text(&self, needle: &str) -> bool {
        self.filled_text().iter().any(|t| t.contains(needle))
    }

    /// Number of `stroke` calls whose path contains a `line_to`.
    pub fn stroked_lines(&self) -> usize {
        let mut has_line = false;
        let mut count = 0;
        for command in &self.commands {
            match command {
                DrawCommand::BeginPath => has_line = false,
                DrawCommand::LineTo { .. } => has_line = true,
                DrawCommand::Stroke if has_line => count += 1,
                _ => {}
            }
        }
        count
    }

    fn current_font(&self) -> &str {
        self.fonts.last().map(String::as_str).unwrap_or("10px sans-serif")
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

impl DrawingContext for RecordingContext {
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.push(DrawCommand::ClearRect { x, y, w, h });
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.push(DrawCommand::FillRect { x, y, w, h });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.push(DrawCommand::StrokeRect { x, y, w, h });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
            max_width,
        });
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.push(DrawCommand::StrokeText {
            text: text.to_string(),
            x,
            y,
            max_width,
        });
    }

    /// Approximates glyph advance as 0.55em per character.
    fn measure_text(&self, text: &str) -> f64 {
        font_size_px(self.current_font()) * 0.55 * text.chars().count() as f64
    }

    fn begin_path(&mut self) {
        self.push(DrawCommand::BeginPath);
    }

    fn close_path(&mut self) {
        self.push(DrawCommand::ClosePath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::LineTo { x, y });
    }

    fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) {
        self.push(DrawCommand::QuadraticCurveTo { cpx, cpy, x, y });
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        self.push(DrawCommand::BezierCurveTo {
            cp1x,
            cp1y,
            cp2x,
            cp2y,
            x,
            y,
        });
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, anticlockwise: bool) {
        self.push(DrawCommand::Arc {
            x,
            y,
            radius,
            start,
            end,
            anticlockwise,
        });
    }

    fn ellipse(
        &mut self,
        x: f64,
        y: f64,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
    ) {
        self.push(DrawCommand::Ellipse {
            x,
            y,
            radius_x,
            radius_y,
            rotation,
            start,
            end,
            anticlockwise,
        });
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.push(DrawCommand::Rect { x, y, w, h });
    }

    fn fill(&mut self) {
        self.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        self.push(DrawCommand::Stroke);
    }

    fn save(&mut self) {
        let font = self.current_font().to_string();
        self.fonts.push(font);
        self.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if self.fonts.len() > 1 {
            self.fonts.pop();
        }
        self.push(DrawCommand::Restore);
    }

    fn reset(&mut self) {
        self.fonts = vec!["10px sans-serif".to_string()];
        self.push(DrawCommand::Reset);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::Translate { x, y });
    }

    fn rotate(&mut self, angle: f64) {
        self.push(DrawCommand::Rotate { angle });
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::Scale { x, y });
    }

    fn set_fill_style(&mut self, paint: Paint) {
        self.push(DrawCommand::SetFillStyle { paint });
    }

    fn set_stroke_style(&mut self, paint: Paint) {
        self.push(DrawCommand::SetStrokeStyle { paint });
    }

    fn set_line_width(&mut self, width: f64) {
        self.push(DrawCommand::SetLineWidth { width });
    }

    fn set_font(&mut self, font: &str) {
        if let Some(top) = self.fonts.last_mut() {
            *top = font.to_string();
        }
        self.push(DrawCommand::SetFont {
            font: font.to_string(),
        });
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.push(DrawCommand::SetTextAlign { align });
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.push(DrawCommand::SetTextBaseline { baseline });
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.push(DrawCommand::SetGlobalAlpha { alpha });
    }

    fn set_shadow_color(&mut self, color: &str) {
        self.push(DrawCommand::SetShadowColor {
            color: color.to_string(),
        });
    }

    fn set_shadow_blur(&mut self, blur: f64) {
        self.push(DrawCommand::SetShadowBlur { blur });
    }

    fn set_line_dash(&mut self, segments: Vec<f64>) {
        self.push(DrawCommand::SetLineDash { segments });
    }
}
