//! The 2D drawing surface a design script paints on.
//!
//! [`DrawingContext`] mirrors the subset of the HTML5 canvas 2D API that
//! certificate scripts use. [`Surface`] is the canvas element itself: just
//! its mutable dimensions.

use serde::Serialize;

/// Width every design is rendered at.
pub const CERTIFICATE_WIDTH: f64 = 800.0;

/// Height every design is rendered at.
pub const CERTIFICATE_HEIGHT: f64 = 600.0;

/// The canvas-like object scripts see as `canvas`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    pub fn certificate() -> Self {
        Self {
            width: CERTIFICATE_WIDTH,
            height: CERTIFICATE_HEIGHT,
        }
    }
}

impl Default for Surface {
    /// Matches an unsized HTML canvas element.
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 150.0,
        }
    }
}

/// Geometry of a gradient.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GradientShape {
    Linear {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    },
    Radial {
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
    },
}

/// A gradient with its color stops, in the order they were added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gradient {
    pub shape: GradientShape,
    pub stops: Vec<ColorStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: String,
}

impl Gradient {
    pub fn new(shape: GradientShape) -> Self {
        Self {
            shape,
            stops: Vec::new(),
        }
    }

    pub fn add_color_stop(&mut self, offset: f64, color: impl Into<String>) {
        self.stops.push(ColorStop {
            offset,
            color: color.into(),
        });
    }
}

/// A fill or stroke style.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Paint {
    /// Any CSS color string, passed through unparsed.
    Color(String),
    Gradient(Gradient),
}

impl From<&str> for Paint {
    fn from(color: &str) -> Self {
        Paint::Color(color.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Left,
    Right,
    Center,
}

impl TextAlign {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "start" => Self::Start,
            "end" => Self::End,
            "left" => Self::Left,
            "right" => Self::Right,
            "center" => Self::Center,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    Top,
    Hanging,
    Middle,
    #[default]
    Alphabetic,
    Ideographic,
    Bottom,
}

impl TextBaseline {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "top" => Self::Top,
            "hanging" => Self::Hanging,
            "middle" => Self::Middle,
            "alphabetic" => Self::Alphabetic,
            "ideographic" => Self::Ideographic,
            "bottom" => Self::Bottom,
            _ => return None,
        })
    }
}

/// Pixel size from a CSS font shorthand such as `"bold 32px Georgia"`.
///
/// Falls back to the canvas default of 10px.
pub fn font_size_px(font: &str) -> f64 {
    font.split_whitespace()
        .find_map(|part| part.strip_suffix("px")?.parse::<f64>().ok())
        .unwrap_or(10.0)
}

/// Canvas 2D drawing operations.
///
/// Coordinates are in canvas pixels. Implementations decide what "drawing"
/// means: rasterizing, forwarding to a browser, or recording.
pub trait DrawingContext {
    // -- rectangles --
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    // -- text --
    fn fill_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>);
    fn stroke_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>);

    /// Advance width of `text` in the current font.
    fn measure_text(&self, text: &str) -> f64;

    // -- paths --
    fn begin_path(&mut self);
    fn close_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64);
    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64);
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, anticlockwise: bool);
    #[allow(clippy::too_many_arguments)]
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
    );
    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn fill(&mut self);
    fn stroke(&mut self);

    // -- state --
    fn save(&mut self);
    fn restore(&mut self);
    /// Back to the initial state: empty save stack, identity transform,
    /// default styles, cleared bitmap.
    fn reset(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, angle: f64);
    fn scale(&mut self, x: f64, y: f64);

    // -- styles --
    fn set_fill_style(&mut self, paint: Paint);
    fn set_stroke_style(&mut self, paint: Paint);
    fn set_line_width(&mut self, width: f64);
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_shadow_color(&mut self, color: &str);
    fn set_shadow_blur(&mut self, blur: f64);
    fn set_line_dash(&mut self, segments: Vec<f64>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_size_parsed_from_shorthand() {
        assert_eq!(font_size_px("bold 32px Georgia"), 32.0);
        assert_eq!(font_size_px("italic 18.5px serif"), 18.5);
        assert_eq!(font_size_px("serif"), 10.0);
    }

    #[test]
    fn text_align_parses_css_keywords() {
        assert_eq!(TextAlign::parse("center"), Some(TextAlign::Center));
        assert_eq!(TextAlign::parse("middle"), None);
    }

    #[test]
    fn certificate_surface_is_800_by_600() {
        let surface = Surface::certificate();
        assert_eq!((surface.width, surface.height), (800.0, 600.0));
    }
}
