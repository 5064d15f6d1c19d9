//! Prompt construction for canvas-code generation.

use crate::style::Style;

/// Canvas width every generated script is asked to use.
pub const CANVAS_WIDTH: u32 = 800;

/// Canvas height every generated script is asked to use.
pub const CANVAS_HEIGHT: u32 = 600;

/// Build the generation prompt for one style and category.
///
/// The prompt asks for bare executable code (no markdown, no prose) that
/// draws a complete certificate on an 800x600 canvas via `ctx`.
pub fn build_prompt(style: Style, category: &str) -> String {
    let style = style.id();
    format!(
        r#"Generate Canvas.js code for a {style} certificate design for "{category}".

Requirements:
1. Use HTML5 Canvas API with ctx (2D context)
2. Set canvas dimensions to {CANVAS_WIDTH}x{CANVAS_HEIGHT}
3. Clear canvas and draw a beautiful {style} background
4. Add decorative borders and elements appropriate for {style} style
5. Include "CERTIFICATE" as the main title
6. Display the category: "{category}"
7. Add completion text like "This is to certify that [recipient] has successfully completed"
8. Include signature lines and date
9. Use appropriate colors and fonts for {style} aesthetic
10. Make it professional and visually appealing

Return ONLY the JavaScript code that works with canvas and ctx variables. No markdown formatting, no explanations, just the executable JavaScript code.

Example structure:
// Clear canvas
ctx.clearRect(0, 0, canvas.width, canvas.height);

// Your drawing code here...
ctx.fillStyle = '#color';
ctx.fillRect(x, y, width, height);
// etc."#
    )
}
