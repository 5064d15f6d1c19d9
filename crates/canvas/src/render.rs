//! Render a design record onto a drawing context.

use certgen_core::design::DesignRecord;
use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::context::{DrawingContext, Surface};
use crate::fallback::draw_fallback;
use crate::script::{run_script, ScriptEnv};

/// How a design ended up on the surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// The design's own script ran to completion.
    Script { steps: u64 },
    /// The script failed and the built-in certificate was drawn instead.
    Fallback { reason: String },
}

impl RenderOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, RenderOutcome::Fallback { .. })
    }
}

/// Render `record` using today's local date.
///
/// Never fails: a script that cannot run is replaced by the built-in
/// certificate for the record's style.
pub fn render_design(
    record: &DesignRecord,
    category: &str,
    ctx: &mut dyn DrawingContext,
    surface: &mut Surface,
) -> RenderOutcome {
    render_design_on(record, category, ctx, surface, Local::now().date_naive())
}

/// [`render_design`] with an explicit date for `new Date()` and the
/// fallback's date line.
pub fn render_design_on(
    record: &DesignRecord,
    category: &str,
    ctx: &mut dyn DrawingContext,
    surface: &mut Surface,
    today: NaiveDate,
) -> RenderOutcome {
    *surface = Surface::certificate();
    let env = ScriptEnv::new(category, today);

    match run_script(&record.code, ctx, surface, &env) {
        Ok(steps) => {
            tracing::debug!(design = %record.id, steps, "Rendered design script");
            RenderOutcome::Script { steps }
        }
        Err(err) => {
            tracing::debug!(design = %record.id, error = %err, "Design script failed, drawing fallback");
            ctx.reset();
            *surface = Surface::certificate();
            draw_fallback(ctx, surface, category, record.style, today);
            RenderOutcome::Fallback {
                reason: err.to_string(),
            }
        }
    }
}

/// File name for a downloaded certificate, e.g. `Machine_Learning_Classic Design.png`.
pub fn download_file_name(category: &str, design_name: &str) -> String {
    let category = category.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{category}_{design_name}.png")
}

#[cfg(test)]
mod tests {
    use certgen_core::style::Style;

    use super::*;

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(RenderOutcome::Fallback {
            reason: "boom".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "outcome": "fallback", "reason": "boom" }));
    }

    #[test]
    fn surface_is_reset_before_running() {
        let record = DesignRecord::new(Style::Classic, "ctx.fillRect(0, 0, canvas.width, canvas.height);".into());
        let mut ctx = crate::recording::RecordingContext::new();
        let mut surface = Surface::default();
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let outcome = render_design_on(&record, "Art", &mut ctx, &mut surface, today);
        assert_eq!(outcome, RenderOutcome::Script { steps: 1 });
        assert_eq!(surface, Surface::certificate());
    }

    #[test]
    fn surface_is_restored_before_fallback() {
        let record = DesignRecord::new(Style::Classic, "canvas.width = 10; canvas.height = 20; boom();".into());
        let mut ctx = crate::recording::RecordingContext::new();
        let mut surface = Surface::default();
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let outcome = render_design_on(&record, "Art", &mut ctx, &mut surface, today);
        assert!(outcome.is_fallback());
        assert_eq!(surface, Surface::certificate());
    }

    #[test]
    fn download_name_replaces_whitespace() {
        assert_eq!(
            download_file_name("Machine  Learning", "Classic Design"),
            "Machine_Learning_Classic Design.png"
        );
    }
}
