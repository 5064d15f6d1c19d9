//! Response payloads for API handlers.

use certgen_core::design::{DesignRecord, DESIGN_COUNT};
use serde::Serialize;

/// Successful `POST /api/generate-certificates` body.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub data: Vec<DesignRecord>,
    pub message: String,
}

impl GenerateResponse {
    pub fn new(data: Vec<DesignRecord>) -> Self {
        Self {
            success: true,
            data,
            message: format!("Successfully generated {DESIGN_COUNT} certificate designs"),
        }
    }
}

/// `{ "message": ... }` body used by the root route.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use certgen_core::style::Style;

    use super::*;

    #[test]
    fn generate_response_shape() {
        let designs = Style::ALL
            .into_iter()
            .map(|style| DesignRecord::new(style, "ctx.fill();".into()))
            .collect();
        let json = serde_json::to_value(GenerateResponse::new(designs)).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Successfully generated 5 certificate designs");
        assert_eq!(json["data"].as_array().unwrap().len(), 5);
        assert_eq!(json["data"][4]["id"], "creative");
    }
}
