//! Framing advice endpoint

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::Directive;

/// One submitted frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceRequest {
    /// Caller-chosen session identifier
    pub session_id: String,
    /// Frame reference, usually a `data:<mime>;base64,...` URI
    #[serde(alias = "artifact")]
    pub img: String,
}

/// Advice for the submitted frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceResponse {
    /// 1 when the frame is ready to shoot, 0 otherwise
    pub ready_to_shoot: u8,
    /// Adjustment to make; empty when ready
    pub suggestion: String,
}

impl AdviceResponse {
    /// Whether the frame is ready
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready_to_shoot != 0
    }
}

impl From<Directive> for AdviceResponse {
    fn from(d: Directive) -> Self {
        Self {
            ready_to_shoot: u8::from(d.ready_to_proceed),
            suggestion: d.suggestion,
        }
    }
}

/// Build the advice router
///
/// Frames arrive inline as data URIs, so the body limit is raised well
/// above axum's 2 MB default.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .with_state(state)
}

async fn generate(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<AdviceRequest>,
) -> Json<AdviceResponse> {
    let directive = state.advisor.advise(&request.session_id, &request.img).await;
    Json(directive.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_alias_accepted() {
        let req: AdviceRequest =
            serde_json::from_str(r#"{"session_id": "s", "artifact": "data:x"}"#).unwrap();
        assert_eq!(req.img, "data:x");
    }

    #[test]
    fn test_response_uses_integer_flag() {
        let resp = AdviceResponse::from(Directive::new(true, ""));
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json, serde_json::json!({"ready_to_shoot": 1, "suggestion": ""}));
        assert!(resp.is_ready());
    }
}
