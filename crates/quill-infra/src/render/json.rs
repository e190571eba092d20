//! Renders view contexts as JSON documents.

use serde_json::{Value, json};

use quill_core::ports::{RenderError, Renderer, View};

/// Wraps the context in `{"view": <name>, "context": <context>}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for JsonRenderer {
    fn render(&self, view: View, context: &Value) -> Result<String, RenderError> {
        serde_json::to_string(&json!({
            "view": view.name(),
            "context": context,
        }))
        .map_err(|e| RenderError::Failed {
            view: view.name(),
            message: e.to_string(),
        })
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}
