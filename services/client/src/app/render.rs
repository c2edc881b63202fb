//! services/client/src/app/render.rs
//!
//! Plain-text rendering of the chat view.

use copilot_core::domain::{CopilotResponse, InteractionState, StatusClass};

pub fn status_class_name(class: StatusClass) -> &'static str {
    match class {
        StatusClass::Grounded => "grounded",
        StatusClass::Rejected => "rejected",
        StatusClass::Error => "error",
        StatusClass::Neutral => "neutral",
    }
}

pub fn render_response(response: &CopilotResponse) -> String {
    let status = response.validation_status();
    let mut lines = vec![
        "Final Grounded Answer".to_string(),
        response.answer().to_string(),
        String::new(),
        format!(
            "Validation Status: {} [{}]",
            status.label(),
            status_class_name(status.class())
        ),
        String::new(),
        format!("Retrieved Source Chunks ({})", response.sources().len()),
    ];
    for (index, source) in response.sources().iter().enumerate() {
        lines.push(format!("Source {} - {}", index + 1, source.score));
        lines.push(source.text.clone());
    }
    lines.join("\n")
}

/// Text for the current interaction state. Idle renders nothing.
pub fn render_state(state: &InteractionState) -> Option<String> {
    match state {
        InteractionState::Idle => None,
        InteractionState::Pending => Some("Processing...".to_string()),
        InteractionState::Succeeded(response) => Some(render_response(response)),
        InteractionState::Failed(message) => Some(format!("Error: {}", message)),
    }
}
