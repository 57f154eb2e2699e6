pub mod matcher;
pub mod renderer;

use crate::models::{BusinessConfig, ResponsePayload};

/// Matches a free-text message and renders the reply for it.
pub fn respond(message: &str, config: &BusinessConfig) -> ResponsePayload {
    renderer::render(matcher::match_intent(message), config)
}
