use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResponseCategory {
    Services,
    Hours,
    Location,
    Contact,
    Booking,
    Review,
    Social,
    Faq,
    Chat,
    Greeting,
    Thanks,
    Farewell,
}

impl ResponseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseCategory::Services => "services",
            ResponseCategory::Hours => "hours",
            ResponseCategory::Location => "location",
            ResponseCategory::Contact => "contact",
            ResponseCategory::Booking => "booking",
            ResponseCategory::Review => "review",
            ResponseCategory::Social => "social",
            ResponseCategory::Faq => "faq",
            ResponseCategory::Chat => "chat",
            ResponseCategory::Greeting => "greeting",
            ResponseCategory::Thanks => "thanks",
            ResponseCategory::Farewell => "farewell",
        }
    }
}

/// Result of matching a chat message against the keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Category(ResponseCategory),
    Default,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Category(category) => category.as_str(),
            Intent::Default => "default",
        }
    }
}

/// Instruction for the chat widget, separate from the rendered text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientAction {
    ShowBookingForm,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponsePayload {
    pub category: String,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ClientAction>,
}
