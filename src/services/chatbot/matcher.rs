use crate::models::{Intent, ResponseCategory};

/// Keyword table in priority order. Matching is first-match-wins: the first
/// row with any keyword contained in the lower-cased message decides the
/// category, so overlaps between rows are resolved by position here.
///
/// Notable overlaps: "schedule" routes to hours, "connect" to contact, and
/// "facebook" to booking (it contains "book").
///
/// Keywords listed in [`WHOLE_WORD`] only match as a separate word, so "hi"
/// greets but "this" and "which" do not.
pub const KEYWORD_TABLE: [(ResponseCategory, &[&str]); 12] = [
    (
        ResponseCategory::Services,
        &[
            "service", "offer", "what do you", "provide", "help with", "seva", "सेवा", "सेवाएं",
            "ಸೇವೆ",
        ],
    ),
    (
        ResponseCategory::Hours,
        &[
            "hours", "timing", "time", "when open", "schedule", "available", "working", "samay",
            "समय", "ಸಮಯ",
        ],
    ),
    (
        ResponseCategory::Location,
        &[
            "location", "address", "where", "find you", "office", "visit", "direction", "kahan",
            "pata", "पता", "कहाँ", "ವಿಳಾಸ",
        ],
    ),
    (
        ResponseCategory::Contact,
        &[
            "contact", "phone", "call", "email", "reach", "connect", "message", "sampark",
            "संपर्क", "ಸಂಪರ್ಕ",
        ],
    ),
    (
        ResponseCategory::Booking,
        &[
            "book", "appointment", "reserve", "consultation", "session", "बुक", "अपॉइंटमेंट",
            "ಬುಕ್",
        ],
    ),
    (
        ResponseCategory::Review,
        &["review", "feedback", "rating", "testimonial", "experience", "समीक्षा"],
    ),
    (
        ResponseCategory::Social,
        &["social", "instagram", "twitter", "youtube", "follow", "connect online"],
    ),
    (
        ResponseCategory::Faq,
        &[
            "what is astrology", "how does", "why should", "benefits", "accurate", "works",
            "question", "faq", "sawal", "सवाल", "प्रश्न",
        ],
    ),
    (ResponseCategory::Chat, &["chat", "talk", "baat", "बात"]),
    (
        ResponseCategory::Greeting,
        &[
            "hi", "hello", "hey", "namaste", "namaskar", "help", "start", "menu", "options", "नमस्ते",
            "ನಮಸ್ಕಾರ",
        ],
    ),
    (
        ResponseCategory::Thanks,
        &[
            "thank", "appreciate", "grateful", "dhanyavad", "dhanyavaad", "shukriya", "धन्यवाद",
            "शुक्रिया", "ಧನ್ಯವಾದ",
        ],
    ),
    (
        ResponseCategory::Farewell,
        &["bye", "see you", "later", "alvida", "अलविदा", "ಹೋಗಿ ಬನ್ನಿ"],
    ),
];

/// Short keywords that appear inside ordinary words ("this", "they").
pub const WHOLE_WORD: &[&str] = &["hi", "hey"];

pub fn match_intent(message: &str) -> Intent {
    let message = message.trim().to_lowercase();
    if message.is_empty() {
        return Intent::Default;
    }

    let words: Vec<&str> = message
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let hit = |keyword: &&str| {
        if WHOLE_WORD.contains(keyword) {
            words.contains(keyword)
        } else {
            message.contains(keyword)
        }
    };

    KEYWORD_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(hit))
        .map(|(category, _)| Intent::Category(*category))
        .unwrap_or(Intent::Default)
}
