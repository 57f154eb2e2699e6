use std::fmt::Write;

use crate::models::{BusinessConfig, ClientAction, ConfigKey, Intent, ResponseCategory, ResponsePayload};

pub fn render(intent: Intent, config: &BusinessConfig) -> ResponsePayload {
    let (response, action) = match intent {
        Intent::Category(ResponseCategory::Services) => (services(config), None),
        Intent::Category(ResponseCategory::Hours) => (hours(config), None),
        Intent::Category(ResponseCategory::Location) => (location(config), None),
        Intent::Category(ResponseCategory::Contact) => (contact(config), None),
        Intent::Category(ResponseCategory::Booking) => {
            (booking(config), Some(ClientAction::ShowBookingForm))
        }
        Intent::Category(ResponseCategory::Review) => (review(config), None),
        Intent::Category(ResponseCategory::Social) => (social(config), None),
        Intent::Category(ResponseCategory::Faq) => (faq(), None),
        Intent::Category(ResponseCategory::Chat) => (chat(config), None),
        Intent::Category(ResponseCategory::Greeting) => (greeting(config), None),
        Intent::Category(ResponseCategory::Thanks) => (thanks(config), None),
        Intent::Category(ResponseCategory::Farewell) => (farewell(config), None),
        Intent::Default => (help_menu(config), None),
    };

    ResponsePayload {
        category: intent.as_str().to_string(),
        response,
        action,
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn value(config: &BusinessConfig, key: ConfigKey) -> String {
    escape_html(config.get(key))
}

/// `<a>` tag, or nothing when the target is empty.
fn link(href: &str, label: &str) -> Option<String> {
    if href.trim().is_empty() {
        return None;
    }
    Some(format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
        escape_html(href),
        escape_html(label)
    ))
}

fn whatsapp_link(config: &BusinessConfig, label: &str) -> Option<String> {
    let digits = config.whatsapp_digits();
    if digits.is_empty() {
        return None;
    }
    link(&format!("https://wa.me/{digits}"), label)
}

fn services(config: &BusinessConfig) -> String {
    let mut html = String::from("<strong>Our Services</strong><br><br>");
    for service in config.services() {
        let _ = write!(html, "&bull; {}<br>", escape_html(service));
    }
    html.push_str("<br>Would you like to book a consultation?");
    html
}

fn hours(config: &BusinessConfig) -> String {
    let mut html = format!(
        "<strong>Working Hours</strong><br><br>Monday - Saturday: {}<br>Sunday: {}",
        value(config, ConfigKey::HoursWeekday),
        value(config, ConfigKey::HoursSunday)
    );
    if let Some(wa) = whatsapp_link(config, "Message us on WhatsApp") {
        let _ = write!(html, "<br><br>{wa}");
    }
    html
}

fn location(config: &BusinessConfig) -> String {
    let mut html = format!(
        "<strong>Visit Us</strong><br><br>{}",
        value(config, ConfigKey::Address)
    );
    if let Some(maps) = link(config.get(ConfigKey::MapsUrl), "View on Google Maps") {
        let _ = write!(html, "<br><br>{maps}");
    }
    html
}

fn contact(config: &BusinessConfig) -> String {
    let mut html = format!(
        "<strong>Get In Touch</strong><br><br>Phone: {}",
        value(config, ConfigKey::Phone)
    );
    let email = config.get(ConfigKey::Email);
    if let Some(mail) = link(&mailto(email), email) {
        let _ = write!(html, "<br>Email: {mail}");
    }
    if let Some(wa) = whatsapp_link(config, "Chat on WhatsApp") {
        let _ = write!(html, "<br>WhatsApp: {wa}");
    }
    html
}

fn mailto(email: &str) -> String {
    if email.is_empty() {
        String::new()
    } else {
        format!("mailto:{email}")
    }
}

fn booking(config: &BusinessConfig) -> String {
    let mut html = String::from(
        "<strong>Book a Consultation</strong><br><br>Fill in the booking form and we will confirm your appointment shortly.",
    );
    if let Some(wa) = whatsapp_link(config, "book on WhatsApp") {
        let _ = write!(html, "<br>You can also {wa}.");
    }
    html
}

fn review(config: &BusinessConfig) -> String {
    let mut html = String::from(
        "<strong>Share Your Experience</strong><br><br>Your feedback helps others find their path.",
    );
    if let Some(review) = link(config.get(ConfigKey::ReviewUrl), "Leave a Google review") {
        let _ = write!(html, "<br><br>{review}");
    }
    html
}

fn social(config: &BusinessConfig) -> String {
    let links: Vec<String> = [
        (ConfigKey::FacebookUrl, "Facebook"),
        (ConfigKey::InstagramUrl, "Instagram"),
        (ConfigKey::TwitterUrl, "Twitter"),
        (ConfigKey::YoutubeUrl, "YouTube"),
    ]
    .iter()
    .filter_map(|(key, label)| link(config.get(*key), label))
    .collect();

    let mut html = String::from("<strong>Follow Us</strong><br><br>");
    if links.is_empty() {
        html.push_str("Contact us for our social media links!");
    } else {
        html.push_str(&links.join("<br>"));
    }
    html
}

fn faq() -> String {
    "<strong>Frequently Asked Questions</strong><br><br>\
     <strong>What is astrology?</strong><br>The study of how planetary positions relate to events in our lives.<br><br>\
     <strong>What do I need for a reading?</strong><br>Your birth date, time and place.<br><br>\
     <strong>How long is a consultation?</strong><br>Sessions usually last 45-60 minutes."
        .to_string()
}

fn chat(config: &BusinessConfig) -> String {
    let mut html = String::from(
        "Go ahead and ask your question. For a detailed conversation with our astrologer",
    );
    match whatsapp_link(config, "chat on WhatsApp") {
        Some(wa) => {
            let _ = write!(html, ", {wa}.");
        }
        None => html.push_str(", book a consultation."),
    }
    html
}

fn greeting(config: &BusinessConfig) -> String {
    format!(
        "<strong>Namaste! Welcome to {}</strong><br><br>{}",
        value(config, ConfigKey::BusinessName),
        menu_items()
    )
}

fn thanks(config: &BusinessConfig) -> String {
    format!(
        "You're welcome! Thank you for choosing {}.",
        value(config, ConfigKey::BusinessName)
    )
}

fn farewell(config: &BusinessConfig) -> String {
    format!(
        "Goodbye! May the stars guide you. {} is here whenever you need us.",
        value(config, ConfigKey::BusinessName)
    )
}

fn help_menu(config: &BusinessConfig) -> String {
    format!(
        "<strong>How can {} help you?</strong><br><br>{}",
        value(config, ConfigKey::BusinessName),
        menu_items()
    )
}

fn menu_items() -> &'static str {
    "Ask me about:<br>\
     &bull; <strong>Services</strong><br>\
     &bull; <strong>Hours</strong><br>\
     &bull; <strong>Location</strong><br>\
     &bull; <strong>Contact</strong><br>\
     &bull; <strong>Book</strong> a consultation<br>\
     &bull; <strong>Reviews</strong> and <strong>social</strong> links"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::Record;
    use serde_json::json;

    fn config(value: serde_json::Value) -> BusinessConfig {
        let info: Record = serde_json::from_value(value).unwrap();
        BusinessConfig::merge(&info, &Record::new())
    }

    #[test]
    fn test_booking_carries_action() {
        let payload = render(Intent::Category(ResponseCategory::Booking), &BusinessConfig::default());
        assert_eq!(payload.category, "booking");
        assert_eq!(payload.action, Some(ClientAction::ShowBookingForm));
        assert!(!payload.response.contains("SHOW_BOOKING_FORM"));
    }

    #[test]
    fn test_other_categories_have_no_action() {
        let payload = render(Intent::Category(ResponseCategory::Hours), &BusinessConfig::default());
        assert_eq!(payload.action, None);
        assert!(payload.response.contains("9:00 AM - 8:00 PM"));
        assert!(payload.response.contains("https://wa.me/918431729319"));
    }

    #[test]
    fn test_default_renders_help_menu() {
        let payload = render(Intent::Default, &BusinessConfig::default());
        assert_eq!(payload.category, "default");
        assert!(payload.response.contains("Ask me about"));
    }

    #[test]
    fn test_social_omits_empty_links() {
        let payload = render(
            Intent::Category(ResponseCategory::Social),
            &config(json!({"instagram": "https://instagram.com/cosmic"})),
        );
        assert!(payload.response.contains("https://instagram.com/cosmic"));
        assert!(!payload.response.contains("Facebook"));
        assert!(!payload.response.contains("href=\"\""));
    }

    #[test]
    fn test_social_without_links() {
        let payload = render(Intent::Category(ResponseCategory::Social), &BusinessConfig::default());
        assert!(!payload.response.contains("<a "));
    }

    #[test]
    fn test_contact_omits_empty_email() {
        let payload = render(Intent::Category(ResponseCategory::Contact), &BusinessConfig::default());
        assert!(!payload.response.contains("mailto:"));

        let payload = render(
            Intent::Category(ResponseCategory::Contact),
            &config(json!({"email": "hello@cosmic.in"})),
        );
        assert!(payload.response.contains("mailto:hello@cosmic.in"));
    }

    #[test]
    fn test_values_are_escaped() {
        let payload = render(
            Intent::Category(ResponseCategory::Greeting),
            &config(json!({"business_name": "<script>Stars & Co</script>"})),
        );
        assert!(payload.response.contains("&lt;script&gt;Stars &amp; Co&lt;/script&gt;"));
    }

    #[test]
    fn test_every_category_renders_non_empty() {
        let config = BusinessConfig::default();
        for (category, _) in crate::services::chatbot::matcher::KEYWORD_TABLE.iter() {
            let payload = render(Intent::Category(*category), &config);
            assert_eq!(payload.category, category.as_str());
            assert!(!payload.response.is_empty());
        }
    }
}
