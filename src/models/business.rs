use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::services::store::Record;

/// Business settings the chatbot and emails read. The `business_info` and
/// `chatbot_config` tables grew different column names for the same values,
/// so each key lists the fields it is read from in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKey {
    BusinessName,
    Phone,
    WhatsappNumber,
    Email,
    Address,
    HoursWeekday,
    HoursSunday,
    MapsUrl,
    ReviewUrl,
    FacebookUrl,
    InstagramUrl,
    TwitterUrl,
    YoutubeUrl,
    Services,
    ChatbotEnabled,
}

pub const ALL_KEYS: [ConfigKey; 15] = [
    ConfigKey::BusinessName,
    ConfigKey::Phone,
    ConfigKey::WhatsappNumber,
    ConfigKey::Email,
    ConfigKey::Address,
    ConfigKey::HoursWeekday,
    ConfigKey::HoursSunday,
    ConfigKey::MapsUrl,
    ConfigKey::ReviewUrl,
    ConfigKey::FacebookUrl,
    ConfigKey::InstagramUrl,
    ConfigKey::TwitterUrl,
    ConfigKey::YoutubeUrl,
    ConfigKey::Services,
    ConfigKey::ChatbotEnabled,
];

impl ConfigKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::BusinessName => "business_name",
            ConfigKey::Phone => "phone",
            ConfigKey::WhatsappNumber => "whatsapp_number",
            ConfigKey::Email => "email",
            ConfigKey::Address => "address",
            ConfigKey::HoursWeekday => "hours_weekday",
            ConfigKey::HoursSunday => "hours_sunday",
            ConfigKey::MapsUrl => "maps_url",
            ConfigKey::ReviewUrl => "review_url",
            ConfigKey::FacebookUrl => "facebook_url",
            ConfigKey::InstagramUrl => "instagram_url",
            ConfigKey::TwitterUrl => "twitter_url",
            ConfigKey::YoutubeUrl => "youtube_url",
            ConfigKey::Services => "services",
            ConfigKey::ChatbotEnabled => "chatbot_enabled",
        }
    }

    fn business_info_fields(&self) -> &'static [&'static str] {
        match self {
            ConfigKey::BusinessName => &["business_name", "name"],
            ConfigKey::Phone => &["phone"],
            ConfigKey::WhatsappNumber => &["whatsapp_number", "whatsapp"],
            ConfigKey::Email => &["email"],
            ConfigKey::Address => &["address"],
            ConfigKey::HoursWeekday => &["hours_weekday", "business_hours"],
            ConfigKey::HoursSunday => &["hours_sunday"],
            ConfigKey::MapsUrl => &["google_location_url", "google_maps_url"],
            ConfigKey::ReviewUrl => &["google_review_url"],
            ConfigKey::FacebookUrl => &["facebook", "facebook_url"],
            ConfigKey::InstagramUrl => &["instagram", "instagram_url"],
            ConfigKey::TwitterUrl => &["twitter", "twitter_url"],
            ConfigKey::YoutubeUrl => &["youtube", "youtube_url"],
            ConfigKey::Services => &["services"],
            ConfigKey::ChatbotEnabled => &[],
        }
    }

    fn chatbot_config_fields(&self) -> &'static [&'static str] {
        match self {
            ConfigKey::BusinessName => &["business_name"],
            ConfigKey::Phone => &["phone"],
            ConfigKey::WhatsappNumber => &["whatsapp_number"],
            ConfigKey::Email => &["email"],
            ConfigKey::Address => &["business_address", "address"],
            ConfigKey::HoursWeekday => &["hours_weekday"],
            ConfigKey::HoursSunday => &["hours_sunday"],
            ConfigKey::MapsUrl => &["google_maps_url", "maps_url"],
            ConfigKey::ReviewUrl => &["google_review_url", "review_url"],
            ConfigKey::FacebookUrl => &["facebook_url"],
            ConfigKey::InstagramUrl => &["instagram_url"],
            ConfigKey::TwitterUrl => &["twitter_url"],
            ConfigKey::YoutubeUrl => &["youtube_url"],
            ConfigKey::Services => &["services"],
            ConfigKey::ChatbotEnabled => &["is_enabled"],
        }
    }

    pub fn default_value(&self) -> &'static str {
        match self {
            ConfigKey::BusinessName => "Cosmic Astrology",
            ConfigKey::Phone => "+918431729319",
            ConfigKey::WhatsappNumber => "+918431729319",
            ConfigKey::Email => "",
            ConfigKey::Address => {
                "3rd Cross Rd, Austin Town, Neelasandra, Bengaluru, Karnataka 560047"
            }
            ConfigKey::HoursWeekday => "9:00 AM - 8:00 PM",
            ConfigKey::HoursSunday => "9:00 AM - 2:00 PM",
            ConfigKey::MapsUrl => {
                "https://maps.google.com/?q=3rd+Cross+Rd+Austin+Town+Neelasandra+Bengaluru+560047"
            }
            ConfigKey::ReviewUrl => "https://maps.app.goo.gl/rPo3UXPy65DBbsVz8",
            ConfigKey::FacebookUrl
            | ConfigKey::InstagramUrl
            | ConfigKey::TwitterUrl
            | ConfigKey::YoutubeUrl => "",
            ConfigKey::Services => {
                "Kundali Reading, Tarot Reading, Career Guidance, Love & Relationships, \
                 Health & Wellness, Finance & Business, Vastu Consultation, Gemstone Recommendation"
            }
            ConfigKey::ChatbotEnabled => "true",
        }
    }
}

/// Merged, read-only view of the business settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessConfig {
    values: HashMap<ConfigKey, String>,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self::merge(&Record::new(), &Record::new())
    }
}

impl BusinessConfig {
    /// First non-empty value wins: business_info, then chatbot_config, then
    /// the compiled-in default.
    pub fn merge(business_info: &Record, chatbot_config: &Record) -> Self {
        Self::merge_with_catalog(business_info, chatbot_config, &[])
    }

    /// Like [`merge`](Self::merge), with the titles of the active service
    /// listings as the last source for `services` before the default.
    pub fn merge_with_catalog(
        business_info: &Record,
        chatbot_config: &Record,
        catalog: &[String],
    ) -> Self {
        let values = ALL_KEYS
            .iter()
            .map(|key| {
                let value = lookup(business_info, key.business_info_fields())
                    .or_else(|| lookup(chatbot_config, key.chatbot_config_fields()))
                    .or_else(|| {
                        (*key == ConfigKey::Services && !catalog.is_empty())
                            .then(|| catalog.join(", "))
                    })
                    .unwrap_or_else(|| key.default_value().to_string());
                (*key, value)
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, key: ConfigKey) -> &str {
        self.values
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_value())
    }

    /// WhatsApp number reduced to digits, as `wa.me` links need.
    pub fn whatsapp_digits(&self) -> String {
        let number = match self.get(ConfigKey::WhatsappNumber) {
            "" => self.get(ConfigKey::Phone),
            n => n,
        };
        number.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// Only an explicit `false` switches the chatbot off.
    pub fn chatbot_enabled(&self) -> bool {
        !self.get(ConfigKey::ChatbotEnabled).eq_ignore_ascii_case("false")
    }

    pub fn services(&self) -> Vec<&str> {
        self.get(ConfigKey::Services)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn lookup(record: &Record, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| match record.get(*field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Value::Object(obj) => obj
                        .get("name")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    })
}
