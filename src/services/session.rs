use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

pub const SESSION_TTL_SECS: i64 = 12 * 60 * 60;

const SUBJECT: &str = "admin";

fn mac(secret: &str) -> Option<HmacSha1> {
    HmacSha1::new_from_slice(secret.as_bytes()).ok()
}

/// Issues a signed admin token of the form `admin.<unix>.<signature>`.
pub fn issue(secret: &str, issued_at: DateTime<Utc>) -> Option<String> {
    let payload = format!("{SUBJECT}.{}", issued_at.timestamp());
    let mut mac = mac(secret)?;
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    Some(format!("{payload}.{signature}"))
}

pub fn verify(secret: &str, token: &str, now: DateTime<Utc>) -> bool {
    let Some((payload, signature)) = token.rsplit_once('.') else {
        return false;
    };
    let Some(issued) = payload
        .strip_prefix(SUBJECT)
        .and_then(|rest| rest.strip_prefix('.'))
        .and_then(|ts| ts.parse::<i64>().ok())
    else {
        return false;
    };
    let Ok(signature) = URL_SAFE_NO_PAD.decode(signature) else {
        return false;
    };
    let Some(mut mac) = mac(secret) else {
        return false;
    };
    mac.update(payload.as_bytes());
    if mac.verify_slice(&signature).is_err() {
        return false;
    }

    let age = now.timestamp() - issued;
    (0..=SESSION_TTL_SECS).contains(&age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_issued_token_verifies() {
        let now = Utc::now();
        let token = issue("secret", now).unwrap();
        assert!(token.starts_with("admin."));
        assert!(verify("secret", &token, now));
        assert!(verify("secret", &token, now + Duration::hours(11)));
    }

    #[test]
    fn test_expired_token() {
        let now = Utc::now();
        let token = issue("secret", now).unwrap();
        assert!(!verify("secret", &token, now + Duration::hours(13)));
    }

    #[test]
    fn test_wrong_secret_or_tampered() {
        let now = Utc::now();
        let token = issue("secret", now).unwrap();
        assert!(!verify("other", &token, now));

        let forged = token.replacen(&now.timestamp().to_string(), &(now.timestamp() + 100).to_string(), 1);
        assert!(!verify("secret", &forged, now + Duration::seconds(200)));
        assert!(!verify("secret", "garbage", now));
        assert!(!verify("secret", "", now));
    }
}
