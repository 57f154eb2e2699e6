use std::fmt::Write;

use crate::models::{BookingRecord, ContactMessage};
use crate::services::chatbot::renderer::escape_html;

pub struct Email {
    pub subject: String,
    pub html_body: String,
}

fn table(rows: &[(&str, &str)]) -> String {
    let mut html = String::from("<table cellpadding=\"6\" style=\"border-collapse: collapse;\">");
    for (label, value) in rows {
        if value.is_empty() {
            continue;
        }
        let _ = write!(
            html,
            "<tr><td><strong>{}</strong></td><td>{}</td></tr>",
            escape_html(label),
            escape_html(value)
        );
    }
    html.push_str("</table>");
    html
}

pub fn booking_notification(record: &BookingRecord) -> Email {
    let created = record.created_at.format("%Y-%m-%d %H:%M UTC").to_string();
    let id = record.id.to_string();
    let body = table(&[
        ("Booking ID", id.as_str()),
        ("Name", record.name.as_str()),
        ("Phone", record.phone.as_str()),
        ("Email", record.email.as_deref().unwrap_or("")),
        ("Service", record.service.as_str()),
        ("Preferred Date", record.booking_date.as_deref().unwrap_or("")),
        ("Preferred Time", record.booking_time.as_deref().unwrap_or("")),
        ("Date of Birth", record.date_of_birth.as_deref().unwrap_or("")),
        ("Message", record.message.as_deref().unwrap_or("")),
        ("Source", record.source.as_str()),
        ("Received", created.as_str()),
    ]);

    Email {
        subject: format!("New Booking: {}", record.service),
        html_body: format!("<h2>New Booking Request</h2>{body}"),
    }
}

pub fn booking_confirmation(record: &BookingRecord, business_name: &str) -> Email {
    Email {
        subject: format!("Booking Confirmation - {business_name}"),
        html_body: format!(
            "<h2>Thank you, {}!</h2>\
             <p>We have received your request for <strong>{}</strong>. \
             We will contact you on {} to confirm the appointment.</p>\
             <p>{}</p>",
            escape_html(&record.name),
            escape_html(&record.service),
            escape_html(&record.phone),
            escape_html(business_name)
        ),
    }
}

pub fn contact_notification(message: &ContactMessage) -> Email {
    let subject_line = message.subject.as_deref().unwrap_or("General enquiry");
    let body = table(&[
        ("Name", message.name.as_str()),
        ("Email", message.email.as_str()),
        ("Phone", message.phone.as_deref().unwrap_or("")),
        ("Subject", subject_line),
        ("Message", message.message.as_str()),
    ]);

    Email {
        subject: format!("New Contact Message: {subject_line}"),
        html_body: format!("<h2>New Contact Message</h2>{body}"),
    }
}
