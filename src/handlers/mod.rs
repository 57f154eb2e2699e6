pub mod admin;
pub mod bookings;
pub mod catalog;
pub mod chatbot;
pub mod contact;
pub mod content;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::services::catalog::Collection;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/bookings",
            post(bookings::create_booking).get(bookings::list_bookings),
        )
        .route(
            "/api/bookings/:id",
            put(bookings::update_booking).delete(bookings::delete_booking),
        )
        .route("/api/chatbot", post(chatbot::chat))
        .route(
            "/api/business-info",
            get(content::get_business_info)
                .post(content::update_business_info)
                .put(content::update_business_info),
        )
        .route(
            "/api/chatbot-config",
            get(content::get_chatbot_config)
                .post(content::update_chatbot_config)
                .put(content::update_chatbot_config),
        )
        .route(
            "/api/contact-messages",
            post(contact::create_message).get(contact::list_messages),
        )
        .route(
            "/api/contact-messages/:id",
            put(contact::update_message).delete(contact::delete_message),
        )
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/logout", post(admin::logout))
        .route("/api/admin/check", get(admin::check))
        .route("/api/admin/change-password", post(admin::change_password))
        .merge(catalog::routes(
            "/api/astrological-services",
            Collection::AstrologicalServices,
        ))
        .merge(catalog::routes("/api/pooja-services", Collection::PoojaServices))
        .merge(catalog::routes("/api/reviews", Collection::Reviews))
        .merge(catalog::routes("/api/announcements", Collection::Announcements))
        .with_state(state)
}
