pub mod booking;
pub mod catalog;
pub mod chatbot;
pub mod clock;
pub mod config_cache;
pub mod contact;
pub mod credentials;
pub mod notifier;
pub mod session;
pub mod store;
pub mod validation;
