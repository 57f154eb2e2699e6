use std::sync::Arc;

use chrono::Duration;

use crate::config::AppConfig;
use crate::services::booking::BookingService;
use crate::services::catalog::CatalogService;
use crate::services::clock::Clock;
use crate::services::config_cache::{ConfigCache, DEFAULT_TTL_SECS};
use crate::services::contact::ContactService;
use crate::services::credentials::AdminCredentials;
use crate::services::notifier::{EmailHealth, Mailer, Notifier};
use crate::services::store::RecordStore;

pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn RecordStore>,
    pub clock: Arc<dyn Clock>,
    pub config_cache: Arc<ConfigCache>,
    pub mailer: Arc<Mailer>,
    pub bookings: BookingService,
    pub contacts: ContactService,
    pub catalog: CatalogService,
    pub credentials: AdminCredentials,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mailer = Arc::new(Mailer::new(
            notifier,
            config.retry_policy(),
            Arc::new(EmailHealth::default()),
            config.notification_email.clone(),
        ));
        let config_cache = Arc::new(ConfigCache::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            Duration::seconds(DEFAULT_TTL_SECS),
        ));
        let bookings = BookingService::new(
            Arc::clone(&store),
            Arc::clone(&mailer),
            Arc::clone(&clock),
            Arc::clone(&config_cache),
        );
        let contacts = ContactService::new(Arc::clone(&store), Arc::clone(&mailer), Arc::clone(&clock));
        let catalog = CatalogService::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            Arc::clone(&config_cache),
        );
        let credentials = AdminCredentials::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            config.admin_password.clone(),
        );

        Self {
            config,
            store,
            clock,
            config_cache,
            mailer,
            bookings,
            contacts,
            catalog,
            credentials,
        }
    }
}
