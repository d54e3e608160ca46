//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, Notifier, RateLimitStore};
use crate::services::{
    AuthService, EventService, ParticipantService, ServiceContainer, Services, UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Event service
    pub event_service: Arc<dyn EventService>,
    /// Participation workflow
    pub participant_service: Arc<dyn ParticipantService>,
    /// Rate limit counters (Redis)
    pub cache: Arc<dyn RateLimitStore>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<dyn RateLimitStore>,
        config: Config,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let container = Services::from_connection(database.get_connection(), config, notifier);
        Self::from_services(&container, cache, database)
    }

    /// Create application state from any service container.
    pub fn from_services(
        services: &dyn ServiceContainer,
        cache: Arc<dyn RateLimitStore>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            event_service: services.events(),
            participant_service: services.participants(),
            cache,
            database,
        }
    }
}
