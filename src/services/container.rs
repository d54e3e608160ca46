//! Service Container - Centralized service access.
//!
//! Builds every service once over a shared Unit of Work and hands them out
//! behind their traits.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, EventManager, EventService, ParticipantManager,
    ParticipantService, SessionManager, SessionService, TokenSigner, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{Notifier, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
///
/// Provides centralized access to all application services.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get session/token manager
    fn sessions(&self) -> Arc<dyn SessionService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    /// Get event service
    fn events(&self) -> Arc<dyn EventService>;

    /// Get participation workflow service
    fn participants(&self) -> Arc<dyn ParticipantService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    session_service: Arc<dyn SessionService>,
    user_service: Arc<dyn UserService>,
    event_service: Arc<dyn EventService>,
    participant_service: Arc<dyn ParticipantService>,
}

impl Services {
    /// Create service container from database connection and config
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::from_unit_of_work(Arc::new(Persistence::new(db)), config, notifier)
    }

    /// Create service container over an existing Unit of Work
    pub fn from_unit_of_work(
        uow: Arc<Persistence>,
        config: Config,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let frontend_url = config.frontend_url.clone();
        let signer = TokenSigner::new(config);

        let session_service: Arc<dyn SessionService> =
            Arc::new(SessionManager::new(uow.clone(), signer.clone()));
        let auth_service = Arc::new(Authenticator::new(
            uow.clone(),
            session_service.clone(),
            signer,
            notifier.clone(),
            frontend_url,
        ));

        Self {
            auth_service,
            session_service,
            user_service: Arc::new(UserManager::new(uow.clone())),
            event_service: Arc::new(EventManager::new(uow.clone())),
            participant_service: Arc::new(ParticipantManager::new(uow, notifier)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn sessions(&self) -> Arc<dyn SessionService> {
        self.session_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn events(&self) -> Arc<dyn EventService> {
        self.event_service.clone()
    }

    fn participants(&self) -> Arc<dyn ParticipantService> {
        self.participant_service.clone()
    }
}
