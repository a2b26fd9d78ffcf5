//! Business logic services

pub mod auth;
pub mod catalog;
pub mod circulation;
pub mod email;
pub mod fines;
pub mod policy;
pub mod readers;
pub mod reservations;
pub mod stats;

use crate::config::{AuthConfig, EmailConfig};
use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub readers: readers::ReadersService,
    pub catalog: catalog::CatalogService,
    pub circulation: circulation::CirculationService,
    pub fines: fines::FinesService,
    pub reservations: reservations::ReservationsService,
    pub policy: policy::PolicyService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, email_config: EmailConfig) -> Self {
        let email = email::EmailService::new(email_config);
        let reservations =
            reservations::ReservationsService::new(repository.clone(), email.clone());

        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            readers: readers::ReadersService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            circulation: circulation::CirculationService::new(
                repository.clone(),
                reservations.clone(),
            ),
            fines: fines::FinesService::new(repository.clone()),
            reservations,
            policy: policy::PolicyService::new(repository.clone()),
            stats: stats::StatsService::new(repository),
        }
    }
}
