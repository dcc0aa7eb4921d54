//! Business logic services

pub mod reservations;
pub mod reviews;
pub mod tools;

use crate::{config::ReservationPolicy, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub tools: tools::ToolsService,
    pub reservations: reservations::ReservationsService,
    pub reviews: reviews::ReviewsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, policy: ReservationPolicy) -> Self {
        Self {
            tools: tools::ToolsService::new(repository.clone()),
            reservations: reservations::ReservationsService::new(repository.clone(), policy),
            reviews: reviews::ReviewsService::new(repository),
        }
    }
}
