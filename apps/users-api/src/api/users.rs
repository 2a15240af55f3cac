//! Users API routes
//!
//! This module wires up the users domain to HTTP routes.

use axum::Router;
use domain_users::{MongoUserRepository, UnavailableUserRepository, UserService, handlers};

use crate::state::AppState;

/// Create users router
///
/// Falls back to a repository that fails every call when the store could
/// not be opened.
pub fn router(state: &AppState) -> Router {
    let max_page_limit = state.config.users.max_page_limit;

    match &state.mongo {
        Ok(store) => {
            let repository = MongoUserRepository::new(&store.db);
            handlers::router(UserService::new(repository).with_max_page_limit(max_page_limit))
        }
        Err(reason) => {
            let repository = UnavailableUserRepository::new(reason.clone());
            handlers::router(UserService::new(repository).with_max_page_limit(max_page_limit))
        }
    }
}
