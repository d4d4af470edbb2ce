//! Request-side operations: registering and logging in users, and creating,
//! listing and joining games. Each one validates its auth token first.

pub mod auth;
pub mod error;
pub mod games;
pub mod users;

pub use error::ServiceError;

use log::info;

use crate::models::AppState;

/// Wipes every user, token and game.
pub fn clear_application(state: &AppState) -> Result<(), ServiceError> {
    state.store.clear()?;
    info!("Cleared all application data");
    Ok(())
}
