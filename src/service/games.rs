use log::info;

use super::auth::authenticate;
use super::ServiceError;
use crate::game::TeamColor;
use crate::models::{AppState, GameId, GameSummary};

pub fn create_game(state: &AppState, auth_token: &str, game_name: &str) -> Result<GameId, ServiceError> {
    let username = authenticate(state.store.as_ref(), auth_token)?;
    if game_name.trim().is_empty() {
        return Err(ServiceError::BadRequest);
    }
    let game_id = state.store.create_game(game_name)?;
    info!("{} created game {} ({})", username, game_id, game_name);
    Ok(game_id)
}

pub fn list_games(state: &AppState, auth_token: &str) -> Result<Vec<GameSummary>, ServiceError> {
    authenticate(state.store.as_ref(), auth_token)?;
    Ok(state.store.list_games()?)
}

/// Seats the caller as `color`, or admits them as an observer when `color`
/// is `None`. Observers never conflict with anyone.
pub fn join_game(
    state: &AppState,
    auth_token: &str,
    color: Option<TeamColor>,
    game_id: GameId,
) -> Result<(), ServiceError> {
    let username = authenticate(state.store.as_ref(), auth_token)?;
    if state.store.get_game(game_id)?.is_none() {
        return Err(ServiceError::BadRequest);
    }

    let lock = state.game_locks.for_game(game_id);
    let _guard = lock.lock();

    let record = state
        .store
        .get_game(game_id)?
        .ok_or(ServiceError::BadRequest)?;
    let Some(color) = color else {
        info!("{} is observing game {}", username, game_id);
        return Ok(());
    };
    if record.seat(color).is_some() {
        return Err(ServiceError::AlreadyTaken);
    }
    state.store.set_seat(game_id, color, Some(username.clone()))?;
    info!("{} joined game {} as {}", username, game_id, color);
    Ok(())
}
