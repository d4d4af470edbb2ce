use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use log::{info, warn};

use super::auth::authenticate;
use super::ServiceError;
use crate::models::AppState;
use crate::storage::{AuthRecord, UserRecord};

pub fn register(
    state: &AppState,
    username: &str,
    password: &str,
    email: &str,
) -> Result<AuthRecord, ServiceError> {
    if username.is_empty() || password.is_empty() || email.is_empty() {
        return Err(ServiceError::BadRequest);
    }
    if state.store.get_user(username)?.is_some() {
        return Err(ServiceError::AlreadyTaken);
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Internal(format!("password hashing failed: {}", e)))?;

    state.store.create_user(UserRecord {
        username: username.to_string(),
        password_hash,
        email: email.to_string(),
    })?;
    info!("Registered user {}", username);
    Ok(state.store.create_auth(username)?)
}

pub fn login(state: &AppState, username: &str, password: &str) -> Result<AuthRecord, ServiceError> {
    let Some(user) = state.store.get_user(username)? else {
        warn!("Login attempt for unknown user {}", username);
        return Err(ServiceError::Unauthorized);
    };
    let parsed = PasswordHash::new(&user.password_hash)
        .map_err(|e| ServiceError::Internal(format!("stored hash unreadable: {}", e)))?;
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_err()
    {
        warn!("Wrong password for {}", username);
        return Err(ServiceError::Unauthorized);
    }
    Ok(state.store.create_auth(username)?)
}

pub fn logout(state: &AppState, auth_token: &str) -> Result<(), ServiceError> {
    let username = authenticate(state.store.as_ref(), auth_token)?;
    state.store.delete_auth(auth_token)?;
    info!("{} logged out", username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_login_logout() {
        let state = AppState::in_memory();
        let registered = register(&state, "alice", "hunter2", "alice@example.com").unwrap();
        assert_eq!(registered.username, "alice");

        let stored = state.store.get_user("alice").unwrap().unwrap();
        assert_ne!(stored.password_hash, "hunter2");
        assert!(stored.password_hash.starts_with("$argon2"));

        let session = login(&state, "alice", "hunter2").unwrap();
        assert_ne!(session.auth_token, registered.auth_token);

        logout(&state, &session.auth_token).unwrap();
        assert!(matches!(
            logout(&state, &session.auth_token),
            Err(ServiceError::Unauthorized)
        ));
        // The registration token is still good.
        assert_eq!(
            state.store.resolve_auth(&registered.auth_token).unwrap().as_deref(),
            Some("alice")
        );
    }

    #[test]
    fn test_register_rejects_duplicates_and_blanks() {
        let state = AppState::in_memory();
        register(&state, "alice", "pw", "a@example.com").unwrap();
        assert!(matches!(
            register(&state, "alice", "other", "b@example.com"),
            Err(ServiceError::AlreadyTaken)
        ));
        assert!(matches!(
            register(&state, "bob", "", "b@example.com"),
            Err(ServiceError::BadRequest)
        ));
    }

    #[test]
    fn test_login_failures() {
        let state = AppState::in_memory();
        register(&state, "alice", "right", "a@example.com").unwrap();
        assert!(matches!(
            login(&state, "alice", "wrong"),
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            login(&state, "nobody", "right"),
            Err(ServiceError::Unauthorized)
        ));
    }
}
