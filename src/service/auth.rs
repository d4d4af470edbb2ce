use crate::storage::{AuthStore, DataAccessError};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Storage(#[from] DataAccessError),
}

/// Resolves `token` to the username it was issued for.
pub fn authenticate<S: AuthStore + ?Sized>(store: &S, token: &str) -> Result<String, AuthError> {
    if token.is_empty() {
        return Err(AuthError::Unauthorized);
    }
    store.resolve_auth(token)?.ok_or(AuthError::Unauthorized)
}
