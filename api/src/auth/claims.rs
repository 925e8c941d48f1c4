use db::models::user::Role;
use serde::{Deserialize, Serialize};

/// JWT claims carried by every issued token.
///
/// - `sub`: user ID the token was issued for
/// - `role`: account role at issue time (`teacher` or `parent`)
/// - `exp`: expiry as a UNIX timestamp (seconds)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub role: Role,
    pub exp: usize,
}

/// Extractor wrapper around [`Claims`] for authenticated handlers.
///
/// Any handler can take `AuthUser` as an argument to require a valid bearer
/// token; the `FromRequestParts` impl lives in [`crate::auth::extractors`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn is_teacher(&self) -> bool {
        self.0.role == Role::Teacher
    }
}
