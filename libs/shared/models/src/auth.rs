use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

/// Authenticated platform user, as decoded from a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl User {
    /// Capture this user together with the token it was decoded from.
    pub fn into_identity(self, token: &str) -> Identity {
        Identity {
            token: token.to_string(),
            user_id: self.id,
            role: self.role,
        }
    }
}

/// The session identity the booking flow is gated on: the bearer token plus
/// the user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub token: String,
    pub user_id: String,
    pub role: Option<String>,
}

impl Identity {
    /// Booking submission requires a patient role and a concrete user id.
    pub fn can_book(&self) -> bool {
        self.role.as_deref() == Some("patient") && !self.user_id.is_empty()
    }
}

/// Source of the current session identity. The flow machine consumes this
/// seam instead of reading ambient session state, so it can be unit-tested
/// with any identity (or none).
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;
}

/// Identity captured once, at session creation.
#[derive(Debug, Clone)]
pub struct CapturedIdentity(pub Identity);

impl IdentityProvider for CapturedIdentity {
    fn current_identity(&self) -> Option<Identity> {
        Some(self.0.clone())
    }
}
