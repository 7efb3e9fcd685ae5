//! Helpers for tests that need valid platform tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Sign a token for the given user that `validate_token` will accept.
pub fn mint_token(user_id: &str, role: &str, secret: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(
        json!({"alg": "HS256", "typ": "JWT"}).to_string(),
    );
    let claims = URL_SAFE_NO_PAD.encode(
        json!({
            "sub": user_id,
            "role": role,
            "exp": Utc::now().timestamp() as u64 + 3600,
            "iat": Utc::now().timestamp() as u64,
        })
        .to_string(),
    );

    let signed_portion = format!("{}.{}", header, claims);
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(signed_portion.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{}.{}", signed_portion, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::validate_token;

    #[test]
    fn minted_token_round_trips() {
        let token = mint_token("user-1", "patient", "secret");
        let user = validate_token(&token, "secret").unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.role.as_deref(), Some("patient"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint_token("user-1", "patient", "secret");
        assert!(validate_token(&token, "other").is_err());
    }
}
