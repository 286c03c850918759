use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use commipay_core::{Owner, Role};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::main_lib::AppState;

/// Claims carried by an access token. Tokens are issued elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize,
}

pub struct AuthManager {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthManager {
    pub fn new(jwt_secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret),
            validation,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Owner, ApiError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => ApiError::Unauthorized("Token has expired".into()),
                ErrorKind::InvalidToken
                | ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::ImmatureSignature
                | ErrorKind::MissingRequiredClaim(_)
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => ApiError::Unauthorized("Invalid token".into()),
                other => ApiError::Internal(format!("Failed to validate token: {other:?}")),
            },
        )?;
        if data.claims.id.trim().is_empty() {
            return Err(ApiError::Unauthorized("Invalid token".into()));
        }
        Ok(Owner::new(data.claims.id, data.claims.role))
    }
}

pub fn decode_secret_key(raw: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("JWT secret cannot be empty");
    }
    match BASE64.decode(trimmed) {
        Ok(bytes) if bytes.len() == 32 => Ok(bytes),
        _ if trimmed.len() == 32 => Ok(trimmed.as_bytes().to_vec()),
        Ok(_) => anyhow::bail!("JWT secret must decode to exactly 32 bytes"),
        Err(_) => anyhow::bail!("JWT secret must be base64 encoded or a 32-byte ASCII string"),
    }
}

/// Resolves the bearer token into an [`Owner`] request extension.
pub async fn require_jwt(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let unauthorized = || ApiError::Unauthorized("Unauthorized".into());

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(unauthorized)?;

    let mut parts = header.splitn(2, ' ');
    let (Some(scheme), Some(token)) = (parts.next(), parts.next()) else {
        return Err(unauthorized());
    };
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(unauthorized());
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(unauthorized());
    }

    let owner = state.auth.validate_token(token)?;
    tracing::debug!("Authenticated owner {} ({})", owner.id, owner.role);
    request.extensions_mut().insert(owner);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn token(id: &str, exp_offset: i64, secret: &[u8]) -> String {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64;
        let claims = Claims {
            id: id.to_string(),
            role: Role::Admin,
            email: None,
            exp: (now + exp_offset) as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn valid_token_yields_owner() {
        let auth = AuthManager::new(SECRET);
        let owner = auth.validate_token(&token("owner-1", 600, SECRET)).unwrap();
        assert_eq!(owner, Owner::new("owner-1", Role::Admin));
    }

    #[test]
    fn expired_or_foreign_tokens_are_unauthorized() {
        let auth = AuthManager::new(SECRET);
        let expired = auth.validate_token(&token("owner-1", -3600, SECRET));
        assert!(matches!(expired, Err(ApiError::Unauthorized(_))));

        let forged = auth.validate_token(&token("owner-1", 600, b"another-secret-another-secret-32"));
        assert!(matches!(forged, Err(ApiError::Unauthorized(_))));

        assert!(matches!(
            auth.validate_token("not-a-jwt"),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn secret_accepts_base64_or_raw_ascii() {
        let encoded = BASE64.encode([7u8; 32]);
        assert_eq!(decode_secret_key(&encoded).unwrap(), vec![7u8; 32]);
        assert_eq!(
            decode_secret_key("0123456789abcdef0123456789abcdef").unwrap(),
            SECRET.to_vec()
        );
        assert!(decode_secret_key("short").is_err());
        assert!(decode_secret_key("  ").is_err());
    }
}
