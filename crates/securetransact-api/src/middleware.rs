use anyhow::anyhow;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use securetransact_types::api::Claims;

use crate::AppState;
use crate::error::ApiError;

/// HS256 signing material plus token lifetime.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64, email: &str) -> anyhow::Result<String> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| anyhow!("token lifetime {} is out of range", self.ttl))?;
        let claims = Claims {
            user_id,
            email: email.to_string(),
            iat: now.timestamp() as usize,
            exp: expires.timestamp() as usize,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default()).map(|data| data.claims)
    }
}

/// `Authorization: Bearer` with nothing after the scheme.
fn scheme_only(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| {
            let v = v.trim();
            v.is_empty() || v.eq_ignore_ascii_case("bearer")
        })
}

/// Extract and validate the JWT from the Authorization header.
///
/// No token at all is 401; a token that fails verification is 403.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = match bearer {
        Ok(header) => header,
        Err(rejection) if rejection.is_missing() => return Err(ApiError::MissingToken),
        Err(_) if scheme_only(req.headers()) => return Err(ApiError::MissingToken),
        Err(_) => return Err(ApiError::InvalidToken),
    };
    if bearer.token().trim().is_empty() {
        return Err(ApiError::MissingToken);
    }

    let claims = state.jwt.verify(bearer.token()).map_err(|e| {
        debug!("Token rejected: {}", e);
        ApiError::InvalidToken
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let keys = JwtKeys::new("test-secret", Duration::hours(24));
        let token = keys.issue(42, "a@b.co").unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "a@b.co");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = JwtKeys::new("one", Duration::hours(1)).issue(1, "a@b.co").unwrap();
        assert!(JwtKeys::new("two", Duration::hours(1)).verify(&token).is_err());
    }

    #[test]
    fn bare_scheme_counts_as_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer".parse().unwrap());
        assert!(scheme_only(&headers));
        headers.insert(AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert!(!scheme_only(&headers));
        assert!(!scheme_only(&HeaderMap::new()));
    }

    #[test]
    fn out_of_range_lifetime_is_an_error() {
        let keys = JwtKeys::new("s", Duration::hours(10_000_000_000));
        assert!(keys.issue(1, "a@b.co").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = JwtKeys::new("s", Duration::hours(-2));
        let token = keys.issue(1, "a@b.co").unwrap();
        assert!(keys.verify(&token).is_err());
    }
}
