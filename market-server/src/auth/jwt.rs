//! Identity tokens
//!
//! Tokens are issued by the external OTP service after phone verification
//! and carry the user's id, display name, phone and role. This side only
//! validates them; [`JwtService::generate_token`] exists for tooling and
//! tests.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::{Actor, Capability, Role};
use thiserror::Error;

/// Shortest accepted HS256 secret
pub const MIN_SECRET_LEN: usize = 32;

pub const DEFAULT_ISSUER: &str = "market-auth";
pub const DEFAULT_AUDIENCE: &str = "market-clients";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of generated tokens
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    pub fn with_secret(secret: impl Into<String>) -> Result<Self, JwtError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::ConfigError(format!(
                "JWT secret must be at least {MIN_SECRET_LEN} characters long"
            )));
        }
        Ok(Self {
            secret,
            expiration_minutes: 1440,
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
        })
    }

    /// Random per-process secret; tokens do not survive a restart
    pub fn development() -> Result<Self, JwtError> {
        tracing::warn!("JWT_SECRET not set, generating a temporary development key");
        Self::with_secret(generate_printable_secret()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub name: String,
    pub phone: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),

    #[error("Key generation failed")]
    KeyGenerationFailed,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::ExpiredToken => AppError::token_expired(),
            JwtError::InvalidToken(_) | JwtError::InvalidSignature => {
                AppError::invalid_token("Invalid token")
            }
            other => AppError::internal(other.to_string()),
        }
    }
}

/// 64 printable characters from the system RNG
fn generate_printable_secret() -> Result<String, JwtError> {
    const ALPHABET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_=+.:";
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    rng.fill(&mut bytes)
        .map_err(|_| JwtError::KeyGenerationFailed)?;
    Ok(bytes
        .iter()
        .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
        .collect())
}

#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn generate_token(&self, user: &Actor) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);
        let claims = Claims {
            sub: user.id.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            role: user.role,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(JwtError::InvalidToken("empty subject".to_string()));
        }
        Ok(data.claims)
    }

    /// Token part of an `Authorization: Bearer <token>` header
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Authenticated caller, injected by [`require_auth`](super::require_auth)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub role: Role,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            phone: claims.phone,
            role: claims.role,
        }
    }
}

impl CurrentUser {
    pub fn actor(&self) -> Actor {
        Actor::new(&self.id, &self.name, &self.phone, self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// 403 unless the caller's role grants `capability`
    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.role.can(capability) {
            return Ok(());
        }
        crate::security_log!(
            "WARN",
            "permission_denied",
            user_id = self.id.clone(),
            role = self.role.as_str(),
            capability = format!("{capability:?}")
        );
        Err(AppError::permission_denied(format!(
            "{} may not {}",
            self.role,
            capability_label(capability)
        )))
    }
}

fn capability_label(capability: Capability) -> &'static str {
    match capability {
        Capability::CreateOrder => "create orders",
        Capability::CreateGroup => "create groups",
        Capability::JoinGroup => "join groups",
        Capability::CreateSurplus => "list surplus items",
        Capability::ReserveSurplus => "reserve surplus items",
        Capability::QuoteOrder => "quote orders",
        Capability::UpdateOrderStatus => "update order status",
        Capability::ManageGroups => "manage groups",
        Capability::ViewAll => "view platform data",
        Capability::Verify => "verify users",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters";

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig::with_secret(SECRET).unwrap())
    }

    fn vendor() -> Actor {
        Actor::new("v1", "Ravi", "+919800000001", Role::Vendor)
    }

    #[test]
    fn test_token_roundtrip_keeps_identity() {
        let service = service();
        let token = service.generate_token(&vendor()).unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "v1");
        assert_eq!(claims.role, Role::Vendor);

        let user = CurrentUser::from(claims);
        assert_eq!(user.actor(), vendor());
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(matches!(
            JwtConfig::with_secret("short"),
            Err(JwtError::ConfigError(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().generate_token(&vendor()).unwrap();
        let other = JwtService::with_config(
            JwtConfig::with_secret("another-secret-that-is-also-32-chars-long").unwrap(),
        );
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut config = JwtConfig::with_secret(SECRET).unwrap();
        config.expiration_minutes = -10;
        let service = JwtService::with_config(config);
        let token = service.generate_token(&vendor()).unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let mut config = JwtConfig::with_secret(SECRET).unwrap();
        config.audience = "someone-else".to_string();
        let token = JwtService::with_config(config).generate_token(&vendor()).unwrap();
        assert!(matches!(
            service().validate_token(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }

    #[test]
    fn test_development_secrets_differ() {
        let a = JwtConfig::development().unwrap();
        let b = JwtConfig::development().unwrap();
        assert_eq!(a.secret.len(), 64);
        assert_ne!(a.secret, b.secret);
    }

    #[test]
    fn test_require_capability() {
        let service = service();
        let token = service.generate_token(&vendor()).unwrap();
        let user = CurrentUser::from(service.validate_token(&token).unwrap());
        assert!(user.require(Capability::CreateOrder).is_ok());

        let err = user.require(Capability::Verify).unwrap_err();
        assert_eq!(err.code, shared::error::ErrorCode::PermissionDenied);
    }
}
