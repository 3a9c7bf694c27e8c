// src/auth.rs
use anyhow::Result;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};

/// Claims issued by the hosted auth provider
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub aud: Option<String>,
}

pub struct AuthConfig {
    pub jwt_secret: String,
    pub audience: Option<String>,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, audience: Option<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            audience,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation
    }

    /// Verify signature, expiry and audience of a bearer token
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let token_data = decode::<Claims>(token, &key, &self.validation())?;
        Ok(token_data.claims)
    }
}

/// The authenticated caller. `user_id` is passed explicitly to every
/// repository call that scopes by organization.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub user_id: String,
    pub email: Option<String>,
}

impl From<Claims> for CallerIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CallerIdentity {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_config = match req.guard::<&State<AuthConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => return reject(req, status, AuthError::Misconfigured),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let token = match req.headers().get_one("Authorization") {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) => token.trim(),
                None => {
                    app_log!(warn, "Invalid Authorization header format");
                    return reject(req, Status::Unauthorized, AuthError::InvalidToken);
                }
            },
            None => {
                app_log!(warn, "Missing Authorization header");
                return reject(req, Status::Unauthorized, AuthError::MissingToken);
            }
        };

        match auth_config.verify(token) {
            Ok(claims) if !claims.sub.is_empty() => {
                app_log!(debug, "Authenticated caller {}", claims.sub);
                Outcome::Success(claims.into())
            }
            Ok(_) => {
                app_log!(warn, "Token without subject rejected");
                reject(req, Status::Unauthorized, AuthError::TokenVerificationFailed)
            }
            Err(e) => {
                app_log!(warn, "Token verification failed: {}", e);
                reject(req, Status::Unauthorized, AuthError::TokenVerificationFailed)
            }
        }
    }
}

/// Records the failure for the error catcher, which renders its message
fn reject<S>(req: &Request<'_>, status: Status, error: AuthError) -> Outcome<S, AuthError> {
    req.local_cache(|| Some(error));
    Outcome::Error((status, error))
}

/// The guard failure recorded for this request, if any
pub fn auth_failure(req: &Request<'_>) -> Option<AuthError> {
    *req.local_cache(|| None::<AuthError>)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
    Misconfigured,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization token required",
            AuthError::InvalidToken => "Invalid authorization token format",
            AuthError::TokenVerificationFailed => "Token verification failed",
            AuthError::Misconfigured => "Authentication is not configured",
        }
    }
}
