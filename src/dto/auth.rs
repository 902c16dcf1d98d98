use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Back-office credentials. Buyers never log in.
#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Ready to send as the `Authorization` header value.
    pub token: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

/// Session claims signed into the bearer token.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub role: String,
    pub exp: i64,
}
