use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::{LoginRequest, LoginResponse, SessionClaims},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

/// Creates a back-office account, or updates password and role when the email exists.
pub async fn upsert_user<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
    role: &str,
) -> AppResult<User> {
    let password_hash = hash_password(password)?;
    let existing = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(db)
        .await?;

    let user = match existing {
        Some(user) => {
            let mut active: UserActive = user.into();
            active.password_hash = Set(password_hash);
            active.role = Set(role.to_string());
            active.update(db).await?
        }
        None => {
            UserActive {
                id: Set(Uuid::new_v4()),
                email: Set(email.to_string()),
                password_hash: Set(password_hash),
                role: Set(role.to_string()),
                created_at: NotSet,
            }
            .insert(db)
            .await?
        }
    };

    Ok(user.into())
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let (token, expires_at) = sign_session(state, user.id, &user.role)?;
    let resp = LoginResponse {
        token: format!("Bearer {}", token),
        role: user.role.clone(),
        expires_at,
    };

    audit::record(
        &state.orm,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        resp,
        Some(Meta::empty()),
    ))
}

pub fn issue_jwt(state: &AppState, user_id: Uuid, role: &str) -> AppResult<String> {
    sign_session(state, user_id, role).map(|(token, _)| token)
}

/// Signs a 24h session for `user_id` and returns the token with its expiry.
fn sign_session(
    state: &AppState,
    user_id: Uuid,
    role: &str,
) -> AppResult<(String, DateTime<Utc>)> {
    let expiration = state
        .clock
        .now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = SessionClaims {
        sub: user_id,
        role: role.to_string(),
        exp: expiration.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;
    Ok((token, expiration))
}
