use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::middleware::auth::Claims;

const TOKEN_TTL_HOURS: i64 = 24;

pub fn create_token(user_id: Uuid, role: &str) -> Result<String> {
    let exp = (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        role: Some(role.to_string()),
    };
    let config = crate::config::get_config();
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
}
