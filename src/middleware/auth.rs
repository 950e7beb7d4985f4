use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::header,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    entity::user_roles::{Column as RoleCol, Entity as UserRoles, Model as UserRoleModel},
    error::{AppError, AppResult},
    state::AppState,
};

pub const ROLE_SUPER: &str = "super";
pub const ROLE_ADMIN: &str = "admin";

/// Claims of tokens issued by the identity provider. Only `sub` and `exp`
/// are relied upon.
#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Role row linking a principal to the restaurant it administers.
#[derive(Debug, Clone)]
pub struct AdminScope {
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub role: String,
}

impl From<UserRoleModel> for AdminScope {
    fn from(model: UserRoleModel) -> Self {
        Self {
            user_id: model.user_id,
            restaurant_id: model.restaurant_id,
            role: model.role,
        }
    }
}

/// Resolve the restaurant the caller may mutate.
pub async fn resolve_admin(state: &AppState, user: &AuthUser) -> AppResult<AdminScope> {
    let role = UserRoles::find()
        .filter(RoleCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::Forbidden)?;

    if role.role != ROLE_SUPER && role.role != ROLE_ADMIN {
        tracing::warn!(user_id = %user.user_id, role = %role.role, "role without admin privileges");
        return Err(AppError::Forbidden);
    }

    Ok(role.into())
}

pub fn ensure_restaurant(admin: &AdminScope, restaurant_id: Uuid) -> Result<(), AppError> {
    if admin.restaurant_id != restaurant_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn decode_token(token: &str, secret: &str) -> AppResult<AuthUser> {
    let mut validation = Validation::default();
    // provider tokens carry an audience this service does not check
    validation.validate_aud = false;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser { user_id })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?
            .trim();

        decode_token(token, &state.config.jwt_secret)
    }
}

/// Public endpoints read an optional caller. No header means anonymous; a
/// header that fails to verify is still rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(None);
        }
        let user = <AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn token(sub: &str, secret: &str, exp: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: exp as usize,
            email: None,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_an_hour() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn valid_token_yields_the_subject() {
        let id = Uuid::new_v4();
        let user = decode_token(&token(&id.to_string(), "s3cret", in_an_hour()), "s3cret").unwrap();
        assert_eq!(user.user_id, id);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let raw = token(&Uuid::new_v4().to_string(), "s3cret", in_an_hour());
        assert!(matches!(
            decode_token(&raw, "other"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let raw = token(&Uuid::new_v4().to_string(), "s3cret", 1_000);
        assert!(matches!(
            decode_token(&raw, "s3cret"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn non_uuid_subject_is_unauthorized() {
        let raw = token("not-a-uuid", "s3cret", in_an_hour());
        assert!(matches!(
            decode_token(&raw, "s3cret"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn admin_scope_guards_other_restaurants() {
        let admin = AdminScope {
            user_id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            role: ROLE_SUPER.into(),
        };
        assert!(ensure_restaurant(&admin, admin.restaurant_id).is_ok());
        assert!(matches!(
            ensure_restaurant(&admin, Uuid::new_v4()),
            Err(AppError::Forbidden)
        ));
    }
}
