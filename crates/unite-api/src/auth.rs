use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};
use uuid::Uuid;

use unite_chat::ChatRepository;
use unite_types::api::{Claims, LoginRequest, LoginResponse};
use unite_types::models::User;

use crate::error::blocking;

pub type AppState = std::sync::Arc<AppStateInner>;

pub struct AppStateInner {
    pub repo: Box<dyn ChatRepository>,
    pub jwt_secret: String,
    /// Demo credential that always signs in as the seeded administrator.
    pub demo_email: String,
    pub demo_password: String,
}

/// Demo login. The configured credential maps to the seeded administrator;
/// any other registered email is accepted without checking the password.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let email = req.email.trim().to_lowercase();
    let is_demo = email == state.demo_email.to_lowercase() && req.password == state.demo_password;

    let user: Option<User> = blocking(&state, move |repo| {
        let user = if is_demo {
            repo.get_user(unite_db::SEED_ADMIN_ID.parse::<Uuid>().map_err(anyhow::Error::from)?)?
        } else {
            None
        };
        match user {
            Some(user) => Ok(Some(user)),
            None => Ok(repo.get_user_by_email(&email)?),
        }
    })
    .await?;

    let Some(user) = user else {
        warn!("Login rejected for unknown email {}", req.email.trim());
        return Err(StatusCode::UNAUTHORIZED);
    };

    let token = create_token(&state.jwt_secret, &user).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    info!("User {} logged in{}", user.email, if is_demo { " (demo)" } else { "" });

    Ok(Json(LoginResponse {
        user_id: user.id,
        name: user.name,
        role: user.role,
        token,
    }))
}

pub fn create_token(secret: &str, user: &User) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};
    use unite_types::models::{Sector, UserRole};

    #[test]
    fn token_round_trips_claims() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Maria".into(),
            email: "maria@unite.com.br".into(),
            role: UserRole::Admin,
            sector: Sector::Vendas,
            created_at: chrono::Utc::now(),
        };
        let token = create_token("secret", &user).unwrap();
        let data = decode::<Claims>(&token, &DecodingKey::from_secret(b"secret"), &Validation::default()).unwrap();
        assert_eq!(data.claims.sub, user.id);
        assert_eq!(data.claims.role, UserRole::Admin);
        assert!(decode::<Claims>(&token, &DecodingKey::from_secret(b"other"), &Validation::default()).is_err());
    }
}
