use crate::config::AuthConfig;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the cookie holding the logged-in user's session token.
pub const CURR_USER_KEY: &str = "curr_user";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i32, session_hours: i64) -> Self {
        let now = Utc::now();
        Claims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: (now + Duration::hours(session_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

pub fn create_token(claims: &Claims, secret: &str) -> Result<String, anyhow::Error> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, anyhow::Error> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;
    Ok(token_data.claims)
}

/// Session cookie marking `user_id` as logged in.
pub fn login_cookie(config: &AuthConfig, user_id: i32) -> Result<Cookie<'static>, anyhow::Error> {
    let claims = Claims::new(user_id, config.session_hours);
    let token = create_token(&claims, &config.secret)?;

    Ok(Cookie::build(CURR_USER_KEY, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish())
}

pub fn logout_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(CURR_USER_KEY, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// User id carried by the request's session cookie. Missing, expired and
/// tampered cookies all read as anonymous.
pub fn session_user_id(req: &HttpRequest, secret: &str) -> Option<i32> {
    let cookie = req.cookie(CURR_USER_KEY)?;
    match verify_token(cookie.value(), secret) {
        Ok(claims) => claims.user_id(),
        Err(e) => {
            log::debug!("Ignoring invalid session cookie: {:?}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            secret: "test-secret".to_string(),
            session_hours: 1,
            bcrypt_cost: 4,
        }
    }

    #[test]
    fn cookie_identifies_user() {
        let config = auth_config();
        let cookie = login_cookie(&config, 1122).unwrap();
        let req = TestRequest::default().cookie(cookie).to_http_request();
        assert_eq!(session_user_id(&req, &config.secret), Some(1122));
    }

    #[test]
    fn cookie_signed_with_other_secret_is_anonymous() {
        let cookie = login_cookie(&auth_config(), 1122).unwrap();
        let req = TestRequest::default().cookie(cookie).to_http_request();
        assert_eq!(session_user_id(&req, "another-secret"), None);
    }

    #[test]
    fn expired_session_is_anonymous() {
        let config = auth_config();
        let claims = Claims::new(7, -2);
        let token = create_token(&claims, &config.secret).unwrap();
        let req = TestRequest::default()
            .cookie(Cookie::new(CURR_USER_KEY, token))
            .to_http_request();
        assert_eq!(session_user_id(&req, &config.secret), None);
    }

    #[test]
    fn no_cookie_is_anonymous() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(session_user_id(&req, "test-secret"), None);
    }
}
