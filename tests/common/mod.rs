#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::{test, web, App};
use warbler::auth::login_cookie;
use warbler::config::{AuthConfig, Config, DatabaseConfig, ServerConfig};
use warbler::db::{self, DbPool};
use warbler::entities::{message, user};
use warbler::models::NewUser;
use warbler::services::{messages, users};
use warbler::api;

/// Configuration for tests: a private in-memory SQLite database and the
/// cheapest bcrypt cost.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            // Each in-memory connection is its own database, so keep one.
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        auth: AuthConfig {
            secret: "test-secret".to_string(),
            session_hours: 1,
            bcrypt_cost: 4,
        },
    }
}

/// Fresh database with the schema created.
pub async fn setup_db() -> DbPool {
    db::create_pool(&test_config())
        .await
        .expect("Failed to create test database")
}

pub async fn signup(db: &DbPool, username: &str, password: &str) -> user::Model {
    users::signup(
        db,
        NewUser {
            username: username.to_string(),
            email: format!("{}@test.com", username),
            password: Some(password.to_string()),
            image_url: None,
        },
        test_config().auth.bcrypt_cost,
    )
    .await
    .expect("Failed to sign up test user")
}

pub async fn post_message(db: &DbPool, author: &user::Model, text: &str) -> message::Model {
    messages::create(db, author, text)
        .await
        .expect("Failed to create test message")
}

/// Session cookie logging in `user_id`, as the browser would send it.
pub fn session_for(user_id: i32) -> Cookie<'static> {
    login_cookie(&test_config().auth, user_id).expect("Failed to create session cookie")
}

/// Helper function to create a test app
pub fn create_test_app(
    db: DbPool,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(test_config()))
        .app_data(web::Data::new(db))
        .configure(api::configure)
        .default_service(web::to(api::not_found))
}

pub async fn body_text(resp: actix_web::dev::ServiceResponse) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).expect("Response body is not UTF-8")
}

pub fn location(resp: &actix_web::dev::ServiceResponse) -> String {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .expect("Response has no Location header")
        .to_str()
        .unwrap()
        .to_string()
}
