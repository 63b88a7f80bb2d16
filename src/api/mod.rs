pub mod auth;
pub mod home;
pub mod messages;
pub mod users;

use crate::auth::AuthenticatedUser;
use crate::entities::user;
use crate::error::Result;
use crate::models::{LoginForm, MessageForm, ProfileForm, SignupForm, UserSearchQuery};
use crate::services::messages::MessageWithAuthor;
use crate::views::{Connection, MessageCard, NotFoundTemplate, UserCard};
use actix_files::Files;
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpResponse};
use askama::Template;
use std::collections::HashSet;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Home
        home::home,
        // Auth endpoints
        auth::signup_form,
        auth::signup,
        auth::login_form,
        auth::login,
        auth::logout,
        // User endpoints
        users::list_users,
        users::show_user,
        users::show_following,
        users::show_followers,
        users::show_likes,
        users::add_follow,
        users::stop_following,
        users::edit_profile_form,
        users::edit_profile,
        users::delete_user,
        users::add_like,
        // Message endpoints
        messages::new_message_form,
        messages::create_message,
        messages::show_message,
        messages::delete_message,
    ),
    components(schemas(
        SignupForm,
        LoginForm,
        ProfileForm,
        MessageForm,
        UserSearchQuery,
    )),
    tags(
        (name = "home", description = "Timeline"),
        (name = "auth", description = "Sign up, log in and log out"),
        (name = "users", description = "Profiles, follows and likes"),
        (name = "messages", description = "Messages"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

use utoipa::Modify;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Cookie(
                        utoipa::openapi::security::ApiKeyValue::new(
                            crate::auth::CURR_USER_KEY,
                        ),
                    ),
                ),
            )
        }
    }
}

/// Stylesheets and default profile images, relative to the working directory.
pub const STATIC_DIR: &str = "static";

/// Registers every page route, the API docs and the static assets.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home::home))
        .route("/signup", web::get().to(auth::signup_form))
        .route("/signup", web::post().to(auth::signup))
        .route("/login", web::get().to(auth::login_form))
        .route("/login", web::post().to(auth::login))
        .route("/logout", web::get().to(auth::logout))
        .service(
            web::scope("/users")
                .route("", web::get().to(users::list_users))
                .route("/profile", web::get().to(users::edit_profile_form))
                .route("/profile", web::post().to(users::edit_profile))
                .route("/delete", web::post().to(users::delete_user))
                .route("/follow/{user_id}", web::post().to(users::add_follow))
                .route(
                    "/stop-following/{user_id}",
                    web::post().to(users::stop_following),
                )
                .route("/add_like/{message_id}", web::post().to(users::add_like))
                .route("/{user_id}", web::get().to(users::show_user))
                .route("/{user_id}/following", web::get().to(users::show_following))
                .route("/{user_id}/followers", web::get().to(users::show_followers))
                .route("/{user_id}/likes", web::get().to(users::show_likes)),
        )
        .service(
            web::scope("/messages")
                .route("/new", web::get().to(messages::new_message_form))
                .route("/new", web::post().to(messages::create_message))
                .route("/{message_id}", web::get().to(messages::show_message))
                .route(
                    "/{message_id}/delete",
                    web::post().to(messages::delete_message),
                ),
        )
        .route(
            "/api/docs",
            web::get().to(|| async {
                HttpResponse::PermanentRedirect()
                    .append_header((header::LOCATION, "/api/docs/"))
                    .finish()
            }),
        )
        .service(
            SwaggerUi::new("/api/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .service(Files::new("/static", STATIC_DIR));
}

/// Fallback for unmatched routes.
pub async fn not_found(user: Option<AuthenticatedUser>) -> Result<HttpResponse> {
    render_with_status(
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            current_user: current_card(&user),
        },
    )
}

pub(crate) fn render<T: Template>(template: T) -> Result<HttpResponse> {
    render_with_status(StatusCode::OK, template)
}

pub(crate) fn render_with_status<T: Template>(status: StatusCode, template: T) -> Result<HttpResponse> {
    let body = template.render()?;
    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body))
}

pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, location))
        .finish()
}

pub(crate) fn current_card(user: &Option<AuthenticatedUser>) -> Option<UserCard> {
    user.as_ref().map(|u| UserCard::from(&u.user))
}

pub(crate) fn connections(users: &[user::Model], followed_ids: &HashSet<i32>) -> Vec<Connection> {
    users
        .iter()
        .map(|u| Connection {
            user: UserCard::from(u),
            followed: followed_ids.contains(&u.id),
        })
        .collect()
}

pub(crate) fn message_cards(
    rows: &[MessageWithAuthor],
    viewer: Option<&user::Model>,
    liked_ids: &HashSet<i32>,
) -> Vec<MessageCard> {
    rows.iter()
        .map(|(msg, author)| MessageCard::build(msg, author, viewer, liked_ids))
        .collect()
}
