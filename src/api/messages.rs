use crate::api::{render, render_with_status, see_other};
use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::MessageForm;
use crate::services::messages;
use crate::views::{MessageCard, MessageShowTemplate, NewMessageTemplate, UserCard};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use std::collections::HashSet;

#[utoipa::path(
    get,
    path = "/messages/new",
    responses(
        (status = 200, description = "Message form", content_type = "text/html", body = String)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "messages"
)]
pub async fn new_message_form(user: AuthenticatedUser) -> Result<HttpResponse> {
    render(NewMessageTemplate {
        current_user: Some(UserCard::from(&user.user)),
        error: String::new(),
    })
}

#[utoipa::path(
    post,
    path = "/messages/new",
    request_body(content = MessageForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Message created, redirect to the author's profile"),
        (status = 400, description = "Empty or too long", content_type = "text/html", body = String)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "messages"
)]
pub async fn create_message(
    form: web::Form<MessageForm>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse> {
    match messages::create(pool.get_ref(), &user.user, &form.text).await {
        Ok(_) => Ok(see_other(&format!("/users/{}", user.id()))),
        Err(AppError::Validation(msg)) => render_with_status(
            StatusCode::BAD_REQUEST,
            NewMessageTemplate {
                current_user: Some(UserCard::from(&user.user)),
                error: msg,
            },
        ),
        Err(e) => Err(e),
    }
}

#[utoipa::path(
    get,
    path = "/messages/{message_id}",
    params(
        ("message_id" = i32, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "A single message", content_type = "text/html", body = String),
        (status = 404, description = "No such message")
    ),
    tag = "messages"
)]
pub async fn show_message(
    path: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse> {
    let db = pool.get_ref();
    let (msg, author) = messages::get(db, path.into_inner()).await?;
    let viewer = user.as_ref().map(|u| &u.user);
    let liked_ids = match viewer {
        Some(v) => messages::liked_ids(db, v.id).await?,
        None => HashSet::new(),
    };

    render(MessageShowTemplate {
        current_user: viewer.map(UserCard::from),
        message: MessageCard::build(&msg, &author, viewer, &liked_ids),
    })
}

#[utoipa::path(
    post,
    path = "/messages/{message_id}/delete",
    params(
        ("message_id" = i32, Path, description = "Message ID")
    ),
    responses(
        (status = 303, description = "Message deleted, redirect to the author's profile"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such message")
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "messages"
)]
pub async fn delete_message(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse> {
    messages::delete(pool.get_ref(), &user.user, path.into_inner()).await?;
    Ok(see_other(&format!("/users/{}", user.id())))
}
