use crate::api::{connections, current_card, message_cards, render, render_with_status, see_other};
use crate::auth::{logout_cookie, AuthenticatedUser};
use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{ProfileForm, UserSearchQuery};
use crate::services::{messages, users};
use crate::views::{
    ConnectionsTemplate, EditProfileTemplate, LikesTemplate, UserCard, UserShowTemplate,
    UsersIndexTemplate,
};
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use std::collections::HashSet;

/// Number of messages shown on a profile page.
const PROFILE_MESSAGE_LIMIT: u64 = 100;

async fn viewer_following(db: &DbPool, viewer: &Option<AuthenticatedUser>) -> Result<HashSet<i32>> {
    match viewer {
        Some(auth) => Ok(users::following_ids(db, auth.id()).await?.into_iter().collect()),
        None => Ok(HashSet::new()),
    }
}

#[utoipa::path(
    get,
    path = "/users",
    params(
        ("q" = Option<String>, Query, description = "Only users whose username contains this")
    ),
    responses(
        (status = 200, description = "Users, each rendered as @username", content_type = "text/html", body = String)
    ),
    tag = "users"
)]
pub async fn list_users(
    user: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
    query: web::Query<UserSearchQuery>,
) -> Result<HttpResponse> {
    let db = pool.get_ref();
    let query = query.into_inner().q;
    let found = users::search(db, query.clone()).await?;
    let followed = viewer_following(db, &user).await?;

    render(UsersIndexTemplate {
        current_user: current_card(&user),
        query: query.unwrap_or_default(),
        users: connections(&found, &followed),
    })
}

#[utoipa::path(
    get,
    path = "/users/{user_id}",
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Profile with the user's messages", content_type = "text/html", body = String),
        (status = 404, description = "No such user")
    ),
    tag = "users"
)]
pub async fn show_user(
    path: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse> {
    let db = pool.get_ref();
    let target = users::get(db, path.into_inner()).await?;
    let rows = messages::by_user(db, target.id, PROFILE_MESSAGE_LIMIT).await?;
    let stats = users::stats(db, target.id).await?;

    let (followed, liked_ids) = match &user {
        Some(auth) => (
            users::is_following(db, auth.id(), target.id).await?,
            messages::liked_ids(db, auth.id()).await?,
        ),
        None => (false, HashSet::new()),
    };

    render(UserShowTemplate {
        current_user: current_card(&user),
        user: UserCard::from(&target),
        stats,
        followed,
        messages: message_cards(&rows, user.as_ref().map(|u| &u.user), &liked_ids),
    })
}

#[utoipa::path(
    get,
    path = "/users/{user_id}/following",
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Users followed by this user", content_type = "text/html", body = String),
        (status = 303, description = "Not logged in, redirect to /")
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "users"
)]
pub async fn show_following(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse> {
    let db = pool.get_ref();
    let target = users::get(db, path.into_inner()).await?;
    let listed = users::following(db, &target).await?;
    let viewer = Some(user);
    let followed = viewer_following(db, &viewer).await?;

    render(ConnectionsTemplate {
        current_user: current_card(&viewer),
        user: UserCard::from(&target),
        stats: users::stats(db, target.id).await?,
        heading: "Following".to_string(),
        users: connections(&listed, &followed),
    })
}

#[utoipa::path(
    get,
    path = "/users/{user_id}/followers",
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Users following this user", content_type = "text/html", body = String),
        (status = 303, description = "Not logged in, redirect to /")
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "users"
)]
pub async fn show_followers(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse> {
    let db = pool.get_ref();
    let target = users::get(db, path.into_inner()).await?;
    let listed = users::followers(db, &target).await?;
    let viewer = Some(user);
    let followed = viewer_following(db, &viewer).await?;

    render(ConnectionsTemplate {
        current_user: current_card(&viewer),
        user: UserCard::from(&target),
        stats: users::stats(db, target.id).await?,
        heading: "Followers".to_string(),
        users: connections(&listed, &followed),
    })
}

#[utoipa::path(
    get,
    path = "/users/{user_id}/likes",
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Messages liked by this user", content_type = "text/html", body = String),
        (status = 303, description = "Not logged in, redirect to /")
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "users"
)]
pub async fn show_likes(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse> {
    let db = pool.get_ref();
    let target = users::get(db, path.into_inner()).await?;
    let rows = messages::liked_messages(db, target.id).await?;
    let liked_ids = messages::liked_ids(db, user.id()).await?;
    let cards = message_cards(&rows, Some(&user.user), &liked_ids);

    render(LikesTemplate {
        current_user: Some(UserCard::from(&user.user)),
        user: UserCard::from(&target),
        stats: users::stats(db, target.id).await?,
        messages: cards,
    })
}

#[utoipa::path(
    post,
    path = "/users/follow/{user_id}",
    params(
        ("user_id" = i32, Path, description = "User to follow")
    ),
    responses(
        (status = 303, description = "Followed, redirect to the session user's following page"),
        (status = 400, description = "Cannot follow yourself"),
        (status = 404, description = "No such user")
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "users"
)]
pub async fn add_follow(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse> {
    users::follow(pool.get_ref(), &user.user, path.into_inner()).await?;
    Ok(see_other(&format!("/users/{}/following", user.id())))
}

#[utoipa::path(
    post,
    path = "/users/stop-following/{user_id}",
    params(
        ("user_id" = i32, Path, description = "User to unfollow")
    ),
    responses(
        (status = 303, description = "Unfollowed, redirect to the session user's following page")
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "users"
)]
pub async fn stop_following(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse> {
    users::stop_following(pool.get_ref(), &user.user, path.into_inner()).await?;
    Ok(see_other(&format!("/users/{}/following", user.id())))
}

#[utoipa::path(
    get,
    path = "/users/profile",
    responses(
        (status = 200, description = "Profile edit form", content_type = "text/html", body = String)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "users"
)]
pub async fn edit_profile_form(user: AuthenticatedUser) -> Result<HttpResponse> {
    let card = UserCard::from(&user.user);
    render(EditProfileTemplate {
        current_user: Some(card.clone()),
        user: card,
        error: String::new(),
    })
}

#[utoipa::path(
    post,
    path = "/users/profile",
    request_body(content = ProfileForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Profile updated, redirect to the profile"),
        (status = 401, description = "Wrong password", content_type = "text/html", body = String),
        (status = 409, description = "Username or email already taken", content_type = "text/html", body = String)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "users"
)]
pub async fn edit_profile(
    form: web::Form<ProfileForm>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse> {
    let db = pool.get_ref();
    let form = form.into_inner();
    let card = UserCard::from(&user.user);

    let confirmed = users::authenticate(db, &user.user.username, &form.password).await?;
    if confirmed.is_none() {
        return render_with_status(
            StatusCode::UNAUTHORIZED,
            EditProfileTemplate {
                current_user: Some(card.clone()),
                user: card,
                error: "Wrong password, please try again.".to_string(),
            },
        );
    }

    let user_id = user.id();
    let (status, error) = match users::update_profile(db, user.user, form.into()).await {
        Ok(_) => return Ok(see_other(&format!("/users/{user_id}"))),
        Err(AppError::Integrity(_)) => (
            StatusCode::CONFLICT,
            "Username or email already taken".to_string(),
        ),
        Err(AppError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg),
        Err(e) => return Err(e),
    };

    render_with_status(
        status,
        EditProfileTemplate {
            current_user: Some(card.clone()),
            user: card,
            error,
        },
    )
}

#[utoipa::path(
    post,
    path = "/users/delete",
    responses(
        (status = 303, description = "Account and owned data deleted, redirect to /signup")
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "users"
)]
pub async fn delete_user(user: AuthenticatedUser, pool: web::Data<DbPool>) -> Result<HttpResponse> {
    users::delete(pool.get_ref(), &user.user).await?;

    Ok(HttpResponse::SeeOther()
        .append_header((header::LOCATION, "/signup"))
        .cookie(logout_cookie())
        .finish())
}

#[utoipa::path(
    post,
    path = "/users/add_like/{message_id}",
    params(
        ("message_id" = i32, Path, description = "Message to like or unlike")
    ),
    responses(
        (status = 303, description = "Like toggled, redirect back"),
        (status = 403, description = "Cannot like your own message"),
        (status = 404, description = "No such message")
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "users"
)]
pub async fn add_like(
    req: HttpRequest,
    path: web::Path<i32>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse> {
    messages::toggle_like(pool.get_ref(), &user.user, path.into_inner()).await?;

    let back = req
        .headers()
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(local_path)
        .unwrap_or("/");
    Ok(see_other(back))
}

/// `referer` as a redirect target, if it stays on this site.
///
/// Only absolute paths are accepted; full URLs and protocol-relative `//host`
/// references are dropped.
fn local_path(referer: &str) -> Option<&str> {
    if referer.starts_with('/') && !referer.starts_with("//") && !referer.starts_with("/\\") {
        Some(referer)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::local_path;

    #[test]
    fn only_local_paths_are_redirect_targets() {
        assert_eq!(local_path("/users/3/likes"), Some("/users/3/likes"));
        assert_eq!(local_path("/"), Some("/"));
        assert_eq!(local_path("https://evil.example/phish"), None);
        assert_eq!(local_path("//evil.example/phish"), None);
        assert_eq!(local_path("/\\evil.example"), None);
        assert_eq!(local_path("users/3"), None);
    }
}
