use crate::api::{current_card, message_cards, render};
use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::error::Result;
use crate::services::{messages, users};
use crate::views::{AnonHomeTemplate, HomeTemplate, UserCard};
use actix_web::{web, HttpResponse};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Timeline of followed users' and own messages, or the landing page", content_type = "text/html", body = String)
    ),
    tag = "home"
)]
pub async fn home(
    user: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse> {
    let me = match &user {
        Some(auth) => &auth.user,
        None => return render(AnonHomeTemplate { current_user: None }),
    };

    let db = pool.get_ref();
    let timeline = messages::timeline(db, me, messages::TIMELINE_LIMIT).await?;
    let liked_ids = messages::liked_ids(db, me.id).await?;
    let stats = users::stats(db, me.id).await?;

    render(HomeTemplate {
        current_user: current_card(&user),
        user: UserCard::from(me),
        stats,
        messages: message_cards(&timeline, Some(me), &liked_ids),
    })
}
