//! Messages ("warbles") and likes.

use crate::db::DbPool;
use crate::entities::{likes, message, user};
use crate::error::{AppError, Result};
use crate::services::users;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Set, TransactionTrait,
};
use sea_orm::sea_query::JoinType;
use std::collections::HashSet;

/// Number of messages on the home timeline.
pub const TIMELINE_LIMIT: u64 = 100;

pub type MessageWithAuthor = (message::Model, user::Model);

fn with_authors(rows: Vec<(message::Model, Option<user::Model>)>) -> Vec<MessageWithAuthor> {
    rows.into_iter()
        .filter_map(|(msg, author)| author.map(|author| (msg, author)))
        .collect()
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    author: &user::Model,
    text: &str,
) -> Result<message::Model> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("message text must not be empty".to_string()));
    }
    if text.chars().count() > message::MAX_TEXT_LEN {
        return Err(AppError::Validation(format!(
            "message text must be at most {} characters",
            message::MAX_TEXT_LEN
        )));
    }

    let new_message = message::ActiveModel {
        text: Set(text.to_string()),
        timestamp: Set(Utc::now()),
        user_id: Set(author.id),
        ..Default::default()
    };

    let msg = message::Entity::insert(new_message)
        .exec_with_returning(db)
        .await?;

    log::debug!("User {} posted message {}", author.id, msg.id);
    Ok(msg)
}

pub async fn get<C: ConnectionTrait>(db: &C, message_id: i32) -> Result<MessageWithAuthor> {
    let row = message::Entity::find_by_id(message_id)
        .find_also_related(user::Entity)
        .one(db)
        .await?;

    match row {
        Some((msg, Some(author))) => Ok((msg, author)),
        _ => Err(AppError::NotFound(format!("message {message_id}"))),
    }
}

/// Only the author may delete a message.
pub async fn delete(db: &DbPool, user: &user::Model, message_id: i32) -> Result<()> {
    let msg = message::Entity::find_by_id(message_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("message {message_id}")))?;

    if msg.user_id != user.id {
        return Err(AppError::Forbidden(
            "only the author may delete a message".to_string(),
        ));
    }

    let txn = db.begin().await?;
    likes::Entity::delete_many()
        .filter(likes::Column::MessageId.eq(msg.id))
        .exec(&txn)
        .await?;
    message::Entity::delete_by_id(msg.id).exec(&txn).await?;
    txn.commit().await?;

    log::info!("User {} deleted message {}", user.id, message_id);
    Ok(())
}

/// Likes the message, or removes the like if it is already there.
///
/// Returns whether the message is liked afterwards.
pub async fn toggle_like<C: ConnectionTrait>(
    db: &C,
    user: &user::Model,
    message_id: i32,
) -> Result<bool> {
    let removed = likes::Entity::delete_many()
        .filter(likes::Column::UserId.eq(user.id))
        .filter(likes::Column::MessageId.eq(message_id))
        .exec(db)
        .await?;

    if removed.rows_affected > 0 {
        log::debug!("User {} unliked message {}", user.id, message_id);
        return Ok(false);
    }

    let msg = message::Entity::find_by_id(message_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("message {message_id}")))?;

    if msg.user_id == user.id {
        return Err(AppError::Forbidden(
            "users cannot like their own messages".to_string(),
        ));
    }

    let like = likes::ActiveModel {
        user_id: Set(user.id),
        message_id: Set(msg.id),
    };
    likes::Entity::insert(like).exec(db).await?;

    log::debug!("User {} liked message {}", user.id, message_id);
    Ok(true)
}

/// Messages `user_id` liked, newest first.
pub async fn liked_messages<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<MessageWithAuthor>> {
    let rows = message::Entity::find()
        .join(JoinType::InnerJoin, message::Relation::Likes.def())
        .filter(likes::Column::UserId.eq(user_id))
        .find_also_related(user::Entity)
        .order_by_desc(message::Column::Timestamp)
        .all(db)
        .await?;

    Ok(with_authors(rows))
}

pub async fn liked_ids<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<HashSet<i32>> {
    Ok(likes::Entity::find()
        .filter(likes::Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|like| like.message_id)
        .collect())
}

/// A user's own messages, newest first.
pub async fn by_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    limit: u64,
) -> Result<Vec<MessageWithAuthor>> {
    let rows = message::Entity::find()
        .filter(message::Column::UserId.eq(user_id))
        .find_also_related(user::Entity)
        .order_by_desc(message::Column::Timestamp)
        .limit(limit)
        .all(db)
        .await?;

    Ok(with_authors(rows))
}

/// Messages by `user` and everyone `user` follows, newest first.
pub async fn timeline<C: ConnectionTrait>(
    db: &C,
    user: &user::Model,
    limit: u64,
) -> Result<Vec<MessageWithAuthor>> {
    let mut author_ids = users::following_ids(db, user.id).await?;
    author_ids.push(user.id);

    let rows = message::Entity::find()
        .filter(message::Column::UserId.is_in(author_ids))
        .find_also_related(user::Entity)
        .order_by_desc(message::Column::Timestamp)
        .limit(limit)
        .all(db)
        .await?;

    Ok(with_authors(rows))
}
