//! User accounts and the follow graph.

use crate::auth::{hash_password, verify_password};
use crate::db::DbPool;
use crate::entities::{follows, likes, message, user};
use crate::error::{AppError, Result};
use crate::models::{NewUser, ProfileUpdate, UserStats};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

/// Treats blank form fields as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Hashes the password and inserts the user.
///
/// A missing password is rejected before the database is touched. Duplicate
/// usernames or emails come back from the unique constraints as
/// [`AppError::Integrity`].
pub async fn signup<C: ConnectionTrait>(
    db: &C,
    new_user: NewUser,
    bcrypt_cost: u32,
) -> Result<user::Model> {
    // Blank means missing, but the password is hashed exactly as typed.
    let password = match new_user.password.filter(|p| !p.trim().is_empty()) {
        Some(password) => password,
        None => return Err(AppError::Validation("password must not be empty".to_string())),
    };

    let username = new_user.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("username must not be empty".to_string()));
    }
    let email = new_user.email.trim().to_string();
    if !email.contains('@') {
        return Err(AppError::Validation(format!("invalid email address: {email:?}")));
    }

    let password_hash =
        hash_password(&password, bcrypt_cost).map_err(|e| AppError::Internal(e.to_string()))?;

    let new_user = user::ActiveModel {
        email: Set(email),
        username: Set(username),
        image_url: Set(non_blank(new_user.image_url)
            .unwrap_or_else(|| user::DEFAULT_IMAGE_URL.to_string())),
        header_image_url: Set(user::DEFAULT_HEADER_IMAGE_URL.to_string()),
        bio: Set(None),
        location: Set(None),
        password: Set(password_hash),
        ..Default::default()
    };

    let user = user::Entity::insert(new_user)
        .exec_with_returning(db)
        .await?;

    log::info!("Signed up user {} ({})", user.username, user.id);
    Ok(user)
}

/// Returns the user when `username` exists and `password` matches, `None`
/// otherwise.
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
) -> Result<Option<user::Model>> {
    let user = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;

    Ok(user.filter(|u| verify_password(password, &u.password)))
}

pub async fn find<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Option<user::Model>> {
    Ok(user::Entity::find_by_id(user_id).one(db).await?)
}

pub async fn get<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<user::Model> {
    find(db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))
}

/// All users, or those whose username contains `query`.
pub async fn search<C: ConnectionTrait>(db: &C, query: Option<String>) -> Result<Vec<user::Model>> {
    let mut select = user::Entity::find();
    if let Some(q) = non_blank(query) {
        select = select.filter(user::Column::Username.contains(&q));
    }

    Ok(select
        .order_by_asc(user::Column::Username)
        .all(db)
        .await?)
}

/// Adds the edge `follower -> followed_id`. Following twice is a no-op.
pub async fn follow<C: ConnectionTrait>(
    db: &C,
    follower: &user::Model,
    followed_id: i32,
) -> Result<()> {
    if follower.id == followed_id {
        return Err(AppError::Validation("users cannot follow themselves".to_string()));
    }
    get(db, followed_id).await?;

    if is_following(db, follower.id, followed_id).await? {
        return Ok(());
    }

    let edge = follows::ActiveModel {
        user_being_followed_id: Set(followed_id),
        user_following_id: Set(follower.id),
    };
    follows::Entity::insert(edge).exec(db).await?;

    log::info!("User {} now follows {}", follower.id, followed_id);
    Ok(())
}

pub async fn stop_following<C: ConnectionTrait>(
    db: &C,
    follower: &user::Model,
    followed_id: i32,
) -> Result<()> {
    let result = follows::Entity::delete_many()
        .filter(follows::Column::UserFollowingId.eq(follower.id))
        .filter(follows::Column::UserBeingFollowedId.eq(followed_id))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        log::info!("User {} stopped following {}", follower.id, followed_id);
    }
    Ok(())
}

/// Does `user_id` follow `other_id`?
pub async fn is_following<C: ConnectionTrait>(db: &C, user_id: i32, other_id: i32) -> Result<bool> {
    let edge = follows::Entity::find()
        .filter(follows::Column::UserFollowingId.eq(user_id))
        .filter(follows::Column::UserBeingFollowedId.eq(other_id))
        .one(db)
        .await?;
    Ok(edge.is_some())
}

/// Is `user_id` followed by `other_id`?
pub async fn is_followed_by<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    other_id: i32,
) -> Result<bool> {
    is_following(db, other_id, user_id).await
}

pub async fn followers<C: ConnectionTrait>(db: &C, user: &user::Model) -> Result<Vec<user::Model>> {
    Ok(user
        .find_linked(user::Followers)
        .order_by_asc(user::Column::Username)
        .all(db)
        .await?)
}

pub async fn following<C: ConnectionTrait>(db: &C, user: &user::Model) -> Result<Vec<user::Model>> {
    Ok(user
        .find_linked(user::Following)
        .order_by_asc(user::Column::Username)
        .all(db)
        .await?)
}

/// Ids of the users `user_id` follows.
pub async fn following_ids<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<i32>> {
    Ok(follows::Entity::find()
        .filter(follows::Column::UserFollowingId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|edge| edge.user_being_followed_id)
        .collect())
}

pub async fn stats<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<UserStats> {
    let messages = message::Entity::find()
        .filter(message::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    let following = follows::Entity::find()
        .filter(follows::Column::UserFollowingId.eq(user_id))
        .count(db)
        .await?;
    let followers = follows::Entity::find()
        .filter(follows::Column::UserBeingFollowedId.eq(user_id))
        .count(db)
        .await?;
    let likes = likes::Entity::find()
        .filter(likes::Column::UserId.eq(user_id))
        .count(db)
        .await?;

    Ok(UserStats {
        messages,
        following,
        followers,
        likes,
    })
}

/// Blank image fields fall back to the defaults.
pub async fn update_profile<C: ConnectionTrait>(
    db: &C,
    user: user::Model,
    update: ProfileUpdate,
) -> Result<user::Model> {
    let username = update.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("username must not be empty".to_string()));
    }
    let email = update.email.trim().to_string();
    if !email.contains('@') {
        return Err(AppError::Validation(format!("invalid email address: {email:?}")));
    }

    let mut active: user::ActiveModel = user.into();
    active.username = Set(username);
    active.email = Set(email);
    active.image_url =
        Set(non_blank(update.image_url).unwrap_or_else(|| user::DEFAULT_IMAGE_URL.to_string()));
    active.header_image_url = Set(non_blank(update.header_image_url)
        .unwrap_or_else(|| user::DEFAULT_HEADER_IMAGE_URL.to_string()));
    active.bio = Set(non_blank(update.bio));
    active.location = Set(non_blank(update.location));

    Ok(active.update(db).await?)
}

/// Deletes the user together with everything that references it, in one
/// transaction.
pub async fn delete(db: &DbPool, user: &user::Model) -> Result<()> {
    let txn = db.begin().await?;

    let message_ids: Vec<i32> = message::Entity::find()
        .filter(message::Column::UserId.eq(user.id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();

    likes::Entity::delete_many()
        .filter(
            Condition::any()
                .add(likes::Column::UserId.eq(user.id))
                .add(likes::Column::MessageId.is_in(message_ids)),
        )
        .exec(&txn)
        .await?;

    follows::Entity::delete_many()
        .filter(
            Condition::any()
                .add(follows::Column::UserFollowingId.eq(user.id))
                .add(follows::Column::UserBeingFollowedId.eq(user.id)),
        )
        .exec(&txn)
        .await?;

    message::Entity::delete_many()
        .filter(message::Column::UserId.eq(user.id))
        .exec(&txn)
        .await?;

    user.clone().delete(&txn).await?;
    txn.commit().await?;

    log::info!("Deleted user {} ({})", user.username, user.id);
    Ok(())
}
