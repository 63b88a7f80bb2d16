use crate::auth::session_user_id;
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::user;
use crate::error::AppError;
use actix_web::{web, FromRequest, HttpRequest};
use sea_orm::EntityTrait;
use std::future::Future;
use std::pin::Pin;

/// The session user, loaded from the database.
///
/// Handlers taking `AuthenticatedUser` reject anonymous requests with
/// [`AppError::Unauthorized`]; take `Option<AuthenticatedUser>` for pages that
/// anonymous visitors may see.
pub struct AuthenticatedUser {
    pub user: user::Model,
}

impl AuthenticatedUser {
    pub fn id(&self) -> i32 {
        self.user.id
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user_id = req
            .app_data::<web::Data<Config>>()
            .and_then(|config| session_user_id(req, &config.auth.secret));
        let pool = req.app_data::<web::Data<DbPool>>().cloned();

        Box::pin(async move {
            let (user_id, pool) = match (user_id, pool) {
                (Some(user_id), Some(pool)) => (user_id, pool),
                _ => return Err(AppError::Unauthorized),
            };

            // Optional extractors drop this error, so it is logged here.
            let found = user::Entity::find_by_id(user_id)
                .one(pool.get_ref())
                .await
                .map_err(|e| {
                    log::warn!("Failed to load session user {}: {:?}", user_id, e);
                    AppError::from(e)
                })?;

            // A session can outlive its user (deleted account).
            match found {
                Some(user) => Ok(AuthenticatedUser { user }),
                None => Err(AppError::Unauthorized),
            }
        })
    }
}
