//! Askama page templates and the view models they render.

use crate::entities::{message, user};
use crate::models::UserStats;
use askama::Template;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct UserCard {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: String,
    pub location: String,
}

impl From<&user::Model> for UserCard {
    fn from(user: &user::Model) -> Self {
        UserCard {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            image_url: user.image_url.clone(),
            header_image_url: user.header_image_url.clone(),
            bio: user.bio.clone().unwrap_or_default(),
            location: user.location.clone().unwrap_or_default(),
        }
    }
}

/// A user in a list, with whether the viewer follows them.
#[derive(Debug, Clone)]
pub struct Connection {
    pub user: UserCard,
    pub followed: bool,
}

#[derive(Debug, Clone)]
pub struct MessageCard {
    pub id: i32,
    pub text: String,
    pub timestamp: String,
    pub author: UserCard,
    pub liked: bool,
    pub own: bool,
}

impl MessageCard {
    /// `viewer` decides the like star and the delete button.
    pub fn build(
        msg: &message::Model,
        author: &user::Model,
        viewer: Option<&user::Model>,
        liked_ids: &HashSet<i32>,
    ) -> Self {
        MessageCard {
            id: msg.id,
            text: msg.text.clone(),
            timestamp: msg.timestamp.format("%d %B %Y").to_string(),
            author: UserCard::from(author),
            liked: liked_ids.contains(&msg.id),
            own: viewer.map(|v| v.id == author.id).unwrap_or(false),
        }
    }
}

#[derive(Template)]
#[template(path = "home-anon.html")]
pub struct AnonHomeTemplate {
    pub current_user: Option<UserCard>,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_user: Option<UserCard>,
    pub user: UserCard,
    pub stats: UserStats,
    pub messages: Vec<MessageCard>,
}

#[derive(Template)]
#[template(path = "users/signup.html")]
pub struct SignupTemplate {
    pub current_user: Option<UserCard>,
    pub error: String,
}

#[derive(Template)]
#[template(path = "users/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<UserCard>,
    pub error: String,
}

#[derive(Template)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub current_user: Option<UserCard>,
    pub query: String,
    pub users: Vec<Connection>,
}

#[derive(Template)]
#[template(path = "users/show.html")]
pub struct UserShowTemplate {
    pub current_user: Option<UserCard>,
    pub user: UserCard,
    pub stats: UserStats,
    pub followed: bool,
    pub messages: Vec<MessageCard>,
}

/// Following and followers pages.
#[derive(Template)]
#[template(path = "users/connections.html")]
pub struct ConnectionsTemplate {
    pub current_user: Option<UserCard>,
    pub user: UserCard,
    pub stats: UserStats,
    pub heading: String,
    pub users: Vec<Connection>,
}

#[derive(Template)]
#[template(path = "users/likes.html")]
pub struct LikesTemplate {
    pub current_user: Option<UserCard>,
    pub user: UserCard,
    pub stats: UserStats,
    pub messages: Vec<MessageCard>,
}

#[derive(Template)]
#[template(path = "users/edit.html")]
pub struct EditProfileTemplate {
    pub current_user: Option<UserCard>,
    pub user: UserCard,
    pub error: String,
}

#[derive(Template)]
#[template(path = "messages/new.html")]
pub struct NewMessageTemplate {
    pub current_user: Option<UserCard>,
    pub error: String,
}

#[derive(Template)]
#[template(path = "messages/show.html")]
pub struct MessageShowTemplate {
    pub current_user: Option<UserCard>,
    pub message: MessageCard,
}

#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub current_user: Option<UserCard>,
}
