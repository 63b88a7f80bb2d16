pub mod messages;
pub mod users;
