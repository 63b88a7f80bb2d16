use serde::Deserialize;
use utoipa::ToSchema;

/// Input for [`crate::services::users::signup`].
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    pub image_url: Option<String>,
}

impl From<SignupForm> for NewUser {
    fn from(form: SignupForm) -> Self {
        NewUser {
            username: form.username,
            email: form.email,
            password: form.password,
            image_url: form.image_url,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Profile edit form; `password` confirms the change.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl From<ProfileForm> for ProfileUpdate {
    fn from(form: ProfileForm) -> Self {
        ProfileUpdate {
            username: form.username,
            email: form.email,
            image_url: form.image_url,
            header_image_url: form.header_image_url,
            bio: form.bio,
            location: form.location,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserSearchQuery {
    #[schema(example = "user")]
    pub q: Option<String>,
}

/// Counters shown on profile pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub messages: u64,
    pub following: u64,
    pub followers: u64,
    pub likes: u64,
}
