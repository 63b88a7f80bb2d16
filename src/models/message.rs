use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct MessageForm {
    #[schema(example = "Hello, Warbler!")]
    pub text: String,
}
