use serde::Deserialize;

#[derive(Deserialize)]
pub struct CommentForm {
    pub text: String,
}
