use serde::Deserialize;

#[derive(Deserialize)]
pub struct PasswordChangeForm {
    pub old_password: String,
    pub new_password1: String,
    pub new_password2: String,
}

#[derive(Deserialize)]
pub struct PasswordResetForm {
    pub email: String,
}

#[derive(Deserialize)]
pub struct PasswordResetConfirmForm {
    pub new_password1: String,
    pub new_password2: String,
}
