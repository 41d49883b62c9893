pub mod comment_form;
pub mod login_form;
pub mod password_forms;
pub mod post_form;
pub mod signup_form;
