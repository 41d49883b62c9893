pub mod add_comment;
pub mod follow_index;
pub mod group_list;
pub mod index;
pub mod login_route;
pub mod logout_route;
pub mod not_found;
pub mod password_change_route;
pub mod password_reset_route;
pub mod post_create;
pub mod post_detail;
pub mod post_edit;
pub mod profile;
pub mod profile_follow;
pub mod signup_route;
