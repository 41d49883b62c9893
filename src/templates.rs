use askama::Template;
use time::{macros::format_description, OffsetDateTime};

use crate::models::comment::Comment;
use crate::models::post::Post;
use crate::utils::pagination::Page;

pub fn format_created_at(created_at: OffsetDateTime) -> String {
    let format = format_description!("[day] [month repr:short] [year], [hour]:[minute]");
    created_at.format(&format).unwrap_or_default()
}

/// One post, display-ready.
pub struct PostCard {
    pub id: i64,
    pub author_username: String,
    pub text: String,
    pub group: Option<GroupRef>,
    pub image_url: Option<String>,
    pub created_at: String,
}

pub struct GroupRef {
    pub title: String,
    pub slug: String,
}

impl From<Post> for PostCard {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_username: post.author_username,
            text: post.text,
            group: match (post.group_title, post.group_slug) {
                (Some(title), Some(slug)) => Some(GroupRef { title, slug }),
                _ => None,
            },
            image_url: post.image.map(|name| format!("/media/{name}")),
            created_at: format_created_at(post.created_at),
        }
    }
}

pub struct CommentCard {
    pub author_username: String,
    pub text: String,
    pub created_at: String,
}

impl From<Comment> for CommentCard {
    fn from(comment: Comment) -> Self {
        Self {
            author_username: comment.author_username,
            text: comment.text,
            created_at: format_created_at(comment.created_at),
        }
    }
}

/// Paginator state for the page-switcher nav.
pub struct PageNav {
    pub number: i64,
    pub num_pages: i64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous: i64,
    pub next: i64,
}

impl From<&Page> for PageNav {
    fn from(page: &Page) -> Self {
        Self {
            number: page.number,
            num_pages: page.num_pages,
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous: page.number - 1,
            next: page.number + 1,
        }
    }
}

pub struct GroupOption {
    pub id: i64,
    pub title: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub current_user: Option<String>,
    pub posts: Vec<PostCard>,
    pub page: PageNav,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupListTemplate {
    pub current_user: Option<String>,
    pub group_title: String,
    pub group_slug: String,
    pub group_description: String,
    pub posts: Vec<PostCard>,
    pub page: PageNav,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfileTemplate {
    pub current_user: Option<String>,
    pub author_username: String,
    pub posts_count: i64,
    pub following: bool,
    pub is_self: bool,
    pub posts: Vec<PostCard>,
    pub page: PageNav,
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailTemplate {
    pub current_user: Option<String>,
    pub post: PostCard,
    pub comments: Vec<CommentCard>,
    pub comments_count: i64,
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct PostFormTemplate {
    pub current_user: Option<String>,
    pub is_edit: bool,
    pub action: String,
    pub text: String,
    pub groups: Vec<GroupOption>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "posts/follow.html")]
pub struct FollowTemplate {
    pub current_user: Option<String>,
    pub posts: Vec<PostCard>,
    pub page: PageNav,
}

#[derive(Template)]
#[template(path = "users/signup.html")]
pub struct SignupTemplate {
    pub current_user: Option<String>,
    pub error: Option<String>,
    pub username: String,
    pub email: String,
}

#[derive(Template)]
#[template(path = "users/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<String>,
    pub error: Option<String>,
    pub next: String,
}

#[derive(Template)]
#[template(path = "users/logged_out.html")]
pub struct LoggedOutTemplate {
    pub current_user: Option<String>,
}

#[derive(Template)]
#[template(path = "users/password_change_form.html")]
pub struct PasswordChangeTemplate {
    pub current_user: Option<String>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "users/password_change_done.html")]
pub struct PasswordChangeDoneTemplate {
    pub current_user: Option<String>,
}

#[derive(Template)]
#[template(path = "users/password_reset_form.html")]
pub struct PasswordResetTemplate {
    pub current_user: Option<String>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "users/password_reset_done.html")]
pub struct PasswordResetDoneTemplate {
    pub current_user: Option<String>,
}

#[derive(Template)]
#[template(path = "users/password_reset_confirm.html")]
pub struct PasswordResetConfirmTemplate {
    pub current_user: Option<String>,
    pub token: String,
    pub valid_link: bool,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "users/password_reset_complete.html")]
pub struct PasswordResetCompleteTemplate {
    pub current_user: Option<String>,
}

#[derive(Template)]
#[template(path = "core/404.html")]
pub struct NotFoundTemplate {
    pub current_user: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample_card() -> PostCard {
        PostCard::from(Post {
            id: 7,
            text: "An evening in the mountains".to_string(),
            image: Some("posts/small.gif".to_string()),
            created_at: datetime!(2023-03-05 22:19 UTC),
            author_username: "NoName".to_string(),
            group_title: Some("Travel notes".to_string()),
            group_slug: Some("travel".to_string()),
        })
    }

    fn one_page() -> PageNav {
        PageNav {
            number: 1,
            num_pages: 1,
            has_previous: false,
            has_next: false,
            previous: 0,
            next: 2,
        }
    }

    #[test]
    fn post_card_resolves_group_and_image() {
        let card = sample_card();
        assert_eq!(card.image_url.as_deref(), Some("/media/posts/small.gif"));
        let group = card.group.expect("group should be present");
        assert_eq!(group.slug, "travel");
        assert_eq!(card.created_at, "05 Mar 2023, 22:19");
    }

    #[test]
    fn index_renders_posts_and_links() {
        let body = IndexTemplate {
            current_user: None,
            posts: vec![sample_card()],
            page: one_page(),
        }
        .render()
        .unwrap();
        assert!(body.contains("An evening in the mountains"));
        assert!(body.contains("/posts/7/"));
        assert!(body.contains("/group/travel/"));
        assert!(body.contains("/media/posts/small.gif"));
        // anonymous navbar
        assert!(body.contains("/auth/login/"));
        assert!(!body.contains("/auth/logout/"));
    }

    #[test]
    fn navbar_changes_for_a_logged_in_user() {
        let body = IndexTemplate {
            current_user: Some("NoName".to_string()),
            posts: vec![],
            page: one_page(),
        }
        .render()
        .unwrap();
        assert!(body.contains("/auth/logout/"));
        assert!(body.contains("/create/"));
        assert!(!body.contains("/auth/signup/"));
    }

    #[test]
    fn paginator_nav_appears_only_with_multiple_pages() {
        let single = IndexTemplate {
            current_user: None,
            posts: vec![],
            page: one_page(),
        }
        .render()
        .unwrap();
        assert!(!single.contains("?page="));

        let multi = IndexTemplate {
            current_user: None,
            posts: vec![],
            page: PageNav {
                number: 2,
                num_pages: 3,
                has_previous: true,
                has_next: true,
                previous: 1,
                next: 3,
            },
        }
        .render()
        .unwrap();
        assert!(multi.contains("?page=1"));
        assert!(multi.contains("?page=3"));
    }

    #[test]
    fn detail_shows_comment_form_only_when_logged_in() {
        let comments = vec![CommentCard {
            author_username: "reader".to_string(),
            text: "A fine read".to_string(),
            created_at: "05 Mar 2023, 23:02".to_string(),
        }];
        let anonymous = PostDetailTemplate {
            current_user: None,
            post: sample_card(),
            comments,
            comments_count: 1,
        }
        .render()
        .unwrap();
        assert!(anonymous.contains("A fine read"));
        assert!(!anonymous.contains("/posts/7/comment/"));

        let logged_in = PostDetailTemplate {
            current_user: Some("reader".to_string()),
            post: sample_card(),
            comments: vec![],
            comments_count: 0,
        }
        .render()
        .unwrap();
        assert!(logged_in.contains("/posts/7/comment/"));
    }

    #[test]
    fn post_form_keeps_selection_and_error() {
        let body = PostFormTemplate {
            current_user: Some("NoName".to_string()),
            is_edit: true,
            action: "/posts/7/edit/".to_string(),
            text: "Draft text".to_string(),
            groups: vec![
                GroupOption {
                    id: 1,
                    title: "Travel notes".to_string(),
                    selected: true,
                },
                GroupOption {
                    id: 2,
                    title: "Recipes".to_string(),
                    selected: false,
                },
            ],
            error: Some("The post text must not be empty.".to_string()),
        }
        .render()
        .unwrap();
        assert!(body.contains("action=\"/posts/7/edit/\""));
        assert!(body.contains("Draft text"));
        assert!(body.contains("The post text must not be empty."));
        assert!(body.contains("<option value=\"1\" selected>"));
        assert!(body.contains("<option value=\"2\">"));
    }

    #[test]
    fn login_carries_next_and_error() {
        let body = LoginTemplate {
            current_user: None,
            error: Some("Invalid credentials.".to_string()),
            next: "/create/".to_string(),
        }
        .render()
        .unwrap();
        assert!(body.contains("Invalid credentials."));
        assert!(body.contains("name=\"next\" value=\"/create/\""));
    }

    #[test]
    fn not_found_page_says_404() {
        let body = NotFoundTemplate { current_user: None }.render().unwrap();
        assert!(body.contains("404"));
    }

    #[test]
    fn profile_shows_follow_controls_to_other_users() {
        let base = ProfileTemplate {
            current_user: Some("reader".to_string()),
            author_username: "NoName".to_string(),
            posts_count: 2,
            following: false,
            is_self: false,
            posts: vec![],
            page: one_page(),
        };
        let body = base.render().unwrap();
        assert!(body.contains("/profile/NoName/follow/"));

        let own = ProfileTemplate {
            current_user: Some("NoName".to_string()),
            author_username: "NoName".to_string(),
            posts_count: 2,
            following: false,
            is_self: true,
            posts: vec![],
            page: one_page(),
        }
        .render()
        .unwrap();
        assert!(!own.contains("/profile/NoName/follow/"));
    }
}
