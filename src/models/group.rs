use std::fmt;

use sqlx::prelude::FromRow;

#[derive(FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Lean row for populating the group `<select>` of the post form.
#[derive(FromRow)]
pub struct GroupChoice {
    pub id: i64,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_displays_as_its_title() {
        let group = Group {
            id: 1,
            title: "Travel notes".to_string(),
            slug: "travel".to_string(),
            description: "Places and roads".to_string(),
        };
        assert_eq!(group.to_string(), "Travel notes");
    }
}
