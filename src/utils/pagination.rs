use serde::Deserialize;

/// Posts shown per listing page.
pub const POSTS_PER_PAGE: i64 = 10;

#[derive(Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
}

/// Page-number pagination over an ordered listing. Out-of-range page numbers
/// clamp into the valid range instead of erroring.
pub struct Paginator {
    total: i64,
    per_page: i64,
}

impl Paginator {
    pub fn new(total: i64, per_page: i64) -> Self {
        Self { total, per_page }
    }

    pub fn num_pages(&self) -> i64 {
        if self.total <= 0 {
            return 1;
        }
        (self.total + self.per_page - 1) / self.per_page
    }

    pub fn page(&self, requested: Option<i64>) -> Page {
        let number = requested.unwrap_or(1).clamp(1, self.num_pages());
        Page {
            number,
            num_pages: self.num_pages(),
            limit: self.per_page,
            offset: (number - 1) * self.per_page,
        }
    }
}

/// One resolved page, ready for a LIMIT/OFFSET query and the paginator nav.
pub struct Page {
    pub number: i64,
    pub num_pages: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_first_page_and_remainder_on_the_last() {
        let paginator = Paginator::new(POSTS_PER_PAGE + 3, POSTS_PER_PAGE);
        assert_eq!(paginator.num_pages(), 2);

        let first = paginator.page(Some(1));
        assert_eq!((first.limit, first.offset), (POSTS_PER_PAGE, 0));

        let second = paginator.page(Some(2));
        assert_eq!(second.offset, POSTS_PER_PAGE);
        // 3 rows remain for the LIMIT to pick up
        assert_eq!(paginator.total - second.offset, 3);
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        let paginator = Paginator::new(25, POSTS_PER_PAGE);
        assert_eq!(paginator.page(Some(99)).number, 3);
        assert_eq!(paginator.page(Some(0)).number, 1);
        assert_eq!(paginator.page(Some(-4)).number, 1);
        assert_eq!(paginator.page(None).number, 1);
    }

    #[test]
    fn empty_listing_still_has_one_page() {
        let paginator = Paginator::new(0, POSTS_PER_PAGE);
        assert_eq!(paginator.num_pages(), 1);
        let page = paginator.page(Some(5));
        assert_eq!(page.number, 1);
        assert_eq!(page.offset, 0);
        assert!(!page.has_previous());
        assert!(!page.has_next());
    }

    #[test]
    fn nav_flags() {
        let paginator = Paginator::new(30, POSTS_PER_PAGE);
        let middle = paginator.page(Some(2));
        assert!(middle.has_previous());
        assert!(middle.has_next());
        let last = paginator.page(Some(3));
        assert!(last.has_previous());
        assert!(!last.has_next());
    }
}
