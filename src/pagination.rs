use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: u64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

pub fn calculate_offset(page: i64, limit: i64) -> u64 {
    if page <= 0 || limit <= 0 {
        return 0;
    }
    ((page - 1) * limit) as u64
}

pub fn calculate_pagination(page: i64, limit: i64, total: u64) -> Pagination {
    let safe_page = page.max(1);
    let safe_limit = limit.max(1);

    // ceil(total / limit), but never less than one page
    let total_pages = ((total + safe_limit as u64 - 1) / safe_limit as u64).max(1) as i64;

    Pagination {
        page: safe_page,
        limit: safe_limit,
        total,
        total_pages,
        has_next_page: safe_page < total_pages,
        has_prev_page: safe_page > 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based_on_page() {
        assert_eq!(calculate_offset(1, 20), 0);
        assert_eq!(calculate_offset(2, 20), 20);
        assert_eq!(calculate_offset(5, 10), 40);
    }

    #[test]
    fn offset_clamps_non_positive_inputs() {
        assert_eq!(calculate_offset(0, 20), 0);
        assert_eq!(calculate_offset(-3, 20), 0);
        assert_eq!(calculate_offset(2, 0), 0);
        assert_eq!(calculate_offset(2, -1), 0);
    }

    #[test]
    fn total_pages_is_ceiling_of_total_over_limit() {
        assert_eq!(calculate_pagination(1, 10, 0).total_pages, 1);
        assert_eq!(calculate_pagination(1, 10, 1).total_pages, 1);
        assert_eq!(calculate_pagination(1, 10, 10).total_pages, 1);
        assert_eq!(calculate_pagination(1, 10, 11).total_pages, 2);
        assert_eq!(calculate_pagination(1, 10, 95).total_pages, 10);
        assert_eq!(calculate_pagination(1, 7, 100).total_pages, 15);
    }

    #[test]
    fn page_and_limit_are_floored_before_computing() {
        let pagination = calculate_pagination(0, 0, 5);

        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.limit, 1);
        assert_eq!(pagination.total_pages, 5);
    }

    #[test]
    fn navigation_flags_follow_the_page_position() {
        let first = calculate_pagination(1, 10, 35);
        assert!(first.has_next_page);
        assert!(!first.has_prev_page);

        let middle = calculate_pagination(2, 10, 35);
        assert!(middle.has_next_page);
        assert!(middle.has_prev_page);

        let last = calculate_pagination(4, 10, 35);
        assert!(!last.has_next_page);
        assert!(last.has_prev_page);

        let beyond = calculate_pagination(9, 10, 35);
        assert!(!beyond.has_next_page);
        assert!(beyond.has_prev_page);
    }
}
