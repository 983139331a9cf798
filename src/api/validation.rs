use super::{ApiError, PageQuery};
use crate::config::FeedConfig;
use crate::domain::Pagination;

pub const SEARCH_DEFAULT_LIMIT: u64 = 10;

pub fn validate_id(id: i32, resource: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {resource} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn validate_limit(limit: u64, max: u64) -> Result<u64, ApiError> {
    if !(1..=max).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between 1 and {max}"
        )));
    }
    Ok(limit)
}

/// Defaults missing values and rejects out-of-range ones.
pub fn validate_pagination(query: &PageQuery, feed: &FeedConfig) -> Result<Pagination, ApiError> {
    let page = query.page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::validation("Invalid page: 0. Pages start at 1"));
    }

    let limit = validate_limit(
        query.limit.unwrap_or(feed.default_page_size),
        feed.max_page_size,
    )?;

    Ok(Pagination::new(page, limit))
}

pub fn validate_search_query(query: &str) -> Result<&str, ApiError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search query cannot be empty"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<u64>, limit: Option<u64>) -> PageQuery {
        PageQuery { page, limit }
    }

    #[test]
    fn test_validate_pagination_defaults() {
        let feed = FeedConfig::default();
        let p = validate_pagination(&query(None, None), &feed).unwrap();
        assert_eq!(p, Pagination::new(1, 10));
        assert_eq!(p.offset(), 0);

        let p = validate_pagination(&query(Some(3), Some(5)), &feed).unwrap();
        assert_eq!(p.offset(), 10);
    }

    #[test]
    fn test_validate_pagination_bounds() {
        let feed = FeedConfig::default();
        assert!(validate_pagination(&query(Some(0), None), &feed).is_err());
        assert!(validate_pagination(&query(None, Some(0)), &feed).is_err());
        assert!(validate_pagination(&query(None, Some(51)), &feed).is_err());
        assert!(validate_pagination(&query(None, Some(50)), &feed).is_ok());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id(1, "post").is_ok());
        assert!(validate_id(0, "post").is_err());
        assert!(validate_id(-4, "comment").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  ada ").unwrap(), "ada");
        assert!(validate_search_query("   ").is_err());
    }
}
