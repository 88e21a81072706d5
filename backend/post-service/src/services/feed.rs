/// Feed listing - newest-first pagination over all posts
use crate::config::FeedConfig;
use crate::db::PostStore;
use crate::error::Result;
use crate::models::FeedPage;
use std::sync::Arc;

#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn PostStore>,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(store: Arc<dyn PostStore>, config: FeedConfig) -> Self {
        Self { store, config }
    }

    /// Normalize raw query values: missing or non-positive values fall back to the
    /// defaults and the page size is capped.
    pub fn normalize(&self, page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size);
        (page, limit)
    }

    /// List one page of the feed. `page` and `limit` must be at least 1.
    ///
    /// An out-of-range page returns an empty slice with the real page count.
    pub async fn list(&self, page: i64, limit: i64, include_author: bool) -> Result<FeedPage> {
        let page = page.max(1);
        let limit = limit.max(1);
        let skip = (page - 1).saturating_mul(limit);

        let total = self.store.count().await?;
        let posts = if skip >= total {
            Vec::new()
        } else {
            self.store.find_page(skip, limit, include_author).await?
        };

        Ok(FeedPage {
            posts,
            total_pages: total_pages(total, limit),
            current_page: page,
        })
    }
}

/// Read a query value the lenient way browsers' `parseInt` does: leading
/// whitespace is skipped, an optional sign and the leading digits are taken and
/// anything after them is ignored. Returns `None` when there are no digits.
pub fn parse_query_int(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim_start();
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .map_or(rest, |end| &rest[..end]);
    if digits.is_empty() {
        return None;
    }

    // Out-of-range values saturate; normalization clamps them anyway.
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}
