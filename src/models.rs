use serde::Serialize;

/// One scraped review as the source page rendered it. `rating` is optional
/// because the scraper stores whatever the page showed, including review
/// cards with no visible star rating. `date_text` is the raw rendered date
/// string and may not parse.
#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub listing_name: String,
    pub place_id: String,
    pub reviewer: String,
    pub rating: Option<i32>,
    pub date_text: String,
}

/// One point of the monthly review-audit series, chart-ready as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// `"YYYY-MM"`, zero-padded so lexicographic order is chronological.
    pub month: String,
    /// Total reviews through and including this month.
    pub cumulative_count: i64,
    /// This month's mean rating (not cumulative), rounded to two digits.
    pub average_rating: f64,
}

#[derive(Debug, Clone)]
pub struct RatingSummary {
    pub rating: i32,
    pub count: usize,
}
