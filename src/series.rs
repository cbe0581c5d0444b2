use chrono::{DateTime, Datelike, NaiveDate};

use crate::models::{ReviewRecord, SeriesPoint};

/// Formats the source pages have been seen rendering review dates in.
/// Anything that matches none of these is treated as unparsable.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
];

#[derive(Default)]
struct MonthBucket {
    count: i64,
    sum: i64,
}

/// Lenient parse of a scraped date string. Returns None rather than an error:
/// a review whose date cannot be read simply drops out of the series.
pub fn parse_review_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

pub fn month_key(date: NaiveDate) -> String {
    format!("{}-{:02}", date.year(), date.month())
}

/// Round to two fraction digits, half away from zero (4.125 -> 4.13).
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fold an unordered batch of scraped reviews into the monthly audit series:
/// per distinct month, the cumulative review count and that month's mean
/// rating. Records with an unreadable date or no rating contribute nothing.
/// Months never present in the input are never emitted.
pub fn aggregate(records: &[ReviewRecord]) -> Vec<SeriesPoint> {
    let mut buckets: std::collections::BTreeMap<String, MonthBucket> =
        std::collections::BTreeMap::new();

    for record in records {
        let Some(rating) = record.rating else {
            continue;
        };
        let Some(date) = parse_review_date(&record.date_text) else {
            continue;
        };

        let bucket = buckets.entry(month_key(date)).or_default();
        bucket.count += 1;
        bucket.sum += rating as i64;
    }

    let mut series = Vec::with_capacity(buckets.len());
    let mut total = 0i64;

    for (month, bucket) in buckets {
        total += bucket.count;
        series.push(SeriesPoint {
            month,
            cumulative_count: total,
            average_rating: round2(bucket.sum as f64 / bucket.count as f64),
        });
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: Option<i32>, date_text: &str) -> ReviewRecord {
        ReviewRecord {
            listing_name: "Blue Harbor Dental".to_string(),
            place_id: "ChIJb3harb0rDent".to_string(),
            reviewer: "Sam Ortiz".to_string(),
            rating,
            date_text: date_text.to_string(),
        }
    }

    #[test]
    fn parses_the_rendered_date_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(parse_review_date("2024-01-10"), Some(expected));
        assert_eq!(parse_review_date("01/10/2024"), Some(expected));
        assert_eq!(parse_review_date("January 10, 2024"), Some(expected));
        assert_eq!(parse_review_date("  Jan 10, 2024 "), Some(expected));
        assert_eq!(parse_review_date("2024-01-10T08:30:00Z"), Some(expected));
        assert_eq!(parse_review_date("not a date"), None);
        assert_eq!(parse_review_date(""), None);
    }

    #[test]
    fn buckets_by_month_with_cumulative_count() {
        let records = vec![
            review(Some(5), "2024-01-10"),
            review(Some(3), "2024-01-20"),
            review(Some(4), "2024-02-01"),
        ];

        let series = aggregate(&records);
        assert_eq!(
            series,
            vec![
                SeriesPoint {
                    month: "2024-01".to_string(),
                    cumulative_count: 2,
                    average_rating: 4.0,
                },
                SeriesPoint {
                    month: "2024-02".to_string(),
                    cumulative_count: 3,
                    average_rating: 4.0,
                },
            ]
        );
    }

    #[test]
    fn empty_input_yields_empty_series() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn drops_unparsable_dates_and_missing_ratings() {
        let records = vec![
            review(Some(4), "not a date"),
            review(None, "2024-03-05"),
            review(Some(2), "2024-03-05"),
        ];

        let series = aggregate(&records);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].month, "2024-03");
        assert_eq!(series[0].cumulative_count, 1);
        assert_eq!(series[0].average_rating, 2.0);
    }

    #[test]
    fn order_of_input_does_not_matter() {
        let forward = vec![
            review(Some(5), "2023-06-01"),
            review(Some(1), "2023-08-14"),
            review(Some(3), "2023-06-30"),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(aggregate(&forward), aggregate(&reversed));
        assert_eq!(aggregate(&forward), aggregate(&forward));
    }

    #[test]
    fn identical_ratings_average_exactly() {
        let records = vec![
            review(Some(5), "2023-06-02"),
            review(Some(5), "2023-06-12"),
            review(Some(5), "2023-06-22"),
        ];

        let series = aggregate(&records);
        assert_eq!(series[0].average_rating, 5.0);
    }

    #[test]
    fn average_rounds_half_away_from_zero() {
        // 4 + 5 + 4 + 4 + 4 + 4 + 5 + 3 = 33 over 8 reviews -> 4.125 -> 4.13
        let ratings = [4, 5, 4, 4, 4, 4, 5, 3];
        let records: Vec<ReviewRecord> = ratings
            .iter()
            .map(|&r| review(Some(r), "2024-05-01"))
            .collect();

        let series = aggregate(&records);
        assert_eq!(series[0].average_rating, 4.13);

        // An exact half at the first fraction digit stays put.
        let half = vec![review(Some(4), "2024-06-01"), review(Some(5), "2024-06-02")];
        assert_eq!(aggregate(&half)[0].average_rating, 4.5);
    }

    #[test]
    fn out_of_range_ratings_pass_through() {
        // The scraper does not clamp what the page rendered.
        let records = vec![review(Some(0), "2024-07-01"), review(Some(6), "2024-07-02")];

        let series = aggregate(&records);
        assert_eq!(series[0].cumulative_count, 2);
        assert_eq!(series[0].average_rating, 3.0);
    }

    #[test]
    fn months_are_sorted_and_cumulative_is_non_decreasing() {
        let records = vec![
            review(Some(2), "2024-11-01"),
            review(Some(4), "2023-02-10"),
            review(Some(5), "2024-01-15"),
            review(Some(3), "2023-02-28"),
        ];

        let series = aggregate(&records);
        let months: Vec<&str> = series.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["2023-02", "2024-01", "2024-11"]);

        for pair in series.windows(2) {
            assert!(pair[0].cumulative_count <= pair[1].cumulative_count);
        }
        assert_eq!(series.last().unwrap().cumulative_count, 4);
    }
}
