use std::fmt::Write;

use crate::models::{RatingSummary, ReviewRecord};
use crate::series;

pub fn summarize_ratings(records: &[ReviewRecord]) -> Vec<RatingSummary> {
    let mut map: std::collections::HashMap<i32, usize> = std::collections::HashMap::new();

    for record in records {
        if let Some(rating) = record.rating {
            *map.entry(rating).or_insert(0) += 1;
        }
    }

    let mut summaries: Vec<RatingSummary> = map
        .into_iter()
        .map(|(rating, count)| RatingSummary { rating, count })
        .collect();

    summaries.sort_by(|a, b| b.rating.cmp(&a.rating));
    summaries
}

pub fn build_report(scope: Option<&str>, records: &[ReviewRecord]) -> String {
    let points = series::aggregate(records);
    let summaries = summarize_ratings(records);

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all listings");

    let _ = writeln!(output, "# Review Audit Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} scraped reviews)",
        scope_label,
        records.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Rating Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No rated reviews in this scope.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {} star: {} reviews",
                summary.rating, summary.count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Series");

    if points.is_empty() {
        let _ = writeln!(output, "No reviews with usable dates in this scope.");
    } else {
        for point in points.iter() {
            let _ = writeln!(
                output,
                "- {}: {} reviews to date, avg rating {:.2}",
                point.month, point.cumulative_count, point.average_rating
            );
        }
    }

    let mut recent: Vec<&ReviewRecord> = records
        .iter()
        .filter(|r| series::parse_review_date(&r.date_text).is_some())
        .collect();
    recent.sort_by_key(|r| std::cmp::Reverse(series::parse_review_date(&r.date_text)));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Reviews");

    if recent.is_empty() {
        let _ = writeln!(output, "No reviews with usable dates in this scope.");
    } else {
        for record in recent.iter().take(5) {
            let rating_label = match record.rating {
                Some(rating) => format!("{} star", rating),
                None => "unrated".to_string(),
            };
            let _ = writeln!(
                output,
                "- {} ({}) on {}: {}",
                record.reviewer, rating_label, record.date_text, record.listing_name
            );
        }
    }

    output
}
