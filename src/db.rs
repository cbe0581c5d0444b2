use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::ReviewRecord;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let listings = vec![
        (
            Uuid::parse_str("3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2")?,
            "Blue Harbor Dental",
            "ChIJkYB1u3HarborDental01",
        ),
        (
            Uuid::parse_str("0c22f1f1-9184-4fd4-9b21-28c68a6a89dc")?,
            "Maple Street Bakery",
            "ChIJm4pl3StreetBakery02",
        ),
    ];

    for (id, name, place_id) in listings {
        sqlx::query(
            r#"
            INSERT INTO review_audit.listings (id, name, place_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (place_id) DO UPDATE
            SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(place_id)
        .fetch_one(pool)
        .await?;
    }

    // date_text stays raw: the seed mirrors the mixed formats the scraper
    // actually captures, including one that will never parse.
    let reviews = vec![
        ("seed-001", "ChIJkYB1u3HarborDental01", "Sam Ortiz", Some(5), "2026-01-12"),
        ("seed-002", "ChIJkYB1u3HarborDental01", "Dana Whitfield", Some(4), "January 28, 2026"),
        ("seed-003", "ChIJkYB1u3HarborDental01", "Priya Nair", Some(2), "02/03/2026"),
        ("seed-004", "ChIJm4pl3StreetBakery02", "Leo Tran", Some(5), "2026-02-07"),
        ("seed-005", "ChIJm4pl3StreetBakery02", "Morgan Ashe", Some(3), "a week ago"),
    ];

    for (source_key, place_id, reviewer, rating, date_text) in reviews {
        let listing_id: Uuid =
            sqlx::query("SELECT id FROM review_audit.listings WHERE place_id = $1")
                .bind(place_id)
                .fetch_one(pool)
                .await?
                .get("id");

        sqlx::query(
            r#"
            INSERT INTO review_audit.reviews
            (id, listing_id, reviewer, rating, date_text, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing_id)
        .bind(reviewer)
        .bind(rating)
        .bind(date_text)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_reviews(
    pool: &PgPool,
    listing: Option<&str>,
    place_id: Option<&str>,
) -> anyhow::Result<Vec<ReviewRecord>> {
    let mut query = String::from(
        "SELECT l.name, l.place_id, r.reviewer, r.rating, r.date_text \
         FROM review_audit.reviews r \
         JOIN review_audit.listings l ON l.id = r.listing_id",
    );

    if listing.is_some() {
        query.push_str(" WHERE l.name = $1");
    } else if place_id.is_some() {
        query.push_str(" WHERE l.place_id = $1");
    }

    let mut rows = sqlx::query(&query);

    if let Some(value) = listing {
        rows = rows.bind(value);
    } else if let Some(value) = place_id {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut reviews = Vec::new();

    for row in records {
        reviews.push(ReviewRecord {
            listing_name: row.get("name"),
            place_id: row.get("place_id"),
            reviewer: row.get("reviewer"),
            rating: row.get("rating"),
            date_text: row.get("date_text"),
        });
    }

    Ok(reviews)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        listing_name: String,
        place_id: String,
        reviewer: String,
        rating: Option<i32>,
        date_text: String,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let listing_id: Uuid = sqlx::query(
            r#"
            INSERT INTO review_audit.listings (id, name, place_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (place_id) DO UPDATE
            SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.listing_name)
        .bind(&row.place_id)
        .fetch_one(pool)
        .await?
        .get("id");

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO review_audit.reviews
            (id, listing_id, reviewer, rating, date_text, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing_id)
        .bind(&row.reviewer)
        .bind(row.rating)
        .bind(&row.date_text)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
