use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod db;
mod models;
mod report;
mod series;

#[derive(Parser)]
#[command(name = "review-audit")]
#[command(about = "Review-audit tracker for scraped business listings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import scraped reviews from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print the monthly review series, or export it as chart-ready JSON
    #[command(group(
        ArgGroup::new("scope")
            .args(["listing", "place_id"])
            .multiple(false)
    ))]
    Series {
        #[arg(long)]
        listing: Option<String>,
        #[arg(long)]
        place_id: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report
    #[command(group(
        ArgGroup::new("scope")
            .args(["listing", "place_id"])
            .multiple(false)
    ))]
    Report {
        #[arg(long)]
        listing: Option<String>,
        #[arg(long)]
        place_id: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} reviews from {}.", csv.display());
        }
        Commands::Series {
            listing,
            place_id,
            out,
        } => {
            let records =
                db::fetch_reviews(&pool, listing.as_deref(), place_id.as_deref()).await?;
            let points = series::aggregate(&records);

            if points.is_empty() {
                println!("No reviews with usable dates for this scope.");
                return Ok(());
            }

            match out {
                Some(path) => {
                    let payload = serde_json::to_string_pretty(&points)?;
                    std::fs::write(&path, payload)?;
                    println!("Series written to {}.", path.display());
                }
                None => {
                    println!("Monthly review series:");
                    for point in &points {
                        println!(
                            "- {}: {} reviews to date, avg rating {:.2}",
                            point.month, point.cumulative_count, point.average_rating
                        );
                    }
                }
            }
        }
        Commands::Report {
            listing,
            place_id,
            out,
        } => {
            let records =
                db::fetch_reviews(&pool, listing.as_deref(), place_id.as_deref()).await?;
            let report = report::build_report(
                listing.as_deref().or(place_id.as_deref()),
                &records,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
