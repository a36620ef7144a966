use std::process::ExitCode;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_sync::api::{HttpPageSource, PageFetcher, RetryPolicy};
use catalog_sync::config::SyncConfig;
use catalog_sync::error::SyncError;
use catalog_sync::pipeline::{ActivityTarget, CourseTarget, RunReport, SyncPipeline};
use catalog_sync::throttle::BackoffPolicy;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "catalog_sync=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let job = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());
    match run(&job).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("sync failed to start: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(job: &str) -> Result<bool, SyncError> {
    if !matches!(job, "courses" | "activity" | "all") {
        return Err(SyncError::Config(format!(
            "unknown job `{job}` (expected courses, activity, or all)"
        )));
    }

    let config = SyncConfig::from_env()?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let mut ok = true;
    if job == "courses" || job == "all" {
        info!("starting course catalog sync");
        let fetcher = PageFetcher::new(
            HttpPageSource::new(config.credentials.clone())?,
            RetryPolicy::default(),
        );
        let pipeline =
            SyncPipeline::new(fetcher, CourseTarget, pool.clone(), BackoffPolicy::default());
        ok &= finish("courses", pipeline.run(&config.course_list_url()).await);
    }
    if job == "activity" || job == "all" {
        info!("starting user course activity sync");
        let fetcher = PageFetcher::new(
            HttpPageSource::new(config.credentials.clone())?,
            RetryPolicy::default(),
        );
        let pipeline =
            SyncPipeline::new(fetcher, ActivityTarget, pool.clone(), BackoffPolicy::default());
        ok &= finish("activity", pipeline.run(&config.activity_url()).await);
    }

    Ok(ok)
}

fn finish(job: &str, report: RunReport) -> bool {
    info!(
        job,
        pages = report.pages_committed,
        records = report.records,
        inserted = report.counts.inserted,
        updated = report.counts.updated,
        done = report.is_done(),
        "run finished"
    );
    report.is_done()
}
