use async_trait::async_trait;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::api::{PageFetcher, PageSource};
use crate::db::PageCounts;
use crate::db::repository;
use crate::error::SyncError;
use crate::models::{ActivityRow, CourseChildren, CourseRow};
use crate::throttle::{BackoffController, BackoffPolicy, SleepAction};
use crate::transform;

/// One syncable entity kind: how a raw record becomes typed rows and how a
/// page of those rows is committed. Lets the driver stay agnostic of what it
/// is syncing.
#[async_trait]
pub trait SyncTarget: Send + Sync {
    type Row: Send + Sync;

    fn transform(&self, record: &Value) -> Result<Self::Row, SyncError>;

    async fn write_page(&self, db: &SqlitePool, rows: &[Self::Row])
    -> Result<PageCounts, SyncError>;
}

pub struct CourseTarget;

#[async_trait]
impl SyncTarget for CourseTarget {
    type Row = (CourseRow, CourseChildren);

    fn transform(&self, record: &Value) -> Result<Self::Row, SyncError> {
        transform::course_rows(record)
    }

    async fn write_page(
        &self,
        db: &SqlitePool,
        rows: &[Self::Row],
    ) -> Result<PageCounts, SyncError> {
        repository::write_course_page(db, rows).await
    }
}

pub struct ActivityTarget;

#[async_trait]
impl SyncTarget for ActivityTarget {
    type Row = ActivityRow;

    fn transform(&self, record: &Value) -> Result<Self::Row, SyncError> {
        transform::activity_row(record)
    }

    async fn write_page(
        &self,
        db: &SqlitePool,
        rows: &[Self::Row],
    ) -> Result<PageCounts, SyncError> {
        repository::write_activity_page(db, rows).await
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    Done,
    Aborted { error: SyncError },
}

/// Final accounting for one run. `pages_committed` is the number of pages
/// durably written before the run ended, which on abort doubles as the marker
/// of where the run stopped.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub pages_committed: u32,
    pub records: u64,
    pub counts: PageCounts,
}

impl RunReport {
    pub fn is_done(&self) -> bool {
        matches!(self.outcome, RunOutcome::Done)
    }
}

/// Drives fetch -> transform -> write -> throttle over the cursor chain until
/// the upstream reports no next page or a fatal error aborts the run. Pages
/// are strictly sequential; each cursor comes from the prior response.
pub struct SyncPipeline<S, T> {
    fetcher: PageFetcher<S>,
    target: T,
    db: SqlitePool,
    throttle: BackoffController,
    backoff: BackoffPolicy,
}

impl<S: PageSource, T: SyncTarget> SyncPipeline<S, T> {
    pub fn new(fetcher: PageFetcher<S>, target: T, db: SqlitePool, backoff: BackoffPolicy) -> Self {
        Self {
            fetcher,
            target,
            db,
            throttle: BackoffController::new(),
            backoff,
        }
    }

    pub async fn run(mut self, start_url: &str) -> RunReport {
        let mut report = RunReport {
            outcome: RunOutcome::Done,
            pages_committed: 0,
            records: 0,
            counts: PageCounts::default(),
        };
        let mut cursor = Some(start_url.to_string());

        while let Some(url) = cursor {
            match self.sync_one_page(&url, &mut report).await {
                Ok(next) => cursor = next,
                Err(e) => {
                    error!(
                        page = report.pages_committed + 1,
                        "sync aborted after {} committed pages: {}", report.pages_committed, e
                    );
                    report.outcome = RunOutcome::Aborted { error: e };
                    return report;
                }
            }
        }

        info!(
            pages = report.pages_committed,
            records = report.records,
            inserted = report.counts.inserted,
            updated = report.counts.updated,
            "sync finished"
        );
        report
    }

    async fn sync_one_page(
        &mut self,
        url: &str,
        report: &mut RunReport,
    ) -> Result<Option<String>, SyncError> {
        let page = self.fetcher.fetch_page(url).await?;

        let mut rows = Vec::with_capacity(page.results.len());
        for record in &page.results {
            rows.push(self.target.transform(record)?);
        }

        let counts = self.target.write_page(&self.db, &rows).await?;
        report.pages_committed += 1;
        report.records += rows.len() as u64;
        report.counts.merge(counts);

        info!(
            page = report.pages_committed,
            records = report.records,
            inserted = report.counts.inserted,
            updated = report.counts.updated,
            next = page.next.as_deref().unwrap_or("<none>"),
            "page committed"
        );

        match self.throttle.advance(rows.len()) {
            SleepAction::None => {}
            SleepAction::Short => {
                info!(
                    "processed {} records, pausing {:?}",
                    self.throttle.total(),
                    self.backoff.short
                );
                tokio::time::sleep(self.backoff.short).await;
            }
            SleepAction::Long => {
                info!(
                    "processed {} records, pausing {:?}",
                    self.throttle.total(),
                    self.backoff.long
                );
                tokio::time::sleep(self.backoff.long).await;
            }
        }

        Ok(page.next)
    }
}
