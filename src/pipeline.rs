use crate::assets::IconFetcher;
use crate::error::Result;
use crate::types::{IconRecord, RecordOutcome, RunSummary};
use crate::writer::write_json;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, error, info, instrument};

pub struct Pipeline;

impl Pipeline {
    /// Transform every input item, resolve icons for the records that come
    /// out, and write the keyed result to `output`.
    ///
    /// Skipped records are counted and dropped. The first fatal outcome (or
    /// input, fetch or write error) aborts the run before anything is written;
    /// icons fetched up to that point stay in the cache.
    #[instrument(skip_all, fields(job = %job))]
    pub async fn run_records<T, R, I, F>(
        job: &str,
        items: I,
        mut transform: F,
        fetcher: &IconFetcher,
        output: &Path,
    ) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<T>>,
        F: FnMut(&T) -> RecordOutcome<R>,
        R: IconRecord + Serialize,
    {
        let mut summary = RunSummary::start(job);
        info!("Starting {} run", job);

        match Self::collect(items, &mut transform, fetcher, &mut summary).await {
            Ok(records) => {
                write_json(output, &records)?;
                summary.finish(output);
                info!(
                    "Wrote {} records to {} ({} skipped, {} icons fetched, {} cached, {} failed)",
                    summary.written,
                    output.display(),
                    summary.skipped,
                    summary.icons_fetched,
                    summary.icons_cached,
                    summary.icon_failures
                );
                Ok(summary)
            }
            Err(e) => {
                summary.abort();
                error!(
                    "{} run aborted after {} rows: {}",
                    job, summary.rows_read, e
                );
                Err(e)
            }
        }
    }

    async fn collect<T, R, I, F>(
        items: I,
        transform: &mut F,
        fetcher: &IconFetcher,
        summary: &mut RunSummary,
    ) -> Result<IndexMap<u32, R>>
    where
        I: IntoIterator<Item = Result<T>>,
        F: FnMut(&T) -> RecordOutcome<R>,
        R: IconRecord + Serialize,
    {
        fetcher.prepare()?;
        let mut records = IndexMap::new();

        for item in items {
            let item = item?;
            summary.rows_read += 1;

            match transform(&item) {
                RecordOutcome::Success(mut record) => {
                    let outcome = fetcher.ensure(record.icon_id(), record.icon_name()).await?;
                    summary.record_icon(&outcome);
                    let icon = outcome
                        .is_available()
                        .then(|| fetcher.public_path(record.icon_name()));
                    record.set_icon(icon);
                    records.insert(record.id(), record);
                    summary.written += 1;
                }
                RecordOutcome::Skipped(reason) => {
                    debug!("Skipping record {}: {}", summary.rows_read, reason);
                    summary.skipped += 1;
                }
                RecordOutcome::Fatal(e) => return Err(e),
            }
        }

        Ok(records)
    }
}
