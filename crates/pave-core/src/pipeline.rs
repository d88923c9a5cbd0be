//! Classify-and-publish: the one operation a scheduled run performs.

use crate::classify::Classifier;
use crate::source::RecordSource;
use crate::store::ProductionStore;
use crate::summary::RunSummary;
use chrono::NaiveDateTime;
use pave_common::{Mode, Result};
use pave_config::PipelineConfig;
use tracing::info;

/// Fetch, classify, and replace the mode's production file.
///
/// Nothing is written unless every record coerced and classified; the
/// previous production file stays in place on error.
pub fn classify_and_publish(
    config: &PipelineConfig,
    mode: Mode,
    source: &mut dyn RecordSource,
    reference: NaiveDateTime,
) -> Result<RunSummary> {
    let classifier = Classifier::new(config, mode)?;
    info!(mode = %mode, source = %source.describe(), %reference, "starting classify run");

    let records = source.fetch()?;
    let classification = classifier.classify(records, reference);

    let path = config.production_path(mode);
    let store = ProductionStore::new(config.date_format.clone());
    let receipt = store.write(&path, &classification.rows)?;

    let summary = RunSummary::new(&classification, &receipt);
    summary.write(&RunSummary::path_for(&path))?;
    info!(
        mode = %mode,
        run_id = %summary.run_id,
        rows = summary.rows_out,
        "Successfully wrote prod file at {}",
        path.display()
    );
    Ok(summary)
}
