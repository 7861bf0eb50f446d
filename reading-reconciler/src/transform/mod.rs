pub mod format;
pub mod history;
pub mod reconcile;

use std::sync::Mutex;

use billing_client::domain::{BillingRecord, ReadingHistory};
use rand::Rng;

use crate::pipeline::{Envelope, PipelineError, Transform};

pub use format::{format_numeric_field, format_reading, FieldValue};
pub use history::{build_output_record, generate_history_time, project_history, HISTORY_DATE};
pub use reconcile::{reconcile_gaps, GapFill};

/// Applies `reconcile_gaps` to every record and counts the outcome.
#[derive(Clone, Default)]
pub struct ReadingGapFill;

#[async_trait::async_trait]
impl Transform<BillingRecord, BillingRecord> for ReadingGapFill {
    async fn apply(
        &self,
        mut input: Envelope<BillingRecord>,
    ) -> Result<Envelope<BillingRecord>, PipelineError> {
        let r = &mut input.payload;
        match reconcile_gaps(r) {
            GapFill::Previous => {
                metrics::counter!("reading_gap_fill_previous_total").increment(1);
                tracing::debug!(code = %r.code, line = input.line, "derived previous reading");
            }
            GapFill::Current => {
                metrics::counter!("reading_gap_fill_current_total").increment(1);
                tracing::debug!(code = %r.code, line = input.line, "derived current reading");
            }
            GapFill::Unfilled => {
                metrics::counter!("reading_gap_unfilled_total").increment(1);
                tracing::warn!(
                    code = %r.code,
                    line = input.line,
                    previous = ?r.previous_reading,
                    current = ?r.current_reading,
                    "reading left missing"
                );
            }
            GapFill::Complete => {}
        }
        Ok(input)
    }
}

/// Turns reconciled billing records into history rows.
///
/// The generator is injected so tests can seed it; a mutex lets the
/// projection be shared behind `Arc` like any other transform.
pub struct HistoryProjection<R> {
    rng: Mutex<R>,
}

impl<R: Rng + Send> HistoryProjection<R> {
    pub fn new(rng: R) -> Self {
        Self { rng: Mutex::new(rng) }
    }
}

#[async_trait::async_trait]
impl<R: Rng + Send> Transform<BillingRecord, ReadingHistory> for HistoryProjection<R> {
    async fn apply(
        &self,
        input: Envelope<BillingRecord>,
    ) -> Result<Envelope<ReadingHistory>, PipelineError> {
        if let Some(id) = input.payload.id_number.as_deref() {
            if format::is_passthrough(id) {
                metrics::counter!("id_number_passthrough_total").increment(1);
                tracing::debug!(code = %input.payload.code, id_number = id, "id number kept as text");
            }
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| PipelineError::Transform("history time generator poisoned".to_string()))?;
        Ok(input.map(|record| project_history(record, &mut *rng)))
    }
}
