use std::{
    io::Write,
    path::{Path, PathBuf},
};

use billing_client::domain::{ReadingHistory, OUTPUT_COLUMNS};
use futures::StreamExt;
use tempfile::NamedTempFile;

use crate::pipeline::{Envelope, PipelineError, Sink};

/// Writes the reading history file (`LECTURAS_PILOTO`): UTF-8, comma
/// separated, header always present.
///
/// Rows are buffered until the stream ends, written to a temporary file next
/// to the destination and renamed into place, so a failed run leaves any
/// previous output untouched.
pub struct ReadingHistoryCsvSink {
    path: PathBuf,
}

impl ReadingHistoryCsvSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomically(&self, rows: &[Envelope<ReadingHistory>]) -> Result<(), PipelineError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| PipelineError::Sink(format!("failed to create temp file in {}: {e}", dir.display())))?;

        write_rows(&mut tmp, rows)?;

        tmp.persist(&self.path).map_err(|e| {
            PipelineError::Sink(format!("failed to move output into {}: {}", self.path.display(), e.error))
        })?;
        Ok(())
    }
}

/// Header plus one line per row, in the order given.
pub fn write_rows<W: Write>(out: W, rows: &[Envelope<ReadingHistory>]) -> Result<(), PipelineError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    wtr.write_record(OUTPUT_COLUMNS)
        .map_err(|e| PipelineError::Sink(format!("failed to write header: {e}")))?;
    for env in rows {
        wtr.serialize(&env.payload).map_err(|e| {
            PipelineError::Sink(format!("failed to write row from line {}: {e}", env.line))
        })?;
    }
    wtr.flush()
        .map_err(|e| PipelineError::Sink(format!("failed to flush output: {e}")))?;
    Ok(())
}

#[async_trait::async_trait]
impl Sink<ReadingHistory> for ReadingHistoryCsvSink {
    async fn run<S>(&self, mut input: S) -> Result<usize, PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<ReadingHistory>, PipelineError>> + Send + Unpin + 'static,
    {
        let mut rows: Vec<Envelope<ReadingHistory>> = Vec::new();

        while let Some(item) = input.next().await {
            match item {
                Ok(env) => rows.push(env),
                Err(e) => {
                    tracing::error!(error = %e, buffered = rows.len(), "upstream failure, output not written");
                    return Err(e);
                }
            }
        }

        self.write_atomically(&rows)?;
        metrics::counter!("reading_history_records_written_total").increment(rows.len() as u64);
        tracing::info!(path = %self.path.display(), records = rows.len(), "reading history written");

        Ok(rows.len())
    }
}
