use anyhow::Result;
use billing_client::domain::{BillingRecord, ReadingHistory};
use rand::{rngs::StdRng, SeedableRng};
use reading_reconciler::{
    config::AppConfig,
    metrics_export,
    observability,
    pipeline::Pipeline,
    sinks::ReadingHistoryCsvSink,
    sources::BillingExportFileSource,
    transform,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    // Recorder must be in place before the first counter is touched.
    let metrics = cfg.metrics.as_ref().map(metrics_export::install).transpose()?;

    let source = BillingExportFileSource::new(
        &cfg.input.path,
        cfg.input.encoding,
        cfg.input.delimiter_byte()?,
    );
    let sink = ReadingHistoryCsvSink::new(&cfg.output.path);

    tracing::info!(
        input = %cfg.input.path.display(),
        output = %cfg.output.path.display(),
        "reconciling meter readings"
    );

    let pipeline: Pipeline<_, BillingRecord, ReadingHistory, _> = Pipeline {
        source,
        transforms: vec![Arc::new(transform::ReadingGapFill::default())],
        projection: Arc::new(transform::HistoryProjection::new(StdRng::from_entropy())),
        sink,
    };

    let written = pipeline.run().await?;
    tracing::info!(
        records = written,
        path = %cfg.output.path.display(),
        "processed billing records"
    );

    if let Some(m) = metrics {
        m.write()?;
    }

    Ok(())
}
