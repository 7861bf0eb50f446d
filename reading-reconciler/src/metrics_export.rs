use std::{fs, path::PathBuf};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;

/// Prometheus textfile export for a one-shot run.
///
/// The job exits long before a scraper would reach it, so counters are
/// rendered to a file that a node exporter textfile collector can pick up.
pub struct MetricsTextfile {
    handle: PrometheusHandle,
    path: PathBuf,
}

/// Installs the global recorder. Call once, before the pipeline runs.
pub fn install(cfg: &MetricsConfig) -> anyhow::Result<MetricsTextfile> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus metrics recorder: {e}"))?;

    Ok(MetricsTextfile::new(handle, cfg.textfile_path.clone()))
}

impl MetricsTextfile {
    pub fn new(handle: PrometheusHandle, path: PathBuf) -> Self {
        Self { handle, path }
    }

    pub fn write(&self) -> anyhow::Result<()> {
        fs::write(&self.path, self.handle.render())
            .map_err(|e| anyhow::anyhow!("failed to write metrics to {}: {e}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), "metrics textfile written");
        Ok(())
    }
}
