//! `export` and `check` command bodies.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use ead_export::{Diagnostic, EadSerializer, ExportConfig, ExportSummary, diagnose};
use ead_model::Record;

/// Inputs of one export run. Flags left unset keep the config file value.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub record: PathBuf,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub include_unpublished: bool,
    pub include_daos: bool,
    pub numbered_c_tags: bool,
    pub id_prefix: Option<String>,
    pub compact: bool,
}

impl ExportRequest {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::load(path)
                .with_context(|| format!("load config {}", path.display()))?,
            None => ExportConfig::default(),
        };
        let options = &mut config.options;
        options.include_unpublished |= self.include_unpublished;
        options.include_daos |= self.include_daos;
        options.use_numbered_c_tags |= self.numbered_c_tags;
        if let Some(prefix) = &self.id_prefix {
            options.id_prefix.clone_from(prefix);
        }
        if self.compact {
            options.pretty = false;
        }
        Ok(config)
    }
}

/// Load the record, serialize it and stream the document to the output.
pub fn run_export(request: &ExportRequest) -> Result<ExportSummary> {
    let span = info_span!("run_export", record = %request.record.display());
    let _guard = span.enter();
    let started = Instant::now();

    let config = request.resolve_config()?;
    let record = Record::load(&request.record)
        .with_context(|| format!("load record {}", request.record.display()))?;
    let labels = config.catalog();
    let stream = EadSerializer::new(config.options.clone(), &labels)
        .stream(&record)
        .context("serialize record")?;

    let summary = match &request.output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            stream
                .write_to(&mut writer)
                .with_context(|| format!("write {}", path.display()))?
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            let summary = stream.write_to(&mut writer).context("write stdout")?;
            writer.write_all(b"\n").context("write stdout")?;
            summary
        }
    };

    info!(
        written = summary.components_written,
        failures = summary.failures.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "export finished"
    );
    Ok(summary)
}

/// Well-formedness diagnostics for a file, suppressed ones included.
pub fn run_check(path: &Path) -> Result<Vec<Diagnostic>> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(diagnose(strip_declaration(&text)))
}

/// Drop a leading XML declaration so whole documents can be probed.
pub fn strip_declaration(text: &str) -> &str {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return trimmed[end + 2..].trim_start();
        }
    }
    text
}
