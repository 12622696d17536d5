//! Batch preview generation: every `.jrxml` under an input directory becomes
//! a standalone HTML page in the output directory. One bad document never
//! stops the run; failures are logged and counted.

use crate::core::extract::parse;
use crate::utils::export::standalone_html;
use anyhow::{Context, Result};
use log::{debug, error, info};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub rendered: usize,
    pub failed: usize,
}

pub struct ReportProcessor;

impl ReportProcessor {
    pub fn new() -> Self {
        ReportProcessor
    }

    /// Render previews for every report under `input_dir` into `output_dir`.
    pub fn process_reports<P: AsRef<Path>>(&self, input_dir: P, output_dir: P) -> Result<BatchOutcome> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();

        info!("rendering report previews from {}", input_dir.display());
        fs::create_dir_all(output_dir)
            .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;

        let reports: Vec<PathBuf> = WalkDir::new(input_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("jrxml"))
                    .unwrap_or(false)
            })
            .map(|entry| entry.into_path())
            .collect();
        debug!("found {} report documents", reports.len());

        let rendered = reports
            .par_iter()
            .filter(|path| match self.render_one(path, output_dir) {
                Ok(()) => {
                    info!("rendered preview for {}", path.display());
                    true
                }
                Err(e) => {
                    error!("failed to render {}: {e:#}", path.display());
                    false
                }
            })
            .count();

        let outcome = BatchOutcome {
            rendered,
            failed: reports.len() - rendered,
        };
        info!(
            "preview run complete: {} rendered, {} failed",
            outcome.rendered, outcome.failed
        );
        Ok(outcome)
    }

    fn render_one(&self, path: &Path, output_dir: &Path) -> Result<()> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let report = parse(&raw).with_context(|| format!("failed to parse {}", path.display()))?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string());
        let out_path = output_dir.join(format!("{stem}_export.html"));
        fs::write(&out_path, standalone_html(&report))
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        Ok(())
    }
}

impl Default for ReportProcessor {
    fn default() -> Self {
        ReportProcessor::new()
    }
}
