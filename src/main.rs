use anyhow::{bail, Context, Result};
use jrxml_preview::utils::batch::ReportProcessor;
use jrxml_preview::utils::export::standalone_html;
use jrxml_preview::{apply_edit, parse, ElementEdit};
use log::{info, warn};
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("parse") => cmd_parse(arg(&args, 2)?),
        Some("export") => cmd_export(arg(&args, 2)?),
        Some("edit") => cmd_edit(arg(&args, 2)?, arg(&args, 3)?),
        Some("batch") => cmd_batch(arg(&args, 2)?, arg(&args, 3)?),
        _ => {
            eprintln!("usage: jrxml-preview <command>");
            eprintln!("  parse  <report.jrxml>              print the report model as JSON");
            eprintln!("  export <report.jrxml>              write <report>_export.html next to the input");
            eprintln!("  edit   <report.jrxml> <edit.json>  apply an element edit in place");
            eprintln!("  batch  <input-dir> <output-dir>    render previews for a whole directory");
            Ok(())
        }
    }
}

fn arg<'a>(args: &'a [String], index: usize) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("missing argument {index}; run without arguments for usage"))
}

fn cmd_parse(path: &str) -> Result<()> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let report = parse(&raw)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_export(path: &str) -> Result<()> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let report = parse(&raw)?;
    let input = Path::new(path);
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let out_path = input.with_file_name(format!("{stem}_export.html"));
    fs::write(&out_path, standalone_html(&report))
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    info!("exported {}", out_path.display());
    println!("{}", out_path.display());
    Ok(())
}

fn cmd_edit(report_path: &str, edit_path: &str) -> Result<()> {
    let raw = fs::read_to_string(report_path)
        .with_context(|| format!("failed to read {report_path}"))?;
    let edit: ElementEdit = serde_json::from_str(
        &fs::read_to_string(edit_path).with_context(|| format!("failed to read {edit_path}"))?,
    )
    .context("edit file is not a valid element edit")?;

    let patched = apply_edit(&raw, &edit)?;

    // Confirm the patched text still extracts before persisting it.
    if let Err(e) = parse(&patched) {
        warn!("patched document no longer parses ({e}); not writing");
        bail!("edit produced an unparseable document");
    }
    fs::write(report_path, &patched)
        .with_context(|| format!("failed to write {report_path}"))?;
    info!(
        "applied {} edit at ({}, {}) to {report_path}",
        edit.kind, edit.original_x, edit.original_y
    );
    Ok(())
}

fn cmd_batch(input_dir: &str, output_dir: &str) -> Result<()> {
    let outcome = ReportProcessor::new().process_reports(Path::new(input_dir), Path::new(output_dir))?;
    println!("{} rendered, {} failed", outcome.rendered, outcome.failed);
    Ok(())
}
