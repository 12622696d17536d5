use jrxml_preview::parse;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let data_dir = Path::new("./data");
    if !data_dir.exists() {
        println!("No data/ directory found. Create data/ and place .jrxml files there.");
        return Ok(());
    }

    for entry in std::fs::read_dir(data_dir)? {
        let entry = entry?;
        let path = entry.path();
        if let Some(ext) = path.extension() {
            if ext == "jrxml" {
                println!("Parsing {}", path.display());
                let raw = std::fs::read_to_string(&path)?;
                let report = parse(&raw)?;
                println!(
                    "{}: {}x{} {}, {} bands",
                    report.name,
                    report.page_width,
                    report.page_height,
                    report.orientation.as_str(),
                    report.bands.len()
                );
                for band in report.bands.iter().take(5) {
                    println!("  [{}] height {} ({} elements)", band.band_type, band.height, band.elements.len());
                }
            }
        }
    }

    Ok(())
}
