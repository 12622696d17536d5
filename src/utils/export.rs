//! Standalone HTML export: a self-contained preview page for a parsed report.
//!
//! Pure string formatting of the already-extracted model; no file I/O and no
//! ambient state. The caller decides where the page goes.

use crate::core::model::{Band, Element, Report};

pub fn standalone_html(report: &Report) -> String {
    let bands: String = report.bands.iter().map(render_band).collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{name} - JRXML Report</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; background: #f5f5f5; }}
        .report-container {{ background: white; padding: 20px; max-width: {page_width}px; margin: 0 auto; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
        .report-header {{ border-bottom: 2px solid #333; padding-bottom: 10px; margin-bottom: 20px; }}
        h1 {{ margin: 0; color: #333; }}
        .report-info {{ color: #666; font-size: 14px; margin-top: 5px; }}
        .band {{ border: 1px solid #ddd; margin: 10px 0; padding: 10px; position: relative; }}
        .band-label {{ background: #007acc; color: white; padding: 2px 8px; font-size: 11px; font-weight: bold; display: inline-block; margin-bottom: 5px; }}
        .element {{ margin: 5px 0; padding: 5px; background: #f9f9f9; border-left: 3px solid #007acc; }}
        .element-type {{ font-weight: bold; color: #007acc; font-size: 12px; }}
        .element-content {{ color: #333; margin-top: 3px; }}
    </style>
</head>
<body>
    <div class="report-container">
        <div class="report-header">
            <h1>{name}</h1>
            <div class="report-info">
                {page_width} &times; {page_height} px | {orientation} |
                Parameters: {parameters} | Fields: {fields} | Variables: {variables}
            </div>
        </div>
{bands}    </div>
</body>
</html>"#,
        name = escape_html(&report.name),
        page_width = report.page_width,
        page_height = report.page_height,
        orientation = report.orientation.as_str(),
        parameters = report.parameters.len(),
        fields = report.fields.len(),
        variables = report.variables.len(),
    )
}

fn render_band(band: &Band) -> String {
    let elements: String = band.elements.iter().map(render_element).collect();
    format!(
        r#"        <div class="band">
            <span class="band-label">{label}</span>
{elements}        </div>
"#,
        label = escape_html(&band.band_type.to_uppercase()),
    )
}

fn render_element(element: &Element) -> String {
    let content = element
        .text
        .as_deref()
        .or(element.expression.as_deref())
        .filter(|c| !c.is_empty())
        .unwrap_or("(empty)");
    format!(
        r#"            <div class="element">
                <div class="element-type">{kind}</div>
                <div class="element-content">{content}</div>
            </div>
"#,
        kind = escape_html(element.kind.tag()),
        content = escape_html(content),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
