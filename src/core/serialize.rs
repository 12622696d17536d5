//! JRXML writer: a [`Report`] back out as report-definition XML.
//!
//! This is the text backend of the export collaborator. It emits a canonical
//! document, with named bands regrouped into their container tags and group
//! bands re-nested under their group declarations, such that re-parsing the
//! output reproduces the model field-for-field. It makes no attempt to preserve the
//! formatting of whatever document the model came from; that is the patch
//! engine's job.

use crate::core::extract::BAND_TYPES;
use crate::core::model::{Band, Element, Report};
use crate::ElementKind;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

pub fn serialize(report: &Report) -> Result<String, quick_xml::Error> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("jasperReport");
    root.push_attribute(("name", report.name.as_str()));
    root.push_attribute(("pageWidth", report.page_width.to_string().as_str()));
    root.push_attribute(("pageHeight", report.page_height.to_string().as_str()));
    root.push_attribute(("orientation", report.orientation.as_str()));
    root.push_attribute(("columnWidth", report.column_width.to_string().as_str()));
    root.push_attribute(("leftMargin", report.left_margin.to_string().as_str()));
    root.push_attribute(("rightMargin", report.right_margin.to_string().as_str()));
    root.push_attribute(("topMargin", report.top_margin.to_string().as_str()));
    root.push_attribute(("bottomMargin", report.bottom_margin.to_string().as_str()));
    writer.write_event(Event::Start(root))?;

    for parameter in &report.parameters {
        let mut tag = BytesStart::new("parameter");
        tag.push_attribute(("name", parameter.name.as_str()));
        tag.push_attribute(("class", parameter.class_name.as_str()));
        tag.push_attribute((
            "isForPrompting",
            if parameter.is_for_prompting { "true" } else { "false" },
        ));
        match &parameter.default_value_expression {
            Some(expression) => {
                writer.write_event(Event::Start(tag))?;
                write_literal(&mut writer, "defaultValueExpression", expression)?;
                writer.write_event(Event::End(BytesEnd::new("parameter")))?;
            }
            None => writer.write_event(Event::Empty(tag))?,
        }
    }

    for field in &report.fields {
        let mut tag = BytesStart::new("field");
        tag.push_attribute(("name", field.name.as_str()));
        tag.push_attribute(("class", field.class_name.as_str()));
        writer.write_event(Event::Empty(tag))?;
    }

    for variable in &report.variables {
        let mut tag = BytesStart::new("variable");
        tag.push_attribute(("name", variable.name.as_str()));
        tag.push_attribute(("class", variable.class_name.as_str()));
        tag.push_attribute(("calculation", variable.calculation.as_str()));
        match &variable.expression {
            Some(expression) => {
                writer.write_event(Event::Start(tag))?;
                write_literal(&mut writer, "variableExpression", expression)?;
                writer.write_event(Event::End(BytesEnd::new("variable")))?;
            }
            None => writer.write_event(Event::Empty(tag))?,
        }
    }

    for group in &report.groups {
        // The extractor falls back to "group" when a group has no name; the
        // band tags carry that effective name.
        let effective_name = if group.name.is_empty() {
            "group"
        } else {
            group.name.as_str()
        };
        let mut tag = BytesStart::new("group");
        tag.push_attribute(("name", group.name.as_str()));
        writer.write_event(Event::Start(tag))?;
        write_literal(&mut writer, "groupExpression", &group.expression)?;
        write_group_bands(
            &mut writer,
            report,
            "groupHeader",
            &format!("groupHeader-{effective_name}"),
        )?;
        write_group_bands(
            &mut writer,
            report,
            "groupFooter",
            &format!("groupFooter-{effective_name}"),
        )?;
        writer.write_event(Event::End(BytesEnd::new("group")))?;
    }

    for band_type in BAND_TYPES {
        let bands: Vec<&Band> = report
            .bands
            .iter()
            .filter(|b| b.band_type == band_type)
            .collect();
        if bands.is_empty() {
            continue;
        }
        writer.write_event(Event::Start(BytesStart::new(band_type)))?;
        for band in bands {
            write_band(&mut writer, band)?;
        }
        writer.write_event(Event::End(BytesEnd::new(band_type)))?;
    }

    writer.write_event(Event::End(BytesEnd::new("jasperReport")))?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn write_group_bands<W: Write>(
    writer: &mut Writer<W>,
    report: &Report,
    container: &str,
    band_type: &str,
) -> Result<(), quick_xml::Error> {
    let bands: Vec<&Band> = report
        .bands
        .iter()
        .filter(|b| b.band_type == band_type)
        .collect();
    if bands.is_empty() {
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(container)))?;
    for band in bands {
        write_band(writer, band)?;
    }
    writer.write_event(Event::End(BytesEnd::new(container)))?;
    Ok(())
}

fn write_band<W: Write>(writer: &mut Writer<W>, band: &Band) -> Result<(), quick_xml::Error> {
    let mut tag = BytesStart::new("band");
    tag.push_attribute(("height", band.height.to_string().as_str()));
    if band.elements.is_empty() {
        return writer.write_event(Event::Empty(tag));
    }
    writer.write_event(Event::Start(tag))?;
    for element in &band.elements {
        write_element(writer, element)?;
    }
    writer.write_event(Event::End(BytesEnd::new("band")))
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    element: &Element,
) -> Result<(), quick_xml::Error> {
    // Unknown kinds are passthrough in the model; there is nothing faithful
    // to emit for them.
    if matches!(element.kind, ElementKind::Unknown(_)) {
        return Ok(());
    }
    let name = element.kind.tag().to_string();

    let mut open = BytesStart::new(name.as_str());
    if element.kind == ElementKind::Chart {
        open.push_attribute(("chartType", element.expression.as_deref().unwrap_or("chart")));
    }
    if element.kind == ElementKind::TextField {
        if let Some(pattern) = &element.pattern {
            open.push_attribute(("pattern", pattern.as_str()));
        }
    }
    writer.write_event(Event::Start(open))?;

    let mut geometry = BytesStart::new("reportElement");
    geometry.push_attribute(("x", element.x.to_string().as_str()));
    geometry.push_attribute(("y", element.y.to_string().as_str()));
    geometry.push_attribute(("width", element.width.to_string().as_str()));
    geometry.push_attribute(("height", element.height.to_string().as_str()));
    if let Some(color) = &element.forecolor {
        geometry.push_attribute(("forecolor", color.as_str()));
    }
    if let Some(color) = &element.backcolor {
        geometry.push_attribute(("backcolor", color.as_str()));
    }
    if let Some(mode) = &element.mode {
        geometry.push_attribute(("mode", mode.as_str()));
    }
    writer.write_event(Event::Empty(geometry))?;

    let has_font =
        element.font_name.is_some() || element.font_size.is_some() || element.is_bold.is_some();
    if has_font || element.text_alignment.is_some() || element.vertical_alignment.is_some() {
        let mut text_element = BytesStart::new("textElement");
        if let Some(alignment) = &element.text_alignment {
            text_element.push_attribute(("textAlignment", alignment.as_str()));
        }
        if let Some(alignment) = &element.vertical_alignment {
            text_element.push_attribute(("verticalAlignment", alignment.as_str()));
        }
        if has_font {
            writer.write_event(Event::Start(text_element))?;
            let mut font = BytesStart::new("font");
            if let Some(font_name) = &element.font_name {
                font.push_attribute(("fontName", font_name.as_str()));
            }
            if let Some(size) = element.font_size {
                font.push_attribute(("size", size.to_string().as_str()));
            }
            if let Some(bold) = element.is_bold {
                font.push_attribute(("isBold", if bold { "true" } else { "false" }));
            }
            writer.write_event(Event::Empty(font))?;
            writer.write_event(Event::End(BytesEnd::new("textElement")))?;
        } else {
            writer.write_event(Event::Empty(text_element))?;
        }
    }

    match element.kind {
        ElementKind::StaticText => {
            if let Some(text) = &element.text {
                write_literal(writer, "text", text)?;
            }
        }
        ElementKind::TextField => {
            if let Some(expression) = &element.expression {
                write_literal(writer, "textFieldExpression", expression)?;
            }
        }
        ElementKind::Subreport => {
            if let Some(expression) = &element.expression {
                write_literal(writer, "subreportExpression", expression)?;
            }
        }
        _ => {}
    }

    writer.write_event(Event::End(BytesEnd::new(name.as_str())))
}

/// Literal content block: CDATA by convention, entity-escaped text when the
/// payload would terminate the CDATA section.
fn write_literal<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: &str,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    if value.contains("]]>") {
        writer.write_event(Event::Text(BytesText::new(value)))?;
    } else {
        writer.write_event(Event::CData(BytesCData::new(value)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))
}
