//! Patch Engine: scoped substring surgery over the original document text.
//!
//! A full re-serialization would destroy unrelated formatting, whitespace and
//! comments, so edits are applied by locating the target element's markup in
//! the raw text and rewriting only that fragment. Everything outside the
//! located span is byte-identical in the output. The raw text is treated as a
//! flat token stream here; no tree is built. The trade-off is fragility on
//! irregular nesting, accepted deliberately and kept behind
//! [`locate_element_span`] so the strategy can be swapped for a structural
//! writer later without touching the field-application logic.

use crate::error::PatchError;
use crate::ElementKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Geometry-carrier open tag, self-closing or not.
static REPORT_ELEMENT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<reportElement\b[^>]*>").expect("static regex"));

/// Typography font sub-tag.
static FONT_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<font\b[^>]*>").expect("static regex"));

/// Typography carrier open tag.
static TEXT_ELEMENT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<textElement\b[^>]*>").expect("static regex"));

/// Static text content block, inner content included.
static TEXT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(<text\b[^>]*>).*?(</text>)").expect("static regex"));

/// Text field expression block, inner content included.
static EXPRESSION_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(<textFieldExpression\b[^>]*>).*?(</textFieldExpression>)")
        .expect("static regex")
});

/// One attribute inside an open tag's text.
static ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z_][A-Za-z0-9_.:-]*)\s*=\s*"([^"]*)""#).expect("static regex"));

/// A user-submitted edit against one element. The element is re-located by
/// its natural key: kind plus the (x, y) it had when the model was extracted.
/// Geometry always carries the full new values; every other field is applied
/// only when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementEdit {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub original_x: i32,
    pub original_y: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backcolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl ElementEdit {
    /// An edit that only moves/resizes, carrying no content changes.
    pub fn geometry(kind: ElementKind, original_x: i32, original_y: i32) -> Self {
        ElementEdit {
            kind,
            original_x,
            original_y,
            x: original_x,
            y: original_y,
            width: 0,
            height: 0,
            text: None,
            expression: None,
            font_name: None,
            font_size: None,
            is_bold: None,
            forecolor: None,
            backcolor: None,
            mode: None,
        }
    }
}

/// A byte span over the original text. `start..end`, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

/// Locate the parent block of the element matching the natural key: the
/// substring from the nearest `<kind` open tag before the matching geometry
/// carrier to the nearest `</kind>` close tag after it, inclusive.
///
/// Multiple elements sharing (kind, x, y) resolve to the first occurrence in
/// document order. Known limitation, deterministic on purpose.
pub fn locate_element_span(text: &str, kind: &ElementKind, x: i32, y: i32) -> Option<TextSpan> {
    let x = x.to_string();
    let y = y.to_string();
    let open_marker = format!("<{}", kind.tag());
    let close_marker = format!("</{}>", kind.tag());

    for m in REPORT_ELEMENT_TAG.find_iter(text) {
        let tag = m.as_str();
        if tag_attr(tag, "x").as_deref() != Some(x.as_str())
            || tag_attr(tag, "y").as_deref() != Some(y.as_str())
        {
            continue;
        }
        let start = text[..m.start()].rfind(&open_marker)?;
        let close = text[m.end()..].find(&close_marker)? + m.end();
        return Some(TextSpan {
            start,
            end: close + close_marker.len(),
        });
    }
    None
}

/// Apply one edit to the raw text, returning the new text. Everything outside
/// the target element's parent block is byte-for-byte unchanged. The input is
/// never modified on failure; each call is total-or-nothing.
pub fn apply_edit(raw: &str, edit: &ElementEdit) -> Result<String, PatchError> {
    let span = locate_element_span(raw, &edit.kind, edit.original_x, edit.original_y).ok_or(
        PatchError::NotFound {
            kind: edit.kind.clone(),
            x: edit.original_x,
            y: edit.original_y,
        },
    )?;

    let block = rewrite_block(&raw[span.start..span.end], edit);

    let mut out = String::with_capacity(raw.len() + block.len());
    out.push_str(&raw[..span.start]);
    out.push_str(&block);
    out.push_str(&raw[span.end..]);

    if out == raw {
        return Err(PatchError::NoChange);
    }
    Ok(out)
}

/// Rewrite one parent block according to the edit. Geometry first, then
/// typography, then content; each step touches the narrowest fragment it can.
fn rewrite_block(block: &str, edit: &ElementEdit) -> String {
    let mut block = block.to_string();

    if let Some(m) = REPORT_ELEMENT_TAG.find(&block) {
        let mut tag = block[m.start()..m.end()].to_string();
        tag = set_attr(&tag, "x", &edit.x.to_string());
        tag = set_attr(&tag, "y", &edit.y.to_string());
        tag = set_attr(&tag, "width", &edit.width.to_string());
        tag = set_attr(&tag, "height", &edit.height.to_string());
        if let Some(color) = &edit.forecolor {
            tag = set_attr(&tag, "forecolor", color);
        }
        if let Some(color) = &edit.backcolor {
            tag = set_attr(&tag, "backcolor", color);
        }
        if let Some(mode) = &edit.mode {
            tag = set_attr(&tag, "mode", mode);
        }
        block.replace_range(m.start()..m.end(), &tag);
    }

    if edit.font_name.is_some() || edit.font_size.is_some() || edit.is_bold.is_some() {
        rewrite_font(&mut block, edit);
    }

    if edit.kind == ElementKind::StaticText {
        if let Some(text) = &edit.text {
            rewrite_content(&mut block, &TEXT_BLOCK, "text", &edit.kind, text);
        }
    }
    if edit.kind == ElementKind::TextField {
        if let Some(expression) = &edit.expression {
            rewrite_content(
                &mut block,
                &EXPRESSION_BLOCK,
                "textFieldExpression",
                &edit.kind,
                expression,
            );
        }
    }

    block
}

/// Rewrite (or insert) the font sub-tag of the typography carrier. Only the
/// attributes the edit carries are touched; the rest of the font tag stays.
fn rewrite_font(block: &mut String, edit: &ElementEdit) {
    let attrs = |mut tag: String| {
        if let Some(name) = &edit.font_name {
            tag = set_attr(&tag, "fontName", name);
        }
        if let Some(size) = edit.font_size {
            tag = set_attr(&tag, "size", &size.to_string());
        }
        if let Some(bold) = edit.is_bold {
            tag = set_attr(&tag, "isBold", if bold { "true" } else { "false" });
        }
        tag
    };

    if let Some(m) = FONT_TAG.find(block) {
        let tag = attrs(block[m.start()..m.end()].to_string());
        block.replace_range(m.start()..m.end(), &tag);
        return;
    }

    let font = attrs("<font/>".to_string());

    if let Some(m) = TEXT_ELEMENT_TAG.find(block) {
        let open = &block[m.start()..m.end()];
        if open.ends_with("/>") {
            // Expand the self-closing carrier so the font has somewhere to live.
            let expanded = format!(
                "{}>{}</textElement>",
                open[..open.len() - 2].trim_end(),
                font
            );
            block.replace_range(m.start()..m.end(), &expanded);
        } else {
            block.insert_str(m.end(), &font);
        }
        return;
    }

    // No typography carrier at all: insert one right after the geometry tag.
    if let Some(m) = REPORT_ELEMENT_TAG.find(block) {
        block.insert_str(m.end(), &format!("<textElement>{font}</textElement>"));
    }
}

/// Rewrite the inner content of a content tag (`<text>` /
/// `<textFieldExpression>`) as an escaped literal block, keeping the tag where
/// it was. Inserts the tag before the element close when it does not exist.
fn rewrite_content(
    block: &mut String,
    pattern: &Regex,
    tag_name: &str,
    kind: &ElementKind,
    value: &str,
) {
    let literal = literal_block(value);
    if let Some(caps) = pattern.captures(block) {
        let open = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
        let close = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        block.replace_range(whole, &format!("{open}{literal}{close}"));
        return;
    }
    let close_marker = format!("</{}>", kind.tag());
    if let Some(at) = block.rfind(&close_marker) {
        block.insert_str(at, &format!("<{tag_name}>{literal}</{tag_name}>"));
    }
}

/// CDATA is the JRXML convention for literal content; payloads that would
/// terminate the CDATA section fall back to entity escaping.
fn literal_block(value: &str) -> String {
    if value.contains("]]>") {
        quick_xml::escape::escape(value).into_owned()
    } else {
        format!("<![CDATA[{value}]]>")
    }
}

fn tag_attr(tag: &str, name: &str) -> Option<String> {
    ATTR.captures_iter(tag)
        .find(|c| c.get(1).map(|m| m.as_str()) == Some(name))
        .map(|c| c[2].to_string())
}

/// Replace an attribute's value in an open tag's text, or append the
/// attribute before the tag terminator when it is absent.
fn set_attr(tag: &str, name: &str, value: &str) -> String {
    if let Some(caps) = ATTR
        .captures_iter(tag)
        .find(|c| c.get(1).map(|m| m.as_str()) == Some(name))
    {
        let range = caps.get(2).map(|m| m.range()).unwrap_or(0..0);
        let mut out = tag.to_string();
        out.replace_range(range, value);
        return out;
    }
    let insert_at = if tag.ends_with("/>") {
        tag.len() - 2
    } else {
        tag.len() - 1
    };
    let mut out = String::with_capacity(tag.len() + name.len() + value.len() + 4);
    out.push_str(tag[..insert_at].trim_end());
    out.push_str(&format!(" {name}=\"{value}\""));
    out.push_str(&tag[insert_at..]);
    out
}
