//! The normalized in-memory Report Model.
//!
//! A `Report` is a derived, disposable view over the raw document text: it is
//! produced fresh on every parse, never mutated in place, and discarded after
//! each render or patch round. The serde shape (camelCase names, `type` for
//! the element tag, absent optionals omitted) is the JSON contract handed to
//! the rendering canvas and the host shell.

use crate::{ElementKind, Orientation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub name: String,
    pub page_width: i32,
    pub page_height: i32,
    pub orientation: Orientation,
    pub column_width: i32,
    pub left_margin: i32,
    pub right_margin: i32,
    pub top_margin: i32,
    pub bottom_margin: i32,
    pub parameters: Vec<Parameter>,
    pub fields: Vec<Field>,
    pub variables: Vec<Variable>,
    pub groups: Vec<Group>,
    /// Bands in canonical stacking order: named band types in declaration
    /// order, then group header/footer bands in group declaration order.
    /// Rendering stacks these top to bottom; the order is load-bearing.
    pub bands: Vec<Band>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub is_for_prompting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value_expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    /// Calculation kind (Nothing, Count, Sum, ...). Opaque, never validated.
    pub calculation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// One of the fixed band tags, or `groupHeader-<name>` /
    /// `groupFooter-<name>` for group-derived bands.
    #[serde(rename = "type")]
    pub band_type: String,
    pub height: i32,
    pub elements: Vec<Element>,
}

/// A positioned visual primitive inside a band. Coordinates are px relative
/// to the band origin. There is no persistent identity beyond
/// (kind, original x, original y), the natural key used by the patch engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_alignment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_alignment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backcolor: Option<String>,
    /// Display mode: Opaque or Transparent. Carried as an opaque string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl Element {
    pub fn new(kind: ElementKind, x: i32, y: i32, width: i32, height: i32) -> Self {
        Element {
            kind,
            x,
            y,
            width,
            height,
            text: None,
            expression: None,
            pattern: None,
            font_name: None,
            font_size: None,
            is_bold: None,
            text_alignment: None,
            vertical_alignment: None,
            forecolor: None,
            backcolor: None,
            mode: None,
        }
    }
}

impl Report {
    /// Total stacked height of all bands, as rendered top to bottom.
    pub fn total_band_height(&self) -> i32 {
        self.bands.iter().map(|b| b.height).sum()
    }
}
