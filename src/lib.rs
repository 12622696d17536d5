pub mod core {
    pub mod extract;
    pub mod model;
    pub mod patch;
    pub mod serialize;
}

pub mod utils {
    pub mod batch;
    pub mod export;
}

pub mod error;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub use crate::core::extract::parse;
pub use crate::core::model::{Band, Element, Field, Group, Parameter, Report, Variable};
pub use crate::core::patch::{apply_edit, locate_element_span, ElementEdit, TextSpan};
pub use crate::core::serialize::serialize;
pub use crate::error::{PatchError, StructureError};

/// Page orientation of a report. Anything that isn't `Landscape` parses as
/// `Portrait`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn from_attr(value: &str) -> Self {
        if value.eq_ignore_ascii_case("landscape") {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

/// The tag of a band element. Unknown tags are carried through verbatim so a
/// document using dialect extensions still serializes to the same JSON shape,
/// but only the seven known kinds are ever extracted or patched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    StaticText,
    TextField,
    Image,
    Line,
    Rectangle,
    Subreport,
    Chart,
    Unknown(String),
}

impl ElementKind {
    /// The kinds the extractor scans for, in extraction order.
    pub const EXTRACTED: [ElementKind; 7] = [
        ElementKind::StaticText,
        ElementKind::TextField,
        ElementKind::Image,
        ElementKind::Line,
        ElementKind::Rectangle,
        ElementKind::Subreport,
        ElementKind::Chart,
    ];

    pub fn tag(&self) -> &str {
        match self {
            ElementKind::StaticText => "staticText",
            ElementKind::TextField => "textField",
            ElementKind::Image => "image",
            ElementKind::Line => "line",
            ElementKind::Rectangle => "rectangle",
            ElementKind::Subreport => "subreport",
            ElementKind::Chart => "chart",
            ElementKind::Unknown(tag) => tag,
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "staticText" => ElementKind::StaticText,
            "textField" => ElementKind::TextField,
            "image" => ElementKind::Image,
            "line" => ElementKind::Line,
            "rectangle" => ElementKind::Rectangle,
            "subreport" => ElementKind::Subreport,
            "chart" => ElementKind::Chart,
            other => ElementKind::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// The JSON contract carries the kind as a plain tag string ("staticText",
// "textField", ...), not as an object, so serde derives don't fit here.
impl Serialize for ElementKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for ElementKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ElementKind::from_tag(&tag))
    }
}
