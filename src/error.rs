use crate::ElementKind;
use thiserror::Error;

/// Failure to locate a recognizable report structure in the input text.
///
/// Malformed numerics never end up here; they fall back to defaults during
/// extraction. This error only fires when the document cannot be read as XML
/// at all, or no report root exists under any namespace-tolerant alias.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("malformed XML: {0}")]
    Malformed(#[from] roxmltree::Error),
    #[error("no jasperReport root element found")]
    MissingRoot,
}

/// Failure of a patch application. The input text is never modified when one
/// of these is returned.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The (kind, old x, old y) lookup key matched no fragment in the text.
    #[error("no {kind} element found at ({x}, {y})")]
    NotFound { kind: ElementKind, x: i32, y: i32 },
    /// The computed output was byte-identical to the input. Guards against a
    /// no-op being reported as a successful edit.
    #[error("edit produced no change to the document")]
    NoChange,
}
