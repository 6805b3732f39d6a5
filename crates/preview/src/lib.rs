//! Orka dry-run preview: a read-only YAML view of an object with an optional
//! managed-fields redaction toggle.
//!
//! The pipeline is linear: [`redact`] → [`serialize_tree`] → [`PreviewMemo`]
//! caches the result per `(object identity, flag)`. [`DryRunPreview`] wraps it
//! with dialog state and produces the props frontends render.

#![forbid(unsafe_code)]

mod dialog;
mod memo;
mod redact;
mod render;

pub use dialog::{DryRunPreview, PreviewEvent, PreviewOutcome, PreviewView, CLOSE_LABEL, HIDE_MANAGED_LABEL};
pub use memo::{render, PreviewMemo, Rendered, RENDER_FAILED};
pub use redact::redact;
pub use render::{serialize, serialize_tree};

pub use orka_core::{ColorScheme, PreviewLimits, SerializationError, Translate, Tree, Untranslated};
