//! Orka core types for the dry-run preview.
//!
//! Frontends (CLI/GUI) and the preview pipeline share these types: the object
//! tree, the serialization error, runtime limits, and the props handed to the
//! display collaborators (dialog host, toggle, read-only text surface).

#![forbid(unsafe_code)]

use std::borrow::Cow;
use std::collections::HashMap;

use serde::Serialize;

/// One Kubernetes object as a generic tree of mappings, sequences and scalars.
///
/// Mapping keys keep insertion order (`serde_json/preserve_order`), which keeps
/// rendered previews stable across runs.
pub type Tree = serde_json::Value;

pub const METADATA: &str = "metadata";
pub const MANAGED_FIELDS: &str = "managedFields";

/// Syntax mode handed to the display surface.
pub const SYNTAX_YAML: &str = "yaml";

/// Initial state of the "hide managed fields" toggle.
pub const fn default_hide_managed() -> bool {
    cfg!(feature = "strip-managed-fields")
}

/// Failure to turn a display object into preview text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializationError {
    #[error("value cannot be represented: {0}")]
    Unsupported(String),
    #[error("document nested deeper than {max} levels")]
    TooDeep { max: usize },
    #[error("document too complex (>{max} nodes)")]
    TooManyNodes { max: usize },
    #[error("yaml encoding failed: {0}")]
    Encode(String),
}

/// Guards applied before encoding a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLimits {
    pub max_nodes: usize,
    pub max_depth: usize,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self { max_nodes: 100_000, max_depth: 128 }
    }
}

impl PreviewLimits {
    /// Read `ORKA_MAX_YAML_NODES` and `ORKA_PREVIEW_MAX_DEPTH`, falling back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        let max_nodes = std::env::var("ORKA_MAX_YAML_NODES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(d.max_nodes);
        let max_depth = std::env::var("ORKA_PREVIEW_MAX_DEPTH")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(d.max_depth);
        Self { max_nodes: max_nodes.max(1), max_depth: max_depth.max(1) }
    }
}

/// Light/dark base of the current UI theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn from_dark(dark: bool) -> Self {
        if dark { ColorScheme::Dark } else { ColorScheme::Light }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, ColorScheme::Dark)
    }

    /// Editor theme name used by code-editor style surfaces.
    pub fn editor_theme(self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "vs-dark",
        }
    }
}

/// Presentation hints for the read-only editor surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceOptions {
    pub select_on_line_numbers: bool,
    pub minimap: bool,
    pub word_wrap: bool,
    pub scroll_beyond_last_line: bool,
    /// Fraction of the host viewport height given to the dialog body.
    pub height_fraction: f32,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            select_on_line_numbers: true,
            minimap: true,
            word_wrap: true,
            scroll_beyond_last_line: false,
            height_fraction: 0.8,
        }
    }
}

/// What the display surface renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceProps<'a> {
    pub content: Cow<'a, str>,
    pub syntax_mode: &'static str,
    pub read_only: bool,
    pub color_scheme: ColorScheme,
    /// Editor theme name for `color_scheme` (`light` / `vs-dark`).
    pub editor_theme: &'static str,
    pub options: SurfaceOptions,
}

/// What the dialog host shows; dismissal comes back as a close request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogProps<'a> {
    pub is_open: bool,
    pub title: &'a str,
    pub full_screen_capable: bool,
}

/// State of the managed-fields switch; flips come back as toggle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleProps<'a> {
    pub checked: bool,
    pub label: Cow<'a, str>,
}

/// Translation capability injected by the host UI.
pub trait Translate {
    fn translate<'a>(&'a self, key: &'a str) -> Cow<'a, str>;
}

/// Returns keys unchanged; keys are written in English.
#[derive(Debug, Clone, Copy, Default)]
pub struct Untranslated;

impl Translate for Untranslated {
    fn translate<'a>(&'a self, key: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(key)
    }
}

impl Translate for HashMap<String, String> {
    fn translate<'a>(&'a self, key: &'a str) -> Cow<'a, str> {
        match self.get(key) {
            Some(v) => Cow::Borrowed(v.as_str()),
            None => Cow::Borrowed(key),
        }
    }
}

pub mod prelude {
    pub use super::{
        ColorScheme, DialogProps, PreviewLimits, SerializationError, SurfaceOptions, SurfaceProps,
        ToggleProps, Translate, Tree, Untranslated,
    };
}
