use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use orka_core::{PreviewLimits, SerializationError, Translate, Tree};
use tracing::{debug, warn};

use crate::redact::redact;
use crate::render::serialize_tree;

/// Translation key of the placeholder shown when rendering fails.
pub const RENDER_FAILED: &str = "Unable to render preview";

/// Outcome of one redact + serialize pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Ok(String),
    Failed(SerializationError),
}

impl Rendered {
    pub fn is_ok(&self) -> bool {
        matches!(self, Rendered::Ok(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Rendered::Ok(s) => Some(s),
            Rendered::Failed(_) => None,
        }
    }

    /// Text for the display surface: the YAML, or a placeholder naming the failure.
    pub fn content<'a>(&'a self, t: &'a dyn Translate) -> Cow<'a, str> {
        match self {
            Rendered::Ok(s) => Cow::Borrowed(s.as_str()),
            Rendered::Failed(e) => Cow::Owned(format!("{}: {}", t.translate(RENDER_FAILED), e)),
        }
    }
}

/// Redact then serialize; failures are captured, never propagated.
///
/// Frontends hold a [`Tree`], so this goes through [`serialize_tree`]; the
/// generic [`crate::serialize`] is for callers starting from typed values.
pub fn render(source: &Tree, hide_managed: bool, limits: &PreviewLimits) -> Rendered {
    let display = redact(source, hide_managed);
    match serialize_tree(&display, limits) {
        Ok(text) => Rendered::Ok(text),
        Err(e) => Rendered::Failed(e),
    }
}

struct Entry {
    source: Arc<Tree>,
    hide_managed: bool,
    rendered: Rendered,
}

/// Caches the last rendering keyed by object identity and flag value.
pub struct PreviewMemo {
    limits: PreviewLimits,
    last: Option<Entry>,
    recomputations: u64,
}

impl Default for PreviewMemo {
    fn default() -> Self {
        Self::new(PreviewLimits::from_env())
    }
}

impl PreviewMemo {
    pub fn new(limits: PreviewLimits) -> Self {
        Self { limits, last: None, recomputations: 0 }
    }

    /// Number of times the pipeline actually ran.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Drop the cached rendering.
    pub fn clear(&mut self) {
        self.last = None;
    }

    pub fn render(&mut self, source: &Arc<Tree>, hide_managed: bool) -> &Rendered {
        let entry = match self.last.take() {
            Some(e) if Arc::ptr_eq(&e.source, source) && e.hide_managed == hide_managed => e,
            _ => self.recompute(source, hide_managed),
        };
        &self.last.insert(entry).rendered
    }

    fn recompute(&mut self, source: &Arc<Tree>, hide_managed: bool) -> Entry {
        let t0 = Instant::now();
        let rendered = render(source, hide_managed, &self.limits);
        self.recomputations += 1;
        counter!("preview_render_total", 1u64);
        histogram!("preview_render_ms", t0.elapsed().as_secs_f64() * 1000.0);
        match &rendered {
            Rendered::Ok(text) => debug!(bytes = text.len(), hide_managed, "preview rendered"),
            Rendered::Failed(e) => {
                counter!("preview_render_err", 1u64);
                warn!(error = %e, hide_managed, "preview render failed; showing placeholder");
            }
        }
        Entry { source: Arc::clone(source), hide_managed, rendered }
    }
}
