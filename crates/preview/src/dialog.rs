use std::borrow::Cow;
use std::sync::Arc;

use orka_core::{
    default_hide_managed, ColorScheme, DialogProps, PreviewLimits, SurfaceOptions, SurfaceProps,
    ToggleProps, Translate, Tree, SYNTAX_YAML,
};
use tracing::info;

use crate::memo::PreviewMemo;

pub const HIDE_MANAGED_LABEL: &str = "Hide managed fields";
pub const CLOSE_LABEL: &str = "Close";

/// Input coming back from the collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewEvent {
    ToggleManagedFields,
    RequestClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOutcome {
    Toggled { hide_managed: bool },
    Closed,
    /// Event arrived while the dialog was closed.
    Ignored,
}

/// Everything a frontend needs to draw one frame of the dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewView<'a> {
    pub dialog: DialogProps<'a>,
    pub toggle: ToggleProps<'a>,
    pub surface: SurfaceProps<'a>,
    pub close_label: Cow<'a, str>,
    /// True when `surface.content` is the failure placeholder.
    pub failed: bool,
}

/// Read-only preview dialog for a dry-run result.
///
/// The toggle state survives close/open; the rendered text does not.
pub struct DryRunPreview {
    item: Arc<Tree>,
    title: String,
    open: bool,
    hide_managed: bool,
    options: SurfaceOptions,
    memo: PreviewMemo,
}

impl DryRunPreview {
    pub fn new(item: Arc<Tree>, title: impl Into<String>) -> Self {
        Self {
            item,
            title: title.into(),
            open: false,
            hide_managed: default_hide_managed(),
            options: SurfaceOptions::default(),
            memo: PreviewMemo::default(),
        }
    }

    pub fn with_limits(mut self, limits: PreviewLimits) -> Self {
        self.memo = PreviewMemo::new(limits);
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn hide_managed(&self) -> bool {
        self.hide_managed
    }

    pub fn set_hide_managed(&mut self, hide: bool) {
        self.hide_managed = hide;
    }

    pub fn set_item(&mut self, item: Arc<Tree>) {
        self.item = item;
    }

    /// Times the redact + serialize pipeline ran for this dialog.
    pub fn recomputations(&self) -> u64 {
        self.memo.recomputations()
    }

    pub fn open(&mut self) {
        if !self.open {
            info!(title = %self.title, "preview: open");
        }
        self.open = true;
    }

    pub fn close(&mut self) {
        if self.open {
            info!(title = %self.title, "preview: close");
        }
        self.open = false;
        self.memo.clear();
    }

    pub fn handle(&mut self, event: PreviewEvent) -> PreviewOutcome {
        if !self.open {
            return PreviewOutcome::Ignored;
        }
        match event {
            PreviewEvent::ToggleManagedFields => {
                self.hide_managed = !self.hide_managed;
                info!(hide_managed = self.hide_managed, "preview: toggle managed fields");
                PreviewOutcome::Toggled { hide_managed: self.hide_managed }
            }
            PreviewEvent::RequestClose => {
                self.close();
                PreviewOutcome::Closed
            }
        }
    }

    /// Props for the current frame, or `None` (and no work) while closed.
    pub fn view<'a>(&'a mut self, scheme: ColorScheme, t: &'a dyn Translate) -> Option<PreviewView<'a>> {
        if !self.open {
            return None;
        }
        let rendered = self.memo.render(&self.item, self.hide_managed);
        Some(PreviewView {
            dialog: DialogProps { is_open: true, title: &self.title, full_screen_capable: true },
            toggle: ToggleProps { checked: self.hide_managed, label: t.translate(HIDE_MANAGED_LABEL) },
            surface: SurfaceProps {
                content: rendered.content(t),
                syntax_mode: SYNTAX_YAML,
                read_only: true,
                color_scheme: scheme,
                editor_theme: scheme.editor_theme(),
                options: self.options,
            },
            close_label: t.translate(CLOSE_LABEL),
            failed: !rendered.is_ok(),
        })
    }
}
