#![forbid(unsafe_code)]

use eframe::egui;
use orka_core::{ColorScheme, Translate, Tree};
use orka_preview::{DryRunPreview, PreviewEvent, PreviewOutcome};
use std::sync::Arc;
use tracing::info;

use crate::util::highlight::yaml_layouter;

/// egui host for [`DryRunPreview`]: window chrome, toggle and a read-only YAML view.
pub struct PreviewWindow {
    preview: DryRunPreview,
    fullscreen: bool,
}

impl PreviewWindow {
    pub fn new(item: Arc<Tree>, title: impl Into<String>) -> Self {
        Self { preview: DryRunPreview::new(item, title), fullscreen: false }
    }

    pub fn from_preview(preview: DryRunPreview) -> Self {
        Self { preview, fullscreen: false }
    }

    pub fn preview(&self) -> &DryRunPreview {
        &self.preview
    }

    pub fn is_open(&self) -> bool {
        self.preview.is_open()
    }

    pub fn open(&mut self) {
        self.preview.open();
    }

    /// Draw one frame. Returns the outcome of the last event raised this frame, if any.
    pub fn show(&mut self, ctx: &egui::Context, t: &dyn Translate) -> Option<PreviewOutcome> {
        let scheme = ColorScheme::from_dark(ctx.style().visuals.dark_mode);
        let mut events: Vec<PreviewEvent> = Vec::new();
        let mut fullscreen = self.fullscreen;
        {
            let view = self.preview.view(scheme, t)?;
            let mut open = view.dialog.is_open;
            let screen = ctx.screen_rect();
            let body_h = screen.height() * view.surface.options.height_fraction;
            egui::Window::new(view.dialog.title)
                .id(egui::Id::new("dry_run_preview"))
                .open(&mut open)
                .resizable(true)
                .collapsible(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .default_width(screen.width() * 0.75)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        let mut checked = view.toggle.checked;
                        if ui.checkbox(&mut checked, &*view.toggle.label).changed() {
                            events.push(PreviewEvent::ToggleManagedFields);
                        }
                        if view.dialog.full_screen_capable {
                            ui.separator();
                            ui.toggle_value(&mut fullscreen, "⛶").on_hover_text("Full screen");
                        }
                    });
                    ui.separator();
                    if view.failed {
                        ui.colored_label(ui.visuals().error_fg_color, &*view.surface.content);
                    } else {
                        let scroll = if view.surface.options.word_wrap {
                            egui::ScrollArea::vertical()
                        } else {
                            egui::ScrollArea::both()
                        };
                        scroll
                            .id_salt("dry_run_preview_scroll")
                            .max_height(body_h)
                            .auto_shrink([false, false])
                            .show(ui, |ui| {
                                let mut layouter = yaml_layouter(view.surface.color_scheme);
                                let mut text: &str = &view.surface.content;
                                let te = egui::TextEdit::multiline(&mut text)
                                    .font(egui::TextStyle::Monospace)
                                    .desired_width(f32::INFINITY)
                                    .frame(true)
                                    .layouter(&mut layouter);
                                ui.add(te);
                            });
                    }
                    ui.separator();
                    ui.horizontal(|ui| {
                        if ui.button(&*view.close_label).clicked() {
                            events.push(PreviewEvent::RequestClose);
                        }
                    });
                });
            if !open {
                events.push(PreviewEvent::RequestClose);
            }
        }

        if fullscreen != self.fullscreen {
            info!(fullscreen, "preview: fullscreen");
            self.set_fullscreen(ctx, fullscreen);
        }
        let mut outcome = None;
        for ev in events {
            outcome = Some(self.handle(ctx, ev));
        }
        outcome
    }

    /// Apply one toggle/close event; leaving the dialog also leaves fullscreen.
    pub fn handle(&mut self, ctx: &egui::Context, event: PreviewEvent) -> PreviewOutcome {
        let outcome = self.preview.handle(event);
        if outcome == PreviewOutcome::Closed && self.fullscreen {
            self.set_fullscreen(ctx, false);
        }
        outcome
    }

    fn set_fullscreen(&mut self, ctx: &egui::Context, on: bool) {
        self.fullscreen = on;
        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(on));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orka_core::Untranslated;
    use serde_json::json;

    fn frame(ctx: &egui::Context, win: &mut PreviewWindow) -> Option<PreviewOutcome> {
        let mut out = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            out = win.show(ctx, &Untranslated);
        });
        out
    }

    #[test]
    fn closed_window_draws_nothing() {
        let ctx = egui::Context::default();
        let mut win = PreviewWindow::new(Arc::new(json!({ "metadata": { "name": "a" } })), "Preview");
        assert_eq!(frame(&ctx, &mut win), None);
        assert_eq!(win.preview().recomputations(), 0);
    }

    #[test]
    fn open_window_renders_once_across_frames() {
        let ctx = egui::Context::default();
        let mut win = PreviewWindow::new(Arc::new(json!({ "metadata": { "name": "a" } })), "Preview");
        win.open();
        assert_eq!(frame(&ctx, &mut win), None);
        assert_eq!(frame(&ctx, &mut win), None);
        assert!(win.is_open());
        assert_eq!(win.preview().recomputations(), 1);
    }

    #[test]
    fn toggle_and_close_flow_through_window() {
        let ctx = egui::Context::default();
        let mut win = PreviewWindow::new(Arc::new(json!({ "metadata": { "name": "a", "managedFields": [] } })), "Preview");
        win.open();
        frame(&ctx, &mut win);
        let hidden = win.preview().hide_managed();

        assert_eq!(
            win.handle(&ctx, PreviewEvent::ToggleManagedFields),
            PreviewOutcome::Toggled { hide_managed: !hidden }
        );
        frame(&ctx, &mut win);
        assert_eq!(win.preview().recomputations(), 2);

        win.fullscreen = true;
        assert_eq!(win.handle(&ctx, PreviewEvent::RequestClose), PreviewOutcome::Closed);
        assert!(!win.is_open());
        assert!(!win.fullscreen);
        assert_eq!(frame(&ctx, &mut win), None);
        assert_eq!(win.preview().recomputations(), 2);
    }
}
