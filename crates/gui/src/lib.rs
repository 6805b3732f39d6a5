#![forbid(unsafe_code)]

use eframe::egui;
use orka_core::{ColorScheme, Translate};
use orka_preview::{DryRunPreview, PreviewOutcome};
use tracing::info;

mod ui;
pub mod util;

pub use ui::preview::PreviewWindow;
pub use util::highlight::{yaml_ansi, yaml_layouter};

/// Entry point used by the CLI: a native window hosting one preview dialog.
///
/// The process window closes together with the dialog.
pub fn run_native(
    preview: DryRunPreview,
    scheme: ColorScheme,
    translate: Box<dyn Translate>,
) -> eframe::Result<()> {
    let options = eframe::NativeOptions::default();
    let app = PreviewApp::new(preview, translate);
    eframe::run_native(
        "Orka Preview",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(if scheme.is_dark() { egui::Visuals::dark() } else { egui::Visuals::light() });
            Ok(Box::new(app))
        }),
    )
}

pub struct PreviewApp {
    window: PreviewWindow,
    translate: Box<dyn Translate>,
}

impl PreviewApp {
    pub fn new(preview: DryRunPreview, translate: Box<dyn Translate>) -> Self {
        let mut window = PreviewWindow::from_preview(preview);
        window.open();
        Self { window, translate }
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |_ui| {});
        let outcome = self.window.show(ctx, &*self.translate);
        if matches!(outcome, Some(PreviewOutcome::Closed)) || !self.window.is_open() {
            info!("ui: preview closed; exiting");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}
