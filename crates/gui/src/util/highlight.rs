#![forbid(unsafe_code)]

use egui::{Color32, TextStyle};
use egui::text::{LayoutJob, TextFormat};
use orka_core::ColorScheme;
use std::sync::Arc;
use once_cell::sync::Lazy;
use std::sync::Mutex;
use std::collections::HashMap;
use syntect::easy::HighlightLines;
use syntect::highlighting::Theme;
use syntect::parsing::SyntaxReference;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

static SYNTAX_SET: Lazy<syntect::parsing::SyntaxSet> = Lazy::new(|| syntect::parsing::SyntaxSet::load_defaults_newlines());
static THEME_SET: Lazy<syntect::highlighting::ThemeSet> = Lazy::new(|| syntect::highlighting::ThemeSet::load_defaults());

// Very small memoization to avoid rebuilding on identical text/scheme pairs
static LRU: Lazy<Mutex<HashMap<u64, Arc<egui::Galley>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn to_color32(c: syntect::highlighting::Color) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

fn hash_key(s: &str, scheme: ColorScheme, wrap: f32) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut h = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut h);
    scheme.hash(&mut h);
    // Quantize wrap to avoid too many keys for tiny width changes
    let q = ((wrap / 8.0).round() as i32).max(0);
    q.hash(&mut h);
    h.finish()
}

fn yaml_syntax() -> &'static SyntaxReference {
    SYNTAX_SET
        .find_syntax_by_extension("yaml")
        .or_else(|| SYNTAX_SET.find_syntax_by_extension("yml"))
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
}

fn theme_for(scheme: ColorScheme) -> Option<&'static Theme> {
    let (name, fallback) = match scheme {
        ColorScheme::Dark => ("Solarized (dark)", "base16-ocean.dark"),
        ColorScheme::Light => ("Solarized (light)", "InspiredGitHub"),
    };
    THEME_SET
        .themes
        .get(name)
        .or_else(|| THEME_SET.themes.get(fallback))
        .or_else(|| THEME_SET.themes.values().next())
}

/// egui layouter that paints YAML with syntect colors for the given scheme.
pub fn yaml_layouter(scheme: ColorScheme) -> impl FnMut(&egui::Ui, &dyn egui::TextBuffer, f32) -> Arc<egui::Galley> {
    move |ui: &egui::Ui, text: &dyn egui::TextBuffer, wrap_width: f32| {
        let s = text.as_str();
        let key = hash_key(s, scheme, wrap_width);
        if let Some(galley) = LRU.lock().ok().and_then(|m| m.get(&key).cloned()) {
            return galley;
        }
        let mono = TextStyle::Monospace.resolve(ui.style());
        let plain = TextFormat { font_id: mono.clone(), color: ui.visuals().text_color(), ..Default::default() };
        let mut job = LayoutJob::default();
        job.wrap.max_width = wrap_width;
        match theme_for(scheme) {
            Some(theme) => {
                let mut h = HighlightLines::new(yaml_syntax(), theme);
                for line in s.split_inclusive(['\n']) {
                    let regions = h.highlight_line(line.trim_end_matches('\n'), &SYNTAX_SET).unwrap_or_default();
                    for (style, piece) in regions.into_iter() {
                        let fmt = TextFormat { font_id: mono.clone(), color: to_color32(style.foreground), ..Default::default() };
                        job.append(piece, 0.0, fmt);
                    }
                    if line.ends_with('\n') { job.append("\n", 0.0, plain.clone()); }
                }
            }
            None => job.append(s, 0.0, plain),
        }
        let galley = ui.fonts(|f| f.layout_job(job));
        if let Ok(mut m) = LRU.lock() {
            if m.len() > 64 { m.clear(); }
            m.insert(key, galley.clone());
        }
        galley
    }
}

/// YAML highlighted with 24-bit ANSI escapes, for terminals.
pub fn yaml_ansi(text: &str, scheme: ColorScheme) -> String {
    let Some(theme) = theme_for(scheme) else {
        return text.to_string();
    };
    let mut h = HighlightLines::new(yaml_syntax(), theme);
    let mut out = String::with_capacity(text.len() * 2);
    for line in LinesWithEndings::from(text) {
        match h.highlight_line(line, &SYNTAX_SET) {
            Ok(regions) => out.push_str(&as_24_bit_terminal_escaped(&regions[..], false)),
            Err(_) => out.push_str(line),
        }
    }
    out.push_str("\x1b[0m");
    out
}
