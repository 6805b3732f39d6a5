use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use orka_core::{ColorScheme, Translate, Untranslated};
use orka_preview::DryRunPreview;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "orkactl", version, about = "Orka CLI (dry-run preview)")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Kubernetes namespace (overrides metadata.namespace)
    #[arg(long = "ns", global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Theme { Light, Dark }

impl From<Theme> for ColorScheme {
    fn from(t: Theme) -> Self {
        match t {
            Theme::Light => ColorScheme::Light,
            Theme::Dark => ColorScheme::Dark,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a read-only YAML preview of a manifest or its dry-run result
    Preview(PreviewArgs),
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// Manifest path (YAML or JSON); "-" reads stdin
    file: String,
    /// Keep metadata.managedFields in the preview
    #[arg(long = "show-managed-fields", action = ArgAction::SetTrue)]
    show_managed_fields: bool,
    /// Send the manifest through a server-side dry-run apply first
    #[arg(long = "dry-run", action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Color scheme for highlighting and the dialog
    #[arg(long = "theme", value_enum, default_value_t = Theme::Dark)]
    theme: Theme,
    /// Highlight YAML with ANSI colors
    #[arg(long = "color", action = ArgAction::SetTrue)]
    color: bool,
    /// Open the preview dialog instead of printing
    #[arg(long = "gui", action = ArgAction::SetTrue)]
    gui: bool,
    /// Dialog title (default: kind and name of the object)
    #[arg(long = "title")]
    title: Option<String>,
    /// JSON file mapping English labels to translations
    #[arg(long = "translations", env = "ORKA_TRANSLATIONS")]
    translations: Option<PathBuf>,
}

fn init_tracing() {
    let env = std::env::var("ORKA_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // stdout carries the preview; logs go to stderr
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("ORKA_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid ORKA_METRICS_ADDR; expected host:port");
        }
    }
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file))
    }
}

fn load_translations(path: &Path) -> Result<HashMap<String, String>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

async fn run_preview(args: PreviewArgs, ns: Option<&str>, output: Output) -> Result<()> {
    let raw = read_input(&args.file)?;
    let (item, default_title) = if args.dry_run {
        let res = orka_apply::dry_run(&raw, ns).await?;
        let title = format!("Dry run: {}", res.target.title());
        (res.object, title)
    } else {
        let doc = orka_apply::load_document(&raw)?;
        let title = orka_apply::parse_target(&doc, ns).map(|t| t.title()).unwrap_or_else(|_| args.file.clone());
        (doc, title)
    };
    let title = args.title.clone().unwrap_or(default_title);
    let translate: Box<dyn Translate> = match &args.translations {
        Some(p) => Box::new(load_translations(p)?),
        None => Box::new(Untranslated),
    };
    let scheme = ColorScheme::from(args.theme);

    let mut preview = DryRunPreview::new(Arc::new(item), title);
    preview.set_hide_managed(!args.show_managed_fields);

    if args.gui {
        info!(title = %preview.title(), "opening preview dialog");
        return orka_gui::run_native(preview, scheme, translate).map_err(|e| anyhow!("GUI error: {}", e));
    }

    preview.open();
    let Some(view) = preview.view(scheme, &*translate) else {
        return Ok(());
    };
    if view.failed {
        warn!(title = %view.dialog.title, "preview fell back to placeholder");
    }
    match output {
        Output::Human => {
            let content = &view.surface.content;
            if args.color && !view.failed {
                print!("{}", orka_gui::yaml_ansi(content, scheme));
            } else {
                print!("{}", content);
            }
            if !content.ends_with('\n') {
                println!();
            }
        }
        Output::Json => println!("{}", serde_json::to_string_pretty(&view.surface)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();

    match cli.command {
        Commands::Preview(args) => {
            let ns = cli.namespace.as_deref();
            info!(file = %args.file, dry_run = args.dry_run, ns = ?ns, "preview invoked");
            run_preview(args, ns, cli.output).await?;
        }
    }
    Ok(())
}
