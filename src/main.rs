#![forbid(unsafe_code)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::{Level as TraceLevel, info, warn};
use tracing_subscriber::FmtSubscriber;

use wlbar::bar::{BarConfig, ModuleTree};
use wlbar::loader::{self, LoadedConfig};
use wlbar::output::{Output, output_matches};

#[derive(Parser, Debug)]
#[command(name = "wlbar", about = "Wayland status bar configuration tool", version)]
struct Cli {
    /// Config file, instead of searching the XDG config dirs
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// trace, debug, info, warn or error; overrides LOG_LEVEL
    #[arg(short, long)]
    log_level: Option<String>,

    /// Output to evaluate, as NAME or NAME:IDENTIFIER
    #[arg(short, long = "output")]
    outputs: Vec<String>,

    /// Print machine readable JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and resolve the config, then summarize every bar
    Check,
    /// Print the module tree of every bar
    Modules,
    /// Show which bars each `--output` would get
    Outputs,
    /// Print the resolved mode table of every bar
    Modes,
}

fn parse_level(level: &str) -> Option<TraceLevel> {
    match level.to_lowercase().as_str() {
        "trace" => Some(TraceLevel::TRACE),
        "debug" => Some(TraceLevel::DEBUG),
        "info" => Some(TraceLevel::INFO),
        "warn" => Some(TraceLevel::WARN),
        "error" => Some(TraceLevel::ERROR),
        _ => None,
    }
}

fn bar_label(index: usize, bar: &BarConfig) -> String {
    match &bar.name {
        Some(name) => format!("#{index} ({name})"),
        None => format!("#{index}"),
    }
}

fn check(loaded: &LoadedConfig, as_json: bool) {
    if as_json {
        let bars: Vec<Value> = loaded
            .bars
            .iter()
            .map(|bar| {
                json!({
                    "name": bar.name,
                    "position": bar.position.unwrap_or_default().as_str(),
                    "mode": bar.initial_mode(),
                    "outputs": bar.outputs,
                    "width": bar.width,
                    "height": bar.height,
                    "spacing": bar.spacing,
                    "margins": [bar.margins.top, bar.margins.right, bar.margins.bottom, bar.margins.left],
                    "modes": bar.modes.keys().collect::<Vec<_>>(),
                    "start_hidden": bar.start_hidden,
                })
            })
            .collect();
        println!("{}", json!({"path": loaded.path, "bars": bars}));
        return;
    }

    println!("{}: {} bar(s)", loaded.path.display(), loaded.bars.len());
    for (index, bar) in loaded.bars.iter().enumerate() {
        let outputs = if bar.outputs.is_empty() { "*".to_string() } else { bar.outputs.join(", ") };
        let m = bar.margins;
        println!("bar {}", bar_label(index, bar));
        println!("  position: {}", bar.position.unwrap_or_default());
        println!("  mode:     {}", bar.initial_mode());
        println!("  outputs:  {outputs}");
        println!("  size:     {}x{}", bar.width, bar.height);
        println!("  margins:  {} {} {} {}", m.top, m.right, m.bottom, m.left);
        if bar.start_hidden {
            println!("  starts hidden");
        }
    }
}

fn modules(loaded: &LoadedConfig, as_json: bool) {
    for (index, bar) in loaded.bars.iter().enumerate() {
        let orientation = bar.position.unwrap_or_default().orientation();
        let tree = ModuleTree::resolve(bar, orientation);
        if as_json {
            println!("{}", json!({"bar": index, "modules": tree.modules()}));
        } else {
            println!("bar {}", bar_label(index, bar));
            print!("{tree}");
        }
    }
}

fn outputs(loaded: &LoadedConfig, outputs: &[String], as_json: bool) {
    if outputs.is_empty() {
        warn!("No --output given, nothing to evaluate");
        return;
    }

    for output in outputs.iter().map(|raw| Output::parse(raw)) {
        let bars: Vec<usize> = loaded
            .bars
            .iter()
            .enumerate()
            .filter(|(_, bar)| output_matches(&bar.outputs, &output))
            .map(|(index, _)| index)
            .collect();

        if as_json {
            println!("{}", json!({"output": output.name, "identifier": output.identifier, "bars": bars}));
        } else if bars.is_empty() {
            println!("{output}: no bar");
        } else {
            let labels: Vec<String> = bars.iter().map(|&i| bar_label(i, &loaded.bars[i])).collect();
            println!("{output}: {}", labels.join(", "));
        }
    }
}

fn modes(loaded: &LoadedConfig, as_json: bool) {
    for (index, bar) in loaded.bars.iter().enumerate() {
        if as_json {
            let table: serde_json::Map<String, Value> = bar
                .modes
                .iter()
                .map(|(name, mode)| {
                    let entry = json!({
                        "layer": mode.layer.map(|l| l.as_str()),
                        "exclusive": mode.exclusive,
                        "passthrough": mode.passthrough,
                        "visible": mode.visible,
                    });
                    (name.clone(), entry)
                })
                .collect();
            println!("{}", json!({"bar": index, "modes": table}));
            continue;
        }

        println!("bar {}", bar_label(index, bar));
        println!("  {:<12} {:<8} {:<10} {:<12} {:<8}", "mode", "layer", "exclusive", "passthrough", "visible");
        for (name, mode) in &bar.modes {
            let layer = mode.layer.map_or("-", |l| l.as_str());
            println!(
                "  {name:<12} {layer:<8} {:<10} {:<12} {:<8}",
                mode.exclusive, mode.passthrough, mode.visible
            );
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level_name = cli
        .log_level
        .clone()
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| "info".to_string());
    let log_level = parse_level(&level_name).unwrap_or(TraceLevel::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if parse_level(&level_name).is_none() {
        warn!(level = %level_name, "Unknown log level, using info");
    }

    let loaded = loader::load(cli.config.as_deref())?;
    info!(path = %loaded.path.display(), bars = loaded.bars.len(), "Config loaded");

    match cli.command {
        Command::Check => check(&loaded, cli.json),
        Command::Modules => modules(&loaded, cli.json),
        Command::Outputs => outputs(&loaded, &cli.outputs, cli.json),
        Command::Modes => modes(&loaded, cli.json),
    }

    Ok(())
}
