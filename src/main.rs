mod catalog;
mod config;
mod error;
mod loader;
mod model;
mod report;
mod scanner;
mod simulator;
mod stats;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eframe::egui;
use serde::Deserialize;
use tracing::{info, warn};

use config::AppConfig;
use model::{InputSkin, CURRENCY};
use ui::TradeupApp;

#[derive(Parser)]
#[command(name = "tradeup_analyzer", about = "Trade-up expected value and ROI scanner")]
struct Cli {
    /// TOML config file
    #[arg(long, default_value = "tradeup.toml", env = "TRADEUP_CONFIG")]
    config: PathBuf,

    /// Catalog database, overrides the config file
    #[arg(long)]
    db: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the report browser (default)
    Gui,
    /// Scan the catalog and write the ranked report
    Scan {
        /// Minimum ROI to report, e.g. 0.9 for 90%
        #[arg(long)]
        threshold: Option<f64>,
        /// Report file, overrides the config file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Evaluate a hand-picked trade-up from a TOML file of [[input]] tables
    Simulate { file: PathBuf },
}

#[derive(Deserialize)]
struct TradeupFile {
    input: Vec<InputSkin>,
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let mut cfg = AppConfig::load_or_default(&cli.config)?;
    if let Some(db) = cli.db {
        cfg.catalog.db_path = db;
    }

    match cli.command.unwrap_or(Command::Gui) {
        Command::Gui => run_gui(cfg),
        Command::Scan { threshold, output } => {
            if let Some(t) = threshold {
                cfg.scan.threshold = t;
            }
            cfg.scan.validate()?;
            let output = output.unwrap_or_else(|| PathBuf::from(&cfg.report.path));
            run_scan(&cfg, &output)
        }
        Command::Simulate { file } => run_simulate(&cfg, &file),
    }
}

fn run_scan(cfg: &AppConfig, output: &Path) -> Result<()> {
    let catalog = loader::load_catalog(&cfg.catalog.db_path)?;
    if catalog.is_empty() {
        warn!(db = %cfg.catalog.db_path, "catalog is empty, nothing to scan");
    }
    let hits = scanner::scan(&catalog, &cfg.scan)?;

    report::write_report(output, &hits)?;

    let summary = stats::summarize(&hits);
    info!(
        hits = summary.hits,
        best = format!("{:.2}%", summary.best_roi * 100.0),
        median = format!("{:.2}%", summary.q50 * 100.0),
        report = %output.display(),
        "Report written"
    );
    for (rarity, count) in &summary.by_rarity {
        info!(%rarity, count, "hits by input rarity");
    }
    Ok(())
}

fn run_simulate(cfg: &AppConfig, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read trade-up file: {}", file.display()))?;
    let tradeup: TradeupFile = toml::from_str(&text)
        .with_context(|| format!("Failed to parse trade-up file: {}", file.display()))?;

    let catalog = loader::load_catalog(&cfg.catalog.db_path)?;
    let result = simulator::simulate(&catalog, &tradeup.input)?;

    println!("Expected value: {CURRENCY}{:.2}", result.expected_value);
    println!("Cost:           {CURRENCY}{:.2}", result.total_cost);
    println!("ROI:            {:.2}%", result.roi * 100.0);
    println!("Outcomes:       {}", result.breakdown_text());
    Ok(())
}

fn run_gui(cfg: AppConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1500.0, 950.0])
            .with_min_inner_size([1100.0, 650.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Trade-Up Analyzer",
        options,
        Box::new(move |cc| {
            let mut fonts = egui::FontDefinitions::default();

            if let Ok(segoe_data) = std::fs::read("C:\\Windows\\Fonts\\segoeui.ttf") {
                fonts.font_data.insert(
                    "SegoeUI".to_owned(),
                    egui::FontData::from_owned(segoe_data).into(),
                );
                if let Some(family) = fonts.families.get_mut(&egui::FontFamily::Proportional) {
                    family.insert(0, "SegoeUI".to_owned());
                }
            }

            cc.egui_ctx.set_fonts(fonts);
            ui::set_custom_style(&cc.egui_ctx);
            Ok(Box::new(TradeupApp::new(cfg)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("GUI failed: {e}"))
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tradeup_analyzer=info"));

    if std::env::var("TRADEUP_LOG_JSON").is_ok() {
        fmt().json().with_env_filter(env_filter).with_target(true).init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rarity;

    #[test]
    fn parses_tradeup_file() {
        let file: TradeupFile = toml::from_str(
            r#"
            [[input]]
            market_hash_name = "AK-47 | Searing Rage (Field-Tested)"
            collection = "The Fever Collection"
            rarity = "Classified"
            wear_float = 0.25
            price = 3.03

            [[input]]
            market_hash_name = "M4A4 | Hellish (Field-Tested)"
            collection = "The Train 2025 Collection"
            rarity = "Classified"
            wear_float = 0.3
            price = 22.0
            "#,
        )
        .unwrap();
        assert_eq!(file.input.len(), 2);
        assert_eq!(file.input[1].rarity, Rarity::Classified);
        assert_eq!(file.input[0].wear_float, 0.25);
    }

    #[test]
    fn cli_parses_scan_overrides() {
        let cli = Cli::try_parse_from([
            "tradeup_analyzer", "--db", "x.db", "scan", "--threshold", "1.2",
        ])
        .unwrap();
        assert_eq!(cli.db.as_deref(), Some("x.db"));
        match cli.command {
            Some(Command::Scan { threshold, output }) => {
                assert_eq!(threshold, Some(1.2));
                assert!(output.is_none());
            }
            _ => panic!("expected scan"),
        }
    }
}
