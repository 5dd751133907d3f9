//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_bar_source::CsvBarSource;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::parse_allowed_hours;
use crate::domain::engine::{BacktestEngine, EngineConfig};
use crate::domain::error::GaptraderError;
use crate::domain::metrics::Summary;
use crate::domain::position::ClosedTrade;
use crate::domain::strategy::StrategyConfig;
use crate::ports::bar_source::BarSource;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "gaptrader", about = "Order-block + gap strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over a fine-bar CSV file
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Bar CSV path, overriding [data] bars from the config
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Trade ledger output path (default: trades.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Validate the configuration and print the resolved parameters
        #[arg(long)]
        dry_run: bool,
    },
    /// Show bar count and time range for a data file
    Info {
        #[arg(short, long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(&config, data.as_deref(), output.as_deref())
            }
        }
        Command::Info { data } => run_info(&data),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

pub fn build_strategy_config(
    adapter: &dyn ConfigPort,
) -> Result<StrategyConfig, GaptraderError> {
    let defaults = StrategyConfig::default();

    let allowed_hours = match adapter.get_string("strategy", "allowed_hours") {
        Some(list) => parse_allowed_hours(&list)?,
        None => defaults.allowed_hours,
    };

    Ok(StrategyConfig {
        pip_size: adapter.get_double("strategy", "pip_size", defaults.pip_size),
        risk_reward_ratio: adapter.get_double(
            "strategy",
            "risk_reward_ratio",
            defaults.risk_reward_ratio,
        ),
        spread_pips: adapter.get_double("strategy", "spread_pips", defaults.spread_pips),
        commission_pips: adapter.get_double(
            "strategy",
            "commission_pips",
            defaults.commission_pips,
        ),
        stop_buffer: adapter.get_double("strategy", "stop_buffer", defaults.stop_buffer),
        allowed_hours,
        require_gap_confirm: adapter.get_bool(
            "strategy",
            "require_gap_confirm",
            defaults.require_gap_confirm,
        ),
    })
}

pub fn build_engine_config(adapter: &dyn ConfigPort) -> Result<EngineConfig, GaptraderError> {
    let strategy = build_strategy_config(adapter)?;

    let bucket_minutes = adapter.get_int("engine", "coarse_bucket_minutes", 15);
    if bucket_minutes < 1 {
        return Err(GaptraderError::ConfigInvalid {
            section: "engine".into(),
            key: "coarse_bucket_minutes".into(),
            reason: "must be at least 1".into(),
        });
    }

    let max_bars = adapter.get_int("engine", "max_bars_in_position", 100);
    if max_bars < 1 {
        return Err(GaptraderError::ConfigInvalid {
            section: "engine".into(),
            key: "max_bars_in_position".into(),
            reason: "must be at least 1".into(),
        });
    }

    Ok(EngineConfig {
        strategy,
        coarse_bucket: chrono::Duration::minutes(bucket_minutes),
        max_bars_in_position: max_bars as usize,
    })
}

fn resolve_data_path(
    adapter: &dyn ConfigPort,
    data_override: Option<&Path>,
) -> Result<PathBuf, GaptraderError> {
    match data_override {
        Some(path) => Ok(path.to_path_buf()),
        None => adapter
            .get_string("data", "bars")
            .map(PathBuf::from)
            .ok_or_else(|| GaptraderError::ConfigMissing {
                section: "data".into(),
                key: "bars".into(),
            }),
    }
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<&Path>,
    output_path: Option<&Path>,
) -> ExitCode {
    // Stage 1: load and validate configuration
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let engine_config = match build_engine_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // BacktestEngine::new re-validates every parameter before any bar.
    let mut engine = match BacktestEngine::new(engine_config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 2: open the bar source
    let data_path = match resolve_data_path(&adapter, data_override) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let mut source = match CsvBarSource::open(&data_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Loaded {} bars from {}", source.len(), data_path.display());

    // Stage 3: drive the engine bar by bar, narrating entries and exits
    let mut was_open = false;
    loop {
        let bar = match source.next_bar() {
            Ok(Some(bar)) => bar,
            Ok(None) => break,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        match engine.on_bar(bar) {
            Ok(Some(trade)) => {
                if !was_open {
                    print_entry_from_trade(&trade);
                }
                print_exit(&trade);
                was_open = false;
            }
            Ok(None) => {
                if let Some(position) = engine.position() {
                    if !was_open {
                        eprintln!(
                            "  ENTRY @ {} | {} @ {:.5} | SL {:.5} | TP {:.5} | Risk {:.2}p",
                            position.entry_time.format("%Y-%m-%d %H:%M"),
                            position.direction,
                            position.entry_price,
                            position.stop_price,
                            position.target_price,
                            position.risk_pips,
                        );
                    }
                    was_open = true;
                } else {
                    was_open = false;
                }
            }
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    // Stage 4: summary and ledger output
    let result = engine.finish();
    eprintln!(
        "\nBacktest complete: {} bars, {} trades",
        result.bars_processed,
        result.ledger.len()
    );
    print_summary(&result.summary);

    let output = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("trades.csv"));

    match CsvReportAdapter.write(&result, &output) {
        Ok(()) => {
            eprintln!("\nTrades written to {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn print_entry_from_trade(trade: &ClosedTrade) {
    // Entry and exit landed on the same bar.
    eprintln!(
        "  ENTRY @ {} | {} @ {:.5} | SL {:.5} | TP {:.5} | Risk {:.2}p",
        trade.entry_time.format("%Y-%m-%d %H:%M"),
        trade.direction,
        trade.entry_price,
        trade.stop_price,
        trade.target_price,
        trade.risk_pips,
    );
}

fn print_exit(trade: &ClosedTrade) {
    eprintln!(
        "  EXIT  @ {} | {} @ {:.5} | P&L: {:+.2}p (gross {:+.2}p)",
        trade.exit_time.format("%Y-%m-%d %H:%M"),
        trade.exit_reason,
        trade.exit_price,
        trade.net_pips,
        trade.gross_pips,
    );
}

fn print_summary(summary: &Summary) {
    eprintln!("\n=== Performance Summary ===");
    eprintln!("Total Trades:        {}", summary.total_trades);
    eprintln!("Wins/Losses:         {} / {}", summary.wins, summary.losses);
    eprintln!("Win Rate:            {:.2}%", summary.win_rate * 100.0);
    eprintln!("Total Net Pips:      {:+.2}p", summary.total_net_pips);
    eprintln!("Average Win:         {:+.2}p", summary.avg_win_pips);
    eprintln!("Average Loss:        {:.2}p", summary.avg_loss_pips);
    eprintln!("Risk:Reward Ratio:   {:.2}", summary.risk_reward_ratio);
    eprintln!("Max Drawdown:        {:.2}p", summary.max_drawdown_pips);
    eprintln!(
        "Target/Stop/Timeout: {}/{}/{}",
        summary.target_exits, summary.stop_exits, summary.timeout_exits
    );
    eprintln!("Avg Bars Held:       {:.1}", summary.avg_bars_held);
}

pub fn run_dry_run(config_path: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let engine_config = match build_engine_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if let Err(e) = BacktestEngine::new(engine_config.clone()) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let strategy = &engine_config.strategy;
    let mut hours: Vec<u32> = strategy.allowed_hours.iter().copied().collect();
    hours.sort_unstable();
    let hours: Vec<String> = hours.iter().map(u32::to_string).collect();

    eprintln!("\nResolved parameters:");
    eprintln!("  pip_size:             {}", strategy.pip_size);
    eprintln!("  risk_reward_ratio:    {}", strategy.risk_reward_ratio);
    eprintln!(
        "  round-trip cost:      {:.2}p (spread {:.2} + commission {:.2})",
        strategy.total_cost_pips(),
        strategy.spread_pips,
        strategy.commission_pips,
    );
    eprintln!("  stop_buffer:          {}", strategy.stop_buffer);
    eprintln!("  allowed_hours:        {}", hours.join(","));
    eprintln!("  require_gap_confirm:  {}", strategy.require_gap_confirm);
    eprintln!(
        "  coarse_bucket:        {} min",
        engine_config.coarse_bucket.num_minutes()
    );
    eprintln!(
        "  max_bars_in_position: {}",
        engine_config.max_bars_in_position
    );

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_info(data_path: &Path) -> ExitCode {
    let source = match CsvBarSource::open(data_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match (source.bars().first(), source.bars().last()) {
        (Some(first), Some(last)) => {
            println!("{} bars", source.len());
            println!("first: {}", first.time.format("%Y-%m-%d %H:%M:%S"));
            println!("last:  {}", last.time.format("%Y-%m-%d %H:%M:%S"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("No bars found in {}", data_path.display());
            ExitCode::from(3)
        }
    }
}
