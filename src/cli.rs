//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{validate_backtest_config, validate_strategy_config};
use crate::domain::error::FxlabError;
use crate::domain::instrument::{
    default_spread_pips, spread_in_price, Granularity, DEFAULT_INSTRUMENT,
};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::SignalFrame;
use crate::domain::strategy::{all_strategies, get_strategy, ParamInput, Strategy};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

/// `[strategy]` keys that describe the strategy rather than parameterise it.
const STRATEGY_META_KEYS: [&str; 2] = ["name", "description"];

#[derive(Parser, Debug)]
#[command(name = "fxlab", about = "Signal-driven FX strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Candle CSV file, or a directory of <INSTRUMENT>_<GRANULARITY>.csv files
        #[arg(short, long)]
        data: PathBuf,
        /// Overrides [strategy] name
        #[arg(short, long)]
        strategy: Option<String>,
        /// Parameter override as key=value (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,
        /// Overrides [backtest] granularity when --data is a directory
        #[arg(short, long)]
        granularity: Option<String>,
        /// Write the trade ledger as CSV
        #[arg(long)]
        trades_out: Option<PathBuf>,
    },
    /// List registered strategies
    Strategies,
    /// Show a strategy's parameters and defaults
    Params { name: String },
    /// List instruments with candle files in a directory
    Instruments {
        #[arg(short, long)]
        dir: PathBuf,
        #[arg(short, long, default_value = "1H")]
        granularity: String,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            data,
            strategy,
            params,
            granularity,
            trades_out,
        } => run_backtest(
            &config,
            &data,
            strategy.as_deref(),
            &params,
            granularity.as_deref(),
            trades_out.as_deref(),
        ),
        Command::Strategies => {
            run_strategies();
            Ok(())
        }
        Command::Params { name } => run_params(&name),
        Command::Instruments { dir, granularity } => run_instruments(&dir, &granularity),
        Command::Validate { config } => run_validate(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

fn run_backtest(
    config_path: &Path,
    data_path: &Path,
    strategy_override: Option<&str>,
    raw_params: &[String],
    granularity_override: Option<&str>,
    trades_out: Option<&Path>,
) -> Result<(), FxlabError> {
    info!("loading config from {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;
    validate_backtest_config(&adapter)?;

    let overrides = parse_param_overrides(raw_params)?;
    let strategy = build_strategy(&adapter, strategy_override, &overrides)?;
    let bt_config = build_backtest_config(&adapter)?;
    let instrument = instrument_of(&adapter);

    let bars = load_bars(&adapter, data_path, &instrument, granularity_override)?;
    info!(
        strategy = strategy.name(),
        instrument = %instrument,
        bars = bars.len(),
        "running backtest"
    );

    let result = run_backtest_pipeline(bars, strategy.as_ref(), &bt_config)?;
    print_summary(strategy.as_ref(), &instrument, &bt_config, &result);

    if let Some(path) = trades_out {
        write_trades(path, &result)?;
        info!("trade ledger written to {}", path.display());
    }
    Ok(())
}

/// Signals then simulation, on a fresh frame built from `bars`.
pub fn run_backtest_pipeline(
    bars: Vec<OhlcvBar>,
    strategy: &dyn Strategy,
    bt_config: &BacktestConfig,
) -> Result<BacktestResult, FxlabError> {
    let frame = SignalFrame::new(bars);
    let signalled = strategy.generate_signals(&frame)?;
    backtest_engine::run_backtest(&signalled, bt_config)
}

fn instrument_of(adapter: &dyn ConfigPort) -> String {
    adapter
        .get_string("backtest", "instrument")
        .map(|s| s.trim().to_uppercase())
        .unwrap_or_else(|| DEFAULT_INSTRUMENT.to_string())
}

/// Engine settings from `[backtest]`, with the spread converted from pips
/// to price units for the configured instrument.
pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, FxlabError> {
    let instrument = instrument_of(adapter);
    let defaults = BacktestConfig::default();
    let spread_pips =
        adapter.get_double("backtest", "spread_pips", default_spread_pips(&instrument))?;

    Ok(BacktestConfig {
        spread: spread_in_price(&instrument, spread_pips),
        sl_atr_mult: adapter.get_double("backtest", "sl_atr_mult", defaults.sl_atr_mult)?,
        tp_atr_mult: adapter.get_double("backtest", "tp_atr_mult", defaults.tp_atr_mult)?,
        risk_pct: adapter.get_double("backtest", "risk_pct", defaults.risk_pct)?,
        initial_capital: adapter.get_double(
            "backtest",
            "initial_capital",
            defaults.initial_capital,
        )?,
    })
}

/// Splits `key=value` arguments. Values stay text; the strategy coerces them.
pub fn parse_param_overrides(raw: &[String]) -> Result<HashMap<String, ParamInput>, FxlabError> {
    raw.iter()
        .map(|arg| match arg.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok((
                key.trim().to_lowercase(),
                ParamInput::from(value.trim()),
            )),
            _ => Err(FxlabError::ConfigInvalid {
                section: "param".into(),
                key: arg.clone(),
                reason: "expected key=value".into(),
            }),
        })
        .collect()
}

/// Resolves the strategy by name (override first, then `[strategy] name`)
/// and applies `[strategy]` parameters followed by `overrides`.
pub fn build_strategy(
    adapter: &dyn ConfigPort,
    name_override: Option<&str>,
    overrides: &HashMap<String, ParamInput>,
) -> Result<Box<dyn Strategy>, FxlabError> {
    let name = match name_override {
        Some(name) => name.to_string(),
        None => {
            validate_strategy_config(adapter)?;
            adapter
                .get_string("strategy", "name")
                .ok_or_else(|| FxlabError::ConfigMissing {
                    section: "strategy".into(),
                    key: "name".into(),
                })?
        }
    };
    let mut strategy = get_strategy(&name)?;

    let mut params: HashMap<String, ParamInput> = adapter
        .section_keys("strategy")
        .into_iter()
        .filter(|key| !STRATEGY_META_KEYS.contains(&key.as_str()))
        .filter_map(|key| {
            let value = adapter.get_string("strategy", &key)?;
            Some((key, ParamInput::from(value)))
        })
        .collect();
    params.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));

    strategy.set_parameters(&params)?;
    Ok(strategy)
}

fn load_bars(
    adapter: &dyn ConfigPort,
    data_path: &Path,
    instrument: &str,
    granularity_override: Option<&str>,
) -> Result<Vec<OhlcvBar>, FxlabError> {
    if data_path.is_dir() {
        let granularity: Granularity = match granularity_override {
            Some(g) => g.parse()?,
            None => adapter
                .get_string("backtest", "granularity")
                .as_deref()
                .unwrap_or("1H")
                .parse()?,
        };
        CsvAdapter::new(data_path.to_path_buf()).fetch_candles(instrument, granularity)
    } else {
        if granularity_override.is_some() {
            warn!("--granularity is ignored when --data names a file");
        }
        CsvAdapter::load_file(data_path)
    }
}

fn print_summary(
    strategy: &dyn Strategy,
    instrument: &str,
    bt_config: &BacktestConfig,
    result: &BacktestResult,
) {
    println!("=== {} on {} ===", strategy.name(), instrument);
    for (name, value) in strategy.parameters() {
        println!("  {name:<20} {value}");
    }

    if !result.trades.is_empty() {
        println!("\n=== Trades ===");
        for t in &result.trades {
            println!(
                "  {:>5} -> {:>5}  {:<5}  {:.5} -> {:.5}  {:<11}  {:+.2}",
                t.entry_index,
                t.exit_index.map_or_else(|| "-".to_string(), |i| i.to_string()),
                t.direction.to_string(),
                t.entry_price,
                t.exit_price.unwrap_or(f64::NAN),
                t.exit_reason.map_or_else(String::new, |r| r.to_string()),
                t.pnl,
            );
        }
    }

    println!("\n=== Results ===");
    println!("Initial Capital:  {:.2}", bt_config.initial_capital);
    println!("Final Equity:     {:.2}", result.final_equity());
    println!("Total PnL:        {:+.2}", result.total_pnl);
    println!("Total Trades:     {}", result.total_trades);
    println!("Win Rate:         {:.1}%", result.win_rate * 100.0);
    println!("Sharpe Ratio:     {:.2}", result.sharpe_ratio);
    println!("Max Drawdown:     {:.2}%", result.max_drawdown * 100.0);
}

/// Trade ledger as CSV, one row per trade.
pub fn write_trades(path: &Path, result: &BacktestResult) -> Result<(), FxlabError> {
    let to_data = |e: csv::Error| FxlabError::Data {
        reason: format!("failed to write {}: {e}", path.display()),
    };
    let mut wtr = csv::Writer::from_path(path).map_err(to_data)?;
    wtr.write_record([
        "entry_index",
        "exit_index",
        "direction",
        "entry_price",
        "exit_price",
        "stop_loss",
        "take_profit",
        "exit_reason",
        "pnl",
    ])
    .map_err(to_data)?;

    for t in &result.trades {
        wtr.write_record([
            t.entry_index.to_string(),
            t.exit_index.map(|i| i.to_string()).unwrap_or_default(),
            t.direction.to_string(),
            t.entry_price.to_string(),
            t.exit_price.map(|p| p.to_string()).unwrap_or_default(),
            t.stop_loss.to_string(),
            t.take_profit.to_string(),
            t.exit_reason.map(|r| r.to_string()).unwrap_or_default(),
            t.pnl.to_string(),
        ])
        .map_err(to_data)?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_strategies() {
    for key in all_strategies() {
        match get_strategy(key) {
            Ok(strategy) => println!("{:<24} {}", key, strategy.description()),
            Err(_) => println!("{key}"),
        }
    }
}

fn run_params(name: &str) -> Result<(), FxlabError> {
    let strategy = get_strategy(name)?;
    println!("{} ({})", strategy.name(), strategy.key());
    for spec in strategy.schema() {
        let range = match (spec.min, spec.max) {
            (Some(lo), Some(hi)) => format!("[{lo}, {hi}]"),
            (Some(lo), None) => format!(">= {lo}"),
            (None, Some(hi)) => format!("<= {hi}"),
            (None, None) => String::new(),
        };
        println!(
            "  {:<20} {:<8} default={:<8} {}",
            spec.name,
            spec.kind.to_string(),
            spec.default.to_string(),
            range
        );
    }
    Ok(())
}

fn run_instruments(dir: &Path, granularity: &str) -> Result<(), FxlabError> {
    let granularity: Granularity = granularity.parse()?;
    let instruments = CsvAdapter::new(dir.to_path_buf()).list_instruments(granularity)?;
    if instruments.is_empty() {
        info!("no {granularity} candle files in {}", dir.display());
    }
    for instrument in instruments {
        println!("{instrument}");
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), FxlabError> {
    info!("validating {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;
    validate_backtest_config(&adapter)?;
    let strategy = build_strategy(&adapter, None, &HashMap::new())?;
    strategy.validate_parameters()?;

    let bt_config = build_backtest_config(&adapter)?;
    println!("Strategy:  {}", strategy.name());
    println!("Spread:    {} (price units)", bt_config.spread);
    println!("Configuration is valid.");
    Ok(())
}
