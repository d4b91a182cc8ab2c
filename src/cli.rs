//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::candle::preflight;
use crate::domain::config_validation::{build_strategy, validate_strategy_config};
use crate::domain::error::SignalError;
use crate::domain::frame::CandleFrame;
use crate::domain::signal::{RSI_ENTRY_HIGH, RSI_ENTRY_LOW};
use crate::domain::strategy::{MacdEma200Rsi, PairMetadata, COL_ENTER_LONG, COL_EXIT_LONG};
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::strategy_port::StrategyPort;

#[derive(Parser, Debug)]
#[command(name = "steddock", about = "EMA200 / MACD / RSI trend-following signal generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicators and entry/exit signals for one pair
    Signals {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long)]
        pair: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List pairs with candle files for the configured timeframe
    ListPairs {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a strategy configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show host configuration and parameter spaces
    Info {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Signals {
            data_dir,
            pair,
            config,
            output,
        } => run_signals(&data_dir, &pair, config.as_deref(), output.as_deref()),
        Command::ListPairs { data_dir, config } => run_list_pairs(&data_dir, config.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config } => run_info(config.as_deref()),
    }
}

/// Strategy from `config_path`, or the built-in defaults when no file is given.
pub fn load_strategy(config_path: Option<&Path>) -> Result<MacdEma200Rsi, SignalError> {
    let Some(path) = config_path else {
        return Ok(MacdEma200Rsi::default());
    };
    info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    build_strategy(&adapter)
}

fn fail(err: SignalError) -> ExitCode {
    error!("{err}");
    (&err).into()
}

/// Default output file: `{BASE_QUOTE}-{timeframe}-signals.csv` next to the input.
pub fn default_output_path(data_dir: &Path, pair: &str, strategy: &MacdEma200Rsi) -> PathBuf {
    data_dir.join(format!(
        "{}-{}-signals.csv",
        pair.replace('/', "_"),
        strategy.host_config().timeframe
    ))
}

fn run_signals(
    data_dir: &Path,
    pair: &str,
    config_path: Option<&Path>,
    output_path: Option<&Path>,
) -> ExitCode {
    let strategy = match load_strategy(config_path) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let output = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(data_dir, pair, &strategy));
    let adapter = CsvAdapter::new(data_dir.to_path_buf());

    match run_signals_pipeline(&adapter, &adapter, &strategy, pair, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

/// Fetch, pre-flight, analyze, write. Returns the first error encountered.
pub fn run_signals_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    strategy: &MacdEma200Rsi,
    pair: &str,
    output_path: &Path,
) -> Result<(), SignalError> {
    let host = strategy.host_config();
    let candles = data_port.fetch_candles(pair, host.timeframe)?;
    preflight(&candles)?;

    let warmup = strategy.indicator_config().warmup_len();
    if candles.len() <= warmup {
        warn!(
            pair,
            rows = candles.len(),
            warmup,
            "series does not extend past the warm-up span; all signals will be false"
        );
    }

    info!(pair, rows = candles.len(), timeframe = %host.timeframe, "running {}", strategy.name());
    let frame = CandleFrame::new(candles)?;
    let analyzed = strategy.analyze(&frame, &PairMetadata::new(pair))?;

    let count = |name: &str| {
        analyzed
            .flag(name)
            .map(|v| v.iter().filter(|&&x| x).count())
            .unwrap_or(0)
    };
    info!(
        pair,
        entries = count(COL_ENTER_LONG),
        exits = count(COL_EXIT_LONG),
        "signals computed"
    );

    report_port.write(&analyzed, output_path)?;
    info!(path = %output_path.display(), "signals written");
    Ok(())
}

fn run_list_pairs(data_dir: &Path, config_path: Option<&Path>) -> ExitCode {
    let strategy = match load_strategy(config_path) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let timeframe = strategy.host_config().timeframe;
    let adapter = CsvAdapter::new(data_dir.to_path_buf());

    let pairs = match adapter.list_pairs(timeframe) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    if pairs.is_empty() {
        warn!(%timeframe, dir = %data_dir.display(), "no pairs found");
    } else {
        for pair in &pairs {
            println!("{}", pair);
        }
        info!(count = pairs.len(), %timeframe, "pairs found");
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    info!(path = %config_path.display(), "validating config");
    let result = FileConfigAdapter::from_file(config_path)
        .and_then(|adapter| validate_strategy_config(&adapter));

    match result {
        Ok(()) => {
            println!("Strategy configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_info(config_path: Option<&Path>) -> ExitCode {
    let strategy = match load_strategy(config_path) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    print!("{}", render_info(&strategy));
    ExitCode::SUCCESS
}

/// Human-readable summary of the strategy's static configuration.
pub fn render_info(strategy: &MacdEma200Rsi) -> String {
    let host = strategy.host_config();
    let indicators = strategy.indicator_config();
    let params = strategy.params();
    let [ema, macd, rsi] = indicators.indicator_types();

    let mut out = String::new();
    out.push_str(&format!("Strategy:                   {}\n", strategy.name()));
    out.push_str(&format!("Indicators:                 {}, {}, {}\n", ema, macd, rsi));
    out.push_str(&format!("Warm-up rows:               {}\n", indicators.warmup_len()));
    out.push_str(&format!("Timeframe:                  {}\n", host.timeframe));
    out.push_str(&format!("Can short:                  {}\n", host.can_short));
    out.push_str(&format!("Minimal ROI:                {}\n", host.minimal_roi));
    out.push_str(&format!("Stoploss:                   {}\n", host.stoploss));
    out.push_str(&format!("Startup candle count:       {}\n", host.startup_candle_count));
    out.push_str(&format!("Process only new candles:   {}\n", host.process_only_new_candles));
    out.push_str(&format!("Cooldown period:            {}\n", host.cooldown_period));
    out.push_str(&format!("Use exit signal:            {}\n", host.use_exit_signal));
    out.push_str(&format!("Exit profit only:           {}\n", host.exit_profit_only));
    out.push_str(&format!("Ignore ROI if entry signal: {}\n", host.ignore_roi_if_entry_signal));
    out.push_str("\nParameters:\n");
    for (name, value, space) in [
        ("rsi_entry_low", params.rsi_entry_low, RSI_ENTRY_LOW),
        ("rsi_entry_high", params.rsi_entry_high, RSI_ENTRY_HIGH),
    ] {
        out.push_str(&format!(
            "  {name}: {value} (range {}..={}, default {}, space {:?})\n",
            space.low, space.high, space.default, space.space
        ));
    }
    out.push_str(&format!("  rsi_exit: {}\n", params.rsi_exit));
    out
}
