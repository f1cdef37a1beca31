use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info};

use lstm_forecast::config::{SourceConfig, SourceKind};
use lstm_forecast::{ForecastConfig, ForecastError, Forecaster, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Forecast future closing prices with a pre-trained LSTM model.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Saved model (.json or bincode)
    #[arg(long)]
    model: Option<PathBuf>,

    /// CSV file with a header row
    #[arg(long, conflicts_with_all = ["json", "symbol"])]
    csv: Option<PathBuf>,

    /// JSON file with closing prices
    #[arg(long, conflicts_with = "symbol")]
    json: Option<PathBuf>,

    /// Ticker to fetch from Alpha Vantage (key in ALPHAVANTAGE_API_KEY)
    #[arg(long)]
    symbol: Option<String>,

    /// Name of the close column in CSV input
    #[arg(long, conflicts_with_all = ["json", "symbol"])]
    column: Option<String>,

    #[arg(long)]
    time_step: Option<usize>,

    #[arg(long)]
    future_days: Option<usize>,

    /// Also report one-step accuracy on the last 20% of the series
    #[arg(long, default_value_t = false)]
    evaluate: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

fn resolve_config(args: &Args) -> Result<ForecastConfig> {
    let mut config = match (&args.config, &args.model) {
        (Some(path), _) => ForecastConfig::from_file(path)?,
        (None, Some(model)) => ForecastConfig::new(model),
        (None, None) => {
            return Err(ForecastError::Config("either --config or --model is required".to_string()))
        }
    };

    if let Some(model) = &args.model {
        config.model_path = model.clone();
    }
    if let Some(time_step) = args.time_step {
        config.time_step = time_step;
    }
    if let Some(future_days) = args.future_days {
        config.future_days = future_days;
    }

    let cli_source = if let Some(path) = &args.csv {
        Some(SourceConfig::csv(path))
    } else if let Some(path) = &args.json {
        Some(SourceConfig::json(path))
    } else {
        args.symbol.as_ref().map(|symbol| SourceConfig::alpha_vantage(symbol.clone()))
    };
    if cli_source.is_some() {
        config.source = cli_source;
    }
    if let (Some(column), Some(source)) = (&args.column, config.source.as_mut()) {
        // Only CSV input has named columns
        if source.kind != SourceKind::Csv {
            return Err(ForecastError::Config(format!(
                "--column applies to CSV input only, source is {:?}",
                source.kind
            )));
        }
        source.column = column.clone();
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = resolve_config(args)?;
    let source = config
        .source
        .as_ref()
        .ok_or_else(|| ForecastError::Config("no data source given (--csv, --json or --symbol)".to_string()))?
        .build()?;

    let series = source.fetch()?;
    info!("{} observations from {}", series.len(), source.describe());

    let mut forecaster = Forecaster::from_model_file(&config.model_path)?;
    let forecast = forecaster.predict_future(&series, config.time_step, config.future_days)?;
    let evaluation = if args.evaluate {
        Some(forecaster.evaluate(&series, config.time_step)?)
    } else {
        None
    };

    match args.output {
        OutputFormat::Json => {
            let mut report = serde_json::json!({
                "predictions": forecast.predictions,
                "message": forecast.message,
            });
            if let Some(eval) = &evaluation {
                report["evaluation"] = serde_json::json!({
                    "samples": eval.samples,
                    "mse": eval.mse,
                    "rmse": eval.rmse,
                    "mae": eval.mae,
                });
            }
            let text = serde_json::to_string_pretty(&report)
                .map_err(|e| ForecastError::Config(e.to_string()))?;
            println!("{}", text);
        }
        OutputFormat::Text => {
            for (day, value) in forecast.predictions.iter().enumerate() {
                println!("Day {:>3}: {:.4}", day + 1, value);
            }
            if let Some(eval) = &evaluation {
                println!(
                    "Test split: {} windows, RMSE {:.4}, MAE {:.4}",
                    eval.samples, eval.rmse, eval.mae
                );
            }
            println!("{}", forecast.message);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
