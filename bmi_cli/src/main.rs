use bmi_core::*;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

mod render;

#[derive(Parser)]
#[command(name = "bmi")]
#[command(about = "Body Mass Index calculator and history tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Load configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate BMI and add it to the user's history
    Calc {
        /// Username the measurement belongs to
        #[arg(short, long)]
        user: String,

        /// Weight in kilograms
        #[arg(short, long, allow_hyphen_values = true)]
        weight: String,

        /// Height unit (Meters, Centimeters, "Feet & Inches")
        #[arg(long, default_value = "Meters")]
        unit: HeightUnit,

        /// Height in the chosen unit (Meters / Centimeters)
        #[arg(long, allow_hyphen_values = true)]
        height: Option<String>,

        /// Feet part of the height (Feet & Inches)
        #[arg(long, allow_hyphen_values = true)]
        feet: Option<String>,

        /// Inches part of the height (Feet & Inches)
        #[arg(long, allow_hyphen_values = true)]
        inches: Option<String>,
    },

    /// Show a user's BMI trend over time
    History {
        /// Username to look up
        #[arg(short, long)]
        user: String,

        /// Write `date,bmi` CSV rows for an external plotting tool instead of a chart
        #[arg(long)]
        csv: bool,
    },

    /// Print the effective configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) if path.exists() => Config::load_from(path)?,
        Some(_) if matches!(cli.command, Commands::Config { init: true }) => Config::default(),
        Some(path) => {
            return Err(Error::Config(format!(
                "config file {} not found",
                path.display()
            )))
        }
        None => Config::load()?,
    };

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    bmi_core::logging::init_with_level(level);

    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    let store_path = config.store_path();

    match cli.command {
        Commands::Calc {
            user,
            weight,
            unit,
            height,
            feet,
            inches,
        } => {
            let raw = RawMeasurement {
                username: user,
                weight,
                unit,
                height,
                feet,
                inches,
            };
            cmd_calc(store_path, &raw, &config)
        }
        Commands::History { user, csv } => cmd_history(store_path, &user, csv, &config),
        Commands::Config { init } => cmd_config(cli.config, init, &config),
    }
}

fn cmd_calc(store_path: PathBuf, raw: &RawMeasurement, config: &Config) -> Result<()> {
    // Reject bad input before the store file is even created
    raw.validate()?;

    let mut store = JsonlStore::initialize(store_path)?;
    let now = chrono::Local::now().naive_local();
    let calculation = calculate_and_record(&mut store, raw, now)?;

    let summary = calculation.summary();
    if config.display.color {
        println!("{}", render::paint(&summary, calculation.color()));
    } else {
        println!("{}", summary);
    }

    Ok(())
}

fn cmd_history(store_path: PathBuf, user: &str, csv: bool, config: &Config) -> Result<()> {
    // A lookup with no username must not create the store
    bmi_core::input::validate_username(user)?;

    let store = JsonlStore::initialize(store_path)?;
    let points = load_history(&store, user)?;

    if csv {
        return write_history_csv(io::stdout().lock(), &points);
    }

    if points.is_empty() {
        println!("No history found for {}.", user.trim());
        return Ok(());
    }

    print!(
        "{}",
        render::trend_chart(user.trim(), &points, config.display.chart_width)
    );
    Ok(())
}

fn cmd_config(explicit_path: Option<PathBuf>, init: bool, config: &Config) -> Result<()> {
    if !init {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let path = explicit_path.unwrap_or_else(Config::default_config_path);
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    Config::default().save_to(&path)?;
    println!("✓ Wrote default config to {}", path.display());
    Ok(())
}
