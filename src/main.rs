//! Time Progress - segmented time progress bars in the terminal

use anyhow::{bail, Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use time_progress::app::App;
use time_progress::config::{BarConfig, Config, TimeConfig};
use time_progress::core::DurationFormatter;
use time_progress::frontend::{Frontend, TuiFrontend};

#[derive(ClapParser)]
#[command(name = "time-progress")]
#[command(about = "Segmented time progress bars", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Custom data directory (default: ~/.time-progress)
    /// Can also be set via TIME_PROGRESS_DIR environment variable
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Show a single bar of this many seconds instead of the configured bars
    #[arg(long, value_name = "SECONDS")]
    total: Option<f64>,

    /// Seconds already elapsed when the single bar starts
    #[arg(long, value_name = "SECONDS")]
    current: Option<f64>,

    /// Multiplier applied to wall-clock time
    #[arg(long)]
    timescale: Option<f64>,

    /// Minimum cells per visible segment marker
    #[arg(long)]
    threshold: Option<f64>,

    /// Title of the single bar
    #[arg(long)]
    title: Option<String>,

    /// Tick interval in milliseconds
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a config file and validate every bar
    ValidateConfig {
        /// Config file (default: the one normally loaded)
        path: Option<PathBuf>,
    },
    /// Print a duration the way bar labels show it
    Format {
        seconds: f64,

        /// Total the duration belongs to (picks the unit; default: SECONDS)
        #[arg(long)]
        total: Option<f64>,

        /// Print the bare count without a unit label
        #[arg(long)]
        hide_suffix: bool,
    },
}

impl Cli {
    fn has_bar_override(&self) -> bool {
        self.total.is_some()
            || self.current.is_some()
            || self.timescale.is_some()
            || self.threshold.is_some()
            || self.title.is_some()
    }

    /// Replace the configured bars with one built from the command line
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(tick_ms) = self.tick_ms {
            config.ui.tick_interval_ms = tick_ms;
        }

        if !self.has_bar_override() {
            return;
        }

        // Start from the first configured bar so units and templates carry over
        let mut bar = config.bars.first().cloned().unwrap_or_default();
        if let Some(total) = self.total {
            bar.time = TimeConfig {
                current: self.current.unwrap_or(0.0),
                total,
            };
        } else if let Some(current) = self.current {
            bar.time.current = current;
        }
        if let Some(timescale) = self.timescale {
            bar.timescale = timescale;
        }
        if let Some(threshold) = self.threshold {
            bar.threshold = threshold;
        }
        if let Some(title) = &self.title {
            bar.title = title.clone();
        }

        config.bars = vec![bar];
    }
}

fn main() -> Result<()> {
    // Initialize logging to file (use RUST_LOG env var to control level, e.g. RUST_LOG=debug)
    // TUI apps can't log to stdout, so we write to a file
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("time-progress.log")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false) // No color codes in log file
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::ValidateConfig { path } => {
                validate_config(path.as_deref().or(cli.config.as_deref()), &cli)
            }
            Commands::Format {
                seconds,
                total,
                hide_suffix,
            } => format_duration(&cli, *seconds, *total, *hide_suffix),
        };
    }

    let mut config = Config::load(cli.config.as_deref(), cli.data_dir.as_deref())?;
    cli.apply_overrides(&mut config);
    if config.bars.is_empty() {
        bail!("No bars configured; add a [[bars]] entry or pass --total");
    }

    run(&config)
}

fn run(config: &Config) -> Result<()> {
    let mut frontend = TuiFrontend::new()?;
    let (width, height) = frontend.size();

    let result = App::new(config, width, height).and_then(|mut app| event_loop(&mut app, &mut frontend));

    frontend.cleanup()?;
    result
}

fn event_loop(app: &mut App, frontend: &mut TuiFrontend) -> Result<()> {
    while app.is_running() {
        frontend.render(app)?;

        let timeout = app.poll_timeout(Instant::now());
        for event in frontend.poll_events(timeout)? {
            app.handle_event(event)?;
        }

        app.tick(Instant::now())?;
    }

    // Last frame so a finished bar is shown full before exiting
    frontend.render(app)?;
    tracing::info!("Event loop stopped");
    Ok(())
}

fn validate_config(path: Option<&std::path::Path>, cli: &Cli) -> Result<()> {
    let config = match path {
        Some(path) => {
            println!("Validating config file: {:?}", path);
            Config::load_from_file(path)?
        }
        None => {
            let path = Config::config_path(cli.data_dir.as_deref())?;
            println!("Validating config: {:?}", path);
            Config::load(None, cli.data_dir.as_deref())?
        }
    };

    println!("✓ Config loaded successfully");
    println!("  {} bars defined", config.bars.len());

    let mut errors = 0;
    for bar in &config.bars {
        match bar.to_options() {
            Ok(options) => println!(
                "✓ '{}': {}s total, {} units",
                bar.title,
                options.time.total,
                options.duration.len()
            ),
            Err(e) => {
                eprintln!("✗ Error: bar '{}': {}", bar.title, e);
                errors += 1;
            }
        }
    }

    if errors > 0 {
        eprintln!("\n✗ Found {} error(s)", errors);
        std::process::exit(1);
    }
    println!("✓ Config is valid with no issues");
    Ok(())
}

fn format_duration(cli: &Cli, seconds: f64, total: Option<f64>, hide_suffix: bool) -> Result<()> {
    // Use the unit table of the first configured bar, if any
    let config = Config::load(cli.config.as_deref(), cli.data_dir.as_deref())?;
    let bar: BarConfig = config.bars.first().cloned().unwrap_or_default();
    let table = bar
        .duration_table()
        .with_context(|| format!("Invalid units for bar '{}'", bar.title))?;

    let formatter = DurationFormatter::new(&table, total.unwrap_or(seconds));
    println!("{}", formatter.format(seconds, hide_suffix));
    Ok(())
}
