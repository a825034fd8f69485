//! fortlens library - Structured analysis of Forcheck listfiles
//!
//! This library exposes the command line front end for testing and
//! embedding purposes. Parsing itself lives in `fortlens-core`.

pub mod config;
pub mod output;

use clap::Parser;
use config::{Config, DEFAULT_CONFIG_PATH, Verbosity, load_config, load_config_or_default};
use eyre::{Result, WrapErr};
use fortlens_api::{ApiReport, ApiSourcePage};
use fortlens_core::{
    Attribution, ParseOptions, ReportFormat, ReportParser, RunData, ToolVersion, parse_ignore_list,
};
use output::{OutputFormat, render_report};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Exit status when the listfile parsed but raised anomalies and
/// `--fail-on-anomaly` was given.
pub const EXIT_ANOMALY: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "fortlens")]
#[command(about = "Summarise a Forcheck listfile", long_about = None)]
pub struct Cli {
    /// Forcheck listfile to parse
    pub listfile: PathBuf,

    /// Comma-separated event codes to ignore, e.g. "557,675"
    #[arg(long, short = 'i', value_name = "CODES")]
    pub ignore: Option<String>,

    /// Listfile was written by a Forcheck release before 14.1
    #[arg(long)]
    pub legacy: bool,

    /// Fail on file events without a location tag
    #[arg(long)]
    pub strict: bool,

    /// Where to keep the raw listfile when the parse raises an anomaly
    #[arg(long, value_name = "PATH", conflicts_with = "no_debug_copy")]
    pub debug_copy: Option<PathBuf>,

    /// Never keep a copy of the raw listfile
    #[arg(long)]
    pub no_debug_copy: bool,

    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Config file [default: .config/fortlens/config.yaml]
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only log errors
    #[arg(long, short = 'q', conflicts_with_all = ["verbose", "debug"])]
    pub quiet: bool,

    /// Log progress and show per-file callouts
    #[arg(long, short = 'v', conflicts_with = "debug")]
    pub verbose: bool,

    /// Log every inconsistency as it is found
    #[arg(long, short = 'd')]
    pub debug: bool,

    /// Exit status of the Forcheck run that wrote the listfile
    #[arg(long, requires = "tool_version")]
    pub exit_code: Option<i32>,

    /// Command line of the Forcheck run
    #[arg(long, requires = "exit_code")]
    pub command: Option<String>,

    /// Forcheck release that wrote the listfile, e.g. V14.3.2
    #[arg(long, value_name = "VERSION")]
    pub tool_version: Option<String>,

    /// Exit with status 2 when the parse raises an anomaly
    #[arg(long)]
    pub fail_on_anomaly: bool,
}

/// Command line flags merged over the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub options: ParseOptions,
    pub verbosity: Verbosity,
    pub run: Option<RunData>,
}

impl Cli {
    /// Config file named by `--config`, or the default one if present.
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => load_config(path),
            None => load_config_or_default(Path::new(DEFAULT_CONFIG_PATH)),
        }
    }

    fn verbosity(&self) -> Option<Verbosity> {
        if self.debug {
            Some(Verbosity::Debug)
        } else if self.verbose {
            Some(Verbosity::Verbose)
        } else if self.quiet {
            Some(Verbosity::Quiet)
        } else {
            None
        }
    }

    fn tool_version(&self) -> Result<Option<ToolVersion>> {
        self.tool_version
            .as_deref()
            .map(|text| {
                ToolVersion::parse(text)
                    .ok_or_else(|| eyre::eyre!("Invalid Forcheck version: {:?}", text))
            })
            .transpose()
    }

    /// Resolve the effective settings. Flags win over the config file.
    pub fn settings(&self, config: &Config) -> Result<Settings> {
        let version = self.tool_version()?;

        let format = if self.legacy || config.legacy {
            ReportFormat::Legacy
        } else if let Some(version) = &version {
            ReportFormat::for_version(version)
        } else {
            ReportFormat::Current
        };

        let ignore = match &self.ignore {
            Some(list) => parse_ignore_list(list)?,
            None => config.ignore.iter().copied().collect(),
        };

        let attribution = if self.strict || config.strict {
            Attribution::Strict
        } else {
            Attribution::BestEffort
        };

        let mut options = ParseOptions::new()
            .format(format)
            .ignore(ignore)
            .attribution(attribution);
        if self.no_debug_copy {
            options = options.debug_copy(None::<PathBuf>);
        } else if let Some(path) = &self.debug_copy {
            options = options.debug_copy(Some(path));
        } else if let Some(path) = &config.debug_copy {
            options = options.debug_copy(Some(path));
        }

        let run = match (self.exit_code, &version) {
            (Some(exit_code), Some(version)) => Some(RunData::new(
                exit_code,
                self.command.clone().unwrap_or_default(),
                version,
            )),
            _ => None,
        };

        Ok(Settings {
            options,
            verbosity: self
                .verbosity()
                .or(config.verbosity)
                .unwrap_or_default(),
            run,
        })
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides `verbosity`.
pub fn init_logging(verbosity: Verbosity) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter()));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    debug!(level = verbosity.filter(), "logging initialized");
}

/// Parse the listfile, print the report and return the process exit status.
pub fn run(cli: &Cli) -> Result<u8> {
    let config = cli.load_config()?;
    let settings = cli.settings(&config)?;
    init_logging(settings.verbosity);

    if let Some(version) = cli.tool_version()? {
        if !version.is_supported() {
            warn!(%version, "listfiles from this Forcheck release may not parse reliably");
        }
    }

    let parser = ReportParser::new(settings.options);
    let state = parser
        .parse_file(&cli.listfile)
        .wrap_err_with(|| format!("Failed to parse {}", cli.listfile.display()))?;

    let report = ApiReport::build(&state, settings.run.as_ref());
    let verbose = settings.verbosity >= Verbosity::Verbose;
    let sources = if verbose {
        ApiSourcePage::all(&state)
    } else {
        Vec::new()
    };
    print!("{}", render_report(&report, &sources, cli.format, verbose)?);

    if cli.fail_on_anomaly && state.anomaly_detected() {
        return Ok(EXIT_ANOMALY);
    }
    Ok(0)
}
