use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;
use vellum_pipeline::ProcessMode;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages (default for verbose)
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(name = "vellum")]
#[command(about = "Reconcile and enrich Markdown frontmatter against templates")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute (defaults to check, or fix when
    /// `reconcile.auto_patch` is set in config)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses config file value, then RUST_LOG, then 'warn'
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ./vellum.toml, then ~/.config/vellum/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Inspect frontmatter and write a report; no note is modified
    Check {
        /// Content root (overrides `content_root` from config)
        dir: Option<PathBuf>,
    },

    /// Inject missing template fields and rewrite notes
    Fix {
        /// Content root (overrides `content_root` from config)
        dir: Option<PathBuf>,
    },

    /// Like fix, then fetch link previews and screenshots
    Enrich {
        /// Content root (overrides `content_root` from config)
        dir: Option<PathBuf>,
    },
}

impl Commands {
    pub fn mode(&self) -> ProcessMode {
        match self {
            Commands::Check { .. } => ProcessMode::Check,
            Commands::Fix { .. } => ProcessMode::Fix,
            Commands::Enrich { .. } => ProcessMode::Enrich,
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        match self {
            Commands::Check { dir } | Commands::Fix { dir } | Commands::Enrich { dir } => {
                dir.as_deref()
            }
        }
    }
}

impl Cli {
    /// Mode for this run. Without a subcommand, config decides between a
    /// dry check and an auto-patching fix.
    pub fn mode(&self, auto_patch: bool) -> ProcessMode {
        match &self.command {
            Some(command) => command.mode(),
            None if auto_patch => ProcessMode::Fix,
            None => ProcessMode::Check,
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.command.as_ref().and_then(Commands::dir)
    }

    /// Level requested on the command line; `--log-level` wins over `-v`.
    pub fn level_filter(&self) -> Option<LevelFilter> {
        match (self.log_level, self.verbose) {
            (Some(level), _) => Some(level.into()),
            (None, true) => Some(LevelFilter::DEBUG),
            (None, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_follows_auto_patch() {
        let cli = Cli::parse_from(["vellum"]);
        assert_eq!(cli.mode(false), ProcessMode::Check);
        assert_eq!(cli.mode(true), ProcessMode::Fix);
        assert_eq!(cli.dir(), None);
    }

    #[test]
    fn test_subcommand_overrides_config_mode() {
        let cli = Cli::parse_from(["vellum", "check", "notes"]);
        assert_eq!(cli.mode(true), ProcessMode::Check);
        assert_eq!(cli.dir(), Some(Path::new("notes")));

        let cli = Cli::parse_from(["vellum", "enrich"]);
        assert_eq!(cli.mode(false), ProcessMode::Enrich);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["vellum", "fix", "-l", "trace", "-C", "custom.toml"]);
        assert_eq!(cli.command, Some(Commands::Fix { dir: None }));
        assert_eq!(cli.level_filter(), Some(LevelFilter::TRACE));
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_log_level_wins_over_verbose() {
        let cli = Cli::parse_from(["vellum", "-v"]);
        assert_eq!(cli.level_filter(), Some(LevelFilter::DEBUG));

        let cli = Cli::parse_from(["vellum", "-v", "--log-level", "error"]);
        assert_eq!(cli.level_filter(), Some(LevelFilter::ERROR));

        let cli = Cli::parse_from(["vellum"]);
        assert_eq!(cli.level_filter(), None);
    }
}
