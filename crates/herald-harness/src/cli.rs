//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;
use herald_config::HarnessConfig;

/// Herald harness - publish two payload models while subscribers churn
#[derive(Debug, Parser)]
#[command(name = "herald-harness")]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Config file merged over the built-in defaults
    #[arg(short, long, env = "HERALD_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// Length of the run in seconds
    #[arg(short, long)]
    pub(crate) duration_secs: Option<u64>,

    /// Subscribers created for each payload model
    #[arg(short, long)]
    pub(crate) subscribers: Option<usize>,

    /// Upper bound for the random pause between iterations, in milliseconds
    #[arg(long)]
    pub(crate) max_pause_ms: Option<u64>,

    /// Keep the initial subscribers for the whole run
    #[arg(long)]
    pub(crate) no_churn: bool,

    /// Log every delivered value
    #[arg(long)]
    pub(crate) print_deliveries: bool,

    /// Global log level
    #[arg(long, value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub(crate) log_level: Option<String>,

    /// Log output format
    #[arg(long, value_parser = ["pretty", "compact", "json", "full"])]
    pub(crate) log_format: Option<String>,
}

impl Cli {
    /// Apply the flags that were given on top of `config`.
    pub(crate) fn apply(&self, config: &mut HarnessConfig) {
        if let Some(secs) = self.duration_secs {
            config.harness.duration_secs = secs;
        }
        if let Some(count) = self.subscribers {
            config.harness.subscribers_per_model = count;
        }
        if let Some(pause) = self.max_pause_ms {
            config.harness.max_pause_ms = pause;
        }
        if self.no_churn {
            config.harness.churn_enabled = false;
        }
        if self.print_deliveries {
            config.harness.print_deliveries = true;
        }
        if let Some(level) = &self.log_level {
            level.clone_into(&mut config.logging.level);
        }
        if let Some(format) = &self.log_format {
            format.clone_into(&mut config.logging.format);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let cli = Cli::try_parse_from(["herald-harness"]).unwrap();
        let mut config = HarnessConfig::default();
        cli.apply(&mut config);
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "herald-harness",
            "--duration-secs",
            "2",
            "--subscribers",
            "7",
            "--no-churn",
            "--log-format",
            "json",
        ])
        .unwrap();

        let mut config = HarnessConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.harness.duration_secs, 2);
        assert_eq!(config.harness.subscribers_per_model, 7);
        assert!(!config.harness.churn_enabled);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let result = Cli::try_parse_from(["herald-harness", "--log-format", "xml"]);
        assert!(result.is_err());
    }
}
