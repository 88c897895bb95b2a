//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "stopwatch")]
#[command(about = "A single-screen stopwatch service with persisted timer state")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// File the timer state is persisted to
    #[arg(short, long, default_value = "stopwatch-state.json")]
    pub state_file: PathBuf,

    /// Keep timer state in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Display refresh period in milliseconds while running
    #[arg(long, default_value = "500", value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["stopwatch"]).unwrap();
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.state_file, PathBuf::from("stopwatch-state.json"));
        assert_eq!(config.refresh_period(), Duration::from_millis(500));
        assert_eq!(config.log_level(), "info");
        assert!(!config.ephemeral);
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "stopwatch", "-p", "8080", "--host", "127.0.0.1", "--state-file", "/tmp/t.json",
            "--refresh-ms", "250", "--ephemeral", "-v",
        ])
        .unwrap();
        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.refresh_period(), Duration::from_millis(250));
        assert_eq!(config.log_level(), "debug");
        assert!(config.ephemeral);
    }

    #[test]
    fn test_zero_refresh_period_is_rejected() {
        assert!(Config::try_parse_from(["stopwatch", "--refresh-ms", "0"]).is_err());
    }
}
