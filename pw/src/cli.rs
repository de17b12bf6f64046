//! CLI argument parsing for pathwatch

use clap::Parser;
use std::path::PathBuf;

/// PathWatch - post alerts for recent commits under watched paths
#[derive(Parser, Debug)]
#[command(name = "pw")]
#[command(author, version, about = "Check watched repository paths for recent commits", long_about = None)]
pub struct Cli {
    /// Directory holding the YAML configuration documents
    #[arg(default_value = crate::DEFAULT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_configs_dir() {
        let cli = Cli::parse_from(["pw"]);
        assert_eq!(cli.config_dir, PathBuf::from("./configs"));
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_explicit_dir_and_level() {
        let cli = Cli::parse_from(["pw", "/etc/pathwatch", "-l", "debug"]);
        assert_eq!(cli.config_dir, PathBuf::from("/etc/pathwatch"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_rejects_extra_positionals() {
        assert!(Cli::try_parse_from(["pw", "a", "b"]).is_err());
    }
}
