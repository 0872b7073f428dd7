// CLI module for diary-edge

use clap::Parser;
use std::path::PathBuf;

/// diary-edge - link previews and AI journaling helpers behind a rate limit
#[derive(Parser, Debug)]
#[command(name = "diary-edge", version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file (default: ~/.diary-edge/config.toml if present)
    #[arg(short, long, env = "DIARY_EDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    pub host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Args {
    /// Apply flag overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut crate::config::AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from(["diary-edge", "--host", "0.0.0.0", "--port", "9000"]);
        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::parse_from(["diary-edge"]);
        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.server.port, 8787);
    }
}
