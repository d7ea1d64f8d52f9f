use std::path::PathBuf;

use clap::Parser;
use gentimer_types::AppConfig;

#[derive(Debug, Parser)]
#[command(
    name = "gentimer",
    version,
    about = "Always-on-top elapsed time overlay controlled over HTTP"
)]
pub struct Cli {
    /// Config file (TOML). Created with defaults if missing.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address for the control server
    #[arg(long)]
    pub host: Option<String>,

    /// Port for the control server
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
