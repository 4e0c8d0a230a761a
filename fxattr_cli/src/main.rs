mod app;
mod config;
mod opt;
mod util;

use clap::Parser;
use std::process::ExitCode;

use app::App;
use config::Config;
use opt::{Encoding, Opts};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Xattr(#[from] fxattr_core::Error),
    #[error("invalid {encoding} value - {reason}")]
    InvalidValue { encoding: Encoding, reason: String },
    #[error("failed to serialize output to json - {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to serialize output to yaml - {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn main() -> ExitCode {
    pretty_env_logger::init();

    let config = Config::load_default_location().unwrap_or_else(|e| {
        log::debug!("using default configuration, reason: {}", e);
        Config::default()
    });

    match App::run(Opts::parse(), config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Execution failed, reason: {}", e);
            ExitCode::FAILURE
        }
    }
}
