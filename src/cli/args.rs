use clap::Parser;
use std::path::PathBuf;

use crate::envfile::DEFAULT_ENV_FILE;

/// Load a .env file and verify that the OpenAI API accepts its credentials
#[derive(Debug, Parser)]
#[command(name = "openai-probe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Environment file to load before probing
    #[arg(long, value_name = "PATH", default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
