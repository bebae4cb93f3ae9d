use anyhow::Result;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tracing::warn;

use crate::config::ProbeConfig;
use crate::envfile::EnvFile;
use crate::probe::{Probe, ProbeError};

const RULE_WIDTH: usize = 50;

/// How a check run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed,
    /// The env file was missing or unreadable; the probe never ran.
    EnvFileFailed,
    ProbeFailed,
}

impl CheckOutcome {
    pub fn is_success(self) -> bool {
        self == CheckOutcome::Passed
    }

    pub fn exit_code(self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Load `env_file`, export it, and probe the API, reporting progress to `out`.
pub async fn run_check(env_file: &Path, out: &mut impl Write) -> Result<CheckOutcome> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "{}", rule)?;
    writeln!(out, "OpenAI API Test Script")?;
    writeln!(out, "{}", rule)?;

    writeln!(out, "\n1. Loading {} file...", env_file.display())?;
    let env = match EnvFile::load(env_file) {
        Ok(env) => env,
        Err(e) => {
            writeln!(out, "Error: {}", e)?;
            return Ok(CheckOutcome::EnvFileFailed);
        }
    };
    for key in env.keys() {
        writeln!(out, "✓ Loaded {}", key)?;
    }
    if env.is_empty() {
        writeln!(out, "  (no assignments found)")?;
    }
    env.apply();

    writeln!(out, "\n2. Testing OpenAI API...")?;
    let config = ProbeConfig::resolve(&env);
    let outcome = probe(&config, out).await?;

    writeln!(out, "\n{}", rule)?;
    Ok(outcome)
}

async fn probe(config: &ProbeConfig, out: &mut impl Write) -> Result<CheckOutcome> {
    let prepared = match Probe::prepare(config) {
        Ok(prepared) => prepared,
        Err(e @ ProbeError::LibraryMissing(_)) => {
            warn!("HTTP client initialization failed: {}", e);
            writeln!(out, "Error: {}", e)?;
            return Ok(CheckOutcome::ProbeFailed);
        }
        Err(e) => {
            writeln!(out, "Error: {}", e)?;
            return Ok(CheckOutcome::ProbeFailed);
        }
    };

    writeln!(out, "\n✓ Found API key: {}", prepared.masked_key())?;
    writeln!(out, "\nTesting OpenAI API with a simple request...")?;
    out.flush()?;

    match prepared.send().await {
        Ok(report) => {
            writeln!(out, "✓ API Response: {}", report.output_text)?;
            if let (Some(id), Some(model)) = (&report.response_id, &report.model) {
                writeln!(out, "  Response {} from {}", id, model)?;
            }
            if let Some(usage) = report.usage {
                writeln!(
                    out,
                    "  Tokens: {} in / {} out ({} total)",
                    usage.input_tokens, usage.output_tokens, usage.total_tokens
                )?;
            }
            writeln!(out, "\n✓ OpenAI API test successful!")?;
            Ok(CheckOutcome::Passed)
        }
        Err(e) => {
            writeln!(out, "✗ API test failed: {}", e)?;
            Ok(CheckOutcome::ProbeFailed)
        }
    }
}
