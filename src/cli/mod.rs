use anyhow::{anyhow, bail};
use clap::{Parser, Subcommand};

use crate::config::AppData;
use crate::installer::{BatchPolicy, InstallRequest};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install mods from the portal, given as name@version
    Install {
        #[arg(required = true)]
        mods: Vec<String>,
        /// Keep going after a failed mod instead of stopping
        #[arg(long)]
        best_effort: bool,
    },
    /// Print the mods currently in the mods directory
    Installed,
    /// Forget the stored mod portal session
    Logout,
}

/// Runs a one-off command if one was given. Returns false when the server should start.
pub async fn maybe_cli(data: &AppData) -> anyhow::Result<bool> {
    let cli = Args::parse();

    let Some(command) = cli.command else {
        return Ok(false);
    };

    match command {
        Commands::Install { mods, best_effort } => {
            let requests = mods
                .iter()
                .map(|m| parse_request(m))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let policy = if best_effort {
                BatchPolicy::BestEffort
            } else {
                BatchPolicy::FailFast
            };

            let report = data.installer().install_batch(requests, policy).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if let Some(e) = report.error {
                return Err(e.into());
            }
        }
        Commands::Installed => {
            let listing = data.installer().list_installed().await?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Commands::Logout => {
            data.credentials().del().await?;
            log::info!("Logged out of the mod portal");
        }
    }

    Ok(true)
}

fn parse_request(arg: &str) -> anyhow::Result<InstallRequest> {
    let (name, version) = arg
        .rsplit_once('@')
        .ok_or(anyhow!("Expected name@version, got {}", arg))?;
    if name.is_empty() {
        bail!("Missing mod name in {}", arg);
    }

    Ok(InstallRequest {
        name: name.to_string(),
        version: version.parse()?,
    })
}
