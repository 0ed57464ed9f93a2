use crate::cli::Commands;
use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use colored::Colorize;
use ocistore::prelude::{FileMode, Storage, StorageFile};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

pub async fn run(command: Commands, storage: Arc<dyn Storage>) -> Result<ExitCode> {
    match command {
        Commands::Ls => {
            for name in storage.listdir().await? {
                println!("{}", name);
            }
        }
        Commands::Get { name, output } => {
            let mut file = StorageFile::new(name.as_str(), Arc::clone(&storage), FileMode::Read);
            let content = file.read(None).await?;
            file.close().await?;

            match output {
                Some(path) => {
                    tokio::fs::write(&path, &content)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!(
                        "  {} {} → {} ({} bytes)",
                        "✓".green(),
                        name.cyan(),
                        path.display(),
                        content.len()
                    );
                }
                None => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&content).await?;
                    stdout.flush().await?;
                }
            }
        }
        Commands::Put { name, file: path } => {
            let content = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let size = content.len();

            let mut file = StorageFile::new(name.as_str(), Arc::clone(&storage), FileMode::Write);
            file.write(content)?;
            file.close().await?;

            println!("  {} Uploaded {} ({} bytes)", "✓".green(), name.cyan(), size);
        }
        Commands::Rm { name } => {
            storage.delete(&name).await?;
            println!("  {} Deleted {}", "✓".green(), name.cyan());
        }
        Commands::Exists { name } => {
            if storage.exists(&name).await? {
                println!("  {} {}", "✓".green(), name.cyan());
            } else {
                println!("  {} {} not found", "✗".red(), name.cyan());
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Stat { name } => {
            let Some(size) = storage.size(&name).await? else {
                println!("  {} {} not found", "✗".red(), name.cyan());
                return Ok(ExitCode::FAILURE);
            };
            let modified = storage
                .modified_time(&name)
                .await?
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string());

            println!("  {}     {}", "Name".dimmed(), name.cyan());
            println!("  {}     {} bytes", "Size".dimmed(), size);
            println!("  {} {}", "Modified".dimmed(), modified);
        }
        Commands::Url { name, expires_in } => {
            let expire_at = match expires_in {
                Some(secs) => Some(
                    Utc::now()
                        + TimeDelta::try_seconds(secs)
                            .with_context(|| format!("Invalid lifetime: {} seconds", secs))?,
                ),
                None => None,
            };
            println!("{}", storage.url(&name, expire_at).await?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
