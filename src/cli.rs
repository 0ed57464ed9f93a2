use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ocistore", version, about = "Read, write and share files kept in Oracle Cloud object storage")]
pub struct Cli {
    /// Configuration file (created with defaults when missing)
    #[arg(short, long, env = "OCISTORE_CONFIG", default_value = "ocistore.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every stored file
    Ls,
    /// Print a file, or write it to a local path
    Get {
        name: String,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Upload a local file under NAME
    Put {
        name: String,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Delete a file
    Rm { name: String },
    /// Exit with status 1 when the file does not exist
    Exists { name: String },
    /// Show size and modification time
    Stat { name: String },
    /// Issue a time-limited download URL
    Url {
        name: String,
        /// Lifetime in seconds (backend default when omitted)
        #[arg(long, value_name = "SECS")]
        expires_in: Option<i64>,
    },
}
