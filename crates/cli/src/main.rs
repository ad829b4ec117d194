//! s3sign - presigned URLs and bulk transfers for S3 buckets
//!
//! Lists, uploads, downloads and empties buckets, or prints presigned GET
//! URLs for BUCKET KEY pairs.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use s3sign::commands::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = commands::execute(cli).await;
    tracing::debug!("Exiting: {exit_code}");

    std::process::exit(exit_code.as_i32());
}

/// RUST_LOG wins; otherwise -v enables debug for our crates and -vv for everything
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "warn,s3sign=debug,s3sign_core=debug,s3sign_s3=debug",
            _ => "debug",
        })
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
