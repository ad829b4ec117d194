//! CLI definition and mode dispatch
//!
//! s3sign runs exactly one mode per invocation. The mode flags are mutually
//! exclusive; without any of them the positional arguments are signed as
//! BUCKET KEY pairs.

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, CommandFactory, Parser};
use clap_complete::Shell;
use s3sign_core::config::Defaults;
use s3sign_core::{BucketPath, ConfigManager, Error, ObjectRef, Result, SessionSettings};
use s3sign_s3::S3Client;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod completions;
mod delete;
mod download;
mod list;
mod sign;
mod upload;

#[cfg(test)]
mod test_support;

/// s3sign - presigned URLs and bulk transfers for S3 buckets
///
/// Without a mode flag every BUCKET KEY pair is turned into a presigned GET
/// URL valid for five days.
#[derive(Parser, Debug)]
#[command(name = "s3sign")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .args(["list", "upload", "delete", "download"])
        .multiple(false)
))]
pub struct Cli {
    /// Increase log verbosity (-v for s3sign, -vv for everything)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// List every key in a bucket
    #[arg(short, long, value_name = "BUCKET[/PREFIX]")]
    pub list: Option<BucketPath>,

    /// Upload the local files and directories given as ARGS
    #[arg(short, long, value_name = "BUCKET[/PREFIX]")]
    pub upload: Option<BucketPath>,

    /// Delete every object in a bucket (the bucket itself is kept)
    #[arg(short = 'D', long, value_name = "BUCKET[/PREFIX]")]
    pub delete: Option<BucketPath>,

    /// Download every object in a bucket, skipping files that already exist
    #[arg(short, long, value_name = "BUCKET[/PREFIX]")]
    pub download: Option<BucketPath>,

    /// Download destination [default: .]
    #[arg(
        short,
        long,
        value_name = "DIR",
        requires = "download",
        conflicts_with_all = ["list", "upload", "delete"]
    )]
    pub output_dir: Option<PathBuf>,

    /// Region of the bucket [default: eu-west-1]
    #[arg(short, long, env = "S3SIGN_REGION")]
    pub region: Option<String>,

    /// Named credentials profile
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Custom S3-compatible endpoint URL
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Use path-style addressing
    #[arg(long)]
    pub path_style: bool,

    /// Output format: human-readable or JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Disable progress indicators
    #[arg(long)]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,

    /// Local paths for --upload, otherwise BUCKET KEY pairs to sign
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,
}

/// The single operation requested on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    List(BucketPath),
    Upload {
        target: BucketPath,
        paths: Vec<PathBuf>,
    },
    Download {
        source: BucketPath,
        dest: PathBuf,
    },
    Delete(BucketPath),
    Sign(Vec<ObjectRef>),
}

impl Cli {
    /// Resolve the requested mode
    ///
    /// Returns None when neither a mode flag nor any argument was given.
    pub fn mode(&self) -> Result<Option<Mode>> {
        if self.output_dir.is_some() && self.download.is_none() {
            return Err(Error::InvalidArgument(
                "--output-dir can only be used with --download".into(),
            ));
        }

        if let Some(target) = &self.upload {
            return Ok(Some(Mode::Upload {
                target: target.clone(),
                paths: self.args.iter().map(PathBuf::from).collect(),
            }));
        }

        let mode = if let Some(path) = &self.list {
            Mode::List(path.clone())
        } else if let Some(path) = &self.download {
            Mode::Download {
                source: path.clone(),
                dest: self
                    .output_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(".")),
            }
        } else if let Some(path) = &self.delete {
            Mode::Delete(path.clone())
        } else if self.args.is_empty() {
            return Ok(None);
        } else {
            return Ok(Some(Mode::Sign(s3sign_core::sign::pair_objects(
                &self.args,
            )?)));
        };

        if !self.args.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "Unexpected arguments: {}",
                self.args.join(" ")
            )));
        }

        Ok(Some(mode))
    }

    /// Session settings given by flags and environment
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            region: self.region.clone(),
            profile: self.profile.clone(),
            endpoint: self.endpoint.clone(),
            path_style: self.path_style.then_some(true),
        }
    }

    /// Output settings from flags, falling back to the configured defaults
    pub fn output_config(&self, defaults: &Defaults) -> OutputConfig {
        OutputConfig {
            json: self.json || defaults.json(),
            no_color: self.no_color,
            no_progress: self.no_progress || !defaults.progress,
            quiet: self.quiet,
        }
    }
}

/// Execute the requested mode and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    if let Some(shell) = cli.completions {
        return completions::execute(shell);
    }

    let mode = match cli.mode() {
        Ok(Some(mode)) => mode,
        Ok(None) => {
            eprintln!("{}", Cli::command().render_usage());
            eprintln!("\nFor more information, try '--help'.");
            return ExitCode::UsageError;
        }
        Err(e) => {
            Formatter::new(cli.output_config(&Defaults::default())).error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let config = match ConfigManager::new().and_then(|manager| manager.load()) {
        Ok(config) => config,
        Err(e) => {
            Formatter::new(cli.output_config(&Defaults::default()))
                .error(&format!("Failed to load configuration: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let formatter = Formatter::new(cli.output_config(&config.defaults));

    let session = match cli
        .session_settings()
        .or(config.session)
        .resolve(cli.verbose)
    {
        Ok(session) => session,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let client = match S3Client::connect(&session).await {
        Ok(client) => client,
        Err(e) => {
            formatter.error(&format!("Failed to create S3 client: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    tracing::debug!(?mode, region = %session.region, "Dispatching");

    match mode {
        Mode::List(path) => list::execute(&client, &path, &formatter).await,
        Mode::Upload { target, paths } => {
            upload::execute(&client, &target, &paths, &formatter).await
        }
        Mode::Download { source, dest } => {
            download::execute(&client, &source, &dest, &formatter).await
        }
        Mode::Delete(path) => delete::execute(&client, &path, &formatter).await,
        Mode::Sign(objects) => sign::execute(&client, &objects, &formatter).await,
    }
}
