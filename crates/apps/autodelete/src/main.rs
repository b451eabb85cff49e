//! AutoDelete - removes Gmail messages matching a search query
//!
//! Meant for recurring cleanup, e.g. expiring one-time-password mails.
//! Run `autodelete authorize` once, then schedule `autodelete [run] --query ...`
//! or a job file.

use anyhow::Result;
use clap::Parser;
use log::{error, info, warn};
use purge::{
    ConsentPolicy, CredentialProvider, DeletionHandler, DeletionOptions, DeletionSummary,
    GmailClient, Job, JobFile, JobFiles,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod cli;
mod logging;

use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("autodelete: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Bootstrap config directory
    let config_ready = config::init();

    match cli.into_command() {
        Command::Authorize(args) => {
            let files = JobFiles::resolve(&load_job_file(None)?.overlay(args.to_job_file()));
            start_logging(&files.log_file, config_ready)?;
            authorize(&files)
        }
        Command::Run(args) => {
            let job = load_job_file(args.job.as_deref())?.overlay(args.to_job_file());
            let job = Job::resolve(job)?;
            start_logging(&job.files.log_file, config_ready)?;
            let policy = if args.non_interactive {
                ConsentPolicy::Forbidden
            } else {
                ConsentPolicy::Interactive
            };
            run_job(&job, policy)
        }
    }
}

/// Load an explicit job file, or the default one when it exists
fn load_job_file(path: Option<&Path>) -> Result<JobFile> {
    if let Some(path) = path {
        return Ok(JobFile::load(path)?);
    }
    match JobFile::default_path() {
        Some(path) if path.exists() => Ok(JobFile::load(&path)?),
        _ => Ok(JobFile::default()),
    }
}

fn start_logging(log_file: &Path, config_ready: Result<PathBuf>) -> Result<()> {
    logging::init(log_file)?;
    if let Err(e) = config_ready {
        warn!("Failed to initialize config directory: {:#}", e);
    }
    Ok(())
}

fn authorize(files: &JobFiles) -> Result<()> {
    let provider = CredentialProvider::from_files(&files.credentials_file, &files.token_file)?;
    provider.authorize()?;
    println!("Token stored at {}", files.token_file.display());
    Ok(())
}

fn run_job(job: &Job, policy: ConsentPolicy) -> Result<()> {
    info!("Deleting messages matching {:?} from {}.", job.query, job.user_id);

    let credential =
        CredentialProvider::from_files(&job.files.credentials_file, &job.files.token_file)?
            .get(policy)?;
    let client = GmailClient::new(credential);

    let summary =
        DeletionHandler::new(&client, DeletionOptions::from(job)).delete_matching(&job.query)?;

    match summary {
        DeletionSummary::NoMatches => info!("Done: nothing matched."),
        DeletionSummary::SearchFailed => warn!("Done: search failed, see errors above."),
        DeletionSummary::DryRun { matched } => {
            info!("Done: dry run, {} messages would be removed.", matched)
        }
        DeletionSummary::Deleted { count } => info!("Done: {} messages removed.", count),
    }
    Ok(())
}
