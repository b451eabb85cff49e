//! Command-line interface

use clap::{Args, Parser, Subcommand};
use purge::{DeleteMode, JobFile};
use std::path::PathBuf;

/// Delete Gmail messages matching a search query
#[derive(Debug, Parser)]
#[command(name = "autodelete", version, about, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub run: RunArgs,
}

impl Cli {
    /// The requested command; bare flags mean `run`
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Run(self.run))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Delete messages matching the job's query (the default)
    Run(RunArgs),
    /// Run the consent flow once and store a refreshable token
    Authorize(AuthorizeArgs),
}

/// Options for a deletion run; each overrides the job file
#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Job file (defaults to ~/.config/autodelete/job.json when present)
    #[arg(long, value_name = "FILE")]
    pub job: Option<PathBuf>,

    /// Gmail search query, e.g. 'from:bank subject:OTP older_than:1d'
    #[arg(long, short)]
    pub query: Option<String>,

    /// Account selector
    #[arg(long, short, value_name = "USER_ID")]
    pub user: Option<String>,

    /// Log what would be deleted without deleting
    #[arg(long)]
    pub dry_run: bool,

    /// Delete for real even if the job file asks for a dry run
    #[arg(long, conflicts_with = "dry_run")]
    pub no_dry_run: bool,

    /// Move matches to Trash instead of deleting permanently
    #[arg(long)]
    pub trash: bool,

    /// Delete permanently even if the job file asks for Trash
    #[arg(long, conflicts_with = "trash")]
    pub permanent: bool,

    /// Include messages already in Spam and Trash
    #[arg(long)]
    pub include_spam_trash: bool,

    #[command(flatten)]
    pub files: FileArgs,

    /// Fail instead of opening the browser when no usable token exists
    #[arg(long)]
    pub non_interactive: bool,
}

#[derive(Debug, Default, Args)]
pub struct AuthorizeArgs {
    #[command(flatten)]
    pub files: FileArgs,
}

#[derive(Debug, Default, Args)]
pub struct FileArgs {
    /// OAuth client descriptor downloaded from Google Cloud Console
    #[arg(long, value_name = "FILE")]
    pub credentials: Option<PathBuf>,

    /// Token cache
    #[arg(long, value_name = "FILE")]
    pub token: Option<PathBuf>,

    /// Log file (appended to)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl FileArgs {
    fn to_job_file(&self) -> JobFile {
        JobFile {
            credentials_file: self.credentials.clone(),
            token_file: self.token.clone(),
            log_file: self.log_file.clone(),
            ..Default::default()
        }
    }
}

impl RunArgs {
    /// Command-line values as a job overlay; unset flags stay `None`
    pub fn to_job_file(&self) -> JobFile {
        JobFile {
            query: self.query.clone(),
            user_id: self.user.clone(),
            dry_run: switch(self.dry_run, self.no_dry_run),
            mode: switch(self.trash, self.permanent).map(|trash| {
                if trash {
                    DeleteMode::Trash
                } else {
                    DeleteMode::Permanent
                }
            }),
            include_spam_trash: self.include_spam_trash.then_some(true),
            ..self.files.to_job_file()
        }
    }
}

/// `Some(true)` for the on flag, `Some(false)` for the off flag, else unset
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

impl AuthorizeArgs {
    pub fn to_job_file(&self) -> JobFile {
        self.files.to_job_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags_become_overlay() {
        let cli = Cli::try_parse_from([
            "autodelete",
            "--query",
            "from:bank older_than:1d",
            "--trash",
            "--token",
            "/tmp/token.json",
        ])
        .unwrap();

        assert!(cli.command.is_none());
        let overlay = cli.run.to_job_file();
        assert_eq!(overlay.query.as_deref(), Some("from:bank older_than:1d"));
        assert_eq!(overlay.mode, Some(DeleteMode::Trash));
        assert_eq!(overlay.token_file, Some(PathBuf::from("/tmp/token.json")));
        assert!(overlay.dry_run.is_none());
        assert!(overlay.user_id.is_none());
    }

    #[test]
    fn test_unset_flags_do_not_override_job_file() {
        let cli = Cli::try_parse_from(["autodelete"]).unwrap();
        let file = JobFile {
            dry_run: Some(true),
            mode: Some(DeleteMode::Trash),
            ..Default::default()
        };

        let merged = file.clone().overlay(cli.run.to_job_file());

        assert_eq!(merged, file);
    }

    #[test]
    fn test_run_keyword_is_optional() {
        let explicit = Cli::try_parse_from(["autodelete", "run", "--query", "from:bank"])
            .unwrap()
            .into_command();
        let bare = Cli::try_parse_from(["autodelete", "--query", "from:bank"])
            .unwrap()
            .into_command();

        for command in [explicit, bare] {
            match command {
                Command::Run(args) => {
                    assert_eq!(args.to_job_file().query.as_deref(), Some("from:bank"))
                }
                other => panic!("unexpected command: {:?}", other),
            }
        }
    }

    #[test]
    fn test_off_switches_override_job_file() {
        let cli = Cli::try_parse_from(["autodelete", "run", "--no-dry-run", "--permanent"]).unwrap();
        let file = JobFile {
            query: Some("from:shop".to_string()),
            dry_run: Some(true),
            mode: Some(DeleteMode::Trash),
            ..Default::default()
        };

        let Command::Run(args) = cli.into_command() else {
            panic!("expected run");
        };
        let merged = file.overlay(args.to_job_file());

        assert_eq!(merged.dry_run, Some(false));
        assert_eq!(merged.mode, Some(DeleteMode::Permanent));
    }

    #[test]
    fn test_conflicting_switches_are_rejected() {
        assert!(Cli::try_parse_from(["autodelete", "--dry-run", "--no-dry-run"]).is_err());
        assert!(Cli::try_parse_from(["autodelete", "run", "--trash", "--permanent"]).is_err());
    }

    #[test]
    fn test_authorize_subcommand() {
        let cli =
            Cli::try_parse_from(["autodelete", "authorize", "--credentials", "creds.json"]).unwrap();
        match cli.command {
            Some(Command::Authorize(args)) => {
                assert_eq!(
                    args.to_job_file().credentials_file,
                    Some(PathBuf::from("creds.json"))
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
