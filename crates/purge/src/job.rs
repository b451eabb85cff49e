//! Cleanup job definition
//!
//! A job names the search query, the account, and how matches are removed.
//! Jobs are read from a JSON file and overlaid with command-line values;
//! anything left unset falls back to the config directory defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::CREDENTIALS_FILE;
use crate::credential::TOKEN_FILE;
use crate::error::Error;
use crate::remote::DEFAULT_USER_ID;

/// Default job filename in the AutoDelete config directory
pub const JOB_FILE: &str = "job.json";

/// Default log filename in the AutoDelete config directory
pub const LOG_FILE: &str = "autodelete.log";

/// How matched messages are removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Immediate, irreversible deletion
    #[default]
    Permanent,
    /// Move to Trash, where Gmail purges after 30 days
    Trash,
}

/// Partially specified job, as found in a job file or on the command line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobFile {
    pub query: Option<String>,
    pub user_id: Option<String>,
    pub dry_run: Option<bool>,
    pub mode: Option<DeleteMode>,
    pub include_spam_trash: Option<bool>,
    pub credentials_file: Option<PathBuf>,
    pub token_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl JobFile {
    /// Load a job file
    ///
    /// # Errors
    /// `Error::Configuration` if the file can't be read or parsed.
    pub fn load(path: &Path) -> crate::Result<Self> {
        config::load_json_file(path).map_err(|e| Error::Configuration {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
            hint: "Job files are JSON objects such as {\"query\": \"from:bank older_than:1d\"}"
                .to_string(),
        })
    }

    /// Get the default job file path (~/.config/autodelete/job.json)
    pub fn default_path() -> Option<PathBuf> {
        config::config_path(JOB_FILE)
    }

    /// Overlay `other` on top of `self`; values set in `other` win
    pub fn overlay(self, other: JobFile) -> JobFile {
        JobFile {
            query: other.query.or(self.query),
            user_id: other.user_id.or(self.user_id),
            dry_run: other.dry_run.or(self.dry_run),
            mode: other.mode.or(self.mode),
            include_spam_trash: other.include_spam_trash.or(self.include_spam_trash),
            credentials_file: other.credentials_file.or(self.credentials_file),
            token_file: other.token_file.or(self.token_file),
            log_file: other.log_file.or(self.log_file),
        }
    }
}

/// Local files a run reads and writes
#[derive(Debug, Clone, PartialEq)]
pub struct JobFiles {
    pub credentials_file: PathBuf,
    pub token_file: PathBuf,
    pub log_file: PathBuf,
}

impl JobFiles {
    /// Take the paths set in `file`, defaulting the rest to the config directory
    pub fn resolve(file: &JobFile) -> Self {
        Self {
            credentials_file: file
                .credentials_file
                .clone()
                .unwrap_or_else(|| default_file(CREDENTIALS_FILE)),
            token_file: file
                .token_file
                .clone()
                .unwrap_or_else(|| default_file(TOKEN_FILE)),
            log_file: file
                .log_file
                .clone()
                .unwrap_or_else(|| default_file(LOG_FILE)),
        }
    }
}

/// Fully resolved cleanup job
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub query: String,
    pub user_id: String,
    pub dry_run: bool,
    pub mode: DeleteMode,
    pub include_spam_trash: bool,
    pub files: JobFiles,
}

impl Job {
    /// Fill defaults and validate
    ///
    /// # Errors
    /// `Error::InvalidJob` if no non-blank query was given.
    pub fn resolve(file: JobFile) -> crate::Result<Self> {
        let files = JobFiles::resolve(&file);
        let query = file
            .query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .ok_or_else(|| Error::InvalidJob("a non-empty search query is required".to_string()))?;

        let user_id = file
            .user_id
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        Ok(Self {
            query,
            user_id,
            dry_run: file.dry_run.unwrap_or(false),
            mode: file.mode.unwrap_or_default(),
            include_spam_trash: file.include_spam_trash.unwrap_or(false),
            files,
        })
    }
}

/// Config directory path for `filename`, or the bare name when there is no config dir
fn default_file(filename: &str) -> PathBuf {
    config::config_path(filename).unwrap_or_else(|| PathBuf::from(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_applies_defaults() {
        let job = Job::resolve(JobFile {
            query: Some("  from:bank subject:OTP older_than:1d ".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(job.query, "from:bank subject:OTP older_than:1d");
        assert_eq!(job.user_id, "me");
        assert!(!job.dry_run);
        assert_eq!(job.mode, DeleteMode::Permanent);
        assert!(!job.include_spam_trash);
        assert!(job.files.credentials_file.ends_with("credentials.json"));
        assert!(job.files.token_file.ends_with("token.json"));
        assert!(job.files.log_file.ends_with("autodelete.log"));
    }

    #[test]
    fn test_blank_query_is_rejected() {
        for query in [None, Some("".to_string()), Some("   ".to_string())] {
            let err = Job::resolve(JobFile {
                query,
                ..Default::default()
            })
            .unwrap_err();
            assert!(matches!(err, Error::InvalidJob(_)));
        }
    }

    #[test]
    fn test_overlay_prefers_later_values() {
        let file = JobFile {
            query: Some("from:shop".to_string()),
            user_id: Some("someone@example.com".to_string()),
            dry_run: Some(true),
            ..Default::default()
        };
        let flags = JobFile {
            query: Some("from:bank".to_string()),
            mode: Some(DeleteMode::Trash),
            ..Default::default()
        };

        let merged = file.overlay(flags);

        assert_eq!(merged.query.as_deref(), Some("from:bank"));
        assert_eq!(merged.user_id.as_deref(), Some("someone@example.com"));
        assert_eq!(merged.dry_run, Some(true));
        assert_eq!(merged.mode, Some(DeleteMode::Trash));
    }

    #[test]
    fn test_files_resolve_without_query() {
        let files = JobFiles::resolve(&JobFile {
            token_file: Some(PathBuf::from("/var/lib/autodelete/token.json")),
            ..Default::default()
        });
        assert_eq!(files.token_file, PathBuf::from("/var/lib/autodelete/token.json"));
        assert!(files.credentials_file.ends_with("credentials.json"));
    }

    #[test]
    fn test_load_job_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(
            &path,
            r#"{"query": "from:abc@gmail.com older_than:1d", "mode": "trash", "dry_run": true}"#,
        )
        .unwrap();

        let file = JobFile::load(&path).unwrap();
        assert_eq!(file.mode, Some(DeleteMode::Trash));
        assert_eq!(file.dry_run, Some(true));
        assert!(file.user_id.is_none());
    }

    #[test]
    fn test_unknown_job_field_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(&path, r#"{"qeury": "typo"}"#).unwrap();

        let err = JobFile::load(&path).unwrap_err();
        assert!(err.is_configuration());
    }
}
