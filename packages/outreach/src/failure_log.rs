//! Append-only record of candidates that need manual follow-up.
//!
//! One line per failed attempt: `profile_url, display_name, company, affiliation`.
//! The file is created on first write. Write errors are logged, never returned
//! to the orchestrator.

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use crate::types::candidate::Candidate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEntry {
    pub profile_url: String,
    pub display_name: String,
    pub company: String,
    pub affiliation: String,
}

impl FailureEntry {
    pub fn new(candidate: &Candidate, company: &str, affiliation: &str) -> Self {
        Self {
            profile_url: candidate.profile_url.clone(),
            display_name: candidate.display_name.clone(),
            company: company.to_string(),
            affiliation: affiliation.to_string(),
        }
    }

    /// Newline-terminated line. Embedded line breaks become spaces so one
    /// entry is always one line.
    pub fn to_line(&self) -> String {
        let fields = [
            &self.profile_url,
            &self.display_name,
            &self.company,
            &self.affiliation,
        ];
        let line = fields
            .iter()
            .map(|f| f.replace(['\r', '\n'], " "))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}\n", line)
    }
}

#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, entry: &FailureEntry) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(entry.to_line().as_bytes()).await?;
        file.flush().await
    }

    /// Fire-and-forget append.
    pub async fn record(&self, entry: &FailureEntry) {
        match self.append(entry).await {
            Ok(()) => debug!(path = %self.path.display(), url = %entry.profile_url, "Recorded failed request"),
            Err(e) => error!(
                path = %self.path.display(),
                url = %entry.profile_url,
                error = %e,
                "Could not write to failure log"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(url: &str, name: &str) -> FailureEntry {
        FailureEntry::new(&Candidate::new(url, name), "Google", "Vanderbilt University")
    }

    #[test]
    fn test_line_format() {
        assert_eq!(
            entry("https://www.linkedin.com/in/ada", "Ada Lovelace").to_line(),
            "https://www.linkedin.com/in/ada, Ada Lovelace, Google, Vanderbilt University\n"
        );
    }

    #[test]
    fn test_embedded_newlines_stay_on_one_line() {
        let line = entry("https://www.linkedin.com/in/ada", "Ada\nLovelace").to_line();
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.contains("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_append_creates_and_appends() {
        let dir = TempDir::new().unwrap();
        let log = FailureLog::new(dir.path().join("failed_requests.txt"));

        log.append(&entry("https://www.linkedin.com/in/a", "A One"))
            .await
            .unwrap();
        log.append(&entry("https://www.linkedin.com/in/b", "B Two"))
            .await
            .unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("https://www.linkedin.com/in/a, A One"));
        assert!(lines[1].starts_with("https://www.linkedin.com/in/b, B Two"));
    }

    #[tokio::test]
    async fn test_record_swallows_write_errors() {
        let dir = TempDir::new().unwrap();
        let log = FailureLog::new(dir.path().join("missing-dir").join("log.txt"));

        log.record(&entry("https://www.linkedin.com/in/a", "A One"))
            .await;

        assert!(!log.path().exists());
    }
}
