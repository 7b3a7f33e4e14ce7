//! Summary of one run.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{attempt::OutreachAttempt, candidate::Candidate};

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Candidates returned by discovery, in processing order.
    pub discovered: Vec<Candidate>,
    /// Empty in discover-only mode.
    pub attempts: Vec<OutreachAttempt>,
}

impl RunReport {
    pub fn sent(&self) -> usize {
        self.attempts.iter().filter(|a| a.is_sent()).count()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &OutreachAttempt> {
        self.attempts.iter().filter(|a| !a.is_sent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::attempt::Outcome;

    #[test]
    fn test_counts_split_by_outcome() {
        let person = |slug: &str| Candidate::new(format!("https://www.linkedin.com/in/{}", slug), slug);
        let report = RunReport {
            run_id: Uuid::now_v7(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            discovered: vec![person("a"), person("b"), person("c")],
            attempts: vec![
                OutreachAttempt::sent(person("a"), "Hi a".into()),
                OutreachAttempt::failed(person("b"), "Hi b".into(), "connect control not found"),
                OutreachAttempt::sent(person("c"), "Hi c".into()),
            ],
        };

        assert_eq!(report.sent(), 2);
        assert_eq!(report.failed(), 1);
        let failed: Vec<_> = report.failures().collect();
        assert_eq!(failed[0].outcome, Outcome::Failed);
        assert_eq!(failed[0].candidate.display_name, "b");
    }
}
