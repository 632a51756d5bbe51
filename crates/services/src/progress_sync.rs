use reqwest::Client;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use exam_core::scoring::Report;

/// Body of the best-effort progress save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressPayload {
    pub email: String,
    #[serde(rename = "roadmapString")]
    pub roadmap_string: String,
    pub level: String,
}

impl ProgressPayload {
    /// Build a payload from a completed exam report.
    ///
    /// The roadmap lists the weakest skills for follow-up study; the level
    /// is the overall accuracy percentage.
    #[must_use]
    pub fn from_report(email: impl Into<String>, report: &Report) -> Self {
        Self {
            email: email.into(),
            roadmap_string: report.weakest_skills.join(", "),
            level: format!("{:.0}", report.total_percentage),
        }
    }
}

/// Client for the external progress-tracking collaborator.
///
/// Saves are fire-and-forget: the task is detached, a failure is caught
/// and logged, and no transition ever awaits the result.
#[derive(Debug, Clone)]
pub struct ProgressClient {
    client: Client,
    endpoint: String,
    email: String,
}

impl ProgressClient {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            email: email.into(),
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Spawn a detached save for a completed report.
    ///
    /// The returned handle is observational only; dropping it does not
    /// cancel the task.
    pub fn spawn_save(&self, report: &Report) -> JoinHandle<()> {
        let payload = ProgressPayload::from_report(self.email.clone(), report);
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        tokio::spawn(async move {
            match client.post(&endpoint).json(&payload).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("progress saved");
                }
                Ok(response) => {
                    warn!(status = %response.status(), "progress save rejected");
                }
                Err(err) => {
                    warn!(error = %err, "progress save failed");
                }
            }
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
