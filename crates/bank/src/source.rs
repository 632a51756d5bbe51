use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use exam_core::model::{Question, QuestionBank};

use crate::error::{BankError, ResourceError};
use crate::record::{bank_from_records, parse_payload};

/// A place question payloads can be fetched from.
///
/// The test identifier is opaque; each source decides how it maps to a
/// single JSON resource.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the raw JSON payload for a test.
    ///
    /// # Errors
    ///
    /// Returns `BankError::ResourceLoad` when the resource cannot be
    /// retrieved.
    async fn fetch_payload(&self, test_id: &str) -> Result<String, BankError>;
}

/// Load and partition the question bank for a test.
///
/// Zero questions is not an error at this layer; the caller decides
/// whether an empty bank is terminal.
///
/// # Errors
///
/// Returns `BankError::ResourceLoad` if the fetch fails and
/// `BankError::Validation` if the payload is malformed.
pub async fn load_bank(
    source: &dyn QuestionSource,
    test_id: &str,
) -> Result<QuestionBank, BankError> {
    let payload = source.fetch_payload(test_id).await?;
    let records = parse_payload(&payload)?;
    let bank = bank_from_records(records)?;
    debug!(test_id, total = bank.total(), "loaded question bank");
    Ok(bank)
}

/// Load only the questions tagged with a skill, for targeted practice.
///
/// # Errors
///
/// Returns `BankError::EmptyResult` when the test has no questions with
/// that skill, in addition to the `load_bank` failure modes.
pub async fn load_skill_questions(
    source: &dyn QuestionSource,
    test_id: &str,
    skill: &str,
) -> Result<Vec<Question>, BankError> {
    let bank = load_bank(source, test_id).await?;
    let questions: Vec<Question> = bank.by_skill(skill).into_iter().cloned().collect();
    if questions.is_empty() {
        return Err(BankError::EmptyResult {
            test_id: test_id.to_owned(),
            skill: skill.to_owned(),
        });
    }
    Ok(questions)
}

//
// ─── FILE SOURCE ───────────────────────────────────────────────────────────────
//

/// Reads `<dir>/<test_id>.json` from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, test_id: &str) -> PathBuf {
        self.dir.join(format!("{test_id}.json"))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl QuestionSource for FileSource {
    async fn fetch_payload(&self, test_id: &str) -> Result<String, BankError> {
        let path = self.path_for(test_id);
        let payload = tokio::fs::read_to_string(&path)
            .await
            .map_err(ResourceError::from)?;
        Ok(payload)
    }
}

//
// ─── HTTP SOURCE ───────────────────────────────────────────────────────────────
//

/// Fetches `<base_url>/<test_id>.json` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    async fn fetch_payload(&self, test_id: &str) -> Result<String, BankError> {
        let url = format!("{}/{test_id}.json", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ResourceError::from)?;

        if !response.status().is_success() {
            return Err(ResourceError::Status(response.status()).into());
        }

        let payload = response.text().await.map_err(ResourceError::from)?;
        Ok(payload)
    }
}

//
// ─── STATIC SOURCE ─────────────────────────────────────────────────────────────
//

/// In-memory source for tests and prototyping.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    payloads: HashMap<String, String>,
}

impl StaticSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_payload(mut self, test_id: impl Into<String>, payload: impl Into<String>) -> Self {
        self.payloads.insert(test_id.into(), payload.into());
        self
    }
}

#[async_trait]
impl QuestionSource for StaticSource {
    async fn fetch_payload(&self, test_id: &str) -> Result<String, BankError> {
        self.payloads
            .get(test_id)
            .cloned()
            .ok_or_else(|| ResourceError::Missing(test_id.to_owned()).into())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
