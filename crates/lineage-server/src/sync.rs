//! Best-effort upload of newly created persons to a remote service.
//!
//! Handlers push persons into an unbounded channel; a single background task
//! drains it and POSTs each one as JSON. Failures are logged and dropped. The
//! local write has already been committed and is never rolled back.

use std::time::Duration;

use anyhow::Context as _;
use lineage_core::person::Person;
use reqwest::Client;
use tokio::{
  sync::mpsc::{self, UnboundedSender},
  task::JoinHandle,
};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct SyncClient {
  client: Client,
  url:    String,
}

impl SyncClient {
  pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, url: url.into() })
  }

  /// `POST <url>` with the person as the JSON body.
  pub async fn upload(&self, person: &Person) -> anyhow::Result<()> {
    self
      .client
      .post(&self.url)
      .json(person)
      .send()
      .await
      .with_context(|| format!("POST {} failed", self.url))?
      .error_for_status()
      .with_context(|| format!("POST {} rejected", self.url))?;
    Ok(())
  }

  /// Start the upload worker. It stops once every sender has been dropped.
  pub fn spawn(self) -> (UnboundedSender<Person>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Person>();
    let handle = tokio::spawn(async move {
      while let Some(person) = rx.recv().await {
        match self.upload(&person).await {
          Ok(()) => debug!(person_id = %person.id(), "uploaded person"),
          Err(e) => warn!(person_id = %person.id(), error = %format!("{e:#}"), "sync upload failed"),
        }
      }
    });
    (tx, handle)
  }
}
