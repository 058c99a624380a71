//! Daily completion records and streak counting
//!
//! A streak is the number of consecutive calendar days, ending today, with
//! at least one completion. Several completions on one day count once.
//!
//! Records are kept per child in an [`ActivityLog`]: one gateway document
//! per child, mapping [`CompletionRecord::record_id`] to the record, so
//! completing the same responsibility twice on one day stores it once.

use crate::error::PersistenceError;
use crate::gateway::PersistenceGateway;
use crate::types::{Notification, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One child's completion of one responsibility on one day
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    /// Child account
    pub child_uid: UserId,
    /// Responsibility text at the time of completion
    pub responsibility: String,
    /// Local calendar day
    pub date: NaiveDate,
}

impl CompletionRecord {
    /// Create record
    #[must_use]
    pub fn new(child_uid: UserId, responsibility: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            child_uid,
            responsibility: responsibility.into(),
            date,
        }
    }

    /// Deterministic key `<uid>_<responsibility>_<YYYY-MM-DD>`
    ///
    /// Whitespace runs in the responsibility become `_`; characters other
    /// than ASCII letters, digits, `_` and `-` are dropped. Recording the same
    /// completion twice on one day yields the same key.
    #[must_use]
    pub fn record_id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.child_uid,
            safe_key(&self.responsibility),
            self.date.format("%Y-%m-%d")
        )
    }
}

fn safe_key(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                key.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            key.push(c);
        }
    }
    key
}

/// Consecutive days with a completion, ending at `today`
///
/// Dates after `today` are ignored. Zero when `today` itself has none.
#[must_use]
pub fn overall_streak<I>(dates: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let days: BTreeSet<NaiveDate> = dates.into_iter().filter(|d| *d <= today).collect();

    let mut streak = 0;
    let mut expected = today;
    for day in days.iter().rev() {
        if *day != expected {
            break;
        }
        streak += 1;
        match expected.pred_opt() {
            Some(prev) => expected = prev,
            None => break,
        }
    }
    streak
}

/// Streak of one child for one responsibility
#[must_use]
pub fn responsibility_streak(
    records: &[CompletionRecord],
    child: &UserId,
    responsibility: &str,
    today: NaiveDate,
) -> u32 {
    overall_streak(
        records
            .iter()
            .filter(|r| &r.child_uid == child && r.responsibility == responsibility)
            .map(|r| r.date),
        today,
    )
}

/// Streak of one child across all responsibilities
#[must_use]
pub fn child_streak(records: &[CompletionRecord], child: &UserId, today: NaiveDate) -> u32 {
    overall_streak(
        records.iter().filter(|r| &r.child_uid == child).map(|r| r.date),
        today,
    )
}

/// Completion records stored through a gateway, one document per child
#[derive(Clone)]
pub struct ActivityLog {
    gateway: Arc<dyn PersistenceGateway>,
}

impl ActivityLog {
    /// Keep records in `gateway`
    ///
    /// The gateway must not also hold store documents; child ids would
    /// collide with account ids.
    #[must_use]
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    /// Every record of `child`, in id order
    ///
    /// # Errors
    /// Gateway failures and malformed stored documents
    pub async fn records(&self, child: &UserId) -> Result<Vec<CompletionRecord>, PersistenceError> {
        Ok(self.load(child).await?.into_values().collect())
    }

    /// Store `record`, replacing one with the same id
    ///
    /// # Errors
    /// Gateway failures and malformed stored documents
    pub async fn record(&self, record: &CompletionRecord) -> Result<(), PersistenceError> {
        let mut records = self.load(&record.child_uid).await?;
        records.insert(record.record_id(), record.clone());
        let document = serde_json::to_value(&records)?;
        self.gateway.save(&record.child_uid, &document).await
    }

    /// [`child_streak`] over the stored records
    ///
    /// # Errors
    /// As [`ActivityLog::records`]
    pub async fn child_streak(&self, child: &UserId, today: NaiveDate) -> Result<u32, PersistenceError> {
        Ok(child_streak(&self.records(child).await?, child, today))
    }

    /// [`responsibility_streak`] over the stored records
    ///
    /// # Errors
    /// As [`ActivityLog::records`]
    pub async fn responsibility_streak(
        &self,
        child: &UserId,
        responsibility: &str,
        today: NaiveDate,
    ) -> Result<u32, PersistenceError> {
        let records = self.records(child).await?;
        Ok(responsibility_streak(&records, child, responsibility, today))
    }

    async fn load(&self, child: &UserId) -> Result<BTreeMap<String, CompletionRecord>, PersistenceError> {
        match self.gateway.load(child).await? {
            Some(document) => Ok(serde_json::from_value(document)?),
            None => Ok(BTreeMap::new()),
        }
    }
}

impl fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityLog").finish_non_exhaustive()
    }
}

#[derive(Debug)]
enum Message {
    Record(CompletionRecord),
    Flush(oneshot::Sender<()>),
}

/// Background writer feeding an [`ActivityLog`]
///
/// Records are written one at a time in submission order. A failed write is
/// logged and announced as a warning, never retried.
#[derive(Debug)]
pub struct ActivityRecorder {
    tx: mpsc::UnboundedSender<Message>,
    worker: JoinHandle<()>,
}

impl ActivityRecorder {
    /// Spawn the writer
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(log: ActivityLog, notices: broadcast::Sender<Notification>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run(log, rx, notices));
        Self { tx, worker }
    }

    /// Queue `record` for writing
    pub fn submit(&self, record: CompletionRecord) {
        if self.tx.send(Message::Record(record)).is_err() {
            warn!("Activity writer stopped, completion dropped");
        }
    }

    /// Wait until everything submitted so far has been handled
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Message::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Flush, then stop the writer
    pub async fn shutdown(self) {
        self.flush().await;
        let Self { tx, worker } = self;
        drop(tx);
        if let Err(e) = worker.await {
            warn!(error = %e, "Activity writer ended abnormally");
        }
    }
}

async fn run(
    log: ActivityLog,
    mut rx: mpsc::UnboundedReceiver<Message>,
    notices: broadcast::Sender<Notification>,
) {
    while let Some(message) = rx.recv().await {
        match message {
            Message::Record(record) => match log.record(&record).await {
                Ok(()) => debug!(id = %record.record_id(), "Completion recorded"),
                Err(e) => {
                    warn!(id = %record.record_id(), error = %e, "Completion not recorded");
                    // no receivers is fine
                    let _ = notices.send(Notification::warning("Failed to record completion"));
                }
            },
            Message::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}
