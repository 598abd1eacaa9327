use chrono::Utc;
use tokio::sync::{mpsc, oneshot};

use crate::models::ContactSubmission;
use crate::storage::{DriveStore, LocalStore, StorageError, WorkbookStore};
use crate::workbook;

/// Which backend ended up holding the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Remote,
    Local,
}

struct WriteRequest {
    record: ContactSubmission,
    reply: oneshot::Sender<Result<Destination, StorageError>>,
}

/// Handle to the single writer task. All workbook read-modify-write cycles
/// go through one mpsc consumer, so concurrent submissions are appended in
/// order instead of racing on the file and losing rows.
#[derive(Clone)]
pub struct WorkbookWriter {
    tx: mpsc::Sender<WriteRequest>,
}

impl WorkbookWriter {
    pub fn spawn(remote: Option<DriveStore>, local: LocalStore) -> Self {
        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(run(rx, remote, local));
        Self { tx }
    }

    /// Queue a record for persistence and wait for the outcome. The
    /// timestamp is stamped by the writer, not here.
    pub async fn persist(
        &self,
        record: ContactSubmission,
    ) -> Result<Destination, StorageError> {
        let (reply, result) = oneshot::channel();
        self.tx
            .send(WriteRequest { record, reply })
            .await
            .map_err(|_| StorageError::Workbook("Writer task is gone".to_string()))?;
        result
            .await
            .map_err(|_| StorageError::Workbook("Writer task dropped the request".to_string()))?
    }
}

async fn run(
    mut rx: mpsc::Receiver<WriteRequest>,
    remote: Option<DriveStore>,
    local: LocalStore,
) {
    tracing::debug!("Workbook writer started");

    while let Some(req) = rx.recv().await {
        let mut record = req.record;
        record.submitted_at = Some(Utc::now());

        let result = persist_one(remote.as_ref(), &local, &record).await;
        let _ = req.reply.send(result);
    }

    tracing::debug!("Workbook writer stopped");
}

/// Try the remote backend when configured; any remote failure falls back
/// to the local workbook. A local failure is fatal for the request.
async fn persist_one(
    remote: Option<&DriveStore>,
    local: &LocalStore,
    record: &ContactSubmission,
) -> Result<Destination, StorageError> {
    if let Some(remote) = remote {
        match append(remote, record).await {
            Ok(()) => return Ok(Destination::Remote),
            Err(e) => {
                tracing::warn!("Remote workbook write failed, falling back to local: {e}");
            }
        }
    }

    append(local, record).await?;
    Ok(Destination::Local)
}

async fn append(store: &dyn WorkbookStore, record: &ContactSubmission) -> Result<(), StorageError> {
    let mut rows = match store.load().await? {
        Some(bytes) => workbook::decode(&bytes)?,
        None => Vec::new(),
    };
    rows.push(record.clone());

    let bytes = workbook::encode(&rows)?;
    store.store(&bytes).await?;

    tracing::debug!(
        "Appended submission to {} workbook ({} rows)",
        store.name(),
        rows.len()
    );
    Ok(())
}
