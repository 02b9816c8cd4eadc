//! Message log stored as a JSON array document.
//!
//! The document lives in a capability-scoped directory, so the configured
//! file name can never escape it. Saves run read-modify-write under an async
//! mutex and replace the document atomically; reads take no lock because
//! they only ever observe a complete document.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ports::{MessageRepository, MessageRepositoryError};
use crate::domain::{MessageId, MessageRecord, StampedMessage};
use crate::outbound::memory::upsert_message;

use super::atomic_io::write_atomic;

/// File-backed [`MessageRepository`].
#[derive(Debug, Clone)]
pub struct JsonFileMessageRepository {
    dir: Arc<Dir>,
    file_name: Arc<Utf8PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileMessageRepository {
    /// Store messages in `file_name` inside an already opened directory.
    pub fn new(dir: Dir, file_name: impl Into<Utf8PathBuf>) -> Self {
        Self {
            dir: Arc::new(dir),
            file_name: Arc::new(file_name.into()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create `dir_path` if needed and store messages in `file_name` inside
    /// it.
    ///
    /// # Errors
    /// Returns [`MessageRepositoryError::Io`] when the directory cannot be
    /// created or opened.
    pub fn open(
        dir_path: &Utf8Path,
        file_name: impl Into<Utf8PathBuf>,
    ) -> Result<Self, MessageRepositoryError> {
        Dir::create_ambient_dir_all(dir_path, ambient_authority())
            .and_then(|()| Dir::open_ambient_dir(dir_path, ambient_authority()))
            .map(|dir| Self::new(dir, file_name))
            .map_err(|err| MessageRepositoryError::io(format!("{dir_path}: {err}")))
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, MessageRepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir, &Utf8Path) -> Result<T, MessageRepositoryError> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        let file_name = Arc::clone(&self.file_name);
        tokio::task::spawn_blocking(move || op(dir.as_ref(), file_name.as_path()))
            .await
            .map_err(|err| MessageRepositoryError::io(format!("file task failed: {err}")))?
    }
}

fn read_document(
    dir: &Dir,
    file_name: &Utf8Path,
) -> Result<Vec<MessageRecord>, MessageRepositoryError> {
    let contents = match dir.read_to_string(file_name) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(MessageRepositoryError::io(format!("{file_name}: {err}"))),
    };
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&contents)
        .map_err(|err| MessageRepositoryError::corrupt(format!("{file_name}: {err}")))
}

fn write_document(
    dir: &Dir,
    file_name: &Utf8Path,
    messages: &[MessageRecord],
) -> Result<(), MessageRepositoryError> {
    let contents = serde_json::to_vec_pretty(messages)
        .map_err(|err| MessageRepositoryError::corrupt(err.to_string()))?;
    write_atomic(dir, file_name, &contents)
        .map_err(|err| MessageRepositoryError::io(format!("{file_name}: {err}")))
}

#[async_trait]
impl MessageRepository for JsonFileMessageRepository {
    async fn list_all(&self) -> Result<Vec<MessageRecord>, MessageRepositoryError> {
        self.blocking(read_document).await
    }

    async fn save(&self, message: StampedMessage) -> Result<MessageRecord, MessageRepositoryError> {
        let _guard = self.write_lock.lock().await;
        let record = message.into_record(MessageId::random);
        let stored = record.clone();
        let total = self
            .blocking(move |dir, file_name| {
                let mut messages = read_document(dir, file_name)?;
                upsert_message(&mut messages, stored);
                write_document(dir, file_name, &messages)?;
                Ok(messages.len())
            })
            .await?;
        debug!(message_id = %record.id(), total, "message document rewritten");
        Ok(record)
    }
}
