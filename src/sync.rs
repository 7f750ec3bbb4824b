use crate::model::{Note, NoteId};
use chrono::Utc;
use std::collections::VecDeque;

/// Acknowledgment returned by the remote delete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAck {
    pub id: NoteId,
    pub success: bool,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("{op} rejected for {id}: {reason}")]
    Rejected {
        op: SyncKind,
        id: NoteId,
        reason: String,
    },
    #[error("remote refused to delete {0}")]
    DeleteRefused(NoteId),
}

/// Remote mirror of the local notes. Calls run after the local write and never undo it.
pub trait SyncClient {
    fn fetch_all(&self) -> Result<Vec<Note>, SyncError>;
    fn create(&self, note: &Note) -> Result<Note, SyncError>;
    fn update(&self, note: &Note) -> Result<Note, SyncError>;
    fn delete(&self, id: &str) -> Result<DeleteAck, SyncError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncKind {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOp {
    Create(Note),
    Update(Note),
    Delete(NoteId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub kind: SyncKind,
    pub id: NoteId,
    pub result: Result<(), SyncError>,
}

/// Stand-in for the HTTP backend: logs each call and answers immediately.
#[derive(Debug, Default)]
pub struct StubSyncClient {
    offline: bool,
}

pub struct SyncQueue {
    client: Box<dyn SyncClient>,
    pending: VecDeque<SyncOp>,
}

impl std::fmt::Display for SyncKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SyncKind::Create => "create",
            SyncKind::Update => "update",
            SyncKind::Delete => "delete",
        })
    }
}

impl SyncOp {
    pub fn kind(&self) -> SyncKind {
        match self {
            SyncOp::Create(_) => SyncKind::Create,
            SyncOp::Update(_) => SyncKind::Update,
            SyncOp::Delete(_) => SyncKind::Delete,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            SyncOp::Create(note) | SyncOp::Update(note) => &note.id,
            SyncOp::Delete(id) => id,
        }
    }
}

impl StubSyncClient {
    pub fn new(offline: bool) -> Self {
        StubSyncClient { offline }
    }

    fn call(&self, op: SyncKind, method: &str, id: &str) -> Result<(), SyncError> {
        tracing::info!(
            target: "notecards::sync",
            %op,
            method,
            path = %format!("/api/notes/{}", id),
            timestamp = %Utc::now().to_rfc3339(),
            offline = self.offline,
            "remote call"
        );
        if self.offline {
            return Err(SyncError::Rejected {
                op,
                id: id.to_string(),
                reason: "offline".into(),
            });
        }
        Ok(())
    }
}

impl SyncClient for StubSyncClient {
    fn fetch_all(&self) -> Result<Vec<Note>, SyncError> {
        tracing::info!(target: "notecards::sync", method = "GET", path = "/api/notes", "remote call");
        Ok(Vec::new())
    }

    fn create(&self, note: &Note) -> Result<Note, SyncError> {
        self.call(SyncKind::Create, "POST", &note.id)?;
        Ok(note.clone())
    }

    fn update(&self, note: &Note) -> Result<Note, SyncError> {
        self.call(SyncKind::Update, "PUT", &note.id)?;
        Ok(note.clone())
    }

    fn delete(&self, id: &str) -> Result<DeleteAck, SyncError> {
        self.call(SyncKind::Delete, "DELETE", id)?;
        Ok(DeleteAck {
            id: id.to_string(),
            success: true,
        })
    }
}

impl SyncQueue {
    pub fn new(client: Box<dyn SyncClient>) -> Self {
        SyncQueue {
            client,
            pending: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, op: SyncOp) {
        tracing::debug!(kind = %op.kind(), id = op.id(), "queued sync");
        self.pending.push_back(op);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn client(&self) -> &dyn SyncClient {
        self.client.as_ref()
    }

    /// Runs every queued call in order.
    pub fn pump(&mut self) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::with_capacity(self.pending.len());
        while let Some(op) = self.pending.pop_front() {
            let kind = op.kind();
            let id = op.id().to_string();
            let result = match &op {
                SyncOp::Create(note) => self.client.create(note).map(|_| ()),
                SyncOp::Update(note) => self.client.update(note).map(|_| ()),
                SyncOp::Delete(id) => self.client.delete(id).and_then(|ack| {
                    if ack.success {
                        Ok(())
                    } else {
                        Err(SyncError::DeleteRefused(ack.id))
                    }
                }),
            };
            if let Err(err) = &result {
                tracing::error!(%kind, %id, %err, "sync failed");
            }
            outcomes.push(SyncOutcome { kind, id, result });
        }
        outcomes
    }
}

#[cfg(test)]
pub use scripted::ScriptedSyncClient;
