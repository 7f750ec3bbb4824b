use crate::model::{Note, NoteDraft, NoteError};
use crate::notify::Toasts;
use crate::storage::{NoteStore, StoreError};
use crate::sync::{SyncKind, SyncOp, SyncOutcome, SyncQueue};
use anyhow::{Context, Result};

/// Local-first note operations: the store is written first, the remote mirror is queued
/// behind it and user-facing notifications are collected in `toasts`.
pub struct Notebook {
    store: NoteStore,
    sync: SyncQueue,
    pub toasts: Toasts,
}

impl Notebook {
    pub fn new(store: NoteStore, sync: SyncQueue) -> Self {
        Notebook {
            store,
            sync,
            toasts: Toasts::default(),
        }
    }

    pub fn notes(&self) -> Vec<Note> {
        self.store.list()
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.store.get(id)
    }

    pub fn sync(&self) -> &SyncQueue {
        &self.sync
    }

    pub fn create(&mut self, draft: NoteDraft) -> Result<Note> {
        let note = Note::new(draft);
        self.store
            .save(note.clone())
            .with_context(|| format!("saving note {}", note.id))?;
        tracing::info!(id = %note.id, "created note");
        self.toasts
            .info("Note created", format!("\"{}\" was created.", note.title));
        self.sync.enqueue(SyncOp::Create(note.clone()));
        Ok(note)
    }

    pub fn update(&mut self, id: &str, draft: NoteDraft) -> Result<Note> {
        let mut note = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| NoteError::NotFound(id.to_string()))?;
        note.apply(draft);
        self.store
            .save(note.clone())
            .with_context(|| format!("saving note {}", id))?;
        tracing::info!(id, updated_at = note.updated_at, "updated note");
        self.toasts
            .info("Note updated", format!("\"{}\" was updated.", note.title));
        self.sync.enqueue(SyncOp::Update(note.clone()));
        Ok(note)
    }

    /// Removes a note. A missing id changes nothing and raises an error toast.
    pub fn delete(&mut self, id: &str) -> Result<Note> {
        match self.store.remove(id) {
            Ok(note) => {
                tracing::info!(id, "deleted note");
                self.toasts
                    .destructive("Note deleted", format!("\"{}\" was deleted.", note.title));
                self.sync.enqueue(SyncOp::Delete(note.id.clone()));
                Ok(note)
            }
            Err(StoreError::NotFound(_)) => {
                tracing::warn!(id, "delete requested for unknown note");
                self.toasts
                    .destructive("Error", "Note not found for deletion.");
                Err(NoteError::NotFound(id.to_string()).into())
            }
            Err(err) => Err(err).with_context(|| format!("deleting note {}", id)),
        }
    }

    /// Runs queued remote calls. Failures become toasts; local state is left as is.
    pub fn pump_sync(&mut self) -> Vec<SyncOutcome> {
        let outcomes = self.sync.pump();
        for outcome in outcomes.iter().filter(|o| o.result.is_err()) {
            let description = match outcome.kind {
                SyncKind::Create => "Could not create the note on the server.",
                SyncKind::Update => "Could not update the note on the server.",
                SyncKind::Delete => "Could not delete the note on the server.",
            };
            self.toasts.destructive("Sync error", description);
        }
        outcomes
    }

    pub fn reload_external(&mut self) -> bool {
        self.store.poll_external()
    }
}
