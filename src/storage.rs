use crate::model::{sort_for_display, Note};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Key of the single entry holding every note.
pub const STORAGE_KEY: &str = "evernote-lite-notes";

pub trait Backend {
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> io::Result<()>;
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("note not found: {0}")]
    NotFound(String),
    #[error("encoding notes: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("writing notes: {0}")]
    Io(#[from] io::Error),
}

pub struct NoteStore {
    backend: Box<dyn Backend>,
    notes: Vec<Note>,
    last_raw: Option<String>,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileBackend { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Backend for FileBackend {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)
    }
}

impl NoteStore {
    /// Loads the persisted collection. Unreadable or malformed data yields an empty store.
    pub fn open(backend: Box<dyn Backend>) -> Self {
        let raw = match backend.read(STORAGE_KEY) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key = STORAGE_KEY, %err, "could not read notes, starting empty");
                None
            }
        };
        let notes = raw.as_deref().map(parse_notes).unwrap_or_default();
        tracing::debug!(count = notes.len(), "loaded notes");
        NoteStore {
            backend,
            notes,
            last_raw: raw,
        }
    }

    /// Notes in display order.
    pub fn list(&self) -> Vec<Note> {
        let mut notes = self.notes.clone();
        sort_for_display(&mut notes);
        notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Upserts by id. New notes go to the front of the persisted sequence.
    /// Nothing changes in memory unless the write succeeds.
    pub fn save(&mut self, note: Note) -> Result<(), StoreError> {
        let mut next = self.notes.clone();
        match next.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => *existing = note,
            None => next.insert(0, note),
        }
        self.persist(next)
    }

    pub fn remove(&mut self, id: &str) -> Result<Note, StoreError> {
        let idx = self
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut next = self.notes.clone();
        let removed = next.remove(idx);
        self.persist(next)?;
        Ok(removed)
    }

    /// Picks up writes made by another session. Returns true only when the notes changed.
    pub fn poll_external(&mut self) -> bool {
        let raw = match self.backend.read(STORAGE_KEY) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key = STORAGE_KEY, %err, "could not poll notes");
                return false;
            }
        };
        if raw == self.last_raw {
            return false;
        }
        let incoming = raw.as_deref().map(parse_notes).unwrap_or_default();
        self.last_raw = raw;
        if incoming == self.notes {
            return false;
        }
        tracing::info!(count = incoming.len(), "notes changed in another session");
        self.notes = incoming;
        true
    }

    fn persist(&mut self, notes: Vec<Note>) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(&notes)?;
        if let Err(err) = self.backend.write(STORAGE_KEY, &serialized) {
            tracing::error!(key = STORAGE_KEY, %err, "writing notes failed, keeping previous state");
            return Err(err.into());
        }
        self.notes = notes;
        self.last_raw = Some(serialized);
        Ok(())
    }
}

fn parse_notes(raw: &str) -> Vec<Note> {
    match serde_json::from_str(raw) {
        Ok(notes) => notes,
        Err(err) => {
            tracing::warn!(key = STORAGE_KEY, %err, "stored notes are malformed, starting empty");
            Vec::new()
        }
    }
}

pub fn default_store_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "notecards").context("locating data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

#[cfg(test)]
pub use memory::MemoryBackend;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoteDraft;

    fn note(id: &str, title: &str, updated: i64) -> Note {
        Note {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            created_at: 1,
            updated_at: updated,
            color_tag_value: None,
        }
    }

    #[test]
    fn save_upserts_by_id() {
        let backend = MemoryBackend::default();
        let mut store = NoteStore::open(Box::new(backend.clone()));
        store.save(note("a", "first", 1)).unwrap();
        store.save(note("b", "second", 2)).unwrap();
        store.save(note("a", "renamed", 3)).unwrap();
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.get("a").unwrap().title, "renamed");

        let reopened = NoteStore::open(Box::new(backend));
        assert_eq!(reopened.get("a").unwrap().title, "renamed");
        assert_eq!(reopened.list().len(), 2);
    }

    #[test]
    fn remove_missing_leaves_entry_untouched() {
        let backend = MemoryBackend::default();
        let mut store = NoteStore::open(Box::new(backend.clone()));
        store.save(note("a", "keep", 1)).unwrap();
        let before = backend.raw(STORAGE_KEY);
        let err = store.remove("zzz").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "zzz"));
        assert_eq!(backend.raw(STORAGE_KEY), before);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn list_is_newest_first() {
        let mut store = NoteStore::open(Box::new(MemoryBackend::default()));
        store.save(note("old", "old", 10)).unwrap();
        store.save(note("new", "new", 30)).unwrap();
        store.save(note("mid", "mid", 20)).unwrap();
        let listed = store.list();
        for pair in listed.windows(2) {
            assert!(pair[0].updated_at >= pair[1].updated_at);
        }
        assert_eq!(listed[0].id, "new");
    }

    #[test]
    fn malformed_entry_opens_empty() {
        let backend = MemoryBackend::default();
        backend.put_raw(STORAGE_KEY, "{not json");
        let store = NoteStore::open(Box::new(backend));
        assert!(store.list().is_empty());
    }

    #[test]
    fn poll_reports_only_real_changes() {
        let backend = MemoryBackend::default();
        let mut ours = NoteStore::open(Box::new(backend.clone()));
        let mut theirs = NoteStore::open(Box::new(backend.clone()));

        assert!(!ours.poll_external());
        theirs.save(note("t", "from elsewhere", 5)).unwrap();
        assert!(ours.poll_external());
        assert_eq!(ours.get("t").unwrap().title, "from elsewhere");
        assert!(!ours.poll_external());

        // Same notes, different formatting: no change reported.
        let pretty = serde_json::to_string_pretty(&ours.notes).unwrap();
        backend.put_raw(STORAGE_KEY, &pretty);
        assert!(!ours.poll_external());
    }

    #[test]
    fn last_writer_wins() {
        let backend = MemoryBackend::default();
        let mut a = NoteStore::open(Box::new(backend.clone()));
        let mut b = NoteStore::open(Box::new(backend.clone()));
        a.save(note("x", "from a", 1)).unwrap();
        b.save(note("y", "from b", 2)).unwrap();
        let reopened = NoteStore::open(Box::new(backend));
        assert!(reopened.get("x").is_none());
        assert_eq!(reopened.get("y").unwrap().title, "from b");
    }

    #[test]
    fn file_backend_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested"));
        let mut store = NoteStore::open(Box::new(backend.clone()));
        let created = Note::new(NoteDraft::new("Persisted", "body", None).unwrap());
        store.save(created.clone()).unwrap();

        assert!(backend.path_for(STORAGE_KEY).exists());
        let reopened = NoteStore::open(Box::new(backend));
        assert_eq!(reopened.get(&created.id), Some(&created));
    }

    /// Accepts nothing; every write is refused.
    struct ReadOnlyBackend(MemoryBackend);

    impl Backend for ReadOnlyBackend {
        fn read(&self, key: &str) -> io::Result<Option<String>> {
            self.0.read(key)
        }

        fn write(&self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[test]
    fn failed_write_keeps_previous_notes() {
        let backend = MemoryBackend::default();
        NoteStore::open(Box::new(backend.clone()))
            .save(note("kept", "kept", 1))
            .unwrap();
        let before = backend.raw(STORAGE_KEY);
        let mut store = NoteStore::open(Box::new(ReadOnlyBackend(backend.clone())));

        let err = store.save(note("ghost", "Ghost", 2)).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(store.get("ghost").is_none());

        let err = store.remove("kept").unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.get("kept").unwrap().title, "kept");

        assert_eq!(backend.raw(STORAGE_KEY), before);
        assert!(!store.poll_external());
        assert_eq!(store.list().len(), 1);
    }
}
