use crate::config::Settings;
use crate::model::{color_label, ColorTag, Note, NoteDraft};
use crate::notebook::Notebook;
use crate::storage::{FileBackend, NoteStore};
use crate::sync::{StubSyncClient, SyncQueue};
use crate::ui;
use anyhow::{Context, Result};

pub fn list(settings: &Settings) -> Result<()> {
    let book = open_notebook(settings);
    let notes = book.notes();
    if notes.is_empty() {
        println!("No notes yet. Add one with `notecards add <title>`.");
        return Ok(());
    }
    for note in &notes {
        print_note(note);
    }
    Ok(())
}

pub fn add(
    settings: &Settings,
    title: String,
    content: Option<String>,
    color: Option<String>,
) -> Result<()> {
    let mut book = open_notebook(settings);
    let color = ColorTag::parse(color.as_deref().unwrap_or_default())?;
    let draft = NoteDraft::new(&title, content.unwrap_or_default(), color)?;
    let note = book.create(draft)?;
    finish(&mut book);
    println!("Added note {}", note.id);
    Ok(())
}

pub fn edit(
    settings: &Settings,
    note_id: String,
    title: Option<String>,
    content: Option<String>,
    color: Option<String>,
    clear_color: bool,
) -> Result<()> {
    let mut book = open_notebook(settings);
    let current = book
        .get(&note_id)
        .cloned()
        .with_context(|| format!("note {} not found", note_id))?;
    let color = match (color, clear_color) {
        (_, true) => None,
        (Some(raw), false) => ColorTag::parse(&raw)?,
        (None, false) => current.color_tag_value,
    };
    let draft = NoteDraft::new(
        title.as_deref().unwrap_or(&current.title),
        content.unwrap_or(current.content),
        color,
    )?;
    book.update(&note_id, draft)?;
    finish(&mut book);
    println!("Updated note {}", note_id);
    Ok(())
}

pub fn delete(settings: &Settings, note_id: String) -> Result<()> {
    let mut book = open_notebook(settings);
    let result = book.delete(&note_id);
    finish(&mut book);
    result.with_context(|| format!("deleting {}", note_id))?;
    println!("Deleted note {}", note_id);
    Ok(())
}

pub fn colors() -> Result<()> {
    println!("  {:<16} {}", "no-color", color_label(None));
    for tag in ColorTag::ALL {
        println!("  {:<16} {}", tag.value(), tag.label());
    }
    Ok(())
}

pub fn tui(settings: &Settings) -> Result<()> {
    let book = open_notebook(settings);
    ui::run(book, settings)
}

fn open_notebook(settings: &Settings) -> Notebook {
    let store = NoteStore::open(Box::new(FileBackend::new(&settings.store_dir)));
    let sync = SyncQueue::new(Box::new(StubSyncClient::new(settings.offline)));
    Notebook::new(store, sync)
}

/// Runs the queued remote calls and reports every notification they produced.
fn finish(book: &mut Notebook) {
    book.pump_sync();
    for toast in book.toasts.drain() {
        if toast.is_error() {
            eprintln!("{}: {}", toast.title, toast.description);
        } else {
            println!("{}: {}", toast.title, toast.description);
        }
    }
}

fn print_note(note: &Note) {
    println!("- {}: {}", note.id, note.title);
    let color = note
        .color_tag_value
        .map(|c| format!("  [{}]", c.value()))
        .unwrap_or_default();
    println!("    updated {}{}", note.updated_label(), color);
    for line in note.content.lines().take(3) {
        println!("    {}", line);
    }
}
