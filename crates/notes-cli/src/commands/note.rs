//! Note command handlers

use anyhow::{anyhow, bail, Context, Result};

use notes_core::{NewNote, Note, NotePage, NotePatch, NoteStore};

use crate::editor::{confirm, edit_text, is_interactive, prompt_with_default};
use crate::output::{Output, OutputFormat};

/// Create a new note
pub fn create(
    store: &NoteStore,
    title: String,
    content: Option<String>,
    output: &Output,
) -> Result<()> {
    let content = match content {
        Some(c) => c,
        None if is_interactive() => edit_text("")
            .context("Failed to edit note")?
            .trim()
            .to_string(),
        None => String::new(),
    };

    let note = store
        .create(NewNote::new(title, content))
        .context("Failed to create note")?;

    report(output, &format!("Created note {}", note.id), &note);
    Ok(())
}

/// List one page of notes, newest first
pub fn list(store: &NoteStore, page: u64, per_page: u64, output: &Output) -> Result<()> {
    let page = usize::try_from(page).unwrap_or(usize::MAX);
    let per_page = usize::try_from(per_page).unwrap_or(usize::MAX);
    let skip = page.saturating_sub(1).saturating_mul(per_page);

    let (notes, total) = store.list(skip, per_page);
    output.print_page(&NotePage {
        notes,
        total,
        page,
        per_page,
    });
    Ok(())
}

/// Show a single note
pub fn show(store: &NoteStore, id: u64, output: &Output) -> Result<()> {
    let note = find(store, id)?;
    output.print_note(&note);
    Ok(())
}

/// Edit a note
///
/// Only the fields given on the command line change. With no fields and a
/// terminal attached, prompts for the title and opens the editor for content.
pub fn edit(
    store: &NoteStore,
    id: u64,
    title: Option<String>,
    content: Option<String>,
    output: &Output,
) -> Result<()> {
    let patch = if title.is_none() && content.is_none() && is_interactive() {
        prompt_patch(&find(store, id)?)?
    } else {
        NotePatch { title, content }
    };

    if patch.is_empty() {
        let note = find(store, id)?;
        report(output, "No changes", &note);
        return Ok(());
    }

    let note = store
        .update(id, patch)
        .context("Failed to update note")?
        .ok_or_else(|| anyhow!("Note not found: {}", id))?;

    report(output, "Note updated", &note);
    Ok(())
}

/// Delete a note
pub fn delete(store: &NoteStore, id: u64, yes: bool, output: &Output) -> Result<()> {
    let note = find(store, id)?;

    if !yes && output.should_prompt() {
        println!("Delete note: {} - {}", note.id, note.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if !store.delete(id).context("Failed to delete note")? {
        bail!("Note not found: {}", id);
    }

    output.success(&format!("Deleted note: {}", id));
    Ok(())
}

/// Search notes by title or content
pub fn search(store: &NoteStore, query: String, output: &Output) -> Result<()> {
    if query.trim().is_empty() {
        bail!("Search query must not be empty");
    }

    let notes = store.search(&query);
    output.print_notes(&notes);
    Ok(())
}

fn find(store: &NoteStore, id: u64) -> Result<Note> {
    store
        .get(id)
        .ok_or_else(|| anyhow!("Note not found: {}", id))
}

/// Success line for humans, then the note in the selected format
fn report(output: &Output, message: &str, note: &Note) {
    if output.format == OutputFormat::Human {
        output.success(message);
    }
    output.print_note(note);
}

/// Ask for a new title and content, keeping what the user leaves alone
fn prompt_patch(note: &Note) -> Result<NotePatch> {
    println!("Editing note: {}", note.id);
    println!("Press Enter to keep the current title.\n");

    let title = prompt_with_default("Title", &note.title)?;

    let edited = edit_text(&note.content).context("Failed to edit note")?;
    let edited = edited.trim_end();
    let content = (edited != note.content.trim_end()).then(|| edited.to_string());

    Ok(NotePatch { title, content })
}
