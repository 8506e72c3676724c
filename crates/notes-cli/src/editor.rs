//! Terminal interaction: `$EDITOR` round trips and line prompts

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Editors tried, in order, when neither $EDITOR nor $VISUAL is set
const FALLBACK_EDITORS: [&str; 4] = ["nano", "vim", "vi", "notepad"];

/// Whether stdin is attached to a terminal
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Let the user edit `initial` in their editor and return the result
pub fn edit_text(initial: &str) -> Result<String> {
    let editor = resolve_editor()?;
    let scratch = ScratchFile::create(initial)?;

    let status = Command::new(&editor)
        .arg(&scratch.path)
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;
    if !status.success() {
        bail!("Editor '{}' exited with {}", editor, status);
    }

    fs::read_to_string(&scratch.path)
        .with_context(|| format!("Failed to read edited note: {:?}", scratch.path))
}

/// Temp file holding the text being edited, removed on drop
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    fn create(content: &str) -> Result<Self> {
        let path = env::temp_dir().join(format!("notes-{}.md", std::process::id()));
        fs::write(&path, content)
            .with_context(|| format!("Failed to create temp file: {:?}", path))?;
        Ok(Self { path })
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn resolve_editor() -> Result<String> {
    let configured = ["EDITOR", "VISUAL"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.trim().is_empty());
    if let Some(editor) = configured {
        return Ok(editor);
    }

    match FALLBACK_EDITORS.iter().find(|cmd| on_path(cmd)) {
        Some(editor) => Ok(editor.to_string()),
        None => bail!("No editor found. Set $EDITOR, or pass the text with --content"),
    }
}

fn on_path(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .is_ok_and(|out| out.status.success())
}

/// Ask a yes/no question, defaulting to no
///
/// Always answers no without a terminal.
pub fn confirm(question: &str) -> Result<bool> {
    if !is_interactive() {
        return Ok(false);
    }
    let answer = ask(&format!("{} [y/N] ", question))?.to_lowercase();
    Ok(matches!(answer.as_str(), "y" | "yes"))
}

/// Ask for a value, `None` when the user just presses Enter
pub fn prompt_with_default(label: &str, current: &str) -> Result<Option<String>> {
    let prompt = if current.is_empty() {
        format!("{}: ", label)
    } else {
        format!("{} [{}]: ", label, current)
    };
    let answer = ask(&prompt)?;
    Ok((!answer.is_empty()).then_some(answer))
}

fn ask(prompt: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", prompt)?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
