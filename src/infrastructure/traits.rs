//! Seams between chart logic and the outside world.
//!
//! `FileSystem` backs the JSON chart store, import/export and `config init`;
//! `Selector` picks a node when a command is run without a node id. Tests
//! swap in recording or scripted implementations.

use std::io;
use std::path::Path;

/// File operations used for chart records, exports and the config file.
pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Create or truncate `path`.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Make sure the directory that will hold `path` exists.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;

    /// Write `<path>.tmp`, then rename it over `path`. A crash leaves either
    /// the old record or the new one, never half a chart.
    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()> {
        self.ensure_parent(path)?;
        let staged = path.with_extension("tmp");
        self.write(&staged, content)?;
        self.rename(&staged, path)
    }
}

/// One pickable line: what the user sees and the id handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    /// e.g. `Bob (CTO) [3f2c...]`
    pub display: String,
    /// Node id
    pub value: String,
}

/// Interactive picker over a flat list of nodes.
pub trait Selector: Send + Sync {
    /// `Ok(None)` means the user backed out; the command aborts without changes.
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String>;
}

// ============================================================
// std / terminal backed implementations
// ============================================================

/// `std::fs` passthrough.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => self.create_dir_all(dir),
            _ => Ok(()),
        }
    }
}

/// Fuzzy node picker drawn with skim in the lower half of the terminal.
#[derive(Debug, Default)]
pub struct SkimSelector;

impl Selector for SkimSelector {
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String> {
        use skim::prelude::*;
        use std::io::Cursor;

        if items.is_empty() {
            return Ok(None);
        }

        let options = SkimOptionsBuilder::default()
            .prompt(Some(prompt))
            .height(Some("50%"))
            .multi(false)
            .build()
            .map_err(|e| format!("skim options: {e}"))?;

        let lines: Vec<&str> = items.iter().map(|item| item.display.as_str()).collect();
        let source = SkimItemReader::default().of_bufread(Cursor::new(lines.join("\n")));

        let Some(out) = Skim::run_with(&options, Some(source)) else {
            return Ok(None);
        };
        if out.is_abort {
            return Ok(None);
        }

        // Display lines carry the node id, so the text maps back to one item
        let picked = out.selected_items.first().map(|line| line.output().to_string());
        Ok(picked.and_then(|text| items.iter().find(|item| item.display == text).cloned()))
    }
}
