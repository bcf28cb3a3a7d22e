//! Emoji removal for local text files
//!
//! Strips a fixed list of glyphs plus anything left in the supplementary
//! planes, and rewrites a file only when its content changed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Glyphs removed before the supplementary-plane sweep.
///
/// Several of these live in the BMP or carry a variation selector, so the
/// regex alone would not catch them.
pub const EMOJIS: &[&str] = &[
    "🚀", "📋", "✅", "❌", "ℹ️", "⏳", "📦", "📝", "🔧", "📌",
    "🪵", "🔍", "📈", "📊", "🐍", "🔨", "✓", "⚠️", "🧪", "🧹",
    "🎉", "🔗", "📁", "🎯", "🆘", "🎨", "📚", "⚙️", "🏗️", "📄",
    "🧠", "💡", "🌟", "🔥", "💻", "🚧", "📣", "👍", "👎", "🙏",
    "🤔", "😊", "😢", "😎", "😡", "🎊", "🎈", "🎁", "🏆", "✨",
];

/// Files cleaned when none are named explicitly
pub const DEFAULT_FILES: &[&str] = &[
    "deploy.sh",
    "cleanup.sh",
    "README.md",
    "QUICKSTART.md",
    "PROJECT-SUMMARY.md",
    "TESTING-GUIDE.md",
    "src/main.rs",
];

static SUPPLEMENTARY_PLANE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{10000}-\x{10FFFF}]").expect("valid supplementary-plane pattern")
});

/// Errors while cleaning one file
#[derive(Debug, Error)]
pub enum EmojiError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Remove emoji from `text`
pub fn strip_emojis(text: &str) -> String {
    let mut current = text.to_string();
    // Either removal step can splice two fragments into a listed glyph
    loop {
        let listed = EMOJIS
            .iter()
            .fold(current.clone(), |acc, emoji| acc.replace(emoji, ""));
        let next = SUPPLEMENTARY_PLANE.replace_all(&listed, "").into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Clean one file in place. Returns whether it was rewritten.
pub fn clean_file(path: &Path) -> Result<bool, EmojiError> {
    let content = fs::read_to_string(path).map_err(|source| EmojiError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let cleaned = strip_emojis(&content);
    if cleaned == content {
        return Ok(false);
    }

    fs::write(path, cleaned).map_err(|source| EmojiError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// Outcome for one requested file
#[derive(Debug)]
pub enum FileOutcome {
    Cleaned,
    Unchanged,
    NotFound,
    Failed(EmojiError),
}

/// Per-file results of a cleaning run
#[derive(Debug, Default)]
pub struct CleanReport {
    pub files: Vec<(PathBuf, FileOutcome)>,
}

impl CleanReport {
    pub fn cleaned_count(&self) -> usize {
        self.files
            .iter()
            .filter(|(_, outcome)| matches!(outcome, FileOutcome::Cleaned))
            .count()
    }
}

/// Clean each of `names`, resolved against `base_dir`.
///
/// A failure on one file is logged and recorded; the rest are still processed.
pub fn clean_files<S: AsRef<str>>(base_dir: &Path, names: &[S]) -> CleanReport {
    let mut report = CleanReport::default();

    for name in names {
        let path = base_dir.join(name.as_ref());
        let outcome = if !path.exists() {
            FileOutcome::NotFound
        } else {
            match clean_file(&path) {
                Ok(true) => FileOutcome::Cleaned,
                Ok(false) => FileOutcome::Unchanged,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Error processing file");
                    FileOutcome::Failed(e)
                }
            }
        };
        report.files.push((path, outcome));
    }

    report
}
