//! Collision-free output filenames and fragment ids.
//!
//! Filenames are unique case-insensitively across the whole run, so the
//! output can be written to case-insensitive filesystems. Fragment ids are
//! unique per file.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

static NAMESPACE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(event|external|module|package):").expect("invalid namespace regex")
});

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/?*:|'"<>]"#).expect("invalid unsafe-char regex"));

static VARIATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\(.*\)$").expect("invalid variation regex"));

/// Default output file extension.
const FILE_EXTENSION: &str = ".html";

/// Hands out unique filenames and per-file fragment ids.
#[derive(Debug, Default)]
pub struct FilenameAllocator {
    /// Lowercased filename (without extension) to the name it was made for.
    files: HashMap<String, String>,
    /// Filename to the lowercased ids already used in it.
    ids: HashMap<String, HashSet<String>>,
}

impl FilenameAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a unique filename derived from `name`.
    ///
    /// Calling this twice with the same name yields two different files.
    pub fn unique_filename(&mut self, name: &str) -> String {
        let mut basename = sanitize(name);

        if basename.starts_with('_') {
            basename.insert(0, '-');
        }

        let mut key = basename.to_lowercase();
        while self.files.contains_key(&key) {
            basename.push('_');
            key = basename.to_lowercase();
        }
        self.files.insert(key, name.to_owned());

        basename + FILE_EXTENSION
    }

    /// Claim a fragment id that is unique within `filename`.
    pub fn unique_id(&mut self, filename: &str, id: &str) -> String {
        let mut id: String = id.chars().filter(|c| !c.is_whitespace()).collect();
        let used = self.ids.entry(filename.to_owned()).or_default();

        let mut key = id.to_lowercase();
        while used.contains(&key) {
            id.push('_');
            key = id.to_lowercase();
        }
        used.insert(key);

        id
    }

    /// Whether `name` was the source of some claimed filename.
    #[must_use]
    pub fn is_claimed_for(&self, name: &str) -> bool {
        self.files.values().any(|source| source == name)
    }
}

/// Turn a long name into a filesystem-safe basename.
fn sanitize(name: &str) -> String {
    let basename = NAMESPACE_PREFIX.replace(name, "$1-");
    let basename = UNSAFE_CHARS.replace_all(&basename, "_");
    let basename = basename.replace('~', "-").replace('#', "_");
    let basename = VARIATION.replace(&basename, "");

    let basename = basename
        .strip_prefix(['.', '-'])
        .unwrap_or(&basename)
        .to_owned();

    if basename.is_empty() {
        "_".to_owned()
    } else {
        basename
    }
}
