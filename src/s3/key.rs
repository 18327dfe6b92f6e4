use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::fmt;
use std::path::Path;
use tracing::warn;
use uuid::Uuid;

/// Characters escaped in tag values. Path separators and dots stay readable.
const TAG_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'=')
    .add(b'?');

// S3 tag value limit
const MAX_TAG_VALUE_LEN: usize = 256;

/// Object key under which an upload is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tags attached to an uploaded object, in S3 `Tagging` query form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    real_name: String,
    original_path: String,
}

impl TagSet {
    /// Tag pairs in the order they are sent
    pub fn pairs(&self) -> [(&'static str, &str); 2] {
        [
            ("RealName", self.real_name.as_str()),
            ("OriginalPath", self.original_path.as_str()),
        ]
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs().into_iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", key, utf8_percent_encode(value, TAG_VALUE))?;
        }
        Ok(())
    }
}

/// Base name of a path, if it has one
pub fn base_name(local_path: &Path) -> Option<String> {
    local_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Extension of a file name, leading dot included
///
/// Everything from the last `.` to the end, so `archive.tar.gz` gives `.gz`
/// and `.bashrc` gives `.bashrc`. Empty when there is no dot.
pub fn extension_of(file_name: &str) -> &str {
    file_name.rfind('.').map_or("", |idx| &file_name[idx..])
}

/// Build a fresh object key: `prefix` + random v4 UUID + original extension
///
/// The file itself is never read.
pub fn derive_key(prefix: &str, local_path: &Path) -> StorageKey {
    let name = base_name(local_path).unwrap_or_default();
    StorageKey(format!(
        "{}{}{}",
        prefix,
        Uuid::new_v4(),
        extension_of(&name)
    ))
}

/// Build the `RealName` / `OriginalPath` tags for a path
pub fn derive_tags(local_path: &Path) -> TagSet {
    let tags = TagSet {
        real_name: base_name(local_path).unwrap_or_default(),
        original_path: local_path.to_string_lossy().into_owned(),
    };

    for (key, value) in tags.pairs() {
        if value.chars().count() > MAX_TAG_VALUE_LEN {
            warn!(
                "Tag {} is {} chars long, S3 may reject it (max: {})",
                key,
                value.chars().count(),
                MAX_TAG_VALUE_LEN
            );
        }
    }

    tags
}
