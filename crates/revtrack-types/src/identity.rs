use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Stable identity of a tracked document.
///
/// A `DocumentId` is the document's logical path, normalized so that the same
/// file always maps to the same key: separators are `/`, there is no leading
/// `/` or `./`, and empty or `.` segments are dropped. Paths that climb out of
/// their root with `..` are rejected.
///
/// The identity is derived from the path alone. Renaming a document produces
/// a new identity.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId {
    path: String,
}

impl DocumentId {
    /// Normalize and validate a logical path.
    pub fn new(path: impl AsRef<str>) -> Result<Self, TypeError> {
        let raw = path.as_ref();
        let replaced = raw.replace('\\', "/");
        let mut segments = Vec::new();
        for segment in replaced.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(TypeError::InvalidPath {
                        path: raw.to_string(),
                        reason: "parent segments are not allowed".into(),
                    })
                }
                s => segments.push(s),
            }
        }
        if segments.is_empty() {
            return Err(TypeError::InvalidPath {
                path: raw.to_string(),
                reason: "path is empty".into(),
            });
        }
        Ok(Self {
            path: segments.join("/"),
        })
    }

    /// The normalized path.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// The final path segment.
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.path)
    }

    /// The directory part of the path, or `None` for documents at the root.
    pub fn parent(&self) -> Option<&str> {
        self.path.rsplit_once('/').map(|(dir, _)| dir)
    }

    /// The path with `suffix` appended to the file name.
    pub fn with_suffix(&self, suffix: &str) -> String {
        format!("{}{}", self.path, suffix)
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.path)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for DocumentId {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.path
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.path
    }
}
