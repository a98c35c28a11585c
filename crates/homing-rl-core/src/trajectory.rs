//! Episode paths: the ordered record of what the agent did

use std::fmt;
use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{persist, Action, RLError};

/// Persisted name of the obstacle-evasion marker
pub const OBSTACLE_SENTINEL: &str = "OBS";

/// One step of an episode path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathEntry {
    /// A regular committed action
    Action(Action),
    /// The fixed evasive maneuver forced by the obstacle guard
    ObstacleEvasion,
}

impl PathEntry {
    /// Persisted name of this entry
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PathEntry::Action(action) => action.name(),
            PathEntry::ObstacleEvasion => OBSTACLE_SENTINEL,
        }
    }

    /// Parse the entry at `index` of a persisted path
    pub fn parse(index: usize, text: &str) -> crate::Result<Self> {
        if text == OBSTACLE_SENTINEL {
            return Ok(PathEntry::ObstacleEvasion);
        }
        text.parse::<Action>()
            .map(PathEntry::Action)
            .map_err(|_| RLError::InvalidPathFormat {
                index,
                entry: text.to_string(),
            })
    }

    /// Parse the raw JSON entry at `index`; anything but a known name is rejected
    pub fn from_json(index: usize, value: &Value) -> crate::Result<Self> {
        match value {
            Value::String(text) => Self::parse(index, text),
            other => Err(RLError::InvalidPathFormat {
                index,
                entry: other.to_string(),
            }),
        }
    }
}

impl From<Action> for PathEntry {
    fn from(action: Action) -> Self {
        PathEntry::Action(action)
    }
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for PathEntry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for PathEntry {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        PathEntry::parse(0, &text).map_err(serde::de::Error::custom)
    }
}

/// Ordered sequence of path entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathEntry>);

impl Path {
    /// Create an empty path
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an entry
    pub fn push(&mut self, entry: impl Into<PathEntry>) {
        self.0.push(entry.into());
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Entries in order
    #[must_use]
    pub fn entries(&self) -> &[PathEntry] {
        &self.0
    }

    /// Iterate over the entries
    pub fn iter(&self) -> std::slice::Iter<'_, PathEntry> {
        self.0.iter()
    }

    /// Number of obstacle evasions recorded
    #[must_use]
    pub fn evasions(&self) -> usize {
        self.0
            .iter()
            .filter(|e| matches!(e, PathEntry::ObstacleEvasion))
            .count()
    }

    /// Write the path as a JSON array of entry names
    pub async fn save(&self, file: &FsPath) -> crate::Result<()> {
        persist::write_json_atomic(file, self, true).await
    }

    /// Read the raw entries of a persisted path, `None` if the file is absent.
    ///
    /// Entries are left unchecked; a document that is not an array fails
    /// with [`RLError::InvalidPathFormat`] at index 0.
    pub async fn load_raw(file: &FsPath) -> crate::Result<Option<Vec<Value>>> {
        match persist::read_json_if_exists(file).await? {
            None => Ok(None),
            Some(Value::Array(entries)) => Ok(Some(entries)),
            Some(other) => Err(RLError::InvalidPathFormat {
                index: 0,
                entry: other.to_string(),
            }),
        }
    }

    /// Read and validate a persisted path, `None` if the file is absent
    pub async fn load(file: &FsPath) -> crate::Result<Option<Self>> {
        let Some(raw) = Self::load_raw(file).await? else {
            return Ok(None);
        };
        raw.iter()
            .enumerate()
            .map(|(index, value)| PathEntry::from_json(index, value))
            .collect::<crate::Result<Vec<_>>>()
            .map(|entries| Some(Self(entries)))
    }
}

impl FromIterator<PathEntry> for Path {
    fn from_iter<I: IntoIterator<Item = PathEntry>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathEntry;
    type IntoIter = std::slice::Iter<'a, PathEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_distinct_from_actions() {
        assert!(Action::ALL.iter().all(|a| a.name() != OBSTACLE_SENTINEL));
        assert_eq!(PathEntry::parse(0, "OBS").unwrap(), PathEntry::ObstacleEvasion);
        assert_eq!(PathEntry::parse(0, "L").unwrap(), PathEntry::Action(Action::Left));
    }

    #[test]
    fn test_unknown_entry_reports_index() {
        let err = PathEntry::parse(4, "X").unwrap_err();
        assert!(matches!(err, RLError::InvalidPathFormat { index: 4, ref entry } if entry == "X"));
    }

    #[test]
    fn test_serializes_as_names() {
        let path: Path = [
            PathEntry::Action(Action::Forward),
            PathEntry::ObstacleEvasion,
            PathEntry::Action(Action::Backward),
        ]
        .into_iter()
        .collect();
        assert_eq!(serde_json::to_string(&path).unwrap(), r#"["F","OBS","B"]"#);
        assert_eq!(path.evasions(), 1);
    }

    #[tokio::test]
    async fn test_load_validates_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("learned_path.json");
        std::fs::write(&file, r#"["F", "L", "jump"]"#).unwrap();

        let err = Path::load(&file).await.unwrap_err();
        assert!(matches!(err, RLError::InvalidPathFormat { index: 2, .. }));
        assert!(Path::load(&dir.path().join("absent.json")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_string_entries_are_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("learned_path.json");
        std::fs::write(&file, r#"["F", 3, "L"]"#).unwrap();

        let err = Path::load(&file).await.unwrap_err();
        assert!(matches!(err, RLError::InvalidPathFormat { index: 1, ref entry } if entry == "3"));

        std::fs::write(&file, r#"{"path": ["F"]}"#).unwrap();
        let err = Path::load_raw(&file).await.unwrap_err();
        assert!(matches!(err, RLError::InvalidPathFormat { index: 0, .. }));
    }
}
