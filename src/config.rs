use crate::error::{NormalizeError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const GAMES_FILE: &str = "games_cleaned.json";
pub const GENRES_FILE: &str = "genres.json";
pub const TAGS_FILE: &str = "game_tags.json";
pub const DEFAULT_ID_FIELD: &str = "appid";

static DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("game_mechanics", "Game Mechanics"),
    ("game_balance", "Game Balance"),
    ("music", "Music"),
    ("story", "Story"),
    ("immersion", "Immersion"),
    ("user_interface", "User Interface"),
    ("usability", "Usability"),
    ("graphics", "Graphics"),
    ("community", "Community"),
    ("dlc", "DLC"),
    ("mods", "Mods"),
    ("content_volume", "Content Volume"),
    ("player_skill", "Player Skill"),
];

/// Maps a lower-cased alias spelling to its canonical display spelling.
///
/// Entries keep the order they were declared in so reports list them the
/// same way every run. Construction rejects tables where applying the
/// mapping twice would differ from applying it once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl AliasTable {
    pub fn from_pairs<I, A, C>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (A, C)>,
        A: AsRef<str>,
        C: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (alias, canonical) in pairs {
            let alias = alias.as_ref().to_lowercase();
            let canonical = canonical.into();
            if alias.is_empty() {
                return Err(NormalizeError::AliasTable("empty alias".to_string()));
            }
            if let Some(&i) = index.get(&alias) {
                let existing = &entries[i].1;
                if *existing != canonical {
                    return Err(NormalizeError::AliasTable(format!(
                        "alias '{}' maps to both '{}' and '{}'",
                        alias, existing, canonical
                    )));
                }
                continue;
            }
            index.insert(alias.clone(), entries.len());
            entries.push((alias, canonical));
        }

        // a canonical spelling must be a fixed point of the lookup
        for (_, canonical) in &entries {
            if let Some(&i) = index.get(&canonical.to_lowercase()) {
                let target = &entries[i].1;
                if target != canonical {
                    return Err(NormalizeError::AliasTable(format!(
                        "canonical '{}' would be rewritten again to '{}'",
                        canonical, target
                    )));
                }
            }
        }

        Ok(Self { entries, index })
    }

    /// Parses a JSON object of `"alias": "Canonical"` pairs.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| NormalizeError::AliasTable(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(NormalizeError::AliasTable(
                "expected a JSON object of alias -> canonical".to_string(),
            ));
        };

        let mut pairs = Vec::with_capacity(map.len());
        for (alias, canonical) in map {
            match canonical {
                Value::String(c) => pairs.push((alias, c)),
                other => {
                    return Err(NormalizeError::AliasTable(format!(
                        "alias '{}' has non-string value {}",
                        alias, other
                    )));
                }
            }
        }
        Self::from_pairs(pairs)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| NormalizeError::io(path, e))?;
        Self::from_json_str(&text)
    }

    /// Case-insensitive lookup; `None` when no alias matches.
    pub fn canonical(&self, key: &str) -> Option<&str> {
        self.index
            .get(&key.to_lowercase())
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(a, c)| (a.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        let entries: Vec<(String, String)> = DEFAULT_ALIASES
            .iter()
            .map(|(a, c)| (a.to_string(), c.to_string()))
            .collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (a, _))| (a.clone(), i))
            .collect();
        Self { entries, index }
    }
}

/// How the genre extractor treats a `genres` field of an unexpected type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum GenrePolicy {
    /// Treat the field (or element) as absent.
    #[default]
    Lenient,
    /// Abort with an error naming the record.
    Strict,
}

/// Locations of the three data files.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub data_dir: PathBuf,
    pub games: PathBuf,
    pub genres: PathBuf,
    pub tags: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            games: PathBuf::from(GAMES_FILE),
            genres: PathBuf::from(GENRES_FILE),
            tags: PathBuf::from(TAGS_FILE),
        }
    }

    pub fn games_path(&self) -> PathBuf {
        self.resolve(&self.games)
    }

    pub fn genres_path(&self) -> PathBuf {
        self.resolve(&self.genres)
    }

    pub fn tags_path(&self) -> PathBuf {
        self.resolve(&self.tags)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir.join(file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_idempotent() {
        let table = AliasTable::default();
        assert_eq!(table.len(), 13);
        // rebuilding through the validating constructor must succeed
        let rebuilt = AliasTable::from_pairs(table.iter()).unwrap();
        assert_eq!(rebuilt, table);
        for (_, canonical) in table.iter() {
            assert_eq!(table.canonical(canonical).unwrap_or(canonical), canonical);
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let table = AliasTable::default();
        assert_eq!(table.canonical("MUSIC"), Some("Music"));
        assert_eq!(table.canonical("Game_Mechanics"), Some("Game Mechanics"));
        assert_eq!(table.canonical("Soundtrack"), None);
    }

    #[test]
    fn alias_keys_are_lowercased() {
        let table = AliasTable::from_pairs([("Co_Op", "Co-op")]).unwrap();
        assert_eq!(table.iter().next(), Some(("co_op", "Co-op")));
        assert_eq!(table.canonical("co_op"), Some("Co-op"));
    }

    #[test]
    fn rejects_chained_aliases() {
        let err = AliasTable::from_pairs([("a", "B"), ("b", "C")]).unwrap_err();
        assert!(matches!(err, NormalizeError::AliasTable(_)));
    }

    #[test]
    fn rejects_conflicting_duplicates() {
        let err =
            AliasTable::from_pairs([("music", "Music"), ("MUSIC", "Soundtrack")]).unwrap_err();
        assert!(err.to_string().contains("maps to both"));
    }

    #[test]
    fn loads_from_json_object() {
        let table =
            AliasTable::from_json_str(r#"{"sfx": "Sound Effects", "dlc": "DLC"}"#).unwrap();
        let pairs: Vec<_> = table.iter().collect();
        assert_eq!(pairs, vec![("sfx", "Sound Effects"), ("dlc", "DLC")]);

        assert!(AliasTable::from_json_str(r#"["music"]"#).is_err());
        assert!(AliasTable::from_json_str(r#"{"music": 1}"#).is_err());
    }

    #[test]
    fn relative_paths_join_data_dir() {
        let mut paths = DataPaths::new("/data");
        assert_eq!(paths.games_path(), PathBuf::from("/data/games_cleaned.json"));
        paths.tags = PathBuf::from("/elsewhere/tags.json");
        assert_eq!(paths.tags_path(), PathBuf::from("/elsewhere/tags.json"));
    }
}
