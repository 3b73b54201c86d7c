//! Nickname equivalence index
//!
//! Bidirectional equivalence map between given-name tokens ("douglas" ↔
//! "doug"), built once from a static nickname table and read-only afterwards,
//! so it is safe for concurrent access across evaluation threads.
//!
//! Loaded from `config/nicknames.yaml`. A `NICKNAME_CONFIG_DIR` env var may
//! point at a directory containing an override table; otherwise the table
//! shipped with the crate is used.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

/// Table shipped with the crate; used when no override is configured.
const BUILTIN_TABLE: &str = include_str!("../../config/nicknames.yaml");

/// Global index instance (lazy-loaded).
static NICKNAME_INDEX: OnceLock<Arc<NicknameIndex>> = OnceLock::new();

/// Get the global nickname index (loads on first access).
pub fn nickname_index() -> Arc<NicknameIndex> {
    NICKNAME_INDEX
        .get_or_init(|| {
            let table = load_table_from_config().unwrap_or_else(|e| {
                tracing::warn!("Failed to load nickname table: {}, using built-in", e);
                NicknameTable::default()
            });
            Arc::new(NicknameIndex::from_table(table))
        })
        .clone()
}

/// Load the nickname table, honoring the `NICKNAME_CONFIG_DIR` override.
fn load_table_from_config() -> anyhow::Result<NicknameTable> {
    let content = match std::env::var("NICKNAME_CONFIG_DIR") {
        Ok(dir) => {
            let path = format!("{}/nicknames.yaml", dir);
            std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("Failed to read nickname table {}: {}", path, e))?
        }
        Err(_) => BUILTIN_TABLE.to_string(),
    };

    let table: NicknameTable = serde_yaml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse nickname table YAML: {}", e))?;

    tracing::info!(names = table.names.len(), "Loaded nickname table");

    Ok(table)
}

/// On-disk shape of the nickname table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NicknameTable {
    #[serde(default)]
    pub version: u32,
    /// canonical name → informal variants
    #[serde(default)]
    pub names: HashMap<String, Vec<String>>,
}

/// Bidirectional nickname equivalence index.
///
/// Every token in a table row (the canonical form and each alias) maps to the
/// full equivalence group, so lookups are symmetric: if `b ∈ variants(a)`
/// then `a ∈ variants(b)`.
#[derive(Debug, Clone, Default)]
pub struct NicknameIndex {
    groups: HashMap<String, BTreeSet<String>>,
}

impl NicknameIndex {
    /// Build the symmetric closure from a table.
    pub fn from_table(table: NicknameTable) -> Self {
        let mut groups: HashMap<String, BTreeSet<String>> = HashMap::new();

        for (canonical, aliases) in &table.names {
            let mut group: BTreeSet<String> = BTreeSet::new();
            group.insert(canonical.trim().to_lowercase());
            for alias in aliases {
                group.insert(alias.trim().to_lowercase());
            }

            for member in &group {
                groups
                    .entry(member.clone())
                    .or_default()
                    .extend(group.iter().cloned());
            }
        }

        Self { groups }
    }

    /// Convenience constructor for tests and embedding callers.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a [&'a str])>) -> Self {
        let names = pairs
            .into_iter()
            .map(|(canonical, aliases)| {
                (
                    canonical.to_string(),
                    aliases.iter().map(|a| a.to_string()).collect(),
                )
            })
            .collect();
        Self::from_table(NicknameTable { version: 0, names })
    }

    /// All equivalent forms of a token, lower-cased, always including the
    /// token itself. Unknown tokens yield a singleton set; absence from the
    /// table is not an error.
    pub fn variants(&self, token: &str) -> BTreeSet<String> {
        let key = token.trim().to_lowercase();
        match self.groups.get(&key) {
            Some(group) => group.clone(),
            None => {
                let mut singleton = BTreeSet::new();
                singleton.insert(key);
                singleton
            }
        }
    }

    /// Case-insensitive equivalence test.
    pub fn are_equivalent(&self, a: &str, b: &str) -> bool {
        self.variants(a).contains(&b.trim().to_lowercase())
    }

    /// Number of distinct tokens in the index.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
