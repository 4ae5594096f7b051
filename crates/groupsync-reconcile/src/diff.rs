//! Membership comparison keyed on display name.

use std::collections::{BTreeMap, BTreeSet};

use groupsync_entra::DirectoryMember;
use tracing::warn;

/// Source members indexed by display name.
///
/// Display names are not unique in Entra; the last member listed under a
/// repeated name wins.
#[derive(Debug, Clone, Default)]
pub struct SourceSnapshot {
    by_display_name: BTreeMap<String, String>,
}

impl SourceSnapshot {
    #[must_use]
    pub fn from_members(members: Vec<DirectoryMember>) -> Self {
        let mut by_display_name = BTreeMap::new();
        for member in members {
            if let Some(previous) =
                by_display_name.insert(member.display_name.clone(), member.principal_name.clone())
            {
                warn!(
                    display_name = %member.display_name,
                    dropped = %previous,
                    kept = %member.principal_name,
                    "Duplicate display name in source group"
                );
            }
        }
        Self { by_display_name }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_display_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_display_name.is_empty()
    }

    #[must_use]
    pub fn principal_for(&self, display_name: &str) -> Option<&str> {
        self.by_display_name.get(display_name).map(String::as_str)
    }

    pub fn display_names(&self) -> impl Iterator<Item = &str> {
        self.by_display_name.keys().map(String::as_str)
    }
}

/// Display names in `source` but not in `target`, sorted.
#[must_use]
pub fn missing_members(source: &SourceSnapshot, target: &[String]) -> BTreeSet<String> {
    let present: BTreeSet<&str> = target.iter().map(String::as_str).collect();
    source
        .display_names()
        .filter(|name| !present.contains(name))
        .map(str::to_string)
        .collect()
}
