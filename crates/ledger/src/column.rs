use crate::error::{LedgerError, Result};
use std::fmt;

/// A family of dynamic quantity columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnFamily {
    /// Order rounds (`lan1`, `lan2`, ...). Summed into the order total.
    Round,
    /// Stock already received (`hangDaLen1`, ...). Recorded, never summed.
    Arrived,
}

impl ColumnFamily {
    pub const ALL: [ColumnFamily; 2] = [ColumnFamily::Round, ColumnFamily::Arrived];

    /// Identifier prefix shared by every column of this family.
    pub fn prefix(self) -> &'static str {
        match self {
            ColumnFamily::Round => "lan",
            ColumnFamily::Arrived => "hangDaLen",
        }
    }

    /// Family a field name belongs to, judged by prefix alone.
    pub fn of(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|family| name.starts_with(family.prefix()))
    }

    /// Numeric suffix of `name`, if it belongs to this family and has one.
    pub fn suffix(self, name: &str) -> Option<u32> {
        name.strip_prefix(self.prefix())?.parse().ok()
    }

    /// Column heading for the column at `position` (0-based) in the registry.
    pub fn heading(self, position: usize) -> String {
        match self {
            ColumnFamily::Round => format!("Lần {}", position + 1),
            ColumnFamily::Arrived => format!("Hàng đã lên {}", position + 1),
        }
    }
}

impl fmt::Display for ColumnFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnFamily::Round => write!(f, "round"),
            ColumnFamily::Arrived => write!(f, "arrived"),
        }
    }
}

/// Ordered identifiers of the dynamic columns, one list per family.
///
/// Order is insertion order. The round list may be empty only when loaded
/// that way; removal never takes it below one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRegistry {
    rounds: Vec<String>,
    arrivals: Vec<String>,
}

impl Default for ColumnRegistry {
    fn default() -> Self {
        Self {
            rounds: vec!["lan1".to_string(), "lan2".to_string()],
            arrivals: Vec::new(),
        }
    }
}

impl ColumnRegistry {
    /// Build a registry from explicit identifier lists. Duplicates are dropped.
    pub fn new(rounds: Vec<String>, arrivals: Vec<String>) -> Self {
        Self {
            rounds: dedup(rounds),
            arrivals: dedup(arrivals),
        }
    }

    pub fn columns(&self, family: ColumnFamily) -> &[String] {
        match family {
            ColumnFamily::Round => &self.rounds,
            ColumnFamily::Arrived => &self.arrivals,
        }
    }

    fn columns_mut(&mut self, family: ColumnFamily) -> &mut Vec<String> {
        match family {
            ColumnFamily::Round => &mut self.rounds,
            ColumnFamily::Arrived => &mut self.arrivals,
        }
    }

    pub fn rounds(&self) -> &[String] {
        &self.rounds
    }

    pub fn arrivals(&self) -> &[String] {
        &self.arrivals
    }

    /// Family of a registered identifier, or `None` if it is not registered.
    pub fn family_of(&self, name: &str) -> Option<ColumnFamily> {
        ColumnFamily::ALL
            .into_iter()
            .find(|family| self.columns(*family).iter().any(|c| c == name))
    }

    /// Identifier the next `push` into `family` would create:
    /// the family prefix followed by one more than the largest numeric suffix.
    /// When the largest suffix is already `u32::MAX`, the lowest unused
    /// suffix is taken instead.
    pub fn next_identifier(&self, family: ColumnFamily) -> String {
        let taken: Vec<u32> = self
            .columns(family)
            .iter()
            .filter_map(|name| family.suffix(name))
            .collect();
        let next = match taken.iter().max() {
            None => 1,
            Some(max) => max
                .checked_add(1)
                .or_else(|| (1..=u32::MAX).find(|n| !taken.contains(n)))
                .unwrap_or(u32::MAX),
        };
        format!("{}{}", family.prefix(), next)
    }

    /// Append a fresh identifier to `family` and return it.
    pub fn push(&mut self, family: ColumnFamily) -> String {
        let name = self.next_identifier(family);
        self.columns_mut(family).push(name.clone());
        name
    }

    /// Register `name` under `family` if not already present.
    pub(crate) fn register(&mut self, family: ColumnFamily, name: &str) -> bool {
        let columns = self.columns_mut(family);
        if columns.iter().any(|c| c == name) {
            false
        } else {
            columns.push(name.to_string());
            true
        }
    }

    /// Remove `name` from `family`.
    ///
    /// The last round column cannot be removed; arrived columns have no floor.
    pub fn remove(&mut self, family: ColumnFamily, name: &str) -> Result<()> {
        let columns = self.columns_mut(family);
        let index = columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| LedgerError::UnknownColumn {
                name: name.to_string(),
            })?;

        if family == ColumnFamily::Round && columns.len() <= 1 {
            return Err(LedgerError::LastRoundColumn);
        }

        columns.remove(index);
        Ok(())
    }
}

fn dedup(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_next_identifier_on_empty_family() {
        let registry = ColumnRegistry::new(Vec::new(), Vec::new());
        assert_eq!(registry.next_identifier(ColumnFamily::Round), "lan1");
        assert_eq!(registry.next_identifier(ColumnFamily::Arrived), "hangDaLen1");
    }

    #[test]
    fn test_next_identifier_uses_max_suffix_not_count() {
        let registry = ColumnRegistry::new(names(&["lan1", "lan3"]), Vec::new());
        assert_eq!(registry.next_identifier(ColumnFamily::Round), "lan4");
    }

    #[test]
    fn test_next_identifier_ignores_unnumbered_names() {
        let registry = ColumnRegistry::new(names(&["lanExtra", "lan2"]), Vec::new());
        assert_eq!(registry.next_identifier(ColumnFamily::Round), "lan3");
    }

    #[test]
    fn test_next_identifier_at_suffix_limit_reuses_lowest_free() {
        let registry = ColumnRegistry::new(names(&["lan4294967295"]), Vec::new());
        assert_eq!(registry.next_identifier(ColumnFamily::Round), "lan1");

        let registry = ColumnRegistry::new(names(&["lan1", "lan4294967295"]), Vec::new());
        assert_eq!(registry.next_identifier(ColumnFamily::Round), "lan2");
    }

    #[test]
    fn test_push_at_suffix_limit_keeps_names_unique() {
        let mut registry = ColumnRegistry::new(names(&["lan4294967295"]), Vec::new());
        let first = registry.push(ColumnFamily::Round);
        let second = registry.push(ColumnFamily::Round);
        assert_eq!(first, "lan1");
        assert_eq!(second, "lan2");
        assert_eq!(registry.rounds(), ["lan4294967295", "lan1", "lan2"]);
    }

    #[test]
    fn test_remove_last_round_rejected() {
        let mut registry = ColumnRegistry::new(names(&["lan1"]), Vec::new());
        let result = registry.remove(ColumnFamily::Round, "lan1");
        assert!(matches!(result, Err(LedgerError::LastRoundColumn)));
        assert_eq!(registry.rounds(), ["lan1"]);
    }

    #[test]
    fn test_remove_last_arrived_allowed() {
        let mut registry = ColumnRegistry::new(names(&["lan1"]), names(&["hangDaLen1"]));
        registry.remove(ColumnFamily::Arrived, "hangDaLen1").unwrap();
        assert!(registry.arrivals().is_empty());
    }

    #[test]
    fn test_remove_unknown_column() {
        let mut registry = ColumnRegistry::default();
        let result = registry.remove(ColumnFamily::Round, "lan9");
        assert!(matches!(result, Err(LedgerError::UnknownColumn { name }) if name == "lan9"));
    }

    #[test]
    fn test_family_of_prefix() {
        assert_eq!(ColumnFamily::of("hangDaLen2"), Some(ColumnFamily::Arrived));
        assert_eq!(ColumnFamily::of("lan2"), Some(ColumnFamily::Round));
        assert_eq!(ColumnFamily::of("ghiChu"), None);
    }

    #[test]
    fn test_duplicates_dropped() {
        let registry = ColumnRegistry::new(names(&["lan1", "lan1", "lan2"]), Vec::new());
        assert_eq!(registry.rounds(), ["lan1", "lan2"]);
    }
}
