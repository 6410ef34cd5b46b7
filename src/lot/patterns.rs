use std::collections::BTreeMap;

/// Wall pattern table: numeric pattern id to material reference string.
///
/// A reference is either a hexadecimal catalog GUID, the literal `blank`,
/// or a bare material name.
#[derive(Debug, Clone, Default)]
pub struct PatternMap {
    entries: BTreeMap<u16, String>,
}

/// What a pattern reference string points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternRef {
    /// Catalog entry whose material should be used.
    Catalog(u32),
    /// Explicitly blank; uses the fallback material.
    Blank,
    /// Material name, normalized to `wall_<name>_base`.
    Named(String),
}

impl PatternRef {
    /// Classifies a pattern reference string.
    ///
    /// Anything that parses as hexadecimal is a catalog GUID, so a bare
    /// name made only of hex digits is treated as a GUID too.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if let Ok(guid) = u32::from_str_radix(value, 16) {
            return Self::Catalog(guid);
        }
        if value == "blank" {
            return Self::Blank;
        }
        let name = if value.starts_with("wall_") {
            format!("{value}_base")
        } else {
            format!("wall_{value}_base")
        };
        Self::Named(name)
    }
}

impl PatternMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a pattern reference.
    pub fn insert(&mut self, id: u16, value: impl Into<String>) {
        self.entries.insert(id, value.into());
    }

    #[must_use]
    pub fn get(&self, id: u16) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Iterates entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> {
        self.entries.iter().map(|(&id, v)| (id, v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(u16, S)> for PatternMap {
    fn from_iter<I: IntoIterator<Item = (u16, S)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(id, v)| (id, v.into())).collect(),
        }
    }
}
