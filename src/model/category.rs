use crate::model::{EntryKind, RawRow};
use serde::{Deserialize, Serialize};

/// The controlled vocabulary of categories for assets or for liabilities, in sheet order.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Categories(Vec<String>);

impl Categories {
    /// Reads the category column for `kind` from the rows of a vocabulary tab. Blank cells are
    /// skipped and repeated names are kept once.
    pub fn from_rows(kind: EntryKind, rows: &[RawRow]) -> Self {
        let column = kind.category_column();
        let mut names: Vec<String> = Vec::new();
        for name in rows.iter().map(|row| row.text(column)) {
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        Self(names)
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.0.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
