//! Types that represent the core data model, such as `Entry`, `Month` and `Categories`.
mod amount;
mod category;
mod collection;
mod entry;
mod mapping;
mod month;
mod normalize;

pub use amount::{Amount, AmountError};
pub use category::Categories;
pub use collection::{
    Collection, EntryKind, Schema, ASSET_CATEGORY, DATE, LIABILITY_CATEGORY, NAME, NOTES, OWNER,
    VALUE,
};
pub use entry::{Entry, EntryInput, NewEntry};
pub use mapping::{Column, Header, Mapping, MappingError, RawRow};
pub use month::Month;
pub use normalize::{normalize, parse_date, parse_value};
use serde::{Deserialize, Serialize};

/// Represents all the tabs of the ledger spreadsheet as raw rows.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LedgerData {
    pub(crate) asset_categories: Vec<RawRow>,
    pub(crate) liability_categories: Vec<RawRow>,
    pub(crate) assets: Vec<RawRow>,
    pub(crate) liabilities: Vec<RawRow>,
}

impl LedgerData {
    pub fn rows(&self, collection: Collection) -> &[RawRow] {
        match collection {
            Collection::AssetCategories => &self.asset_categories,
            Collection::LiabilityCategories => &self.liability_categories,
            Collection::Assets => &self.assets,
            Collection::Liabilities => &self.liabilities,
        }
    }

    pub(crate) fn set_rows(&mut self, collection: Collection, rows: Vec<RawRow>) {
        match collection {
            Collection::AssetCategories => self.asset_categories = rows,
            Collection::LiabilityCategories => self.liability_categories = rows,
            Collection::Assets => self.assets = rows,
            Collection::Liabilities => self.liabilities = rows,
        }
    }

    /// The normalized entries of `kind`.
    pub fn entries(&self, kind: EntryKind) -> Vec<Entry> {
        normalize(kind, self.rows(kind.entries()))
    }

    pub fn categories(&self, kind: EntryKind) -> Categories {
        Categories::from_rows(kind, self.rows(kind.categories()))
    }
}
