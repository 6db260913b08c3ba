use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DATE: &str = "date";
pub const OWNER: &str = "owner";
pub const ASSET_CATEGORY: &str = "asset_category";
pub const LIABILITY_CATEGORY: &str = "liability_category";
pub const NAME: &str = "name";
pub const VALUE: &str = "value";
pub const NOTES: &str = "notes";

/// The tabs of the ledger spreadsheet. The serialized name of each variant is the tab name.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    AssetCategories,
    LiabilityCategories,
    Assets,
    Liabilities,
}

serde_plain::derive_display_from_serialize!(Collection);
serde_plain::derive_fromstr_from_deserialize!(Collection);

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::AssetCategories,
        Collection::LiabilityCategories,
        Collection::Assets,
        Collection::Liabilities,
    ];

    /// The name of the tab in the spreadsheet.
    pub fn tab_name(&self) -> &'static str {
        match self {
            Collection::AssetCategories => "asset_categories",
            Collection::LiabilityCategories => "liability_categories",
            Collection::Assets => "assets",
            Collection::Liabilities => "liabilities",
        }
    }

    /// The kind of entry stored in this collection, `None` for the category vocabularies.
    pub fn entry_kind(&self) -> Option<EntryKind> {
        match self {
            Collection::Assets => Some(EntryKind::Asset),
            Collection::Liabilities => Some(EntryKind::Liability),
            Collection::AssetCategories | Collection::LiabilityCategories => None,
        }
    }
}

/// Whether an entry is something owned or something owed.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Asset,
    Liability,
}

serde_plain::derive_display_from_serialize!(EntryKind);
serde_plain::derive_fromstr_from_deserialize!(EntryKind);

impl EntryKind {
    /// The collection that holds entries of this kind.
    pub fn entries(&self) -> Collection {
        match self {
            EntryKind::Asset => Collection::Assets,
            EntryKind::Liability => Collection::Liabilities,
        }
    }

    /// The collection that holds the category vocabulary for this kind.
    pub fn categories(&self) -> Collection {
        match self {
            EntryKind::Asset => Collection::AssetCategories,
            EntryKind::Liability => Collection::LiabilityCategories,
        }
    }

    /// The column that holds the category, both in the entries and in the vocabulary tab.
    pub fn category_column(&self) -> &'static str {
        match self {
            EntryKind::Asset => ASSET_CATEGORY,
            EntryKind::Liability => LIABILITY_CATEGORY,
        }
    }
}

/// The fixed column layout of each collection. The `owner` column only exists in multi-user
/// deployments.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct Schema {
    multi_user: bool,
}

impl Schema {
    pub fn new(multi_user: bool) -> Self {
        Self { multi_user }
    }

    pub fn multi_user(&self) -> bool {
        self.multi_user
    }

    /// The ordered column names of `collection`.
    pub fn columns(&self, collection: Collection) -> Vec<&'static str> {
        match collection.entry_kind() {
            None => match collection {
                Collection::LiabilityCategories => vec![LIABILITY_CATEGORY],
                _ => vec![ASSET_CATEGORY],
            },
            Some(kind) => {
                let mut columns = vec![DATE];
                if self.multi_user {
                    columns.push(OWNER);
                }
                columns.extend([kind.category_column(), NAME, VALUE, NOTES]);
                columns
            }
        }
    }
}
