use crate::error::Res;
use crate::model::{Categories, EntryKind, Month, Schema, DATE, NAME, NOTES, OWNER, VALUE};
use crate::session::Session;
use anyhow::{bail, ensure};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A normalized asset or liability row.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Entry {
    pub(crate) date: NaiveDate,
    pub(crate) month: Month,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) owner: Option<String>,
    pub(crate) category: String,
    pub(crate) name: String,
    pub(crate) value: Decimal,
    #[serde(default)]
    pub(crate) notes: String,
}

impl Entry {
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        name: impl Into<String>,
        value: Decimal,
    ) -> Self {
        Self {
            date,
            month: Month::from_date(date),
            owner: None,
            category: category.into(),
            name: name.into(),
            value,
            notes: String::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

/// What a user supplies to record an entry.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EntryInput {
    pub date: NaiveDate,
    pub category: String,
    pub name: String,
    pub value: Decimal,
    pub notes: String,
}

/// An entry that has passed write validation and is ready to be appended.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct NewEntry {
    kind: EntryKind,
    /// The stored date is always the month-end of the date the user gave.
    month: Month,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    category: String,
    name: String,
    value: Decimal,
    notes: String,
}

impl NewEntry {
    /// Validates user input for a write. The name is trimmed and must not be empty, the value
    /// must not be negative and the category must be in the vocabulary. The session must suit
    /// the ledger's schema.
    pub fn validate(
        kind: EntryKind,
        input: &EntryInput,
        categories: &Categories,
        schema: Schema,
        session: &Session,
    ) -> Res<Self> {
        session.check_writable(schema.multi_user())?;
        let name = input.name.trim();
        ensure!(!name.is_empty(), "A {kind} name must not be empty");
        let value = input.value;
        ensure!(
            !value.is_sign_negative() || value.is_zero(),
            "A {kind} value must not be negative, got {value}"
        );
        let category = input.category.trim();
        if !categories.contains(category) {
            if categories.is_empty() {
                bail!(
                    "There are no {kind} categories, add some to the '{}' tab first",
                    kind.categories()
                );
            }
            bail!(
                "Unknown {kind} category '{category}', expected one of: {}",
                categories.names().join(", ")
            );
        }
        Ok(Self {
            kind,
            month: Month::from_date(input.date),
            owner: session.owner().map(|o| o.to_string()),
            category: category.to_string(),
            name: name.to_string(),
            value,
            notes: input.notes.trim().to_string(),
        })
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    /// The row in the column order of `schema`.
    pub fn to_row(&self, schema: Schema) -> Vec<String> {
        schema
            .columns(self.kind.entries())
            .into_iter()
            .map(|column| match column {
                DATE => self.month.to_string(),
                OWNER => self.owner.clone().unwrap_or_default(),
                NAME => self.name.clone(),
                VALUE => self.value.normalize().to_string(),
                NOTES => self.notes.clone(),
                _ => self.category.clone(),
            })
            .collect()
    }
}
