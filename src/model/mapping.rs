use serde::de::Error as SerdeError;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MappingError(String);

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for MappingError {}

/// The header row of a tab. Each header is converted to a snake_case column name so that a tab
/// with the header `Asset Category` can be read with the column name `asset_category`.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Mapping {
    headers: Vec<Header>,
    columns: Vec<Column>,
    column_map: HashMap<Column, usize>,
}

impl Mapping {
    /// Create a new `Mapping` from a list of header strings.
    pub fn new<S, I>(headers: I) -> Result<Self, MappingError>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let headers: Vec<Header> = headers.into_iter().map(|s| s.into().into()).collect();
        let columns = headers
            .iter()
            .map(|h| Column::new(to_snake_case(h)))
            .collect::<Result<Vec<Column>, MappingError>>()?;

        let column_map: HashMap<Column, usize> = columns
            .iter()
            .enumerate()
            .map(|(idx, key)| (key.to_owned(), idx))
            .collect();

        if column_map.len() != headers.len() {
            return Err(MappingError(String::from(
                "Encountered a duplicate column name \
                (two or more headers resulted in the same snake_case conversion)",
            )));
        }

        Ok(Self {
            headers,
            columns,
            column_map,
        })
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.column_map.get(column).cloned()
    }

    /// Pairs each value of a data row with its column name. Cells past the last value are
    /// missing from the returned row, and values past the last header are dropped.
    pub fn row<S, I>(&self, values: I) -> RawRow
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        self.columns
            .iter()
            .zip(values)
            .map(|(column, value)| (column.as_ref().to_string(), value.into()))
            .collect()
    }
}

impl Serialize for Mapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.headers.len()))?;
        for header in &self.headers {
            seq.serialize_element(header.as_ref())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items: Vec<String> = Vec::deserialize(deserializer)?;
        let mapping = Mapping::new(items).map_err(D::Error::custom)?;
        Ok(mapping)
    }
}

/// Represents a header in the Google sheet, for example, `Asset Category`
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header(String);

impl AsRef<str> for Header {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl<S: Into<String>> From<S> for Header {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

/// Represents a snake_case column name, for example, `asset_category`
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Column(String);

impl AsRef<str> for Column {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::borrow::Borrow<str> for Column {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for Column {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_column_name(s)?;
        Ok(Self(s.into()))
    }
}

impl Column {
    pub fn new(s: impl Into<String>) -> Result<Self, MappingError> {
        let s = s.into();
        validate_column_name(&s)?;
        Ok(Self(s))
    }
}

/// One data row of a tab: column name to the raw, formatted cell text.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<String, String>);

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// The trimmed cell text, or an empty string when the cell is missing.
    pub fn text(&self, column: &str) -> &str {
        self.get(column).map(str::trim).unwrap_or_default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    /// True when every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|v| v.trim().is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn to_snake_case(s: impl AsRef<str>) -> String {
    let trimmed = s.as_ref().trim();
    if trimmed.is_empty() {
        return "no_name".to_string();
    }
    let lower = trimmed
        .to_lowercase()
        .replace([' ', '-'], "_")
        .replace('#', "number");
    let alphanumeric: String = lower
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || c == '_')
        .collect();
    let first_char = alphanumeric.chars().next().unwrap_or('a');
    if !first_char.is_ascii_alphabetic() {
        format!("x_{alphanumeric}")
    } else {
        alphanumeric
    }
}

fn validate_column_name(s: impl AsRef<str>) -> std::result::Result<(), MappingError> {
    let s = s.as_ref();
    let mut chars = s.chars();
    match chars.next() {
        None => {
            return Err(MappingError(String::from(
                "A column name must not be zero length",
            )))
        }
        Some(c) => {
            if !c.is_ascii_lowercase() {
                return Err(MappingError(format!(
                    "A column name must start with an ascii lowercase letter, \
                    but '{s}' starts with '{c}'"
                )));
            }
        }
    }

    if let Some(bad) = chars.find(|&c| !is_valid_column_name_char(c)) {
        return Err(MappingError(format!(
            "A column name must be lowercase ascii alphanumeric with underscores. \
            '{s}' has illegal char '{bad}'"
        )));
    }

    Ok(())
}

fn is_valid_column_name_char(c: char) -> bool {
    c == '_' || c.is_ascii_digit() || c.is_ascii_lowercase()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_illegal_column_name_chars() {
        assert!(is_valid_column_name_char('_'));
        assert!(!is_valid_column_name_char('#'));
        assert!(!is_valid_column_name_char(' '));
        assert!(!is_valid_column_name_char('X'));
    }

    #[test]
    fn test_invalid_column_names() {
        validate_column_name("asset_category").unwrap();
        assert!(validate_column_name("1leading_numeral").is_err());
        assert!(validate_column_name("_leading_underscore").is_err());
        assert!(validate_column_name("has space").is_err());
        assert!(validate_column_name("upper_Case").is_err());
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Asset Category"), "asset_category");
        assert_eq!(to_snake_case(" value "), "value");
        assert_eq!(to_snake_case("Account #"), "account_number");
        assert_eq!(to_snake_case("123"), "x_123");
        assert_eq!(to_snake_case(""), "no_name");
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        assert!(Mapping::new(["Name", "name"]).is_err());
    }

    #[test]
    fn test_row_pairs_values_with_columns() {
        let mapping = Mapping::new(["date", "Asset Category", "name", "value", "notes"]).unwrap();
        assert_eq!(mapping.column_index("asset_category"), Some(1));
        let row = mapping.row(["2025-01-15", "Bank", "Savings", "₹1,000"]);
        assert_eq!(row.get("asset_category"), Some("Bank"));
        assert_eq!(row.get("value"), Some("₹1,000"));
        assert_eq!(row.get("notes"), None);
        assert_eq!(row.text("notes"), "");
    }

    #[test]
    fn test_row_past_last_header() {
        let mapping = Mapping::new(["a", "b"]).unwrap();
        let row = mapping.row(["1", "2", "scratch"]);
        let expected: RawRow = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(row, expected);
    }

    #[test]
    fn test_blank_row() {
        let row: RawRow = [("a", " "), ("b", "")].into_iter().collect();
        assert!(row.is_blank());
    }

    #[test]
    fn test_mapping_serde() {
        let original_json = r##"["Date","Asset Category","Value"]"##;
        let mapping: Mapping = serde_json::from_str(original_json).unwrap();
        let serialized = serde_json::to_string(&mapping).unwrap();
        assert_eq!(original_json, serialized);
        assert_eq!(
            mapping.columns(),
            ["date", "asset_category", "value"]
                .into_iter()
                .map(|s| Column::new(s).unwrap())
                .collect::<Vec<Column>>()
                .as_slice()
        );
    }
}
