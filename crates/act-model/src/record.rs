//! Header-keyed spreadsheet rows
//!
//! A worksheet arrives as a header row followed by data rows. [`Record`]
//! pairs every cell with its column header so typed constructors can look
//! values up by name.

use indexmap::IndexMap;

/// One data row keyed by column header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: IndexMap<String, String>,
}

impl Record {
    /// Build a record from a header row and a data row
    ///
    /// Short rows are padded with empty cells, surplus cells without a header
    /// are dropped.
    #[must_use]
    pub fn from_row(headers: &[String], row: &[String]) -> Self {
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = row.get(i).cloned().unwrap_or_default();
                (header.trim().to_string(), value)
            })
            .collect();
        Self { fields }
    }

    /// Convert a whole worksheet (header row first) into records
    ///
    /// Rows where every cell is blank are skipped.
    #[must_use]
    pub fn from_rows(rows: &[Vec<String>]) -> Vec<Self> {
        let Some((headers, data)) = rows.split_first() else {
            return Vec::new();
        };
        data.iter()
            .map(|row| Self::from_row(headers, row))
            .filter(|record| !record.is_blank())
            .collect()
    }

    /// Trimmed value of a column, `None` when absent or blank
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// First non-blank value among several column aliases
    #[must_use]
    pub fn get_any(&self, columns: &[&str]) -> Option<&str> {
        columns.iter().find_map(|c| self.get(c))
    }

    /// Raw cell value without trimming
    #[inline]
    #[must_use]
    pub fn raw(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Whether every cell is blank
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
