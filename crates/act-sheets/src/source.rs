//! Spreadsheet access seam
//!
//! [`SpreadsheetSource`] is the only thing the loader needs from a workbook:
//! its worksheet titles and the cell values of one worksheet. The Google
//! backend lives in [`crate::google`]; [`MemorySpreadsheet`] serves fixtures.

use crate::error::ConnectionError;
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Rows of one worksheet, header row first
pub type Rows = Vec<Vec<String>>;

/// Read-only access to a workbook
#[async_trait]
pub trait SpreadsheetSource: Send + Sync {
    /// Titles of all worksheets, in workbook order
    async fn worksheet_titles(&self) -> Result<Vec<String>, ConnectionError>;

    /// Formatted cell values of a worksheet
    async fn worksheet_rows(&self, title: &str) -> Result<Rows, ConnectionError>;
}

/// Locate a worksheet title
///
/// Exact match first, then a scan comparing lowercased titles. Lowercasing
/// is Unicode-aware, so Cyrillic titles match regardless of case.
#[must_use]
pub fn find_worksheet<'a>(titles: &'a [String], name: &str) -> Option<&'a str> {
    if let Some(exact) = titles.iter().find(|t| t.as_str() == name) {
        return Some(exact);
    }
    let wanted = name.to_lowercase();
    titles
        .iter()
        .find(|t| t.to_lowercase() == wanted)
        .map(String::as_str)
}

/// In-memory workbook
///
/// Sheets can be replaced while the workbook is shared, which lets tests
/// observe cache refreshes. Every call is counted.
#[derive(Debug, Clone, Default)]
pub struct MemorySpreadsheet {
    sheets: Arc<RwLock<IndexMap<String, Rows>>>,
    calls: Arc<AtomicUsize>,
    outage: Arc<RwLock<Option<String>>>,
}

impl MemorySpreadsheet {
    /// Create an empty workbook
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a worksheet
    #[must_use]
    pub fn with_sheet<R, C>(self, title: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        self.set_sheet(title, rows);
        self
    }

    /// Insert or replace a worksheet
    pub fn set_sheet<R, C>(&self, title: impl Into<String>, rows: R)
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self.sheets.write().insert(title.into(), rows);
    }

    /// Remove a worksheet
    pub fn remove_sheet(&self, title: &str) {
        self.sheets.write().shift_remove(title);
    }

    /// Make every call fail with [`ConnectionError::Unavailable`]
    pub fn set_outage(&self, reason: Option<&str>) {
        *self.outage.write() = reason.map(str::to_string);
    }

    /// Number of calls served so far
    #[inline]
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check_outage(&self) -> Result<(), ConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outage.read().as_deref() {
            Some(reason) => Err(ConnectionError::Unavailable(reason.to_string())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SpreadsheetSource for MemorySpreadsheet {
    async fn worksheet_titles(&self) -> Result<Vec<String>, ConnectionError> {
        self.check_outage()?;
        Ok(self.sheets.read().keys().cloned().collect())
    }

    async fn worksheet_rows(&self, title: &str) -> Result<Rows, ConnectionError> {
        self.check_outage()?;
        self.sheets
            .read()
            .get(title)
            .cloned()
            .ok_or_else(|| ConnectionError::MissingWorksheet(title.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn finds_cyrillic_title_case_insensitively() {
        let all = titles(&["ЗАГАЛЬНІ ДАНІ", "Ліцензіати"]);
        assert_eq!(find_worksheet(&all, "загальні дані"), Some("ЗАГАЛЬНІ ДАНІ"));
        assert_eq!(find_worksheet(&all, "ЛІЦЕНЗІАТИ"), Some("Ліцензіати"));
    }

    #[test]
    fn exact_match_wins_over_case_insensitive() {
        let all = titles(&["fire", "FIRE"]);
        assert_eq!(find_worksheet(&all, "FIRE"), Some("FIRE"));
        assert_eq!(find_worksheet(&all, "Fire"), Some("fire"));
    }

    #[test]
    fn missing_title_is_none() {
        let all = titles(&["Підписанти"]);
        assert_eq!(find_worksheet(&all, "загальні дані"), None);
        assert_eq!(find_worksheet(&[], "x"), None);
    }

    #[tokio::test]
    async fn memory_spreadsheet_serves_and_counts() {
        let book = MemorySpreadsheet::new().with_sheet("A", [["h"], ["v"]]);
        assert_eq!(book.worksheet_titles().await.unwrap(), vec!["A".to_string()]);
        assert_eq!(book.worksheet_rows("A").await.unwrap().len(), 2);
        assert!(book.worksheet_rows("B").await.is_err());
        assert_eq!(book.calls(), 3);
    }

    #[tokio::test]
    async fn memory_spreadsheet_outage() {
        let book = MemorySpreadsheet::new().with_sheet("A", [["h"]]);
        book.set_outage(Some("offline"));
        assert!(matches!(
            book.worksheet_titles().await,
            Err(ConnectionError::Unavailable(_))
        ));
        book.set_outage(None);
        assert!(book.worksheet_titles().await.is_ok());
    }
}
