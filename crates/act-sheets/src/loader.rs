//! Reference data loader
//!
//! Reads the four kinds of reference tables out of a workbook and turns
//! them into a [`ReferenceSnapshot`]:
//!
//! | Worksheet           | Columns                              | Missing tab        |
//! |---------------------|--------------------------------------|--------------------|
//! | general data        | `Назва`/`Name`, `Код`/`Code`         | `ConnectionError`  |
//! | licensees           | `Short Name`, `Full Text`            | empty table        |
//! | signatories         | `Category`, `Label`, `Position`, `Name` | empty table     |
//! | one per system code | `Category`, `Short Name`, `Full Text` | empty catalog     |

use crate::error::ConnectionError;
use crate::source::{find_worksheet, SpreadsheetSource};
use act_model::{
    Defect, Licensee, ModelError, Record, ReferenceSnapshot, Signatory, System, SystemCode,
};
use std::fmt;
use std::sync::Arc;

/// Worksheet titles the loader looks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    /// Mandatory systems table
    pub general: String,
    /// Optional licensee boilerplate
    pub licensees: String,
    /// Optional signatory roster
    pub signatories: String,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            general: "загальні дані".to_string(),
            licensees: "Ліцензіати".to_string(),
            signatories: "Підписанти".to_string(),
        }
    }
}

/// Loads reference snapshots from a spreadsheet source
#[derive(Clone)]
pub struct ReferenceLoader {
    source: Arc<dyn SpreadsheetSource>,
    layout: SheetLayout,
}

impl fmt::Debug for ReferenceLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceLoader")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl ReferenceLoader {
    /// Create a loader with the default layout
    #[must_use]
    pub fn new(source: Arc<dyn SpreadsheetSource>) -> Self {
        Self {
            source,
            layout: SheetLayout::default(),
        }
    }

    /// With custom worksheet titles
    #[must_use]
    pub fn with_layout(mut self, layout: SheetLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Worksheet layout in use
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    /// Fetch a fresh snapshot
    ///
    /// # Errors
    /// `ConnectionError` when the workbook cannot be read or the general
    /// data worksheet is absent. Optional worksheets degrade to empty tables.
    pub async fn load(&self) -> Result<ReferenceSnapshot, ConnectionError> {
        let titles = self.source.worksheet_titles().await?;

        let general = find_worksheet(&titles, &self.layout.general)
            .ok_or_else(|| ConnectionError::MissingWorksheet(self.layout.general.clone()))?;
        let systems = self.systems(general).await?;

        let mut builder = ReferenceSnapshot::builder();

        for record in self.optional_records(&titles, &self.layout.licensees).await? {
            match Licensee::from_record(&record) {
                Ok(licensee) => builder = builder.licensee(licensee),
                Err(e) => tracing::debug!("skipping licensee row: {}", e),
            }
        }

        for record in self.optional_records(&titles, &self.layout.signatories).await? {
            builder = builder.signatory(Signatory::from_record(&record));
        }

        let mut defect_count = 0;
        for system in &systems {
            let catalog = self.defects(&titles, &system.code).await?;
            defect_count += catalog.len();
            builder = builder.defects(system.code.clone(), catalog);
        }

        for system in systems {
            builder = builder.system(system);
        }
        let snapshot = builder.build();

        tracing::info!(
            systems = snapshot.system_count(),
            licensees = snapshot.licensees().count(),
            signatories = snapshot.signatories().len(),
            defects = defect_count,
            "reference data loaded"
        );
        Ok(snapshot)
    }

    async fn systems(&self, title: &str) -> Result<Vec<System>, ConnectionError> {
        let rows = self.source.worksheet_rows(title).await?;
        let mut systems: Vec<System> = Vec::new();
        for record in Record::from_rows(&rows) {
            match System::from_record(&record) {
                Ok(system) => {
                    if !system.code.is_placeholder() {
                        tracing::warn!(
                            "system '{}': code '{}' is not a placeholder name, defects stay out of the act",
                            system.name,
                            system.code
                        );
                    }
                    if let Some(existing) = systems.iter_mut().find(|s| s.name == system.name) {
                        *existing = system;
                    } else {
                        systems.push(system);
                    }
                }
                Err(ModelError::EmptySystemCode) => {}
                Err(e) => tracing::warn!("skipping system row in '{}': {}", title, e),
            }
        }
        Ok(systems)
    }

    async fn optional_records(
        &self,
        titles: &[String],
        name: &str,
    ) -> Result<Vec<Record>, ConnectionError> {
        let Some(title) = find_worksheet(titles, name) else {
            tracing::warn!("worksheet '{}' not found, using empty table", name);
            return Ok(Vec::new());
        };
        let rows = self.source.worksheet_rows(title).await?;
        Ok(Record::from_rows(&rows))
    }

    async fn defects(
        &self,
        titles: &[String],
        code: &SystemCode,
    ) -> Result<Vec<Defect>, ConnectionError> {
        let Some(title) = find_worksheet(titles, code.as_str()) else {
            tracing::debug!("no defect worksheet for system {}", code);
            return Ok(Vec::new());
        };
        let rows = self.source.worksheet_rows(title).await?;
        Ok(Record::from_rows(&rows)
            .iter()
            .filter_map(|record| Defect::from_record(code, record).ok())
            .collect())
    }
}
