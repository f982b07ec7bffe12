//! Cell placement of a day's prices in the monthly spreadsheet tabs.
//!
//! Each month has its own tab named `YYYY-MM`. Row 1 is a header, so day `d`
//! lives on row `d + 1`. Columns A to E hold the date and the four grades.

use chrono::{Datelike, NaiveDate};

use super::FuelPrices;

/// Location of one day's row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPlacement {
    /// Tab name, `YYYY-MM`.
    pub tab: String,
    /// 1-based row number.
    pub row: u32,
}

impl SheetPlacement {
    /// Placement for prices effective on `date`.
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            tab: date.format("%Y-%m").to_string(),
            row: date.day() + 1,
        }
    }

    /// A1-notation range covering columns A to E of the row.
    #[must_use]
    pub fn range(&self) -> String {
        format!("'{}'!A{row}:E{row}", self.tab, row = self.row)
    }
}

/// Cell values for the row; missing prices become empty cells.
#[must_use]
pub fn row_values(date: NaiveDate, prices: &FuelPrices) -> Vec<String> {
    std::iter::once(date.format("%Y-%m-%d").to_string())
        .chain(
            prices
                .grades()
                .into_iter()
                .map(|p| p.map(|p| p.normalize().to_string()).unwrap_or_default()),
        )
        .collect()
}
