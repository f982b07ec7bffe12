//! Fuel price change detection and spreadsheet placement.

pub mod sheet;

pub use sheet::SheetPlacement;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places accepted for a per-litre price.
pub const PRICE_SCALE: u32 = 3;

/// The four posted fuel grades. A missing grade is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelPrices {
    /// Regular unleaded.
    pub regular: Option<Decimal>,
    /// Mid-grade.
    pub midgrade: Option<Decimal>,
    /// Premium.
    pub premium: Option<Decimal>,
    /// Diesel.
    pub diesel: Option<Decimal>,
}

impl FuelPrices {
    /// Returns the grades in sheet column order.
    #[must_use]
    pub const fn grades(&self) -> [Option<Decimal>; 4] {
        [self.regular, self.midgrade, self.premium, self.diesel]
    }

    /// True when at least one grade has a price.
    #[must_use]
    pub fn has_any(&self) -> bool {
        self.grades().iter().any(Option::is_some)
    }

    /// True when any grade differs from `previous`.
    #[must_use]
    pub fn changed_from(&self, previous: &Self) -> bool {
        self.grades() != previous.grades()
    }

    /// Whether a write of `self` must be pushed to the spreadsheet.
    ///
    /// A new record is pushed if it carries any price; an update is pushed
    /// only if a price actually changed.
    #[must_use]
    pub fn needs_push(&self, previous: Option<&Self>) -> bool {
        match previous {
            None => self.has_any(),
            Some(previous) => self.changed_from(previous),
        }
    }

    /// Returns the name of the first grade that is negative or too precise.
    #[must_use]
    pub fn first_invalid(&self) -> Option<&'static str> {
        let names = ["regular", "midgrade", "premium", "diesel"];
        names.into_iter().zip(self.grades()).find_map(|(name, price)| {
            price
                .filter(|p| p.is_sign_negative() || p.normalize().scale() > PRICE_SCALE)
                .map(|_| name)
        })
    }
}
