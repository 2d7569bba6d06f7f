//! # General Settings
//!
//! Store-wide knobs read by the totals, payment and cash modules.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::currency::{Currency, ExchangeRate};
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::TaxRate;
use crate::validation::{validate_price, validate_required, validate_tax_rate_bps, ValidationResult};

/// Mexico City standard time, UTC−06:00.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -360;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralSettings {
    pub system_name: String,
    /// Base currency for every stored amount.
    pub currency: Currency,
    pub tax_rate: TaxRate,
    /// Last dollar rate entered by the cashier.
    pub dollar_rate: ExchangeRate,
    pub language: String,
    /// IANA name shown in the UI.
    pub timezone: String,
    /// Offset used to decide which calendar day a timestamp falls on.
    pub utc_offset_minutes: i32,
    /// Allowed drift between counted and expected cash at closing.
    pub closure_tolerance: Money,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            system_name: "Cantina POS".to_string(),
            currency: Currency::Mxn,
            tax_rate: TaxRate::default(),
            dollar_rate: ExchangeRate::default(),
            language: "es".to_string(),
            timezone: "America/Mexico_City".to_string(),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            closure_tolerance: Money::from_cents(crate::DEFAULT_CLOSURE_TOLERANCE_CENTAVOS),
        }
    }
}

impl GeneralSettings {
    /// The store's offset from UTC. Out-of-range values fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Checks values entered on the configuration screen.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("system name", &self.system_name)?;
        validate_tax_rate_bps(self.tax_rate.bps())?;
        validate_price("closure tolerance", self.closure_tolerance)?;
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ValidationError::OutOfRange {
                field: "utc offset minutes".to_string(),
                min: -(24 * 60 - 1),
                max: 24 * 60 - 1,
            });
        }
        Ok(())
    }
}
