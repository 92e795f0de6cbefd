//! Station pricing settings. A singleton, created with defaults at startup
//! and updated in place by an authenticated admin.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub fuel_price: BigDecimal,
    pub discount_per_liter: BigDecimal,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fuel_price: BigDecimal::from(100).with_scale(2),
            discount_per_liter: (BigDecimal::from(7) / BigDecimal::from(10)).with_scale(2),
        }
    }
}

/// Partial update applied by the admin settings endpoint. Absent fields
/// keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub fuel_price: Option<BigDecimal>,
    pub discount_per_liter: Option<BigDecimal>,
}

impl Settings {
    pub fn apply(&self, patch: SettingsPatch) -> Settings {
        Settings {
            fuel_price: patch.fuel_price.unwrap_or_else(|| self.fuel_price.clone()),
            discount_per_liter: patch
                .discount_per_liter
                .unwrap_or_else(|| self.discount_per_liter.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.fuel_price.to_string(), "100.00");
        assert_eq!(settings.discount_per_liter.to_string(), "0.70");
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let settings = Settings::default();
        let updated = settings.apply(SettingsPatch {
            fuel_price: Some("98.50".parse().unwrap()),
            discount_per_liter: None,
        });

        assert_eq!(updated.fuel_price.to_string(), "98.50");
        assert_eq!(updated.discount_per_liter.to_string(), "0.70");
    }
}
