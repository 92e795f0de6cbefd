//! Discount quote computation. Pure over the requested amount plus the
//! current pricing settings.

use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::domain::Settings;
use crate::error::AppError;

/// Quote returned to the client. Monetary fields are fixed to two decimal
/// places (truncation toward zero) and serialized as strings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub original_amount: String,
    pub final_amount: String,
    pub discount_amount: String,
    pub savings: String,
    pub fuel_price: String,
    pub discount_per_liter: String,
    pub liters: String,
}

fn money(value: &BigDecimal) -> String {
    value.with_scale(2).to_string()
}

/// Computes the loyalty discount for a purchase of `amount` currency units.
///
/// The discount is fixed to two decimals before the final amount is
/// derived, so `final + discount == original` holds exactly at two-decimal
/// precision for every input.
pub fn quote(amount: &BigDecimal, settings: &Settings) -> Result<Quote, AppError> {
    if *amount <= BigDecimal::from(0) {
        return Err(AppError::Validation("amount must be positive".to_string()));
    }
    if settings.fuel_price <= BigDecimal::from(0) {
        return Err(AppError::InvalidConfiguration(
            "fuel price must be positive".to_string(),
        ));
    }

    let liters = amount / &settings.fuel_price;
    let discount = (&liters * &settings.discount_per_liter).with_scale(2);
    let original = amount.with_scale(2);
    let final_amount = &original - &discount;

    Ok(Quote {
        original_amount: original.to_string(),
        final_amount: final_amount.to_string(),
        discount_amount: discount.to_string(),
        savings: discount.to_string(),
        fuel_price: money(&settings.fuel_price),
        discount_per_liter: money(&settings.discount_per_liter),
        liters: money(&liters),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(fuel_price: &str, discount_per_liter: &str) -> Settings {
        Settings {
            fuel_price: fuel_price.parse().unwrap(),
            discount_per_liter: discount_per_liter.parse().unwrap(),
        }
    }

    #[test]
    fn test_pinned_example() {
        let quote = quote(&"500".parse().unwrap(), &settings("100.00", "0.70")).unwrap();

        assert_eq!(quote.original_amount, "500.00");
        assert_eq!(quote.liters, "5.00");
        assert_eq!(quote.discount_amount, "3.50");
        assert_eq!(quote.final_amount, "496.50");
        assert_eq!(quote.savings, "3.50");
        assert_eq!(quote.fuel_price, "100.00");
        assert_eq!(quote.discount_per_liter, "0.70");
    }

    #[test]
    fn test_final_plus_discount_equals_original() {
        for amount in ["500", "499.99", "123.45", "0.01", "1000000"] {
            let quote = quote(&amount.parse().unwrap(), &settings("97.31", "0.73")).unwrap();

            let final_amount: BigDecimal = quote.final_amount.parse().unwrap();
            let discount: BigDecimal = quote.discount_amount.parse().unwrap();
            let original: BigDecimal = quote.original_amount.parse().unwrap();
            assert_eq!(final_amount + discount, original, "amount {}", amount);
        }
    }

    #[test]
    fn test_zero_fuel_price_rejected() {
        let err = quote(&"100".parse().unwrap(), &settings("0", "0.70")).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_negative_fuel_price_rejected() {
        let err = quote(&"100".parse().unwrap(), &settings("-1", "0.70")).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let err = quote(&"0".parse().unwrap(), &settings("100.00", "0.70")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_zero_discount_per_liter() {
        let quote = quote(&"250".parse().unwrap(), &settings("100.00", "0")).unwrap();

        assert_eq!(quote.discount_amount, "0.00");
        assert_eq!(quote.final_amount, "250.00");
    }
}
