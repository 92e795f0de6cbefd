//! Typed views over External Ledger rows.
//!
//! The ledger serves spreadsheet rows as loosely-typed JSON objects whose
//! keys derive from sheet headers. Parsing here fails closed: a row with a
//! missing or unparseable required field is logged and dropped instead of
//! being propagated inward.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

/// Operator-entered OTP/amount row.
#[derive(Debug, Clone, PartialEq)]
pub struct OtpRecord {
    pub timestamp: DateTime<Utc>,
    pub code: String,
    pub amount: Option<String>,
}

impl OtpRecord {
    pub fn from_row(row: &Value) -> Option<Self> {
        let timestamp = row
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(parse_timestamp)?;
        let code = row
            .get("otp")
            .or_else(|| row.get("code"))
            .and_then(value_to_string)?;

        Some(OtpRecord {
            timestamp,
            code,
            amount: row.get("amount").and_then(value_to_string),
        })
    }
}

/// Customer row mirrored to the ledger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerCustomer {
    pub id: Option<i64>,
    pub phone: String,
    pub vehicle_number: Option<String>,
}

impl LedgerCustomer {
    pub fn from_row(row: &Value) -> Option<Self> {
        let phone = row.get("phone").and_then(value_to_string)?;

        Some(LedgerCustomer {
            id: row.get("id").and_then(value_to_i64),
            phone,
            vehicle_number: row
                .get("vehicleNumber")
                .and_then(value_to_string)
                .filter(|v| !v.is_empty()),
        })
    }
}

/// Transaction row mirrored to the ledger, served back for the
/// customer-history view. Amounts stay strings; the local store remains
/// authoritative for payment status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTransaction {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub original_amount: String,
    pub discount_amount: String,
    pub final_amount: String,
    pub savings: String,
    pub payment_method: Option<String>,
    pub auth_code: String,
    pub status: Option<String>,
    pub created_at: Option<String>,
}

impl LedgerTransaction {
    pub fn from_row(row: &Value) -> Option<Self> {
        let id = row.get("id").and_then(value_to_i64)?;
        let original_amount = row.get("originalAmount").and_then(value_to_string)?;
        let final_amount = row.get("finalAmount").and_then(value_to_string)?;

        Some(LedgerTransaction {
            id,
            customer_id: row.get("customerId").and_then(value_to_i64),
            original_amount,
            discount_amount: row
                .get("discountAmount")
                .and_then(value_to_string)
                .unwrap_or_else(|| "0.00".to_string()),
            final_amount,
            savings: row
                .get("savings")
                .and_then(value_to_string)
                .unwrap_or_else(|| "0.00".to_string()),
            payment_method: row.get("paymentMethod").and_then(value_to_string),
            auth_code: row
                .get("authCode")
                .and_then(value_to_string)
                .unwrap_or_else(|| crate::domain::AUTH_CODE_PENDING.to_string()),
            status: row.get("status").and_then(value_to_string),
            created_at: row.get("createdAt").and_then(value_to_string),
        })
    }
}

/// Parses every row of a ledger payload with `parse`, dropping and logging
/// the ones that fail.
pub fn parse_rows<T>(rows: &[Value], kind: &str, parse: fn(&Value) -> Option<T>) -> Vec<T> {
    let mut parsed = Vec::with_capacity(rows.len());
    for row in rows {
        match parse(row) {
            Some(value) => parsed.push(value),
            None => tracing::warn!(kind, %row, "dropping unrecognized ledger row"),
        }
    }
    parsed
}

/// Sheet timestamps arrive either as RFC 3339 or as the sheet's own
/// `YYYY-MM-DD HH:MM:SS` format, which is taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_otp_record_from_rfc3339_row() {
        let row = json!({"timestamp": "2026-08-06T10:15:00Z", "otp": "4321", "amount": 496.5});
        let record = OtpRecord::from_row(&row).unwrap();

        assert_eq!(record.code, "4321");
        assert_eq!(record.amount.as_deref(), Some("496.5"));
        assert_eq!(record.timestamp.to_rfc3339(), "2026-08-06T10:15:00+00:00");
    }

    #[test]
    fn test_otp_record_from_sheet_format_row() {
        let row = json!({"timestamp": "2026-08-06 10:15:00", "code": 4321});
        let record = OtpRecord::from_row(&row).unwrap();

        assert_eq!(record.code, "4321");
        assert_eq!(record.amount, None);
    }

    #[test]
    fn test_rows_without_timestamp_or_code_are_dropped() {
        assert!(OtpRecord::from_row(&json!({"otp": "4321"})).is_none());
        assert!(OtpRecord::from_row(&json!({"timestamp": "2026-08-06 10:15:00"})).is_none());
        assert!(OtpRecord::from_row(&json!({"timestamp": "yesterday", "otp": "4321"})).is_none());
    }

    #[test]
    fn test_parse_rows_fails_closed() {
        let rows = vec![
            json!({"timestamp": "2026-08-06 10:15:00", "otp": "1111"}),
            json!({"timestamp": null, "otp": "2222"}),
            json!({"timestamp": "2026-08-06 10:16:00", "otp": "3333"}),
        ];
        let parsed = parse_rows(&rows, "otp-data", OtpRecord::from_row);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].code, "1111");
        assert_eq!(parsed[1].code, "3333");
    }

    #[test]
    fn test_ledger_transaction_requires_id_and_amounts() {
        let full = json!({
            "id": 12, "customerId": "3", "originalAmount": "500.00",
            "discountAmount": "3.50", "finalAmount": "496.50", "savings": "3.50",
            "paymentMethod": "upi", "authCode": "4321", "status": "paid",
            "createdAt": "2026-08-06 10:15:00"
        });
        let parsed = LedgerTransaction::from_row(&full).unwrap();
        assert_eq!(parsed.id, 12);
        assert_eq!(parsed.customer_id, Some(3));
        assert_eq!(parsed.auth_code, "4321");

        assert!(LedgerTransaction::from_row(&json!({"customerId": 3})).is_none());
    }
}
