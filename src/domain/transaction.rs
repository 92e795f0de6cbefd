//! Transaction domain entity.
//! Framework-agnostic representation of a fuel purchase.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel authorization code for a transaction that has not been
/// matched to an operator-entered code yet.
pub const AUTH_CODE_PENDING: &str = "PENDING";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    NetBanking,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::NetBanking => "net_banking",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "upi" => Some(PaymentMethod::Upi),
            "net_banking" => Some(PaymentMethod::NetBanking),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Paid,
    Verified,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Paid => "paid",
            TransactionStatus::Verified => "verified",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(TransactionStatus::Pending),
            "paid" => Some(TransactionStatus::Paid),
            "verified" => Some(TransactionStatus::Verified),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub original_amount: BigDecimal,
    pub discount_amount: BigDecimal,
    pub final_amount: BigDecimal,
    pub savings: BigDecimal,
    pub payment_method: PaymentMethod,
    pub auth_code: String,
    pub status: TransactionStatus,
    pub timestamp_str: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload accepted when a payment is submitted. The store assigns the id,
/// status, sentinel auth code and creation instant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub customer_id: Option<i64>,
    pub original_amount: BigDecimal,
    pub discount_amount: BigDecimal,
    pub final_amount: BigDecimal,
    pub savings: BigDecimal,
    pub payment_method: PaymentMethod,
}

impl Transaction {
    pub fn new(id: i64, input: NewTransaction) -> Self {
        let now = Utc::now();
        Self {
            id,
            customer_id: input.customer_id,
            original_amount: input.original_amount,
            discount_amount: input.discount_amount,
            final_amount: input.final_amount,
            savings: input.savings,
            payment_method: input.payment_method,
            auth_code: AUTH_CODE_PENDING.to_string(),
            status: TransactionStatus::Paid,
            timestamp_str: Some(now.format("%Y-%m-%d %H:%M:%S").to_string()),
            created_at: now,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.auth_code != AUTH_CODE_PENDING
    }
}

/// Single-use code in the local pool, used when no External Ledger is
/// configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Otp {
    pub id: i64,
    pub code: String,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
}
