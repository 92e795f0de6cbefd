//! Postgres implementation of the store contract.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::domain::{
    Customer, NewTransaction, Otp, Settings, SettingsPatch, Transaction, TransactionStatus,
};
use crate::domain::{PaymentMethod, AUTH_CODE_PENDING};
use crate::ports::{Store, StoreError, StoreResult};

/// Postgres-backed store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn get_settings(&self) -> StoreResult<Settings> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT fuel_price, discount_per_liter FROM settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(row.map(SettingsRow::into_domain).unwrap_or_default())
    }

    async fn update_settings(&self, patch: SettingsPatch) -> StoreResult<Settings> {
        let updated = self.get_settings().await?.apply(patch);

        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            INSERT INTO settings (id, fuel_price, discount_per_liter)
            VALUES (1, $1, $2)
            ON CONFLICT (id) DO UPDATE
                SET fuel_price = EXCLUDED.fuel_price,
                    discount_per_liter = EXCLUDED.discount_per_liter
            RETURNING fuel_price, discount_per_liter
            "#,
        )
        .bind(&updated.fuel_price)
        .bind(&updated.discount_per_liter)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(row.into_domain())
    }

    async fn get_or_create_customer(
        &self,
        phone: &str,
        vehicle_number: Option<&str>,
    ) -> StoreResult<Customer> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            INSERT INTO customers (phone, vehicle_number, created_at)
            VALUES ($1, NULLIF($2, ''), NOW())
            ON CONFLICT (phone) DO UPDATE
                SET vehicle_number = COALESCE(NULLIF($2, ''), customers.vehicle_number)
            RETURNING id, phone, vehicle_number, created_at
            "#,
        )
        .bind(phone)
        .bind(vehicle_number.unwrap_or(""))
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(row.into_domain())
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, phone, vehicle_number, created_at FROM customers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(rows.into_iter().map(CustomerRow::into_domain).collect())
    }

    async fn create_transaction(&self, input: NewTransaction) -> StoreResult<Transaction> {
        let tx = Transaction::new(0, input);

        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (
                customer_id, original_amount, discount_amount, final_amount, savings,
                payment_method, auth_code, status, timestamp_str, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, customer_id, original_amount, discount_amount, final_amount,
                savings, payment_method, auth_code, status, timestamp_str, created_at
            "#,
        )
        .bind(tx.customer_id)
        .bind(&tx.original_amount)
        .bind(&tx.discount_amount)
        .bind(&tx.final_amount)
        .bind(&tx.savings)
        .bind(tx.payment_method.as_str())
        .bind(AUTH_CODE_PENDING)
        .bind(tx.status.as_str())
        .bind(&tx.timestamp_str)
        .bind(tx.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)?;

        row.into_domain()
    }

    async fn get_transaction(&self, id: i64) -> StoreResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        row.map(TransactionRow::into_domain)
            .transpose()?
            .ok_or_else(|| StoreError::NotFound(format!("Transaction {}", id)))
    }

    async fn update_transaction_status(
        &self,
        id: i64,
        status: TransactionStatus,
        auth_code: Option<&str>,
    ) -> StoreResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            UPDATE transactions
            SET status = $2, auth_code = COALESCE($3, auth_code)
            WHERE id = $1
            RETURNING id, customer_id, original_amount, discount_amount, final_amount,
                savings, payment_method, auth_code, status, timestamp_str, created_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(auth_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        row.map(TransactionRow::into_domain)
            .transpose()?
            .ok_or_else(|| StoreError::NotFound(format!("Transaction {}", id)))
    }

    async fn list_transactions(&self, customer_id: Option<i64>) -> StoreResult<Vec<Transaction>> {
        let rows = match customer_id {
            Some(customer_id) => {
                sqlx::query_as::<_, TransactionRow>(
                    "SELECT * FROM transactions WHERE customer_id = $1 \
                     ORDER BY created_at DESC, id DESC",
                )
                .bind(customer_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, TransactionRow>(
                    "SELECT * FROM transactions ORDER BY created_at DESC, id DESC",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(StoreError::from)?;

        rows.into_iter().map(TransactionRow::into_domain).collect()
    }

    async fn next_unused_otp(&self) -> StoreResult<Option<Otp>> {
        let row = sqlx::query_as::<_, OtpRow>(
            "SELECT id, code, is_used, created_at FROM otps WHERE is_used = FALSE \
             ORDER BY id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(row.map(OtpRow::into_domain))
    }

    async fn mark_otp_used(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("UPDATE otps SET is_used = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Otp {}", id)));
        }
        Ok(())
    }

    async fn seed_otps(&self, codes: &[String]) -> StoreResult<()> {
        for code in codes {
            sqlx::query("INSERT INTO otps (code, is_used, created_at) VALUES ($1, FALSE, NOW())")
                .bind(code)
                .execute(&self.pool)
                .await
                .map_err(StoreError::from)?;
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }
}

/// Internal row types for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    fuel_price: bigdecimal::BigDecimal,
    discount_per_liter: bigdecimal::BigDecimal,
}

impl SettingsRow {
    fn into_domain(self) -> Settings {
        Settings {
            fuel_price: self.fuel_price,
            discount_per_liter: self.discount_per_liter,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    phone: String,
    vehicle_number: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl CustomerRow {
    fn into_domain(self) -> Customer {
        Customer {
            id: self.id,
            phone: self.phone,
            vehicle_number: self.vehicle_number,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    customer_id: Option<i64>,
    original_amount: bigdecimal::BigDecimal,
    discount_amount: bigdecimal::BigDecimal,
    final_amount: bigdecimal::BigDecimal,
    savings: bigdecimal::BigDecimal,
    payment_method: String,
    auth_code: String,
    status: String,
    timestamp_str: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TransactionRow {
    fn into_domain(self) -> StoreResult<Transaction> {
        let payment_method = PaymentMethod::parse(&self.payment_method).ok_or_else(|| {
            StoreError::Backend(format!("unknown payment method: {}", self.payment_method))
        })?;
        let status = TransactionStatus::parse(&self.status)
            .ok_or_else(|| StoreError::Backend(format!("unknown status: {}", self.status)))?;

        Ok(Transaction {
            id: self.id,
            customer_id: self.customer_id,
            original_amount: self.original_amount,
            discount_amount: self.discount_amount,
            final_amount: self.final_amount,
            savings: self.savings,
            payment_method,
            auth_code: self.auth_code,
            status,
            timestamp_str: self.timestamp_str,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OtpRow {
    id: i64,
    code: String,
    is_used: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl OtpRow {
    fn into_domain(self) -> Otp {
        Otp {
            id: self.id,
            code: self.code,
            is_used: self.is_used,
            created_at: self.created_at,
        }
    }
}
