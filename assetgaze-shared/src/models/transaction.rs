/// Transaction model and database operations
///
/// A transaction records a single buy or sell of a security (identified by
/// ISIN) inside one account and tax wrapper. Monetary and quantity columns
/// are `NUMERIC` in Postgres and [`Decimal`] in Rust.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE transaction_type AS ENUM ('buy', 'sell');
/// CREATE TYPE tax_wrapper AS ENUM ('isa', 'sipp', 'gia');
///
/// CREATE TABLE transactions (
///     id UUID PRIMARY KEY,
///     transaction_type transaction_type NOT NULL,
///     broker_id UUID NOT NULL REFERENCES brokers(id),
///     account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
///     tax_wrapper tax_wrapper NOT NULL,
///     isin CHAR(12) NOT NULL,
///     transaction_date TIMESTAMPTZ NOT NULL,
///     quantity NUMERIC(20, 8) NOT NULL,
///     native_price NUMERIC(20, 8) NOT NULL,
///     local_price NUMERIC(20, 8) NOT NULL,
///     consideration NUMERIC(20, 4) NOT NULL,
///     broker_charge NUMERIC(20, 4),
///     stamp_duty NUMERIC(20, 4),
///     fx_charge NUMERIC(20, 4),
///     accrued_interest NUMERIC(20, 4),
///     broker_deal_reference VARCHAR(100)
/// );
/// ```
///
/// # JSON
///
/// Field names are camelCase. Decimals serialize as strings and accept
/// either strings or numbers on input.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
pub enum TransactionType {
    Buy,
    Sell,
}

/// Tax wrapper the holding sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tax_wrapper", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum TaxWrapper {
    /// Individual Savings Account
    Isa,

    /// Self-Invested Personal Pension
    Sipp,

    /// General Investment Account
    Gia,
}

/// Stored transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub transaction_type: TransactionType,
    pub broker_id: Uuid,
    pub account_id: Uuid,
    pub tax_wrapper: TaxWrapper,
    pub isin: String,
    pub transaction_date: DateTime<Utc>,
    pub quantity: Decimal,
    pub native_price: Decimal,
    pub local_price: Decimal,
    pub consideration: Decimal,
    pub broker_charge: Option<Decimal>,
    pub stamp_duty: Option<Decimal>,
    pub fx_charge: Option<Decimal>,
    pub accrued_interest: Option<Decimal>,
    pub broker_deal_reference: Option<String>,
}

/// Every caller-supplied field of a transaction
///
/// Used as the body of both create and update requests: an update
/// overwrites all of these on the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFields {
    pub transaction_type: TransactionType,

    pub broker_id: Uuid,

    pub account_id: Uuid,

    pub tax_wrapper: TaxWrapper,

    /// 12-character International Securities Identification Number
    #[validate(length(equal = 12, message = "ISIN must be exactly 12 characters"))]
    pub isin: String,

    pub transaction_date: DateTime<Utc>,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    pub native_price: Decimal,

    pub local_price: Decimal,

    pub consideration: Decimal,

    #[serde(default)]
    pub broker_charge: Option<Decimal>,

    #[serde(default)]
    pub stamp_duty: Option<Decimal>,

    #[serde(default)]
    pub fx_charge: Option<Decimal>,

    #[serde(default)]
    pub accrued_interest: Option<Decimal>,

    #[serde(default)]
    #[validate(length(max = 100, message = "Broker deal reference must be at most 100 characters"))]
    pub broker_deal_reference: Option<String>,
}

fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        let mut err = ValidationError::new("positive");
        err.message = Some("Quantity must be greater than zero".into());
        Err(err)
    }
}

impl Transaction {
    /// Builds a new transaction with a fresh ID
    pub fn from_fields(fields: TransactionFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_type: fields.transaction_type,
            broker_id: fields.broker_id,
            account_id: fields.account_id,
            tax_wrapper: fields.tax_wrapper,
            isin: fields.isin,
            transaction_date: fields.transaction_date,
            quantity: fields.quantity,
            native_price: fields.native_price,
            local_price: fields.local_price,
            consideration: fields.consideration,
            broker_charge: fields.broker_charge,
            stamp_duty: fields.stamp_duty,
            fx_charge: fields.fx_charge,
            accrued_interest: fields.accrued_interest,
            broker_deal_reference: fields.broker_deal_reference,
        }
    }

    /// Overwrites every mutable field, keeping the ID
    pub fn apply(&mut self, fields: TransactionFields) {
        let id = self.id;
        *self = Self::from_fields(fields);
        self.id = id;
    }

    /// Inserts a transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the broker or account doesn't exist (foreign key
    /// violation) or the database connection fails.
    pub async fn create(pool: &PgPool, tx: &Transaction) -> Result<Self, sqlx::Error> {
        let created = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                id, transaction_type, broker_id, account_id, tax_wrapper, isin,
                transaction_date, quantity, native_price, local_price, consideration,
                broker_charge, stamp_duty, fx_charge, accrued_interest, broker_deal_reference
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id, transaction_type, broker_id, account_id, tax_wrapper, isin,
                      transaction_date, quantity, native_price, local_price, consideration,
                      broker_charge, stamp_duty, fx_charge, accrued_interest, broker_deal_reference
            "#,
        )
        .bind(tx.id)
        .bind(tx.transaction_type)
        .bind(tx.broker_id)
        .bind(tx.account_id)
        .bind(tx.tax_wrapper)
        .bind(&tx.isin)
        .bind(tx.transaction_date)
        .bind(tx.quantity)
        .bind(tx.native_price)
        .bind(tx.local_price)
        .bind(tx.consideration)
        .bind(tx.broker_charge)
        .bind(tx.stamp_duty)
        .bind(tx.fx_charge)
        .bind(tx.accrued_interest)
        .bind(&tx.broker_deal_reference)
        .fetch_one(pool)
        .await?;

        Ok(created)
    }

    /// Finds a transaction by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let tx = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, transaction_type, broker_id, account_id, tax_wrapper, isin,
                   transaction_date, quantity, native_price, local_price, consideration,
                   broker_charge, stamp_duty, fx_charge, accrued_interest, broker_deal_reference
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(tx)
    }

    /// Overwrites a stored transaction
    ///
    /// Returns false if no row has this ID.
    pub async fn update(pool: &PgPool, tx: &Transaction) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET transaction_type = $2,
                broker_id = $3,
                account_id = $4,
                tax_wrapper = $5,
                isin = $6,
                transaction_date = $7,
                quantity = $8,
                native_price = $9,
                local_price = $10,
                consideration = $11,
                broker_charge = $12,
                stamp_duty = $13,
                fx_charge = $14,
                accrued_interest = $15,
                broker_deal_reference = $16
            WHERE id = $1
            "#,
        )
        .bind(tx.id)
        .bind(tx.transaction_type)
        .bind(tx.broker_id)
        .bind(tx.account_id)
        .bind(tx.tax_wrapper)
        .bind(&tx.isin)
        .bind(tx.transaction_date)
        .bind(tx.quantity)
        .bind(tx.native_price)
        .bind(tx.local_price)
        .bind(tx.consideration)
        .bind(tx.broker_charge)
        .bind(tx.stamp_duty)
        .bind(tx.fx_charge)
        .bind(tx.accrued_interest)
        .bind(&tx.broker_deal_reference)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a transaction
    ///
    /// Returns true if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists transactions in any of the given accounts, newest first
    pub async fn find_by_account_ids(
        pool: &PgPool,
        account_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        if account_ids.is_empty() {
            return Ok(Vec::new());
        }

        let txs = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, transaction_type, broker_id, account_id, tax_wrapper, isin,
                   transaction_date, quantity, native_price, local_price, consideration,
                   broker_charge, stamp_duty, fx_charge, accrued_interest, broker_deal_reference
            FROM transactions
            WHERE account_id = ANY($1)
            ORDER BY transaction_date DESC, id ASC
            "#,
        )
        .bind(account_ids)
        .fetch_all(pool)
        .await?;

        Ok(txs)
    }
}
