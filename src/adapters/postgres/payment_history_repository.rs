//! PostgreSQL implementation of PaymentHistoryRepository.
//!
//! Amounts are written as `NUMERIC(14,2)` major units and read back as text,
//! so no value passes through a float on either side.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::billing::{Money, PaymentRecord, PaymentStatus};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::{PaymentHistoryRepository, SaveResult};

pub struct PostgresPaymentHistoryRepository {
    pool: PgPool,
}

impl PostgresPaymentHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    user_id: String,
    amount: String,
    currency: String,
    payment_method: String,
    payment_reference: String,
    payment_status: String,
    payment_data: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(PaymentRecord {
            user_id: UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            amount: parse_major_amount(&row.amount)?,
            currency: row.currency,
            payment_method: row.payment_method,
            payment_reference: row.payment_reference,
            payment_status: parse_status(&row.payment_status)?,
            payment_data: row.payment_data,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_status(s: &str) -> Result<PaymentStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(PaymentStatus::Pending),
        "success" => Ok(PaymentStatus::Success),
        "failed" => Ok(PaymentStatus::Failed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid payment status value: {}", s),
        )),
    }
}

/// Parses a `NUMERIC(14,2)` text rendering such as `"1500.00"` or `"-3.5"`.
fn parse_major_amount(s: &str) -> Result<Money, DomainError> {
    let invalid =
        || DomainError::new(ErrorCode::DatabaseError, format!("Invalid amount value: {}", s));

    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() || fraction.len() > 2 {
        return Err(invalid());
    }

    let whole: i64 = whole.parse().map_err(|_| invalid())?;
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    let minor = whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(invalid)?;
    Ok(Money::from_minor(if negative { -minor } else { minor }))
}

#[async_trait]
impl PaymentHistoryRepository for PostgresPaymentHistoryRepository {
    async fn insert(&self, record: &PaymentRecord) -> Result<SaveResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO payment_history (
                user_id, amount, currency, payment_method, payment_reference,
                payment_status, payment_data, created_at
            ) VALUES ($1, $2::numeric, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (payment_reference) DO NOTHING
            "#,
        )
        .bind(record.user_id.as_str())
        .bind(record.amount.to_major_string())
        .bind(&record.currency)
        .bind(&record.payment_method)
        .bind(&record.payment_reference)
        .bind(record.payment_status.as_str())
        .bind(&record.payment_data)
        .bind(record.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert payment: {}", e)))?;

        if result.rows_affected() == 0 {
            Ok(SaveResult::AlreadyExists)
        } else {
            Ok(SaveResult::Inserted)
        }
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT user_id, amount::text AS amount, currency, payment_method, payment_reference,
                   payment_status, payment_data, created_at
            FROM payment_history
            WHERE payment_reference = $1
            "#,
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find payment: {}", e)))?;

        row.map(PaymentRecord::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_decimal_amounts() {
        assert_eq!(parse_major_amount("1500.00").unwrap().minor_units(), 150000);
        assert_eq!(parse_major_amount("0.05").unwrap().minor_units(), 5);
        assert_eq!(parse_major_amount("-12.34").unwrap().minor_units(), -1234);
    }

    #[test]
    fn parses_short_fractions() {
        assert_eq!(parse_major_amount("3.5").unwrap().minor_units(), 350);
        assert_eq!(parse_major_amount("42").unwrap().minor_units(), 4200);
    }

    #[test]
    fn rejects_garbage_amounts() {
        assert!(parse_major_amount("").is_err());
        assert!(parse_major_amount("abc").is_err());
        assert!(parse_major_amount("1.234").is_err());
        assert!(parse_major_amount(".50").is_err());
    }

    #[test]
    fn major_string_round_trips_through_parser() {
        for minor in [0, 1, 99, 100, 150000, -250] {
            let money = Money::from_minor(minor);
            assert_eq!(parse_major_amount(&money.to_major_string()).unwrap(), money);
        }
    }

    #[test]
    fn parse_status_works_for_all_values() {
        assert_eq!(parse_status("pending").unwrap(), PaymentStatus::Pending);
        assert_eq!(parse_status("success").unwrap(), PaymentStatus::Success);
        assert_eq!(parse_status("FAILED").unwrap(), PaymentStatus::Failed);
        assert!(parse_status("refunded").is_err());
    }
}
