//! PostgreSQL implementation of AccountRepository over the `profiles` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::billing::{Account, SubscriptionState, SubscriptionStatus, SubscriptionTier};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::AccountRepository;

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of the subscription slice of a profile.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: String,
    email: String,
    subscription_tier: String,
    subscription_status: Option<String>,
    subscription_start_date: Option<DateTime<Utc>>,
    subscription_end_date: Option<DateTime<Utc>>,
    paystack_subscription_code: Option<String>,
    subscription_updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProfileRow> for Account {
    type Error = DomainError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let user_id = UserId::new(row.id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid profile id: {}", e))
        })?;

        Ok(Account {
            user_id,
            email: row.email,
            subscription: SubscriptionState {
                tier: parse_tier(&row.subscription_tier)?,
                status: row
                    .subscription_status
                    .as_deref()
                    .map(parse_status)
                    .transpose()?,
                start_date: row.subscription_start_date.map(Timestamp::from_datetime),
                end_date: row.subscription_end_date.map(Timestamp::from_datetime),
                provider_subscription_code: row.paystack_subscription_code,
                updated_at: row.subscription_updated_at.map(Timestamp::from_datetime),
            },
        })
    }
}

fn parse_tier(s: &str) -> Result<SubscriptionTier, DomainError> {
    SubscriptionTier::parse(s).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid tier value: {}", e))
    })
}

fn parse_status(s: &str) -> Result<SubscriptionStatus, DomainError> {
    SubscriptionStatus::parse(s).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid status value: {}", e))
    })
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, email, subscription_tier, subscription_status, subscription_start_date,
                   subscription_end_date, paystack_subscription_code, subscription_updated_at
            FROM profiles
            WHERE lower(email) = lower($1)
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find profile by email: {}", e)))?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_subscription_code(
        &self,
        code: &str,
    ) -> Result<Option<Account>, DomainError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, email, subscription_tier, subscription_status, subscription_start_date,
                   subscription_end_date, paystack_subscription_code, subscription_updated_at
            FROM profiles
            WHERE paystack_subscription_code = $1
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to find profile by subscription: {}", e))
        })?;

        row.map(Account::try_from).transpose()
    }

    async fn update_subscription(
        &self,
        user_id: &UserId,
        subscription: &SubscriptionState,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                subscription_tier = $2,
                subscription_status = $3,
                subscription_start_date = $4,
                subscription_end_date = $5,
                paystack_subscription_code = $6,
                subscription_updated_at = $7,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_str())
        .bind(subscription.tier.as_str())
        .bind(subscription.status.map(|s| s.as_str()))
        .bind(subscription.start_date.map(|t| *t.as_datetime()))
        .bind(subscription.end_date.map(|t| *t.as_datetime()))
        .bind(&subscription.provider_subscription_code)
        .bind(subscription.updated_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update subscription: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Profile {} not found", user_id),
            ));
        }

        Ok(())
    }

    async fn find_lapsed(&self, now: Timestamp, limit: u32) -> Result<Vec<Account>, DomainError> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, email, subscription_tier, subscription_status, subscription_start_date,
                   subscription_end_date, paystack_subscription_code, subscription_updated_at
            FROM profiles
            WHERE subscription_status IN ('active', 'expiring', 'payment_failed')
              AND subscription_end_date IS NOT NULL
              AND subscription_end_date < $1
            ORDER BY subscription_end_date ASC
            LIMIT $2
            "#,
        )
        .bind(now.as_datetime())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find lapsed profiles: {}", e)))?;

        rows.into_iter().map(Account::try_from).collect()
    }
}
