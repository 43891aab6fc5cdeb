use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use haven_shared::clients::db::{checkout, DbPool};
use haven_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{
    MomentBalance, NewMomentBalance, NewPurchase, NewUsageEvent, Purchase, UsageEvent, UsageKind,
};
use crate::schema::{moment_balances, purchases, usage_events};

use super::BillingStore;

pub struct PgBillingStore {
    pool: DbPool,
}

impl PgBillingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Must run inside a transaction: the row lock holds until commit.
fn add_moments(conn: &mut PgConnection, user_id: Uuid, amount: i32) -> AppResult<MomentBalance> {
    let current = moment_balances::table
        .find(user_id)
        .select(moment_balances::balance)
        .for_update()
        .first::<i32>(conn)
        .optional()?;

    let Some(current) = current else {
        let balance = diesel::insert_into(moment_balances::table)
            .values(&NewMomentBalance {
                user_id,
                balance: amount,
            })
            .on_conflict(moment_balances::user_id)
            .do_update()
            .set((
                moment_balances::balance.eq(moment_balances::balance + amount),
                moment_balances::updated_at.eq(Utc::now()),
            ))
            .get_result::<MomentBalance>(conn)?;
        return Ok(balance);
    };

    let updated = current
        .checked_add(amount)
        .ok_or_else(|| AppError::new(ErrorCode::InvalidAmount, "balance would overflow"))?;
    let balance = diesel::update(moment_balances::table.find(user_id))
        .set((
            moment_balances::balance.eq(updated),
            moment_balances::updated_at.eq(Utc::now()),
        ))
        .get_result::<MomentBalance>(conn)?;
    Ok(balance)
}

fn log_usage(conn: &mut PgConnection, event: &NewUsageEvent) -> QueryResult<usize> {
    diesel::insert_into(usage_events::table).values(event).execute(conn)
}

#[async_trait]
impl BillingStore for PgBillingStore {
    async fn get_or_grant(&self, user_id: Uuid, starter: i32) -> AppResult<(MomentBalance, bool)> {
        let mut conn = checkout(&self.pool)?;

        conn.transaction::<_, AppError, _>(|conn| {
            let inserted = diesel::insert_into(moment_balances::table)
                .values(&NewMomentBalance {
                    user_id,
                    balance: starter,
                })
                .on_conflict(moment_balances::user_id)
                .do_nothing()
                .execute(conn)?;

            let granted = inserted == 1;
            if granted && starter > 0 {
                log_usage(conn, &NewUsageEvent::new(user_id, UsageKind::Grant, starter, None))?;
            }

            let balance = moment_balances::table
                .find(user_id)
                .first::<MomentBalance>(conn)?;
            Ok((balance, granted))
        })
    }

    async fn deduct(
        &self,
        user_id: Uuid,
        amount: i32,
        kind: UsageKind,
        reference: Option<String>,
    ) -> AppResult<MomentBalance> {
        let mut conn = checkout(&self.pool)?;

        conn.transaction::<_, AppError, _>(|conn| {
            // UPDATE ... WHERE balance >= amount keeps concurrent deductions from overdrawing.
            let updated = diesel::update(
                moment_balances::table
                    .filter(moment_balances::user_id.eq(user_id))
                    .filter(moment_balances::balance.ge(amount)),
            )
            .set((
                moment_balances::balance.eq(moment_balances::balance - amount),
                moment_balances::updated_at.eq(Utc::now()),
            ))
            .get_result::<MomentBalance>(conn)
            .optional()?;

            let Some(balance) = updated else {
                return Err(AppError::new(ErrorCode::InsufficientMoments, "not enough moments"));
            };

            log_usage(conn, &NewUsageEvent::new(user_id, kind, -amount, reference))?;
            Ok(balance)
        })
    }

    async fn credit(
        &self,
        user_id: Uuid,
        amount: i32,
        kind: UsageKind,
        reference: Option<String>,
    ) -> AppResult<MomentBalance> {
        let mut conn = checkout(&self.pool)?;

        conn.transaction::<_, AppError, _>(|conn| {
            let balance = add_moments(conn, user_id, amount)?;
            log_usage(conn, &NewUsageEvent::new(user_id, kind, amount, reference))?;
            Ok(balance)
        })
    }

    async fn record_purchase(
        &self,
        purchase: NewPurchase,
    ) -> AppResult<(Purchase, bool, MomentBalance)> {
        let mut conn = checkout(&self.pool)?;

        conn.transaction::<_, AppError, _>(|conn| {
            let inserted = diesel::insert_into(purchases::table)
                .values(&purchase)
                .on_conflict(purchases::transaction_id)
                .do_nothing()
                .get_result::<Purchase>(conn)
                .optional()?;

            match inserted {
                Some(stored) => {
                    let balance = add_moments(conn, stored.user_id, stored.credits)?;
                    log_usage(
                        conn,
                        &NewUsageEvent::new(
                            stored.user_id,
                            UsageKind::Purchase,
                            stored.credits,
                            Some(stored.transaction_id.clone()),
                        ),
                    )?;
                    Ok((stored, true, balance))
                }
                None => {
                    let existing = purchases::table
                        .filter(purchases::transaction_id.eq(&purchase.transaction_id))
                        .first::<Purchase>(conn)?;
                    let balance = moment_balances::table
                        .find(existing.user_id)
                        .first::<MomentBalance>(conn)?;
                    Ok((existing, false, balance))
                }
            }
        })
    }

    async fn list_usage(
        &self,
        user_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<UsageEvent>, i64)> {
        let mut conn = checkout(&self.pool)?;

        let total = usage_events::table
            .filter(usage_events::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        let events = usage_events::table
            .filter(usage_events::user_id.eq(user_id))
            .order(usage_events::created_at.desc())
            .offset(offset)
            .limit(limit)
            .load::<UsageEvent>(&mut conn)?;

        Ok((events, total))
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = checkout(&self.pool)?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }
}
