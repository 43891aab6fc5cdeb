use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use haven_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{MomentBalance, NewPurchase, NewUsageEvent, Purchase, UsageEvent, UsageKind};

use super::BillingStore;

#[derive(Default)]
pub struct MemoryBillingStore {
    balances: DashMap<Uuid, MomentBalance>,
    usage: DashMap<Uuid, Vec<UsageEvent>>,
    purchases: DashMap<String, Purchase>,
}

impl MemoryBillingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn purchase_count(&self) -> usize {
        self.purchases.len()
    }

    fn log_usage(&self, event: NewUsageEvent) {
        let stored = UsageEvent {
            id: Uuid::new_v4(),
            user_id: event.user_id,
            kind: event.kind,
            amount: event.amount,
            reference: event.reference,
            created_at: Utc::now(),
        };
        self.usage.entry(stored.user_id).or_default().push(stored);
    }

    fn add_moments(&self, user_id: Uuid, amount: i32) -> AppResult<MomentBalance> {
        let mut entry = self.balances.entry(user_id).or_insert_with(|| MomentBalance {
            user_id,
            balance: 0,
            updated_at: Utc::now(),
        });
        entry.balance = entry
            .balance
            .checked_add(amount)
            .ok_or_else(|| AppError::new(ErrorCode::InvalidAmount, "balance would overflow"))?;
        entry.updated_at = Utc::now();
        Ok(entry.value().clone())
    }
}

#[async_trait]
impl BillingStore for MemoryBillingStore {
    async fn get_or_grant(&self, user_id: Uuid, starter: i32) -> AppResult<(MomentBalance, bool)> {
        let (balance, granted) = match self.balances.entry(user_id) {
            Entry::Occupied(e) => (e.get().clone(), false),
            Entry::Vacant(e) => {
                let balance = MomentBalance {
                    user_id,
                    balance: starter,
                    updated_at: Utc::now(),
                };
                e.insert(balance.clone());
                (balance, true)
            }
        };

        if granted && starter > 0 {
            self.log_usage(NewUsageEvent::new(user_id, UsageKind::Grant, starter, None));
        }
        Ok((balance, granted))
    }

    async fn deduct(
        &self,
        user_id: Uuid,
        amount: i32,
        kind: UsageKind,
        reference: Option<String>,
    ) -> AppResult<MomentBalance> {
        let updated = match self.balances.get_mut(&user_id) {
            Some(mut row) if row.balance >= amount => {
                row.balance -= amount;
                row.updated_at = Utc::now();
                row.value().clone()
            }
            _ => return Err(AppError::new(ErrorCode::InsufficientMoments, "not enough moments")),
        };

        self.log_usage(NewUsageEvent::new(user_id, kind, -amount, reference));
        Ok(updated)
    }

    async fn credit(
        &self,
        user_id: Uuid,
        amount: i32,
        kind: UsageKind,
        reference: Option<String>,
    ) -> AppResult<MomentBalance> {
        let balance = self.add_moments(user_id, amount)?;
        self.log_usage(NewUsageEvent::new(user_id, kind, amount, reference));
        Ok(balance)
    }

    async fn record_purchase(
        &self,
        purchase: NewPurchase,
    ) -> AppResult<(Purchase, bool, MomentBalance)> {
        match self.purchases.entry(purchase.transaction_id.clone()) {
            Entry::Occupied(e) => {
                let stored = e.get().clone();
                let balance = self
                    .balances
                    .get(&stored.user_id)
                    .map(|b| b.value().clone())
                    .ok_or_else(|| AppError::not_found("balance not found"))?;
                Ok((stored, false, balance))
            }
            Entry::Vacant(e) => {
                // Credit before recording so a failed credit leaves no purchase behind.
                let balance = self.add_moments(purchase.user_id, purchase.credits)?;
                let stored = Purchase {
                    id: Uuid::new_v4(),
                    user_id: purchase.user_id,
                    product_id: purchase.product_id,
                    transaction_id: purchase.transaction_id,
                    credits: purchase.credits,
                    created_at: Utc::now(),
                };
                e.insert(stored.clone());
                self.log_usage(NewUsageEvent::new(
                    stored.user_id,
                    UsageKind::Purchase,
                    stored.credits,
                    Some(stored.transaction_id.clone()),
                ));
                Ok((stored, true, balance))
            }
        }
    }

    async fn list_usage(
        &self,
        user_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<UsageEvent>, i64)> {
        let Some(events) = self.usage.get(&user_id) else {
            return Ok((vec![], 0));
        };

        let total = events.len() as i64;
        let page = events
            .iter()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_read_grants_once() {
        let store = MemoryBillingStore::new();
        let user = Uuid::new_v4();

        let (first, granted) = store.get_or_grant(user, 20).await.unwrap();
        assert!(granted);
        assert_eq!(first.balance, 20);

        let (second, granted) = store.get_or_grant(user, 20).await.unwrap();
        assert!(!granted);
        assert_eq!(second.balance, 20);

        let (usage, total) = store.list_usage(user, 0, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(usage[0].kind, "grant");
    }

    #[tokio::test]
    async fn overdraw_leaves_balance_and_log_untouched() {
        let store = MemoryBillingStore::new();
        let user = Uuid::new_v4();
        store.get_or_grant(user, 2).await.unwrap();

        let err = store.deduct(user, 3, UsageKind::VoiceMinute, None).await.unwrap_err();
        assert!(err.is(ErrorCode::InsufficientMoments));

        let (balance, _) = store.get_or_grant(user, 2).await.unwrap();
        assert_eq!(balance.balance, 2);
        assert_eq!(store.list_usage(user, 0, 10).await.unwrap().1, 1);
    }

    #[tokio::test]
    async fn credit_that_would_overflow_is_rejected() {
        let store = MemoryBillingStore::new();
        let user = Uuid::new_v4();
        store.get_or_grant(user, 20).await.unwrap();

        let err = store.credit(user, i32::MAX, UsageKind::Grant, None).await.unwrap_err();
        assert!(err.is(ErrorCode::InvalidAmount));

        let (balance, _) = store.get_or_grant(user, 20).await.unwrap();
        assert_eq!(balance.balance, 20);
        assert_eq!(store.list_usage(user, 0, 10).await.unwrap().1, 1);
    }

    #[tokio::test]
    async fn deduct_without_balance_row_is_insufficient() {
        let store = MemoryBillingStore::new();
        let err = store
            .deduct(Uuid::new_v4(), 1, UsageKind::AiChat, None)
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::InsufficientMoments));
    }

    #[tokio::test]
    async fn usage_is_newest_first_and_paged() {
        let store = MemoryBillingStore::new();
        let user = Uuid::new_v4();
        store.get_or_grant(user, 10).await.unwrap();
        store.deduct(user, 1, UsageKind::AiChat, Some("a".into())).await.unwrap();
        store.deduct(user, 2, UsageKind::VoiceMinute, Some("b".into())).await.unwrap();

        let (page, total) = store.list_usage(user, 0, 2).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page[0].amount, -2);
        assert_eq!(page[1].reference.as_deref(), Some("a"));

        let (rest, _) = store.list_usage(user, 2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].kind, "grant");
    }
}
