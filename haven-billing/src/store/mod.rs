//! Persistence boundary for balances, the usage log and purchases.
//!
//! Every balance change and its usage event are written together: both or neither.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use haven_shared::errors::AppResult;

use crate::models::{MomentBalance, NewPurchase, Purchase, UsageEvent, UsageKind};

pub use memory::MemoryBillingStore;
pub use postgres::PgBillingStore;

#[async_trait]
pub trait BillingStore: Send + Sync {
    /// The user's balance. The first call creates it with `starter` moments and
    /// logs a grant; the flag is true when this call did so.
    async fn get_or_grant(&self, user_id: Uuid, starter: i32) -> AppResult<(MomentBalance, bool)>;

    /// Subtract `amount` only if the balance covers it. Fails with
    /// `InsufficientMoments` and leaves the balance unchanged otherwise.
    async fn deduct(
        &self,
        user_id: Uuid,
        amount: i32,
        kind: UsageKind,
        reference: Option<String>,
    ) -> AppResult<MomentBalance>;

    async fn credit(
        &self,
        user_id: Uuid,
        amount: i32,
        kind: UsageKind,
        reference: Option<String>,
    ) -> AppResult<MomentBalance>;

    /// Insert-if-absent on the transaction id, crediting only on insert.
    /// A repeat returns the stored purchase, the flag false, and the purchaser's balance.
    async fn record_purchase(
        &self,
        purchase: NewPurchase,
    ) -> AppResult<(Purchase, bool, MomentBalance)>;

    /// Newest first, with the total count.
    async fn list_usage(
        &self,
        user_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<UsageEvent>, i64)>;

    async fn ping(&self) -> AppResult<()>;
}
