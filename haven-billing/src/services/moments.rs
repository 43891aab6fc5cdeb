use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use haven_shared::errors::{AppError, AppResult, ErrorCode};

use crate::catalog;
use crate::models::{MomentBalance, NewPurchase, Purchase, UsageKind};
use crate::store::BillingStore;

/// Longest single voice call that can be charged in one request.
const MAX_VOICE_MINUTES: f64 = 240.0;
/// Largest deduction or credit accepted in one request.
pub const MAX_LEDGER_AMOUNT: i32 = 10_000;

fn invalid_amount(message: impl Into<String>) -> AppError {
    AppError::new(ErrorCode::InvalidAmount, message)
}

fn check_amount(amount: i32) -> AppResult<()> {
    if amount <= 0 {
        return Err(invalid_amount("amount must be positive"));
    }
    if amount > MAX_LEDGER_AMOUNT {
        return Err(invalid_amount(format!("amount cannot exceed {MAX_LEDGER_AMOUNT}")));
    }
    Ok(())
}

/// The user's balance, granting `starter` moments on first access.
pub async fn balance(
    store: &dyn BillingStore,
    starter: i32,
    user_id: Uuid,
) -> AppResult<MomentBalance> {
    let (balance, granted) = store.get_or_grant(user_id, starter).await?;
    if granted {
        tracing::info!(user_id = %user_id, starter, "starter moments granted");
    }
    Ok(balance)
}

pub async fn deduct(
    store: &dyn BillingStore,
    starter: i32,
    user_id: Uuid,
    amount: i32,
    kind: UsageKind,
    reference: Option<String>,
) -> AppResult<MomentBalance> {
    check_amount(amount)?;
    if !kind.is_debit() {
        return Err(AppError::bad_request(format!("{} cannot be deducted", kind.as_str())));
    }

    balance(store, starter, user_id).await?;
    let updated = store.deduct(user_id, amount, kind, reference).await?;

    metrics::counter!("haven_moments_deducted_total", "kind" => kind.as_str()).increment(amount as u64);
    tracing::debug!(user_id = %user_id, amount, kind = kind.as_str(), balance = updated.balance, "moments deducted");
    Ok(updated)
}

/// Refunds and manual grants. Purchases credit through [`purchase`].
pub async fn credit(
    store: &dyn BillingStore,
    starter: i32,
    user_id: Uuid,
    amount: i32,
    kind: UsageKind,
    reference: Option<String>,
) -> AppResult<MomentBalance> {
    check_amount(amount)?;
    if !matches!(kind, UsageKind::Refund | UsageKind::Grant) {
        return Err(AppError::bad_request(format!("{} cannot be credited", kind.as_str())));
    }

    balance(store, starter, user_id).await?;
    let updated = store.credit(user_id, amount, kind, reference).await?;

    metrics::counter!("haven_moments_credited_total", "kind" => kind.as_str()).increment(amount as u64);
    Ok(updated)
}

/// One moment per started minute.
pub fn voice_cost(minutes: f64) -> AppResult<i32> {
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(invalid_amount("minutes must be positive"));
    }
    if minutes > MAX_VOICE_MINUTES {
        return Err(invalid_amount(format!("a call cannot exceed {MAX_VOICE_MINUTES} minutes")));
    }
    Ok(minutes.ceil() as i32)
}

#[derive(Debug, Deserialize)]
pub struct VoiceUsageRequest {
    pub minutes: f64,
    /// Client call identifier, kept on the usage event.
    pub call_id: Option<String>,
}

pub async fn charge_voice(
    store: &dyn BillingStore,
    starter: i32,
    user_id: Uuid,
    req: VoiceUsageRequest,
) -> AppResult<(MomentBalance, i32)> {
    let cost = voice_cost(req.minutes)?;
    let balance = deduct(store, starter, user_id, cost, UsageKind::VoiceMinute, req.call_id).await?;
    Ok((balance, cost))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PurchaseRequest {
    #[validate(length(min = 1, max = 100))]
    pub product_id: String,
    #[validate(length(min = 1, max = 255))]
    pub transaction_id: String,
}

#[derive(Debug, Serialize)]
pub struct PurchaseOutcome {
    pub purchase: Purchase,
    pub balance: i32,
    /// False when the transaction id was already redeemed.
    pub credited: bool,
}

/// Credit a store purchase once per transaction id.
pub async fn purchase(
    store: &dyn BillingStore,
    starter: i32,
    user_id: Uuid,
    req: PurchaseRequest,
) -> AppResult<PurchaseOutcome> {
    req.validate()?;
    if req.transaction_id.trim().is_empty() {
        return Err(AppError::Validation("transaction_id must not be blank".into()));
    }
    let product = catalog::find(req.product_id.trim())?;

    balance(store, starter, user_id).await?;
    let (purchase, created, balance) = store
        .record_purchase(NewPurchase {
            user_id,
            product_id: product.id.to_string(),
            transaction_id: req.transaction_id.trim().to_string(),
            credits: product.credits,
        })
        .await?;

    if purchase.user_id != user_id {
        tracing::warn!(
            user_id = %user_id,
            transaction_id = %purchase.transaction_id,
            "transaction id already redeemed by another account"
        );
        return Err(AppError::forbidden("this transaction was already redeemed"));
    }

    if created {
        metrics::counter!("haven_purchases_total", "product" => product.id).increment(1);
        tracing::info!(
            user_id = %user_id,
            product_id = product.id,
            credits = product.credits,
            "purchase credited"
        );
    }

    Ok(PurchaseOutcome {
        purchase,
        balance: balance.balance,
        credited: created,
    })
}
