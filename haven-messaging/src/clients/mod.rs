//! Outbound calls to the other Haven services and the AI API.

pub mod ai;
pub mod ledger;
pub mod profiles;

pub use ai::{ChatTurn, CompletionClient, HttpCompletionClient};
pub use ledger::{HttpMomentLedger, MomentLedger};
pub use profiles::{HttpProfileDirectory, ProfileDirectory};
