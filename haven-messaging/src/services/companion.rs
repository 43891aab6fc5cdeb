use serde::{Deserialize, Serialize};
use uuid::Uuid;

use haven_shared::errors::{AppError, AppResult};

use crate::clients::ai::ChatRole;
use crate::clients::{ChatTurn, CompletionClient, MomentLedger};

/// Moments charged per companion response.
pub const COMPANION_COST: i32 = 1;
const MAX_TURNS: usize = 20;

const COMPANION_PROMPT: &str = "You are Haven's companion, a warm and patient conversation partner for \
neurodivergent adults. Be direct and literal, avoid sarcasm, keep replies short, and ask at most one \
question at a time. Help with social practice, dating nerves, and winding down after a long day. \
You are not a therapist; suggest professional help when someone seems to be in crisis.";

#[derive(Debug, Deserialize)]
pub struct CompanionChatRequest {
    pub messages: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct CompanionReply {
    pub reply: String,
    pub balance: i32,
}

/// Charge one moment, ask the AI API, and refund the moment if the API fails.
pub async fn companion_chat(
    ledger: &dyn MomentLedger,
    completion: &dyn CompletionClient,
    user_id: Uuid,
    req: CompanionChatRequest,
) -> AppResult<CompanionReply> {
    let turns = trim_history(req.messages);
    match turns.last() {
        Some(last) if last.role == ChatRole::User && !last.content.trim().is_empty() => {}
        _ => {
            return Err(AppError::Validation(
                "the last message must be a non-empty user message".into(),
            ))
        }
    }

    let reference = Uuid::now_v7().to_string();
    let balance = ledger
        .deduct(user_id, COMPANION_COST, "ai_chat", Some(reference.clone()))
        .await?;

    match completion.complete(COMPANION_PROMPT, &turns).await {
        Ok(reply) => {
            metrics::counter!("haven_companion_replies_total").increment(1);
            Ok(CompanionReply { reply, balance })
        }
        Err(e) => {
            tracing::warn!(error = %e, user_id = %user_id, "companion reply failed, refunding");
            if let Err(refund_err) = ledger
                .credit(user_id, COMPANION_COST, "refund", Some(reference))
                .await
            {
                tracing::error!(
                    error = %refund_err,
                    user_id = %user_id,
                    "failed to refund companion moment"
                );
            }
            Err(e)
        }
    }
}

fn trim_history(mut turns: Vec<ChatTurn>) -> Vec<ChatTurn> {
    if turns.len() > MAX_TURNS {
        turns.drain(..turns.len() - MAX_TURNS);
    }
    turns
}
