use std::sync::Arc;

use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;

use haven_shared::clients::rabbitmq::RabbitMQClient;
use haven_shared::types::event::{payloads, routing_keys, Event};

use crate::socket::ConversationNotifier;

/// Listen for match.created events and tell both participants over their sockets.
pub async fn listen_match_created(
    rabbitmq: RabbitMQClient,
    notifier: Arc<dyn ConversationNotifier>,
) -> anyhow::Result<()> {
    let mut consumer = rabbitmq
        .subscribe(
            "haven-messaging.matching.match.created",
            &[routing_keys::MATCHING_MATCH_CREATED],
        )
        .await?;

    tracing::info!("listening for match.created events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                handle_match_created(notifier.as_ref(), &delivery.data);
                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "consumer error");
            }
        }
    }

    Ok(())
}

fn handle_match_created(notifier: &dyn ConversationNotifier, body: &[u8]) {
    match serde_json::from_slice::<Event<payloads::MatchCreated>>(body) {
        Ok(event) => {
            tracing::info!(
                match_id = %event.data.match_id,
                conversation_id = %event.data.conversation_id,
                "received match.created event"
            );
            notifier.match_created(&event.data);
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to deserialize match.created event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingNotifier;
    use uuid::Uuid;

    #[test]
    fn match_event_is_forwarded_to_sockets() {
        let notifier = RecordingNotifier::default();
        let match_id = Uuid::new_v4();
        let event = Event::new(
            "haven-matching",
            routing_keys::MATCHING_MATCH_CREATED,
            payloads::MatchCreated {
                match_id,
                conversation_id: Uuid::new_v4(),
                user_low: Uuid::new_v4(),
                user_high: Uuid::new_v4(),
                with_seeded_profile: false,
            },
        );

        handle_match_created(&notifier, &serde_json::to_vec(&event).unwrap());
        handle_match_created(&notifier, b"not json");

        assert_eq!(notifier.matches(), vec![match_id]);
    }
}
