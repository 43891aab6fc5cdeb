use uuid::Uuid;

use haven_shared::clients::rabbitmq::RabbitMQClient;
use haven_shared::types::event::{payloads, routing_keys, Event};

use crate::models::Match;

const SOURCE: &str = "haven-matching";

pub async fn publish_swipe_recorded(
    rabbitmq: Option<&RabbitMQClient>,
    actor_id: Uuid,
    target_id: Uuid,
    liked: bool,
) {
    let Some(rabbitmq) = rabbitmq else { return };
    let event = Event::new(
        SOURCE,
        routing_keys::MATCHING_SWIPE_RECORDED,
        payloads::SwipeRecorded {
            actor_id,
            target_id,
            liked,
        },
    )
    .with_user(actor_id);

    rabbitmq.publish_logged(&event).await;
}

pub async fn publish_match_created(
    rabbitmq: Option<&RabbitMQClient>,
    row: &Match,
    initiator_id: Uuid,
    with_seeded_profile: bool,
) {
    let Some(rabbitmq) = rabbitmq else { return };
    let event = Event::new(
        SOURCE,
        routing_keys::MATCHING_MATCH_CREATED,
        payloads::MatchCreated {
            match_id: row.id,
            conversation_id: row.conversation_id,
            user_low: row.user_low,
            user_high: row.user_high,
            with_seeded_profile,
        },
    )
    .with_user(initiator_id);

    rabbitmq.publish_logged(&event).await;
}

pub async fn publish_profile_deleted(rabbitmq: Option<&RabbitMQClient>, profile_id: Uuid) {
    let Some(rabbitmq) = rabbitmq else { return };
    let event = Event::new(
        SOURCE,
        routing_keys::MATCHING_PROFILE_DELETED,
        payloads::ProfileDeleted { profile_id },
    )
    .with_user(profile_id);

    rabbitmq.publish_logged(&event).await;
}
