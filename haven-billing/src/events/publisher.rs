use uuid::Uuid;

use haven_shared::clients::rabbitmq::RabbitMQClient;
use haven_shared::types::event::{payloads, routing_keys, Event};

use crate::models::{Purchase, UsageKind};

const SOURCE: &str = "haven-billing";

pub async fn publish_moments_purchased(rabbitmq: Option<&RabbitMQClient>, purchase: &Purchase) {
    let Some(rabbitmq) = rabbitmq else { return };
    let event = Event::new(
        SOURCE,
        routing_keys::BILLING_MOMENTS_PURCHASED,
        payloads::MomentsPurchased {
            user_id: purchase.user_id,
            product_id: purchase.product_id.clone(),
            transaction_id: purchase.transaction_id.clone(),
            credits: purchase.credits,
        },
    )
    .with_user(purchase.user_id);

    rabbitmq.publish_logged(&event).await;
}

pub async fn publish_moments_deducted(
    rabbitmq: Option<&RabbitMQClient>,
    user_id: Uuid,
    amount: i32,
    kind: UsageKind,
    balance: i32,
) {
    let Some(rabbitmq) = rabbitmq else { return };
    let event = Event::new(
        SOURCE,
        routing_keys::BILLING_MOMENTS_DEDUCTED,
        payloads::MomentsDeducted {
            user_id,
            amount,
            kind: kind.as_str().to_string(),
            balance,
        },
    )
    .with_user(user_id);

    rabbitmq.publish_logged(&event).await;
}
