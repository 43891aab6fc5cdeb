use haven_shared::clients::rabbitmq::RabbitMQClient;
use haven_shared::types::event::{payloads, routing_keys, Event};

use crate::models::Message;
use crate::services::conversation_service::preview;

const SOURCE: &str = "haven-messaging";

pub async fn publish_message_sent(rabbitmq: Option<&RabbitMQClient>, message: &Message) {
    let Some(rabbitmq) = rabbitmq else { return };
    let event = Event::new(
        SOURCE,
        routing_keys::MESSAGING_MESSAGE_SENT,
        payloads::MessageSent {
            message_id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            content_preview: preview(message),
        },
    )
    .with_user(message.sender_id);

    rabbitmq.publish_logged(&event).await;
}
