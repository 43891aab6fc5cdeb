pub mod companion;
pub mod conversation_service;
pub mod reply_service;
