pub mod companion;
pub mod conversations;
pub mod health;
pub mod internal;
pub mod messages;
