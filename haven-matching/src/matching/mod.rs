pub mod compatibility;
pub mod deck;
