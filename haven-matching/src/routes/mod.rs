pub mod deck;
pub mod health;
pub mod internal;
pub mod matches;
pub mod profile;
pub mod swipes;
