pub mod health;
pub mod internal;
pub mod moments;
pub mod products;
