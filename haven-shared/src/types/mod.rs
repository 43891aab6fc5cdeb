pub mod api;
pub mod auth;
pub mod event;
pub mod pagination;
pub mod pair;
pub mod profile;

pub use api::*;
pub use auth::*;
pub use event::*;
pub use pagination::*;
pub use pair::*;
pub use profile::*;
