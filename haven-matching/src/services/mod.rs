pub mod match_service;
pub mod profile_service;
pub mod seed;
pub mod swipe_service;
