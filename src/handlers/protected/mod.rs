// handlers/protected/mod.rs - handlers behind a landlord, boarder or
// any-session layer
//
// Route prefix: /api/*

pub mod boarders;
pub mod dashboard;
pub mod payments;
pub mod portal;
pub mod rooms;
pub mod session;
pub mod utilities;
