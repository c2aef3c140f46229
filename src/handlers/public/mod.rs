// handlers/public/mod.rs - handlers reachable without a session
//
// Route prefix: none (`/`, `/health`, `/auth/*`)

pub mod auth;
pub mod health;
