// handlers/mod.rs - three access tiers
//
// Public (no session) -> Protected (landlord or boarder session) ->
// Elevated (admin session). The tier a handler lives in matches the
// middleware layered over its routes in `routes.rs`.

pub mod elevated;
pub mod protected;
pub mod public;
