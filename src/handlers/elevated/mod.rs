// handlers/elevated/mod.rs - admin-only handlers
//
// Route prefix: /api/admin/*

pub mod users;
