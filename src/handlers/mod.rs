// handlers/mod.rs - Two handler tiers
//
// Public (no auth) → Protected (JWT auth, every call acts for the token's user)
pub mod public;    // /api/user/create/, /api/user/token/
pub mod protected; // /api/user/me/, /api/recipe/*
