// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Route prefix: /api/user/me/, /api/recipe/*
// Middleware: jwt_auth_middleware inserts the AuthUser extension
pub mod recipe; // Tags, ingredients, recipes and recipe images
pub mod user;   // The authenticated user's own profile
