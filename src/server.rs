use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::{self, SecurityConfig};
use crate::handlers::{protected, public};
use crate::is_development;
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full application router: public routes, JWT-protected API, uploaded media
pub fn app(state: AppState) -> Router {
    let config = config::config();

    let protected = Router::new()
        .merge(user_routes())
        .merge(recipe_routes())
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected API
        .merge(protected);

    let media_prefix = state.images.url_prefix().trim_end_matches('/').to_string();
    if media_prefix.starts_with('/') {
        router = router.nest_service(&media_prefix, ServeDir::new(state.images.root()));
    } else {
        info!("Media prefix {:?} is not a local path, uploads are not served", media_prefix);
    }

    let router = router.layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));
    let router = match cors_layer(&config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/create/", post(public::user_create))
        .route("/api/user/token/", post(public::user_token))
}

fn user_routes() -> Router<AppState> {
    use protected::user;

    Router::new().route("/api/user/me/", get(user::get).put(user::put).patch(user::patch))
}

fn recipe_routes() -> Router<AppState> {
    use protected::recipe;

    Router::new()
        .route("/api/recipe/tags/", get(recipe::tag_list).post(recipe::tag_create))
        .route(
            "/api/recipe/ingredients/",
            get(recipe::ingredient_list).post(recipe::ingredient_create),
        )
        // Collection
        .route("/api/recipe/recipes/", get(recipe::recipe_list).post(recipe::recipe_create))
        // Record
        .route(
            "/api/recipe/recipes/:id/",
            get(recipe::recipe_get)
                .put(recipe::recipe_put)
                .patch(recipe::recipe_patch)
                .delete(recipe::recipe_delete),
        )
        .route(
            "/api/recipe/recipes/:id/upload-image/",
            post(recipe::recipe_upload_image),
        )
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if is_development!() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Recipe API",
            "version": version,
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "user": "/api/user/create/, /api/user/token/ (public), /api/user/me/ (protected)",
                "tags": "/api/recipe/tags/ (protected)",
                "ingredients": "/api/recipe/ingredients/ (protected)",
                "recipes": "/api/recipe/recipes/[:id/[upload-image/]] (protected)",
                "media": "/media/* (public)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
