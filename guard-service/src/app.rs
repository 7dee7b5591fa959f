use axum::extract::FromRef;
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use jwt_guard::{authenticate, Authenticated, Claims, Guard};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub guard: Guard,
}

impl FromRef<AppState> for Guard {
    fn from_ref(state: &AppState) -> Self {
        state.guard.clone()
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn show_claims(claims: Claims) -> Json<Claims> {
    Json(claims)
}

/// Verifies in the extractor instead of the layer and adds the decoded lifetime.
async fn session(auth: Authenticated) -> Json<Value> {
    let claims = auth.into_claims();
    Json(json!({
        "expires_at": claims.expires_at().map(|at| at.to_rfc3339()),
        "issuer": claims.issuer(),
        "claims": claims,
    }))
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/claims", get(show_claims))
        .route_layer(from_fn_with_state(state.guard.clone(), authenticate));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/healthz", get(health))
        .route("/session", get(session))
        .merge(protected)
        .with_state(state)
        .layer(cors)
}
