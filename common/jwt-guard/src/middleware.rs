//! Request gate for axum routers.
//!
//! ```rust,ignore
//! let guard = Guard::new(secret).with_leeway(30);
//!
//! let app = Router::new()
//!     .route("/claims", get(show_claims))
//!     .layer(axum::middleware::from_fn_with_state(guard, authenticate));
//! ```
//!
//! Handlers behind the layer take [`Claims`] as an extractor.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::claims::Claims;
use crate::error::Rejection;
use crate::guard::Guard;
use crate::verifier::RequestGate;

/// Runs the gate before the handler. On success the verified [`Claims`] are
/// inserted into the request extensions; on failure the handler never runs.
pub async fn authenticate(State(guard): State<Guard>, mut request: Request, next: Next) -> Response {
    match admit(&guard, &mut request) {
        Ok(()) => next.run(request).await,
        Err(rejection) => {
            debug!(
                code = rejection.code(),
                path = %request.uri().path(),
                "rejected request"
            );
            rejection.into_response()
        }
    }
}

fn admit<G: RequestGate>(gate: &G, request: &mut Request) -> Result<(), Rejection> {
    let claims: Claims = gate.check(request.headers().get(AUTHORIZATION))?;
    request.extensions_mut().insert(claims);
    Ok(())
}
