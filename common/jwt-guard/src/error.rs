use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type IssueResult<T> = Result<T, IssueError>;

/// Failure to build a token. Raised to the caller of `generate`, never to a client.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("signing secret is empty")]
    EmptySecret,
    #[error("failed to encode token: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for IssueError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::Encoding(value.to_string())
    }
}

/// Why the gate refused a request. Every variant maps to a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("authorization header missing")]
    MissingCredential,
    #[error("authorization header malformed")]
    MalformedHeader,
    #[error("token expired")]
    ExpiredToken,
    #[error("token invalid")]
    InvalidToken,
}

impl Rejection {
    /// Stable machine-readable code carried in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::MissingCredential => "missing_credential",
            Rejection::MalformedHeader => "malformed_header",
            Rejection::ExpiredToken => "token_expired",
            Rejection::InvalidToken => "token_invalid",
        }
    }

    /// User-facing message. The expired-token text is relied on by clients.
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::MissingCredential => "Missing Authorization header.",
            Rejection::MalformedHeader => "Authorization header must use the Bearer scheme.",
            Rejection::ExpiredToken => "The provided token is expired.",
            Rejection::InvalidToken => "The provided token is invalid.",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    title: &'static str,
    description: &'static str,
    code: &'static str,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            title: "401 Unauthorized",
            description: self.message(),
            code: self.code(),
        };
        let mut resp = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        resp.headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};

    async fn body_json(resp: Response) -> Value {
        let bytes = resp.into_body().collect().await.expect("body").to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn expired_rejection_renders_fixed_message() {
        let resp = Rejection::ExpiredToken.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
        assert_eq!(
            body_json(resp).await,
            json!({
                "title": "401 Unauthorized",
                "description": "The provided token is expired.",
                "code": "token_expired"
            })
        );
    }

    #[tokio::test]
    async fn every_rejection_is_unauthorized_with_distinct_code() {
        let all = [
            Rejection::MissingCredential,
            Rejection::MalformedHeader,
            Rejection::ExpiredToken,
            Rejection::InvalidToken,
        ];
        let mut codes = Vec::new();
        for rejection in all {
            let resp = rejection.into_response();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            let body = body_json(resp).await;
            assert_eq!(body["title"], "401 Unauthorized");
            codes.push(body["code"].as_str().unwrap().to_owned());
        }
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 4);
    }
}
