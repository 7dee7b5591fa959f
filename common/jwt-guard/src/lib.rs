pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod guard;
pub mod issuer;
pub mod middleware;
pub mod verifier;

pub use claims::{ClaimSet, Claims};
pub use config::{GuardConfig, ALGORITHM, DEFAULT_EXPIRY_HOURS};
pub use error::{IssueError, IssueResult, Rejection};
pub use extractors::Authenticated;
pub use guard::Guard;
pub use issuer::{Expiry, TokenOptions};
pub use middleware::authenticate;
pub use verifier::RequestGate;
