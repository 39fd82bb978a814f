use serde::{Deserialize, Serialize};

/// Bearer token payload. The subject is the principal id; nothing else about the
/// principal is trusted from the token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}
