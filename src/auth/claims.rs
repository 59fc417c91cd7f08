use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated user context supplied by the identity provider.
/// The server trusts this identity and never re-derives it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user id)
    pub name: String,
    pub email: String,
    pub exp: usize, // Expiration time (as UTC timestamp)
    pub iat: usize, // Issued at (as UTC timestamp)
}

impl Claims {
    pub fn new(user_id: &str, name: &str, email: &str, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours);

        Self {
            sub: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("user-1", "Maya Reader", "maya@example.com", 24);

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.name, "Maya Reader");
        assert_eq!(claims.email, "maya@example.com");
        assert!(claims.exp > claims.iat);
    }
}
