use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Claims carried by operator tokens for the admin endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // operator name
    pub is_superuser: bool,
    pub is_staff: bool,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued at
}

impl Claims {
    /// Staff claims valid for `valid_for` from now. `None` if the expiry overflows.
    pub fn staff(sub: impl Into<String>, valid_for: chrono::Duration) -> Option<Self> {
        let now = chrono::Utc::now();
        let expires = now.checked_add_signed(valid_for)?;
        Some(Self {
            sub: sub.into(),
            is_superuser: false,
            is_staff: true,
            exp: expires.timestamp().max(0) as usize,
            iat: now.timestamp() as usize,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

#[derive(Debug, Serialize)]
pub struct AdminAck {
    pub success: bool,
    pub message: String,
    pub cleared: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_claims_expire_after_validity() {
        let claims = Claims::staff("ops", chrono::Duration::hours(2)).unwrap();
        assert!(claims.is_admin());
        assert_eq!(claims.exp - claims.iat, 2 * 3600);
    }

    #[test]
    fn test_staff_claims_reject_overflowing_validity() {
        let huge = chrono::Duration::try_days(100_000_000).unwrap();
        assert!(Claims::staff("ops", huge).is_none());
    }
}
