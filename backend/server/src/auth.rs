//! # Moderator Login
//!
//! Single credential pair from [`crate::config::Config`], compared by exact
//! equality. No session or token is issued.
use crate::error::AppError;

pub struct AccessGate {
    username: String,
    password: String,
}

impl AccessGate {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn check(&self, username: &str, password: &str) -> Result<(), AppError> {
        if username == self.username && password == self.password {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AccessGate;

    #[test]
    fn test_exact_match_only() {
        let gate = AccessGate::new("moderator", "s3cret");

        assert!(gate.check("moderator", "s3cret").is_ok());
        assert!(gate.check("moderator", "S3cret").is_err());
        assert!(gate.check("Moderator", "s3cret").is_err());
        assert!(gate.check("moderator", "s3cret ").is_err());
        assert!(gate.check("", "").is_err());
    }
}
