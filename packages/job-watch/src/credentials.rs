//! Mailbox credentials.
//!
//! The app password is held in a `secrecy::SecretString` so it never shows
//! up in logs or debug output.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Mailbox login. The address is also the sender and the recipient.
pub struct MailCredentials {
    pub address: String,
    pub app_password: SecretString,
}

impl MailCredentials {
    pub fn new(address: impl Into<String>, app_password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            app_password: SecretString::from(app_password.into()),
        }
    }

    /// Password for the SMTP login; only call when handing it to the transport.
    pub fn password(&self) -> &str {
        self.app_password.expose_secret()
    }
}

impl Clone for MailCredentials {
    fn clone(&self) -> Self {
        Self::new(self.address.clone(), self.password())
    }
}

impl fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailCredentials")
            .field("address", &self.address)
            .field("app_password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let creds = MailCredentials::new("me@example.com", "abcd efgh ijkl mnop");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("me@example.com"));
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("abcd"));
    }

    #[test]
    fn test_password_exposed_for_login() {
        let creds = MailCredentials::new("me@example.com", "abcd efgh ijkl mnop");
        assert_eq!(creds.password(), "abcd efgh ijkl mnop");
    }

    #[test]
    fn test_clone_keeps_password() {
        let creds = MailCredentials::new("me@example.com", "hunter2");
        let cloned = creds.clone();
        assert_eq!(cloned.address, "me@example.com");
        assert_eq!(cloned.password(), "hunter2");
    }
}
