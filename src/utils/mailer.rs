// src/utils/mailer.rs

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

/// Delivery channel for signup confirmation codes.
///
/// Callers treat delivery as fire-and-forget: an `Err` is logged and never
/// rolls back the account that triggered it.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_confirmation_code(
        &self,
        username: &str,
        email: &str,
        code: &str,
    ) -> Result<(), String>;
}

/// Writes the code to the application log instead of sending mail.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_confirmation_code(
        &self,
        username: &str,
        email: &str,
        code: &str,
    ) -> Result<(), String> {
        tracing::info!(
            "Confirmation code for '{}' <{}>: {}",
            username,
            email,
            code
        );
        Ok(())
    }
}

/// Keeps the last code issued per username in memory.
/// Used by the integration tests to complete the signup -> token flow.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    codes: Mutex<HashMap<String, String>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_code(&self, username: &str) -> Option<String> {
        self.codes
            .lock()
            .ok()
            .and_then(|codes| codes.get(username).cloned())
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send_confirmation_code(
        &self,
        username: &str,
        _email: &str,
        code: &str,
    ) -> Result<(), String> {
        let mut codes = self.codes.lock().map_err(|e| e.to_string())?;
        codes.insert(username.to_string(), code.to_string());
        Ok(())
    }
}
