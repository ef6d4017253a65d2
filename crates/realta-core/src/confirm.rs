use std::io;

/// Consulted immediately before each remote write.
pub trait ConfirmGate {
    fn confirm(&self, prompt: &str) -> io::Result<bool>;
}

/// Gate that never asks.
pub struct AutoConfirm;

impl ConfirmGate for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> io::Result<bool> {
        Ok(true)
    }
}
