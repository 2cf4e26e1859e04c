use std::{fmt, future::Future};

use tokio_util::sync::CancellationToken;

/// Identifies one activation of a view in the logs.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct MountId(u64);

impl MountId {
    pub fn random() -> Self {
        Self(rand::random())
    }
}

impl fmt::Display for MountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// The span during which a view may still write into its own state. Once
/// ended, pending requests are abandoned and their results dropped.
#[derive(Debug, Clone)]
pub struct Lifetime {
    mount: MountId,
    token: CancellationToken,
}

impl Lifetime {
    pub fn new() -> Self {
        Self { mount: MountId::random(), token: CancellationToken::new() }
    }

    pub fn mount(&self) -> MountId {
        self.mount
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn end(&self) {
        self.token.cancel();
    }

    /// Runs `future` unless the lifetime ends first, in which case the
    /// output is discarded and None is returned. A lifetime that has
    /// already ended never polls `future`.
    pub async fn guard<F: Future>(&self, future: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            output = future => Some(output).filter(|_| self.is_active()),
        }
    }
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::new()
    }
}
