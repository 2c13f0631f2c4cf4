//! Cooperative cancellation for market requests.
//!
//! Callers holding the sending half of a `tokio::sync::watch` channel flip it
//! to `true` to ask in-flight work to stop. A deadline may be attached as
//! well. The service polls the signal before each store call, so a cancelled
//! request never reaches the commit.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use super::error::MarketError;

/// Receiving side of a cancellation signal.
///
/// # Examples
/// ```
/// use market_backend::domain::Cancellation;
///
/// let (tx, cancellation) = Cancellation::channel();
/// assert!(cancellation.ensure_active().is_ok());
/// tx.send(true).unwrap();
/// assert!(cancellation.ensure_active().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    signal: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self::default()
    }

    pub fn from_receiver(receiver: watch::Receiver<bool>) -> Self {
        Self {
            signal: Some(receiver),
            deadline: None,
        }
    }

    /// Fresh channel; send `true` on the sender to cancel.
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self::from_receiver(rx))
    }

    /// Fire once `budget` has elapsed from now.
    pub fn after(budget: Duration) -> Self {
        Self::never().with_deadline(Instant::now() + budget)
    }

    /// Add a deadline, keeping the earlier one if already set.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(self.deadline.map_or(deadline, |d| d.min(deadline)));
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.as_ref().is_some_and(|rx| *rx.borrow())
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Fail with [`MarketError::Cancelled`] once the signal has fired.
    pub fn ensure_active(&self) -> Result<(), MarketError> {
        if self.is_cancelled() {
            Err(MarketError::Cancelled)
        } else {
            Ok(())
        }
    }
}
