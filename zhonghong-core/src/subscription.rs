//! Status subscriptions
//!
//! A listener receives the full [`DeviceStatus`] every time a frame
//! mentioning its address is decoded.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::error;

use zhonghong_types::DeviceStatus;

/// Receives status updates for one device address
///
/// Implemented for any `Fn(&DeviceStatus) + Send + Sync` closure.
pub trait StatusListener: Send + Sync {
    fn on_update(&self, status: &DeviceStatus);
}

impl<F> StatusListener for F
where
    F: Fn(&DeviceStatus) + Send + Sync,
{
    fn on_update(&self, status: &DeviceStatus) {
        self(status)
    }
}

/// Identifies one registration, returned by subscribe and used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Registered listener
#[derive(Clone)]
pub(crate) struct Subscriber {
    pub(crate) id: SubscriptionId,
    pub(crate) listener: Arc<dyn StatusListener>,
}

/// Invoke `listeners` in order with `status`
///
/// A listener that panics is logged and skipped; the remaining listeners
/// still run. Returns the number of listeners that panicked.
pub fn dispatch(listeners: &[Arc<dyn StatusListener>], status: &DeviceStatus) -> usize {
    let mut panicked = 0;

    for listener in listeners {
        if catch_unwind(AssertUnwindSafe(|| listener.on_update(status))).is_err() {
            error!("Listener for {} panicked, skipping it", status.address);
            panicked += 1;
        }
    }

    panicked
}
