//! Device registry
//!
//! Tracks the last-known status of every unit seen on the bus and the
//! listeners subscribed to each address. Entries are overwritten wholesale
//! and never removed.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::trace;

use zhonghong_types::{DeviceAddress, DeviceStatus};

use crate::subscription::{StatusListener, Subscriber, SubscriptionId};

/// Stored status plus the time it was received
#[derive(Debug, Clone)]
struct DeviceRecord {
    status: DeviceStatus,
    last_seen: DateTime<Utc>,
}

/// Registry of device states and status listeners
///
/// Thread-safe; the receive loop writes while callers read and subscribe.
///
/// # Examples
///
/// ```
/// use zhonghong_core::DeviceRegistry;
/// use zhonghong_types::{DeviceAddress, DeviceStatus, FanSpeed, Mode};
///
/// let registry = DeviceRegistry::new();
/// let address = DeviceAddress::new(1, 1, 2);
/// registry.subscribe(address, |status: &DeviceStatus| println!("{}", status));
///
/// let listeners = registry.update(DeviceStatus {
///     address,
///     power: true,
///     target_temperature: 24,
///     mode: Mode::Cool,
///     fan: FanSpeed::Low,
///     current_temperature: 26,
/// });
/// assert_eq!(listeners.len(), 1);
/// ```
pub struct DeviceRegistry {
    next_id: AtomicU64,
    devices: RwLock<HashMap<DeviceAddress, DeviceRecord>>,
    subscribers: RwLock<HashMap<DeviceAddress, Vec<Subscriber>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            devices: RwLock::new(HashMap::new()),
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Store `status` and return the listeners registered for its address
    ///
    /// Listeners are returned in registration order; the caller invokes them
    /// after the registry locks are released.
    pub fn update(&self, status: DeviceStatus) -> Vec<Arc<dyn StatusListener>> {
        let address = status.address;

        trace!("Updating {}", status);

        self.devices.write().insert(
            address,
            DeviceRecord {
                status,
                last_seen: Utc::now(),
            },
        );

        self.subscribers
            .read()
            .get(&address)
            .map(|subs| subs.iter().map(|sub| Arc::clone(&sub.listener)).collect())
            .unwrap_or_default()
    }

    /// Append a listener for `address`
    ///
    /// Registering the same listener twice makes it fire twice.
    pub fn subscribe<L>(&self, address: DeviceAddress, listener: L) -> SubscriptionId
    where
        L: StatusListener + 'static,
    {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.subscribers
            .write()
            .entry(address)
            .or_default()
            .push(Subscriber {
                id,
                listener: Arc::new(listener),
            });

        id
    }

    /// Remove a listener by its subscription id
    ///
    /// Returns `false` if no such subscription exists for `address`.
    pub fn unsubscribe(&self, address: &DeviceAddress, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();

        let Some(subs) = subscribers.get_mut(address) else {
            return false;
        };

        let before = subs.len();
        subs.retain(|sub| sub.id != id);
        let removed = subs.len() != before;

        if subs.is_empty() {
            subscribers.remove(address);
        }

        removed
    }

    /// Last-known status of `address`
    pub fn get(&self, address: &DeviceAddress) -> Option<DeviceStatus> {
        self.devices.read().get(address).map(|r| r.status.clone())
    }

    /// When `address` was last refreshed by a status frame
    pub fn last_seen(&self, address: &DeviceAddress) -> Option<DateTime<Utc>> {
        self.devices.read().get(address).map(|r| r.last_seen)
    }

    /// All known addresses
    pub fn addresses(&self) -> BTreeSet<DeviceAddress> {
        self.devices.read().keys().copied().collect()
    }

    /// All known statuses, ordered by address
    pub fn snapshot(&self) -> Vec<DeviceStatus> {
        let mut statuses: Vec<DeviceStatus> = self
            .devices
            .read()
            .values()
            .map(|r| r.status.clone())
            .collect();
        statuses.sort_by_key(|s| s.address);
        statuses
    }

    /// Number of listeners registered for `address`
    pub fn subscriber_count(&self, address: &DeviceAddress) -> usize {
        self.subscribers.read().get(address).map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
