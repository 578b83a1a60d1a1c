//! Gateway connection manager

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, trace, warn};

use zhonghong_core::{
    CommandFrame, DeviceRegistry, StatusListener, SubscriptionId, decode_status_batch, dispatch,
};
use zhonghong_transport::{Error as TransportError, Transport};
use zhonghong_types::{DeviceAddress, DeviceStatus, FanSpeed, Mode};

use crate::config::HubConfig;
use crate::error::{Error, Result};

/// ZhongHong gateway hub
///
/// Owns one connection to a gateway and a background task that reads status
/// frames, keeps the [`DeviceRegistry`] current and notifies subscribers.
/// Commands are fire-and-forget: a failed send is logged and dropped.
///
/// # Examples
///
/// ```no_run
/// use zhonghong::{DeviceStatus, Hub, HubConfig, Mode};
///
/// #[tokio::main]
/// async fn main() -> zhonghong::Result<()> {
///     let hub = Hub::connect(HubConfig::new("192.168.1.50")).await;
///
///     for address in hub.discover().await? {
///         hub.subscribe(address, |status: &DeviceStatus| println!("{}", status));
///     }
///
///     hub.set_mode(1, 1, Mode::Cool).await;
///     hub.turn_on(1, 1).await;
///
///     hub.stop().await;
///     Ok(())
/// }
/// ```
pub struct Hub {
    inner: Arc<HubInner>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

struct HubInner {
    config: HubConfig,
    transport: Arc<dyn Transport>,
    registry: DeviceRegistry,
    listening: AtomicBool,
    shutdown: Notify,
    /// `true` while a discovery window is open
    discovering: watch::Sender<bool>,
    /// Held for the length of one discovery window
    discovery: Mutex<()>,
}

impl Hub {
    /// Connect to the gateway described by `config` and start listening
    ///
    /// A failed connection is logged, not returned; the receive loop keeps
    /// retrying every `reconnect_delay`.
    pub async fn connect(config: HubConfig) -> Self {
        let transport = Arc::new(config.transport());
        Self::with_transport(config, transport).await
    }

    /// Start a hub over an already constructed transport
    pub async fn with_transport(config: HubConfig, transport: Arc<dyn Transport>) -> Self {
        let inner = Arc::new(HubInner::new(config, transport));

        inner.establish().await;
        inner.listening.store(true, Ordering::Release);

        let handle = tokio::spawn(Arc::clone(&inner).listen());

        Self {
            inner,
            listener: Mutex::new(Some(handle)),
        }
    }

    /// Gateway address commands are sent to
    pub fn gateway_address(&self) -> u8 {
        self.inner.config.gateway_address
    }

    /// Check if the socket is currently open
    pub fn is_connected(&self) -> bool {
        self.inner.transport.is_connected()
    }

    /// Check if the receive loop is running
    pub fn is_listening(&self) -> bool {
        self.inner.listening.load(Ordering::Acquire)
    }

    /// Check if a discovery window is open
    pub fn is_discovering(&self) -> bool {
        *self.inner.discovering.borrow()
    }

    /// Discover devices using the configured discovery timeout
    pub async fn discover(&self) -> Result<BTreeSet<DeviceAddress>> {
        self.discover_within(self.inner.config.discover_timeout).await
    }

    /// Query every unit and wait up to `window` for the full-query response
    ///
    /// Returns every address known to the registry once the response has
    /// been processed. Concurrent calls are serialized: each waits for the
    /// previous window to close before opening its own.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DiscoveryTimeout`] if no full-query response arrives
    /// in time. Nothing is retried; devices decoded from other frames stay
    /// available through [`Hub::devices`].
    pub async fn discover_within(&self, window: Duration) -> Result<BTreeSet<DeviceAddress>> {
        let _window = self.inner.discovery.lock().await;

        let mut done = self.inner.discovering.subscribe();
        self.inner.discovering.send_replace(true);

        self.inner.send_frame(CommandFrame::query_all(self.gateway_address())).await;

        let finished = matches!(
            timeout(window, done.wait_for(|discovering| !discovering)).await,
            Ok(Ok(_))
        );

        if !finished {
            self.inner.discovering.send_replace(false);
            error!("No response from ZhongHong gateway {}", self.inner.transport.remote_addr());
            return Err(Error::DiscoveryTimeout {
                seconds: window.as_secs(),
            });
        }

        let addresses = self.inner.registry.addresses();
        info!("Discovery finished, {} device(s)", addresses.len());
        Ok(addresses)
    }

    /// Register `listener` for updates of `address`
    pub fn subscribe<L>(&self, address: DeviceAddress, listener: L) -> SubscriptionId
    where
        L: StatusListener + 'static,
    {
        let id = self.inner.registry.subscribe(address, listener);
        debug!("{} subscribed to {}", id, address);
        id
    }

    /// Remove a listener registered with [`Hub::subscribe`]
    pub fn unsubscribe(&self, address: &DeviceAddress, id: SubscriptionId) -> bool {
        self.inner.registry.unsubscribe(address, id)
    }

    /// Last-known status of one unit
    pub fn device(&self, address: &DeviceAddress) -> Option<DeviceStatus> {
        self.inner.registry.get(address)
    }

    /// Last-known status of every unit seen so far
    pub fn devices(&self) -> Vec<DeviceStatus> {
        self.inner.registry.snapshot()
    }

    /// Underlying registry
    pub fn registry(&self) -> &DeviceRegistry {
        &self.inner.registry
    }

    /// Ask the gateway to report the state of every unit
    pub async fn query_all(&self) {
        self.inner.send_frame(CommandFrame::query_all(self.gateway_address())).await;
    }

    pub async fn turn_on(&self, outdoor: u8, indoor: u8) {
        self.inner
            .send_frame(CommandFrame::power(self.gateway_address(), outdoor, indoor, true))
            .await;
    }

    pub async fn turn_off(&self, outdoor: u8, indoor: u8) {
        self.inner
            .send_frame(CommandFrame::power(self.gateway_address(), outdoor, indoor, false))
            .await;
    }

    /// Set target temperature (°C)
    pub async fn set_temperature(&self, outdoor: u8, indoor: u8, celsius: u8) {
        self.inner
            .send_frame(CommandFrame::set_temperature(
                self.gateway_address(),
                outdoor,
                indoor,
                celsius,
            ))
            .await;
    }

    pub async fn set_mode(&self, outdoor: u8, indoor: u8, mode: Mode) {
        self.inner
            .send_frame(CommandFrame::set_mode(self.gateway_address(), outdoor, indoor, mode))
            .await;
    }

    pub async fn set_fan(&self, outdoor: u8, indoor: u8, fan: FanSpeed) {
        self.inner
            .send_frame(CommandFrame::set_fan(self.gateway_address(), outdoor, indoor, fan))
            .await;
    }

    /// Stop listening and close the connection
    ///
    /// Waits for the receive loop to exit. Safe to call more than once.
    pub async fn stop(&self) {
        if self.inner.listening.swap(false, Ordering::AcqRel) {
            info!("Stopping hub for {}", self.inner.transport.remote_addr());
        }
        self.inner.shutdown.notify_one();

        if let Some(handle) = self.listener.lock().await.take() {
            if let Err(e) = handle.await {
                warn!("Receive loop ended abnormally: {}", e);
            }
        }

        info!("Closing socket");
        if let Err(e) = self.inner.transport.disconnect().await {
            warn!("Failed to close connection: {}", e);
        }
    }
}

impl Drop for Hub {
    fn drop(&mut self) {
        if self.inner.listening.swap(false, Ordering::AcqRel) {
            warn!("Hub dropped without stop");
            self.inner.shutdown.notify_one();
        }
    }
}

impl HubInner {
    fn new(config: HubConfig, transport: Arc<dyn Transport>) -> Self {
        let (discovering, _) = watch::channel(false);

        Self {
            config,
            transport,
            registry: DeviceRegistry::new(),
            listening: AtomicBool::new(false),
            shutdown: Notify::new(),
            discovering,
            discovery: Mutex::new(()),
        }
    }

    /// (Re)open the connection, logging failure
    async fn establish(&self) -> bool {
        let remote = self.transport.remote_addr();
        info!("Connecting to ZhongHong gateway {}", remote);

        match self.transport.connect().await {
            Ok(()) => true,
            Err(e) => {
                error!("Cannot connect to ZhongHong gateway {}: {}", remote, e);
                false
            }
        }
    }

    /// Send one frame; failures are logged and the frame is dropped
    async fn send_frame(&self, frame: CommandFrame) {
        let data = frame.encode();

        if frame.command.is_control() {
            debug!("send >> {} [{}]", frame, hex::encode(&data));
        } else {
            trace!("send >> {} [{}]", frame, hex::encode(&data));
        }

        match self.transport.send(&data).await {
            Ok(()) => {}
            Err(TransportError::WriteTimeout) => {
                error!(
                    "Cannot reach ZhongHong gateway {}, dropping {}",
                    self.transport.remote_addr(),
                    frame
                );
            }
            Err(TransportError::BrokenPipe) => {
                error!("Broken pipe, dropping {}", frame);
            }
            Err(TransportError::NotConnected) => {
                warn!("Not connected, dropping {}", frame);
            }
            Err(e) => {
                error!("Failed to send {}: {}", frame, e);
            }
        }
    }

    async fn listen(self: Arc<Self>) {
        debug!("Receive loop started");

        while self.listening.load(Ordering::Acquire) {
            let received = tokio::select! {
                _ = self.shutdown.notified() => break,
                received = self.transport.receive(self.config.socket_timeout) => received,
            };

            match received {
                Ok(data) => self.handle_frame(&data),
                Err(TransportError::ReadTimeout) => {
                    trace!("Idle for {:?}, refreshing state", self.config.socket_timeout);
                    self.send_frame(CommandFrame::query_all(self.config.gateway_address)).await;
                }
                Err(TransportError::NotConnected) => {
                    if !self.listening.load(Ordering::Acquire) {
                        debug!("Socket is closed");
                        continue;
                    }
                    tokio::select! {
                        _ = self.shutdown.notified() => break,
                        _ = sleep(self.config.reconnect_delay) => {}
                    }
                    self.establish().await;
                }
                Err(e) if e.requires_reconnect() => {
                    debug!("{}, reconnecting", e);
                    self.establish().await;
                }
                Err(e) => {
                    error!("Unknown error when receiving: {}", e);
                }
            }
        }

        debug!("Receive loop stopped");
    }

    /// Decode one received buffer and publish every status it carries
    fn handle_frame(&self, data: &[u8]) {
        let batch = match decode_status_batch(data) {
            Ok(batch) => batch,
            Err(e) => {
                error!("Unknown data received << {}: {}", hex::encode(data), e);
                return;
            }
        };

        if batch.marker.is_none() {
            trace!("Ignoring non-status data << {}", hex::encode(data));
            return;
        }

        debug!("recv data << {}", hex::encode(data));

        let full_query = batch.is_full_query();

        for status in batch.devices {
            let listeners = self.registry.update(status.clone());
            dispatch(&listeners, &status);
        }

        if full_query {
            self.discovering.send_if_modified(|discovering| std::mem::replace(discovering, false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use bytes::BytesMut;
    use mockall::mock;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    use zhonghong_core::Command;
    use zhonghong_transport::Result as TransportResult;

    /// Scripted in-memory gateway
    ///
    /// Receives pop from `inbound`; an empty script behaves like an idle link.
    struct FakeGateway {
        inbound_tx: mpsc::UnboundedSender<TransportResult<BytesMut>>,
        inbound: Mutex<mpsc::UnboundedReceiver<TransportResult<BytesMut>>>,
        sent_tx: mpsc::UnboundedSender<CommandFrame>,
        connected: AtomicBool,
        refuse_connect: AtomicBool,
        connects: AtomicUsize,
        disconnects: AtomicUsize,
    }

    impl FakeGateway {
        fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<CommandFrame>) {
            let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
            let (sent_tx, sent_rx) = mpsc::unbounded_channel();
            let gateway = Arc::new(Self {
                inbound_tx,
                inbound: Mutex::new(inbound_rx),
                sent_tx,
                connected: AtomicBool::new(false),
                refuse_connect: AtomicBool::new(false),
                connects: AtomicUsize::new(0),
                disconnects: AtomicUsize::new(0),
            });
            (gateway, sent_rx)
        }

        fn push(&self, data: &[u8]) {
            self.inbound_tx.send(Ok(BytesMut::from(data))).unwrap();
        }

        fn push_error(&self, err: TransportError) {
            self.inbound_tx.send(Err(err)).unwrap();
        }

        fn connects(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for FakeGateway {
        async fn connect(&self) -> TransportResult<()> {
            if self.refuse_connect.load(Ordering::SeqCst) {
                return Err(TransportError::ConnectionTimeout);
            }
            self.connects.fetch_add(1, Ordering::SeqCst);
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn disconnect(&self) -> TransportResult<()> {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
            self.connected.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn send(&self, data: &[u8]) -> TransportResult<()> {
            if !self.is_connected() {
                return Err(TransportError::NotConnected);
            }
            let frame = CommandFrame::decode(data).unwrap();
            self.sent_tx.send(frame).unwrap();
            Ok(())
        }

        async fn receive(&self, wait: Duration) -> TransportResult<BytesMut> {
            if !self.is_connected() {
                return Err(TransportError::NotConnected);
            }
            let mut inbound = self.inbound.lock().await;
            match timeout(wait, inbound.recv()).await {
                Ok(Some(Err(e))) => {
                    if e.requires_reconnect() {
                        self.connected.store(false, Ordering::SeqCst);
                    }
                    Err(e)
                }
                Ok(Some(Ok(data))) => Ok(data),
                Ok(None) | Err(_) => Err(TransportError::ReadTimeout),
            }
        }

        fn remote_addr(&self) -> String {
            "fake:9999".to_string()
        }
    }

    mock! {
        Gateway {}

        #[async_trait]
        impl Transport for Gateway {
            async fn connect(&self) -> TransportResult<()>;
            async fn disconnect(&self) -> TransportResult<()>;
            fn is_connected(&self) -> bool;
            async fn send(&self, data: &[u8]) -> TransportResult<()>;
            async fn receive(&self, timeout: Duration) -> TransportResult<BytesMut>;
            fn remote_addr(&self) -> String;
        }
    }

    fn config() -> HubConfig {
        HubConfig::new("fake").with_gateway_address(1)
    }

    /// Full-query response: 4-byte header, 10-byte records, checksum
    fn full_query_frame(gw: u8, records: &[[u8; 7]]) -> Vec<u8> {
        let mut frame = vec![gw, 0x50, 0xFF, records.len() as u8];
        for fields in records {
            frame.extend_from_slice(fields);
            frame.extend_from_slice(&[0x00, 0x00, 0x00]);
        }
        frame.push(0x00);
        frame
    }

    /// Broadcast record of 15 bytes
    fn broadcast_frame(gw: u8, fields: [u8; 7]) -> Vec<u8> {
        let mut frame = vec![gw, 0x50, 0x01, 0x01];
        frame.extend_from_slice(&fields);
        frame.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        frame
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        timeout(Duration::from_secs(30), async {
            while !condition() {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached");
    }

    #[tokio::test(start_paused = true)]
    async fn test_discovery_completes_on_full_query() {
        let (gateway, mut sent) = FakeGateway::new();
        let hub = Hub::with_transport(config(), gateway.clone()).await;

        let responder = {
            let gateway = gateway.clone();
            tokio::spawn(async move {
                sleep(Duration::from_secs(2)).await;
                gateway.push(&full_query_frame(
                    1,
                    &[[1, 1, 1, 24, 0x01, 0x01, 26], [1, 2, 0, 20, 0x08, 0x04, 19]],
                ));
            })
        };

        let started = Instant::now();
        let addresses = hub.discover_within(Duration::from_secs(10)).await.unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_secs(3));
        assert_eq!(
            addresses.into_iter().map(|a| a.to_string()).collect::<Vec<_>>(),
            vec!["1_1_1", "1_1_2"]
        );
        assert!(!hub.is_discovering());

        let query = sent.recv().await.unwrap();
        assert_eq!(query, CommandFrame::query_all(1));

        responder.await.unwrap();
        hub.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_discovery_timeout() {
        let (gateway, _sent) = FakeGateway::new();
        let hub = Hub::with_transport(config(), gateway.clone()).await;

        let started = Instant::now();
        let result = hub.discover().await;

        assert!(matches!(result, Err(Error::DiscoveryTimeout { seconds: 10 })));
        assert!(started.elapsed() >= Duration::from_secs(10));
        assert!(!hub.is_discovering());

        hub.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_discoveries_do_not_release_each_other() {
        let (gateway, mut sent) = FakeGateway::new();
        let hub = Hub::with_transport(config(), gateway.clone()).await;

        let started = Instant::now();
        let (first, second) = tokio::join!(
            hub.discover_within(Duration::from_secs(1)),
            async {
                sleep(Duration::from_millis(100)).await;
                hub.discover_within(Duration::from_secs(3)).await
            }
        );

        assert!(matches!(first, Err(Error::DiscoveryTimeout { seconds: 1 })));
        assert!(matches!(second, Err(Error::DiscoveryTimeout { seconds: 3 })));
        assert!(started.elapsed() >= Duration::from_secs(4));

        // each window sent its own query
        assert_eq!(sent.recv().await.unwrap(), CommandFrame::query_all(1));
        assert_eq!(sent.recv().await.unwrap(), CommandFrame::query_all(1));

        hub.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_does_not_finish_discovery() {
        let (gateway, _sent) = FakeGateway::new();
        let hub = Hub::with_transport(config(), gateway.clone()).await;

        gateway.push(&broadcast_frame(1, [1, 1, 1, 24, 0x01, 0x01, 26]));
        let result = hub.discover_within(Duration::from_secs(3)).await;

        assert!(result.is_err());
        assert_eq!(hub.devices().len(), 1);

        hub.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_receive_updates_in_order() {
        let (gateway, _sent) = FakeGateway::new();
        let hub = Hub::with_transport(config(), gateway.clone()).await;

        let address = DeviceAddress::new(1, 2, 3);
        let seen = Arc::new(StdMutex::new(Vec::new()));
        for tag in [1, 2] {
            let seen = Arc::clone(&seen);
            hub.subscribe(address, move |status: &DeviceStatus| {
                seen.lock().unwrap().push((tag, status.clone()));
            });
        }

        gateway.push(&broadcast_frame(1, [2, 3, 1, 23, 0x02, 0x02, 21]));
        wait_until(|| seen.lock().unwrap().len() == 2).await;

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen[0].0, 1);
        assert_eq!(seen[1].0, 2);
        assert_eq!(seen[0].1, seen[1].1);
        assert_eq!(seen[0].1.mode, Mode::Dry);
        assert_eq!(hub.device(&address), Some(seen[0].1.clone()));

        hub.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribed_listener_is_not_called() {
        let (gateway, _sent) = FakeGateway::new();
        let hub = Hub::with_transport(config(), gateway.clone()).await;

        let address = DeviceAddress::new(1, 1, 1);
        let calls = Arc::new(AtomicUsize::new(0));
        let id = {
            let calls = Arc::clone(&calls);
            hub.subscribe(address, move |_: &DeviceStatus| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };
        assert!(hub.unsubscribe(&address, id));

        gateway.push(&broadcast_frame(1, [1, 1, 1, 24, 0x01, 0x01, 26]));
        wait_until(|| hub.device(&address).is_some()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        hub.stop().await;
    }

    fn faulty_listener(_: &DeviceStatus) {
        panic!("listener failed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_listener_does_not_stop_loop() {
        let (gateway, _sent) = FakeGateway::new();
        let hub = Hub::with_transport(config(), gateway.clone()).await;

        let faulty = DeviceAddress::new(1, 1, 1);
        let healthy = DeviceAddress::new(1, 1, 2);
        let calls = Arc::new(AtomicUsize::new(0));

        hub.subscribe(faulty, faulty_listener);
        {
            let calls = Arc::clone(&calls);
            hub.subscribe(faulty, move |_: &DeviceStatus| {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }

        gateway.push(&broadcast_frame(1, [1, 1, 1, 24, 0x01, 0x01, 26]));
        gateway.push(&broadcast_frame(1, [1, 2, 1, 22, 0x08, 0x04, 20]));

        wait_until(|| hub.device(&healthy).is_some()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(hub.device(&faulty).is_some());
        assert!(hub.is_listening());

        // the loop keeps serving later frames too
        gateway.push(&broadcast_frame(1, [1, 1, 0, 24, 0x01, 0x01, 26]));
        wait_until(|| calls.load(Ordering::SeqCst) == 2).await;
        assert_eq!(hub.device(&faulty).map(|s| s.power), Some(false));

        hub.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_frame_does_not_stop_loop() {
        let (gateway, _sent) = FakeGateway::new();
        let hub = Hub::with_transport(config(), gateway.clone()).await;

        gateway.push(&broadcast_frame(1, [1, 1, 1, 24, 0x00, 0x01, 26]));
        gateway.push(&broadcast_frame(1, [1, 2, 1, 24, 0x01, 0x01, 26]));

        wait_until(|| !hub.devices().is_empty()).await;
        assert_eq!(hub.device(&DeviceAddress::new(1, 1, 1)), None);
        assert!(hub.device(&DeviceAddress::new(1, 1, 2)).is_some());
        assert!(hub.is_listening());

        hub.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_link_sends_keepalive_query() {
        let (gateway, mut sent) = FakeGateway::new();
        let config = config().with_socket_timeout(Duration::from_secs(60));
        let hub = Hub::with_transport(config, gateway.clone()).await;

        let started = Instant::now();
        let keepalive = sent.recv().await.unwrap();

        assert_eq!(keepalive.command, Command::QueryAll);
        assert!(started.elapsed() >= Duration::from_secs(60));

        hub.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnects_after_reset() {
        let (gateway, mut sent) = FakeGateway::new();
        let hub = Hub::with_transport(config(), gateway.clone()).await;
        assert_eq!(gateway.connects(), 1);

        gateway.push_error(TransportError::ConnectionReset);
        wait_until(|| gateway.connects() == 2).await;
        assert!(hub.is_connected());

        hub.turn_on(1, 2).await;
        assert_eq!(sent.recv().await.unwrap(), CommandFrame::power(1, 1, 2, true));

        hub.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_failed_connect() {
        let (gateway, mut sent) = FakeGateway::new();
        gateway.refuse_connect.store(true, Ordering::SeqCst);

        let config = config().with_reconnect_delay(Duration::from_secs(5));
        let hub = Hub::with_transport(config, gateway.clone()).await;
        assert!(!hub.is_connected());

        // commands while disconnected are dropped
        hub.turn_off(1, 1).await;

        gateway.refuse_connect.store(false, Ordering::SeqCst);
        wait_until(|| hub.is_connected()).await;

        hub.set_temperature(1, 1, 22).await;
        assert_eq!(sent.recv().await.unwrap(), CommandFrame::set_temperature(1, 1, 1, 22));

        hub.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_control_commands() {
        let (gateway, mut sent) = FakeGateway::new();
        let hub = Hub::with_transport(config().with_gateway_address(3), gateway.clone()).await;

        hub.turn_on(1, 2).await;
        hub.turn_off(1, 2).await;
        hub.set_temperature(1, 2, 26).await;
        hub.set_mode(1, 2, Mode::Heat).await;
        hub.set_fan(1, 2, FanSpeed::Medium).await;
        hub.query_all().await;

        let mut frames = Vec::new();
        for _ in 0..6 {
            frames.push(sent.recv().await.unwrap());
        }

        assert_eq!(
            frames,
            vec![
                CommandFrame::power(3, 1, 2, true),
                CommandFrame::power(3, 1, 2, false),
                CommandFrame::set_temperature(3, 1, 2, 26),
                CommandFrame::set_mode(3, 1, 2, Mode::Heat),
                CommandFrame::set_fan(3, 1, 2, FanSpeed::Medium),
                CommandFrame::query_all(3),
            ]
        );

        hub.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_graceful_and_idempotent() {
        let (gateway, _sent) = FakeGateway::new();
        let hub = Hub::with_transport(config(), gateway.clone()).await;
        assert!(hub.is_listening());

        hub.stop().await;
        assert!(!hub.is_listening());
        assert!(!hub.is_connected());
        assert!(hub.listener.lock().await.is_none());

        hub.stop().await;
        assert_eq!(gateway.disconnects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_send_timeout_is_dropped_without_retry() {
        let mut transport = MockGateway::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(TransportError::WriteTimeout));
        transport.expect_connect().never();
        transport.expect_remote_addr().return_const("mock:9999".to_string());

        let inner = HubInner::new(config(), Arc::new(transport));
        inner.send_frame(CommandFrame::power(1, 1, 1, true)).await;
    }

    #[tokio::test]
    async fn test_broken_pipe_does_not_reconnect() {
        let mut transport = MockGateway::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(TransportError::BrokenPipe));
        transport.expect_connect().never();
        transport.expect_remote_addr().return_const("mock:9999".to_string());

        let inner = HubInner::new(config(), Arc::new(transport));
        inner.send_frame(CommandFrame::set_mode(1, 1, 1, Mode::Cool)).await;
    }
}
