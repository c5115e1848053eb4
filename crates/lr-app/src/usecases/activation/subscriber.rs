use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use lr_core::ports::{PlatformError, ServiceStatusListener, ServiceStatusSourcePort};
use tracing::{debug, warn};

/// Idempotent wrapper around the platform's service status source.
///
/// # Behavior
/// - `register()` while registered is a no-op; platform errors are logged, never returned.
/// - `unregister()` while unregistered is a no-op; platform errors are logged, never returned.
/// - `force_unregister()` always reaches the platform, to repair a listener whose
///   local flag no longer matches the platform's view.
pub struct ServiceStatusSubscriber {
    source: Arc<dyn ServiceStatusSourcePort>,
    listener: Arc<dyn ServiceStatusListener>,
    registered: Mutex<bool>,
}

impl ServiceStatusSubscriber {
    pub fn new(
        source: Arc<dyn ServiceStatusSourcePort>,
        listener: Arc<dyn ServiceStatusListener>,
    ) -> Self {
        Self {
            source,
            listener,
            registered: Mutex::new(false),
        }
    }

    /// Register the listener. Returns whether a registration is live afterwards.
    pub fn register(&self) -> bool {
        let mut registered = self.lock();
        if *registered {
            debug!("service status listener already registered");
            return true;
        }

        match self.source.register_listener(self.listener.clone()) {
            Ok(()) => {
                *registered = true;
                debug!("service status listener registered");
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to register service status listener");
                false
            }
        }
    }

    pub fn unregister(&self) {
        let mut registered = self.lock();
        if !*registered {
            return;
        }

        *registered = false;
        match self.source.unregister_listener() {
            Ok(()) => debug!("service status listener unregistered"),
            Err(err) => warn!(error = %err, "failed to unregister service status listener"),
        }
    }

    pub fn force_unregister(&self) {
        let mut registered = self.lock();
        *registered = false;
        match self.source.unregister_listener() {
            Ok(()) => debug!("service status listener force-unregistered"),
            Err(err) => warn!(error = %err, "forced unregister of service status listener failed"),
        }
    }

    pub fn is_registered(&self) -> bool {
        *self.lock()
    }

    pub fn is_service_active(&self) -> Result<bool, PlatformError> {
        self.source.is_active()
    }

    /// Register and return a handle that unregisters when released or dropped.
    pub fn subscribe(self: &Arc<Self>) -> SubscriptionHandle {
        self.register();
        SubscriptionHandle {
            subscriber: Some(self.clone()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.registered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Scoped service status registration.
///
/// Exactly one release happens per handle: `release`, `force_release`, or drop.
pub struct SubscriptionHandle {
    subscriber: Option<Arc<ServiceStatusSubscriber>>,
}

impl SubscriptionHandle {
    pub fn is_live(&self) -> bool {
        self.subscriber
            .as_ref()
            .is_some_and(|subscriber| subscriber.is_registered())
    }

    pub fn release(mut self) {
        if let Some(subscriber) = self.subscriber.take() {
            subscriber.unregister();
        }
    }

    pub fn force_release(mut self) {
        if let Some(subscriber) = self.subscriber.take() {
            subscriber.force_unregister();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(subscriber) = self.subscriber.take() {
            subscriber.unregister();
        }
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("live", &self.is_live())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;

    mock! {
        pub Source {}

        impl ServiceStatusSourcePort for Source {
            fn is_active(&self) -> Result<bool, PlatformError>;
            fn register_listener(
                &self,
                listener: Arc<dyn ServiceStatusListener>,
            ) -> Result<(), PlatformError>;
            fn unregister_listener(&self) -> Result<(), PlatformError>;
        }
    }

    struct NoopListener;

    impl ServiceStatusListener for NoopListener {
        fn on_service_status_changed(&self, _status: Result<bool, PlatformError>) {}
    }

    fn subscriber(source: MockSource) -> Arc<ServiceStatusSubscriber> {
        Arc::new(ServiceStatusSubscriber::new(
            Arc::new(source),
            Arc::new(NoopListener),
        ))
    }

    #[test]
    fn repeated_register_and_unregister_reach_the_platform_once() {
        let mut source = MockSource::new();
        source.expect_register_listener().times(1).returning(|_| Ok(()));
        source.expect_unregister_listener().times(1).returning(|| Ok(()));
        let subscriber = subscriber(source);

        assert!(subscriber.register());
        assert!(subscriber.register());
        assert!(subscriber.register());
        subscriber.unregister();
        subscriber.unregister();
        subscriber.unregister();

        assert!(!subscriber.is_registered());
    }

    #[test]
    fn registration_error_is_swallowed_and_leaves_subscriber_unregistered() {
        let mut source = MockSource::new();
        source
            .expect_register_listener()
            .times(1)
            .returning(|_| Err(PlatformError::Registration("receiver leaked".into())));
        source.expect_unregister_listener().never();
        let subscriber = subscriber(source);

        assert!(!subscriber.register());
        assert!(!subscriber.is_registered());
        subscriber.unregister();
    }

    #[test]
    fn unregister_error_is_swallowed() {
        let mut source = MockSource::new();
        source.expect_register_listener().times(1).returning(|_| Ok(()));
        source
            .expect_unregister_listener()
            .times(1)
            .returning(|| Err(PlatformError::Registration("not registered".into())));
        let subscriber = subscriber(source);

        subscriber.register();
        subscriber.unregister();
        assert!(!subscriber.is_registered());
    }

    #[test]
    fn dropping_a_handle_unregisters_exactly_once() {
        let mut source = MockSource::new();
        source.expect_register_listener().times(1).returning(|_| Ok(()));
        source.expect_unregister_listener().times(1).returning(|| Ok(()));
        let subscriber = subscriber(source);

        {
            let handle = subscriber.subscribe();
            assert!(handle.is_live());
        }
        assert!(!subscriber.is_registered());
    }

    #[test]
    fn force_release_reaches_the_platform_even_when_unregistered() {
        let mut source = MockSource::new();
        source
            .expect_register_listener()
            .times(1)
            .returning(|_| Err(PlatformError::Registration("busy".into())));
        source.expect_unregister_listener().times(1).returning(|| Ok(()));
        let subscriber = subscriber(source);

        let handle = subscriber.subscribe();
        assert!(!handle.is_live());
        handle.force_release();
    }
}
