//! Thread-scoped service-name override
//!
//! Some hosts run several logical services on shared worker threads. While a
//! [`ServiceNameGuard`] is alive, checkpoints on that thread hash and report
//! under the overriding name. Dropping the guard restores whatever override
//! was active before it, so nested scopes unwind correctly on every exit path,
//! including unwinding panics.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::trace;

thread_local! {
    static SERVICE_NAME_OVERRIDE: RefCell<Option<Arc<str>>> = const { RefCell::new(None) };
}

/// Install `name` as this thread's override until the returned guard drops
#[must_use = "the override is cleared as soon as the guard is dropped"]
pub fn set_service_name(name: &str) -> ServiceNameGuard {
    let previous = SERVICE_NAME_OVERRIDE.with(|slot| slot.replace(Some(Arc::from(name))));
    trace!("Service name override set to '{}'", name);
    ServiceNameGuard {
        previous,
        _not_send: PhantomData,
    }
}

/// Override active on the calling thread, if any
pub fn current_service_name() -> Option<Arc<str>> {
    SERVICE_NAME_OVERRIDE.with(|slot| slot.borrow().clone())
}

/// Restores the previous override on drop; tied to the thread that created it
#[derive(Debug)]
pub struct ServiceNameGuard {
    previous: Option<Arc<str>>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ServiceNameGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        SERVICE_NAME_OVERRIDE.with(|slot| {
            *slot.borrow_mut() = previous;
        });
    }
}
