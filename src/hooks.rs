//! Notification hooks that surface errors to the operator.
//!
//! Views subscribe a callback (toast, banner, stderr line) and the dispatcher
//! calls every subscriber when a request fails terminally.

use std::fmt;
use std::sync::{Arc, RwLock};

type Hook = Arc<dyn Fn(&str) + Send + Sync>;

/// Registry of message callbacks, cheap to clone and share.
#[derive(Clone, Default)]
pub struct NotificationHooks {
    hooks: Arc<RwLock<Vec<Hook>>>,
}

impl NotificationHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a callback. Callbacks run in registration order.
    pub fn register<F>(&self, hook: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        if let Ok(mut hooks) = self.hooks.write() {
            hooks.push(Arc::new(hook));
        }
    }

    pub fn len(&self) -> usize {
        self.hooks.read().map(|hooks| hooks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Report a failed request as `Error: <message>`.
    pub fn report_failure(&self, message: &str) {
        self.error(&format!("Error: {message}"));
    }

    /// Send `message` verbatim to every hook.
    pub fn error(&self, message: &str) {
        // Snapshot so a hook may register another hook without deadlocking.
        let snapshot: Vec<Hook> = match self.hooks.read() {
            Ok(hooks) => hooks.clone(),
            Err(_) => return,
        };
        for hook in snapshot {
            hook(message);
        }
    }
}

impl fmt::Debug for NotificationHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHooks")
            .field("len", &self.len())
            .finish()
    }
}

/// Hook that records every message; used by tests.
#[cfg(test)]
pub(crate) fn recording_hook(hooks: &NotificationHooks) -> Arc<std::sync::Mutex<Vec<String>>> {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    hooks.register(move |message| {
        sink.lock().unwrap().push(message.to_string());
    });
    seen
}
