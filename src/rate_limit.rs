use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Remembers when each client last created a league.
///
/// One timestamp per client, compared against a rolling window. Check and
/// record are separate steps, so two racing creations from one client can
/// both get through.
#[derive(Debug)]
pub struct CreationLimiter {
    window: Duration,
    last_created: DashMap<String, DateTime<Utc>>,
}

impl CreationLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_created: DashMap::new(),
        }
    }

    pub fn allows(&self, client: &str, now: DateTime<Utc>) -> bool {
        match self.last_created.get(client) {
            Some(last) => now - *last >= self.window,
            None => true,
        }
    }

    pub fn record(&self, client: &str, now: DateTime<Utc>) {
        let window = self.window;
        self.last_created.retain(|_, last| now - *last < window);
        self.last_created.insert(client.to_string(), now);
    }

    #[cfg(test)]
    pub fn tracked_clients(&self) -> usize {
        self.last_created.len()
    }
}
