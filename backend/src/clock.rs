//! Injectable time source for the cache window and `cachedAt` stamps.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
#[derive(Clone)]
pub struct SimulatedClock {
    current_time: std::sync::Arc<std::sync::Mutex<DateTime<Utc>>>,
}

#[cfg(test)]
impl SimulatedClock {
    pub fn starting_at(time: DateTime<Utc>) -> Self {
        SimulatedClock {
            current_time: std::sync::Arc::new(std::sync::Mutex::new(time)),
        }
    }

    pub fn advance(&self, duration: chrono::Duration) {
        if let Ok(mut time) = self.current_time.lock() {
            *time += duration;
        }
    }
}

#[cfg(test)]
impl Clock for SimulatedClock {
    fn now(&self) -> DateTime<Utc> {
        self.current_time
            .lock()
            .map(|time| *time)
            .unwrap_or_else(|_| Utc::now())
    }
}
