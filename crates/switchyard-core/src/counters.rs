// ── Usage counters ──

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Counter {
    Views,
    DetailViews,
    HardwareViews,
    Changes,
    BulkEdits,
    Errors,
    AccessDenied,
    Commands,
    VlanManage,
}

/// Process-wide operation counters.
#[derive(Debug, Default)]
pub struct Counters {
    values: [AtomicU64; Counter::COUNT],
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, counter: Counter) {
        self.values[counter as usize].fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.values[counter as usize].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> Vec<CounterValue> {
        Counter::iter()
            .map(|counter| CounterValue {
                name: counter.to_string(),
                value: self.get(counter),
            })
            .collect()
    }

    /// Add previously saved values, e.g. from an earlier process.
    /// Unknown names are ignored.
    pub fn restore(&self, saved: &[CounterValue]) {
        for item in saved {
            if let Ok(counter) = item.name.parse::<Counter>() {
                self.values[counter as usize].fetch_add(item.value, Ordering::Relaxed);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterValue {
    pub name: String,
    pub value: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_lists_every_counter() {
        let counters = Counters::new();
        counters.increment(Counter::Changes);
        counters.increment(Counter::Changes);
        counters.increment(Counter::AccessDenied);

        let snap = counters.snapshot();
        assert_eq!(snap.len(), Counter::COUNT);
        assert_eq!(counters.get(Counter::Changes), 2);
        assert!(snap.contains(&CounterValue {
            name: "access_denied".into(),
            value: 1,
        }));
    }

    #[test]
    fn restore_adds_saved_values() {
        let counters = Counters::new();
        counters.increment(Counter::Views);
        counters.restore(&[
            CounterValue {
                name: "views".into(),
                value: 41,
            },
            CounterValue {
                name: "retired_counter".into(),
                value: 7,
            },
        ]);
        assert_eq!(counters.get(Counter::Views), 42);
    }
}
