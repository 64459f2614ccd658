use crate::report::BacktestReport;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A bounded, TTL'd store for finished backtest reports.
///
/// The simulator itself is pure and keeps nothing; callers that want to
/// serve results later (e.g. an HTTP layer) own one of these and decide its
/// capacity and retention. Expired entries are dropped lazily on access.
#[derive(Debug)]
pub struct ResultStore {
    capacity: usize,
    ttl: Duration,
    entries: HashMap<String, StoredReport>,
    insertion_order: VecDeque<String>,
}

#[derive(Debug)]
struct StoredReport {
    stored_at: Instant,
    report: BacktestReport,
}

impl ResultStore {
    /// Creates a store holding at most `capacity` reports, each for at most
    /// `ttl` after insertion.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    /// Stores a report and returns its generated identifier.
    ///
    /// When the store is full, the oldest surviving entry is evicted first.
    pub fn insert(&mut self, report: BacktestReport) -> String {
        self.purge_expired();

        while self.entries.len() >= self.capacity.max(1) {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }

        let id = format!("bt_{}", Uuid::new_v4().simple());
        self.entries.insert(
            id.clone(),
            StoredReport {
                stored_at: Instant::now(),
                report,
            },
        );
        self.insertion_order.push_back(id.clone());
        id
    }

    /// Looks up a stored report. Returns `None` for unknown ids and for
    /// entries whose TTL has lapsed.
    pub fn get(&mut self, id: &str) -> Option<&BacktestReport> {
        self.purge_expired();
        self.entries.get(id).map(|stored| &stored.report)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn purge_expired(&mut self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, stored| stored.stored_at.elapsed() < ttl);
        let entries = &self.entries;
        self.insertion_order.retain(|id| entries.contains_key(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::BacktestMetrics;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn report() -> BacktestReport {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        BacktestReport {
            strategy_id: "balanced".to_string(),
            start,
            end,
            trading_days: 0,
            initial_capital: dec!(100000),
            final_value: dec!(100000),
            equity_curve: Vec::new(),
            trades: Vec::new(),
            metrics: BacktestMetrics::new(),
        }
    }

    #[test]
    fn stored_reports_are_retrievable_by_id() {
        let mut store = ResultStore::new(4, Duration::from_secs(60));
        let id = store.insert(report());

        assert!(id.starts_with("bt_"));
        assert_eq!(store.get(&id).unwrap().strategy_id, "balanced");
        assert!(store.get("bt_missing").is_none());
    }

    #[test]
    fn capacity_evicts_the_oldest_entry() {
        let mut store = ResultStore::new(2, Duration::from_secs(60));
        let first = store.insert(report());
        let second = store.insert(report());
        let third = store.insert(report());

        assert_eq!(store.len(), 2);
        assert!(store.get(&first).is_none());
        assert!(store.get(&second).is_some());
        assert!(store.get(&third).is_some());
    }

    #[test]
    fn expired_entries_vanish() {
        let mut store = ResultStore::new(4, Duration::ZERO);
        let id = store.insert(report());

        assert!(store.get(&id).is_none());
        assert!(store.is_empty());
    }
}
