//! Bounded Trade Log
//!
//! In-memory, most-recent-first record of dispatched trades. Entries only
//! leave via an explicit clear or by falling off the cap.
//!
//! Author: AI-Generated
//! Created: 2026-08-05

use crate::types::TradeRecord;

pub const DEFAULT_TRADE_LOG_CAP: usize = 20;

/// Append-only bounded log, newest entry first.
#[derive(Debug)]
pub struct TradeLog {
    cap: usize,
    records: Vec<TradeRecord>,
}

impl TradeLog {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            records: Vec::with_capacity(cap),
        }
    }

    /// Prepend a record, evicting the oldest entry beyond the cap.
    pub fn add(&mut self, record: TradeRecord) {
        self.records.insert(0, record);
        self.records.truncate(self.cap);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn latest(&self) -> Option<&TradeRecord> {
        self.records.first()
    }

    pub fn as_slice(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for TradeLog {
    fn default() -> Self {
        Self::new(DEFAULT_TRADE_LOG_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExecutionPath;
    use alloy::primitives::Address;

    fn record(n: usize) -> TradeRecord {
        TradeRecord {
            tx_hash: format!("0x{:064x}", n),
            path: ExecutionPath::Server,
            amount_in_wei: "1000000".into(),
            token_in: Address::ZERO,
            token_out: Address::ZERO,
            recipient: Address::ZERO,
            at: n as i64,
        }
    }

    #[test]
    fn test_most_recent_first() {
        let mut log = TradeLog::default();
        log.add(record(1));
        log.add(record(2));
        log.add(record(3));
        assert_eq!(log.len(), 3);
        assert_eq!(log.latest().unwrap().at, 3);
        assert_eq!(log.as_slice()[2].at, 1);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut log = TradeLog::default();
        for n in 0..30 {
            log.add(record(n));
        }
        assert_eq!(log.len(), DEFAULT_TRADE_LOG_CAP);
        // Newest 20 survive: 29 down to 10.
        assert_eq!(log.latest().unwrap().at, 29);
        assert_eq!(log.as_slice().last().unwrap().at, 10);
    }

    #[test]
    fn test_clear() {
        let mut log = TradeLog::new(5);
        log.add(record(1));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
        assert!(log.latest().is_none());
    }
}
