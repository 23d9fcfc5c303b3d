// Keyscan Scan History
// Decoded scans kept for display

use std::collections::VecDeque;
use std::time::SystemTime;

/// Default number of scans kept by [`ScanHistory`]
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// One successfully decoded scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    /// Trimmed barcode text
    pub barcode: String,
    /// 1-based count of scans emitted by the owning decoder
    pub sequence: u64,
    /// Wall-clock time of the decode
    pub scanned_at: SystemTime,
}

/// Bounded log of recent scans, most recent first
#[derive(Debug, Clone)]
pub struct ScanHistory {
    records: VecDeque<ScanRecord>,
    capacity: usize,
}

impl ScanHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// A capacity of zero keeps nothing
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: ScanRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_back();
        }
        self.records.push_front(record);
    }

    pub fn latest(&self) -> Option<&ScanRecord> {
        self.records.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

}

impl Default for ScanHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(barcode: &str, sequence: u64) -> ScanRecord {
        ScanRecord {
            barcode: barcode.to_string(),
            sequence,
            scanned_at: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_most_recent_first() {
        let mut history = ScanHistory::new();
        history.push(record("1111", 1));
        history.push(record("2222", 2));
        assert_eq!(history.latest().map(|r| r.barcode.as_str()), Some("2222"));
        let order: Vec<u64> = history.iter().map(|r| r.sequence).collect();
        assert_eq!(order, vec![2, 1]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = ScanHistory::with_capacity(2);
        history.push(record("a", 1));
        history.push(record("b", 2));
        history.push(record("c", 3));
        assert_eq!(history.len(), 2);
        let order: Vec<&str> = history.iter().map(|r| r.barcode.as_str()).collect();
        assert_eq!(order, vec!["c", "b"]);
    }

    #[test]
    fn test_zero_capacity() {
        let mut history = ScanHistory::with_capacity(0);
        history.push(record("a", 1));
        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }
}
