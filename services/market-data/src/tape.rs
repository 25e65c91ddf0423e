//! Trade tape
//!
//! Bounded history of executed trades with replay from a publish sequence,
//! so a late consumer can backfill what it missed while the window allows.

use std::collections::VecDeque;

use types::trade::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct TapeEntry {
    /// Publish sequence of the trade event.
    pub sequence: u64,
    pub trade: Trade,
}

#[derive(Debug)]
pub struct TradeTape {
    history: VecDeque<TapeEntry>,
    max_history: usize,
}

impl TradeTape {
    pub fn new(max_history: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Record a trade, evicting the oldest entry once the window is full.
    pub fn record(&mut self, sequence: u64, trade: Trade) {
        if self.history.len() == self.max_history {
            self.history.pop_front();
        }
        self.history.push_back(TapeEntry { sequence, trade });
    }

    /// Most recent `n` trades, newest last.
    pub fn recent(&self, n: usize) -> Vec<&TapeEntry> {
        let start = self.history.len().saturating_sub(n);
        self.history.range(start..).collect()
    }

    /// All retained trades with a publish sequence after `sequence`.
    pub fn since(&self, sequence: u64) -> Vec<&TapeEntry> {
        self.history
            .iter()
            .filter(|entry| entry.sequence > sequence)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl Default for TradeTape {
    fn default() -> Self {
        Self::new(10_000)
    }
}
