//! Bounded message history for the stateless chat path.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use openai_sdk::ChatMessage;

/// One recorded message.
pub type Turn = ChatMessage;

/// Ordered buffer of recent turns, oldest evicted first.
///
/// Every mutation runs inside one critical section, so concurrent calls can
/// interleave whole exchanges but never split one or exceed the capacity.
#[derive(Debug)]
pub struct HistoryStore {
    inner: Mutex<History>,
}

#[derive(Debug)]
struct History {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl History {
    fn trim(&mut self) {
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }
}

impl HistoryStore {
    /// Create an empty store holding at most `capacity` turns.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(History {
                turns: VecDeque::with_capacity(capacity),
                capacity,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, History> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Maximum number of turns kept.
    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    /// Change the capacity, dropping the oldest turns if needed.
    pub fn set_capacity(&self, capacity: usize) {
        let mut history = self.lock();
        history.capacity = capacity;
        history.trim();
    }

    /// Record a question and its answer as a user turn then an assistant turn.
    pub fn append(&self, question: &str, answer: &str) {
        let mut history = self.lock();
        history.turns.push_back(Turn::user(question));
        history.turns.push_back(Turn::assistant(answer));
        history.trim();
    }

    /// Record an exchange under a new capacity in one critical section.
    ///
    /// Used once a reply has arrived, so a failed call never trims.
    pub fn append_with_capacity(&self, question: &str, answer: &str, capacity: usize) {
        let mut history = self.lock();
        history.capacity = capacity;
        history.turns.push_back(Turn::user(question));
        history.turns.push_back(Turn::assistant(answer));
        history.trim();
    }

    /// The most recent `limit` turns in chronological order.
    pub fn snapshot(&self, limit: usize) -> Vec<Turn> {
        let history = self.lock();
        let skip = history.turns.len().saturating_sub(limit);
        history.turns.iter().skip(skip).cloned().collect()
    }

    /// Remove every turn.
    pub fn clear(&self) {
        self.lock().turns.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().turns.is_empty()
    }
}

#[cfg(test)]
#[path = "history.test.rs"]
mod tests;
