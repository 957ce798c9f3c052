//! In-memory conversation store.
//!
//! One `Transcript` per user, created lazily and kept for the process
//! lifetime. Each transcript sits behind its own `tokio::sync::Mutex`;
//! holding that lock across a completion call is what serializes two
//! in-flight messages from the same user, while other users proceed
//! independently.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use gptgram_core::types::{Role, Turn, UserId};

/// Ordered turn sequence for one user.
///
/// Invariant: at most one system turn exists and it is always first.
/// Turns are never reordered; only `set_system` touches the head.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn in dialogue order.
    ///
    /// A system turn routed through here is redirected to `set_system`,
    /// so the single-system-first invariant holds no matter the caller.
    pub fn push(&mut self, turn: Turn) {
        match turn.role {
            Role::System => self.set_system(turn.text),
            _ => self.turns.push(turn),
        }
    }

    /// Set or replace the system prompt. Any existing system turn is
    /// removed; the relative order of the remaining turns is preserved.
    pub fn set_system(&mut self, text: impl Into<String>) {
        self.turns.retain(|t| t.role != Role::System);
        self.turns.insert(0, Turn::system(text));
    }

    /// Drop every turn, system prompt included.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Build the completion request payload.
    ///
    /// With a window, the system turn (if any) survives and only the last
    /// `max_turns` non-system turns follow it; the stored transcript is
    /// untouched. Without one, the full transcript is cloned.
    pub fn payload(&self, max_turns: Option<usize>) -> Vec<Turn> {
        let Some(max) = max_turns else {
            return self.turns.clone();
        };

        let mut out: Vec<Turn> = self
            .turns
            .iter()
            .filter(|t| t.role == Role::System)
            .cloned()
            .collect();
        let rest: Vec<&Turn> = self
            .turns
            .iter()
            .filter(|t| t.role != Role::System)
            .collect();
        let skip = rest.len().saturating_sub(max);
        out.extend(rest.into_iter().skip(skip).cloned());
        out
    }
}

/// Map from user to transcript. Shared across all handler tasks.
pub struct DialogStore {
    dialogs: DashMap<UserId, Arc<Mutex<Transcript>>>,
    max_turns: Option<usize>,
}

impl DialogStore {
    pub fn new(max_turns: Option<usize>) -> Self {
        Self {
            dialogs: DashMap::new(),
            max_turns,
        }
    }

    /// Fetch the user's dialog handle, creating an empty transcript on
    /// first contact.
    pub fn dialog(&self, user: &UserId) -> Arc<Mutex<Transcript>> {
        self.dialogs
            .entry(user.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Transcript::new())))
            .clone()
    }

    /// Configured payload window (None = send the full transcript).
    pub fn max_turns(&self) -> Option<usize> {
        self.max_turns
    }

    /// Reset the user's transcript to empty. Idempotent.
    pub async fn clear(&self, user: &UserId) {
        self.dialog(user).lock().await.clear();
    }

    /// Set or replace the user's system prompt, creating the transcript
    /// if it does not exist yet.
    pub async fn set_system(&self, user: &UserId, text: &str) {
        self.dialog(user).lock().await.set_system(text);
    }
}
