use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock, RwLockReadGuard};

use crate::models::{NetworkFeeEntry, Token};

/// Shared between the price loop, the fee loop and the read handler.
///
/// Each field has its own lock:
/// - `snapshot`: written only by the price loop, once per successful cycle,
///   as a whole-vector swap. Readers hold the read lock while serializing.
/// - `latest_quotes`: priced tokens from the most recent cycle, published or
///   not. The fee loop reads it to decide which fees to fetch.
/// - `fee_table`: loaded once by the price loop, fixed fees rewritten by the
///   fee loop.
/// - `fees_ready`: set after the first full fee pass, never cleared.
pub struct AppState {
    snapshot: RwLock<Option<Arc<Vec<Token>>>>,
    latest_quotes: RwLock<Arc<Vec<Token>>>,
    fee_table: RwLock<Option<Vec<NetworkFeeEntry>>>,
    fees_ready: AtomicBool,
    inputs_seen: watch::Sender<bool>,
}

pub type SharedState = Arc<AppState>;

impl Default for AppState {
    fn default() -> Self {
        let (inputs_seen, _) = watch::channel(false);
        Self {
            snapshot: RwLock::new(None),
            latest_quotes: RwLock::new(Arc::new(Vec::new())),
            fee_table: RwLock::new(None),
            fees_ready: AtomicBool::new(false),
            inputs_seen,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a complete result set.
    pub async fn publish(&self, tokens: Vec<Token>) {
        let next = Arc::new(tokens);
        *self.snapshot.write().await = Some(next);
    }

    /// Read guard over the published snapshot; `None` before the first publish.
    pub async fn read_snapshot(&self) -> RwLockReadGuard<'_, Option<Arc<Vec<Token>>>> {
        self.snapshot.read().await
    }

    #[cfg(test)]
    pub async fn snapshot(&self) -> Option<Arc<Vec<Token>>> {
        self.snapshot.read().await.clone()
    }

    pub async fn set_latest_quotes(&self, tokens: Vec<Token>) {
        *self.latest_quotes.write().await = Arc::new(tokens);
    }

    pub async fn latest_quotes(&self) -> Arc<Vec<Token>> {
        self.latest_quotes.read().await.clone()
    }

    pub async fn fee_table_loaded(&self) -> bool {
        self.fee_table.read().await.is_some()
    }

    pub async fn set_fee_table(&self, entries: Vec<NetworkFeeEntry>) {
        *self.fee_table.write().await = Some(entries);
    }

    /// Copy of the table, empty while it has not been loaded.
    pub async fn fee_table(&self) -> Vec<NetworkFeeEntry> {
        self.fee_table.read().await.clone().unwrap_or_default()
    }

    /// Store a priced fee for one entry. No-op if the table has not been loaded
    /// or the index is out of range.
    pub async fn set_fixed_fee(&self, index: usize, fee: rust_decimal::Decimal) {
        if let Some(entry) = self
            .fee_table
            .write()
            .await
            .as_mut()
            .and_then(|t| t.get_mut(index))
        {
            entry.fixed_fee = Some(fee);
        }
    }

    pub fn is_ready(&self) -> bool {
        self.fees_ready.load(Ordering::Acquire)
    }

    pub fn mark_ready(&self) {
        self.fees_ready.store(true, Ordering::Release);
    }

    /// Fee table and first quotes are both in place.
    pub fn signal_inputs_seen(&self) {
        self.inputs_seen.send_replace(true);
    }

    /// Resolves once `signal_inputs_seen` has been called.
    pub async fn wait_for_inputs(&self) {
        let mut rx = self.inputs_seen.subscribe();
        // the sender lives in self, so the channel cannot close here
        let _ = rx.wait_for(|seen| *seen).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn generation(gen: i64, len: usize) -> Vec<Token> {
        (0..len)
            .map(|i| Token {
                last_updated: gen,
                name: format!("t{i}"),
                ..Default::default()
            })
            .collect()
    }

    #[tokio::test]
    async fn nothing_published_initially() {
        let state = AppState::new();
        assert!(state.snapshot().await.is_none());
        assert!(!state.is_ready());
        assert!(state.fee_table().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn readers_never_see_a_mixed_snapshot() {
        let state: SharedState = Arc::new(AppState::new());
        state.publish(generation(0, 1)).await;

        let writer = {
            let state = state.clone();
            tokio::spawn(async move {
                for gen in 1..200i64 {
                    state.publish(generation(gen, (gen % 7 + 1) as usize)).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..4 {
            let state = state.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..500 {
                    let guard = state.read_snapshot().await;
                    let tokens = guard.as_ref().expect("published");
                    let gen = tokens[0].last_updated;
                    assert_eq!(tokens.len(), (gen % 7 + 1) as usize);
                    assert!(tokens.iter().all(|t| t.last_updated == gen));
                    drop(guard);
                    tokio::task::yield_now().await;
                }
            }));
        }

        writer.await.unwrap();
        for r in readers {
            r.await.unwrap();
        }
        assert_eq!(state.snapshot().await.unwrap()[0].last_updated, 199);
    }

    #[tokio::test]
    async fn fixed_fee_updates_single_entry() {
        let state = AppState::new();
        state.set_fixed_fee(0, rust_decimal::Decimal::ONE).await;
        assert!(state.fee_table().await.is_empty());

        state
            .set_fee_table(vec![NetworkFeeEntry::default(), NetworkFeeEntry::default()])
            .await;
        state.set_fixed_fee(1, rust_decimal::Decimal::ONE).await;
        state.set_fixed_fee(9, rust_decimal::Decimal::ONE).await;
        let table = state.fee_table().await;
        assert_eq!(table[0].fixed_fee, None);
        assert_eq!(table[1].fixed_fee, Some(rust_decimal::Decimal::ONE));
    }

    #[tokio::test]
    async fn waiters_wake_on_signal() {
        let state: SharedState = Arc::new(AppState::new());
        let waiter = {
            let state = state.clone();
            tokio::spawn(async move { state.wait_for_inputs().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());
        state.signal_inputs_seen();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("woken")
            .unwrap();

        // already signalled: returns at once
        state.wait_for_inputs().await;
    }
}
