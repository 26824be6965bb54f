use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::oneshot;

/// Cloneable summary of a failed refresh, fanned out to every waiter.
#[derive(Debug, Clone)]
pub(crate) struct RefreshFailure {
    pub message: String,
}

pub(crate) type RefreshOutcome = std::result::Result<(), RefreshFailure>;

/// Role assigned to a caller that hit an auth failure.
pub(crate) enum Entry<'a> {
    /// This caller runs the refresh; everyone else waits on it.
    Leader(LeaderLease<'a>),
    /// A refresh is already in flight; await its outcome.
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

/// Obligation to settle the in-flight refresh, held by the leader.
///
/// Settling consumes the lease. If the leader's future is dropped mid-refresh
/// (caller timeout, task abort) the lease settles the batch as a failure on
/// drop, so the coordinator can never be left stuck in the refreshing state
/// with waiters queued on a refresh that will not finish.
pub(crate) struct LeaderLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl LeaderLease<'_> {
    /// Mark the refresh settled and wake every waiter, FIFO.
    pub(crate) fn settle(mut self, outcome: RefreshOutcome) {
        self.settled = true;
        self.coordinator.settle(outcome);
    }
}

impl Drop for LeaderLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.settle(Err(RefreshFailure {
                message: "token refresh was cancelled".to_string(),
            }));
        }
    }
}

#[derive(Default)]
struct State {
    refreshing: bool,
    waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

/// Single-flight gate around the token refresh.
///
/// At most one refresh runs at a time. The check-and-set in [`enter`] and the
/// drain in settle both happen synchronously under one mutex, so no task can
/// observe `refreshing == false` while another is between checking and
/// setting it, and no waiter can enqueue after the drain has started without
/// seeing `refreshing == false` and becoming the next leader.
///
/// [`enter`]: RefreshCoordinator::enter
#[derive(Default)]
pub(crate) struct RefreshCoordinator {
    state: Mutex<State>,
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Claim the refresh, or join the queue behind the one in flight.
    pub(crate) fn enter(&self) -> Entry<'_> {
        let mut state = self.state.lock().unwrap();
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            Entry::Waiter(rx)
        } else {
            state.refreshing = true;
            Entry::Leader(LeaderLease {
                coordinator: self,
                settled: false,
            })
        }
    }

    fn settle(&self, outcome: RefreshOutcome) {
        let waiters = {
            let mut state = self.state.lock().unwrap();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            // A waiter whose task was dropped is fine to skip.
            let _ = waiter.send(outcome.clone());
        }
    }

    #[cfg(test)]
    fn is_refreshing(&self) -> bool {
        self.state.lock().unwrap().refreshing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_entrant_leads_and_later_entrants_wait() {
        let coordinator = RefreshCoordinator::new();
        let entry = coordinator.enter();
        // Match by reference: dropping the lease would settle the refresh.
        assert!(matches!(&entry, Entry::Leader(_)));
        assert!(matches!(coordinator.enter(), Entry::Waiter(_)));
        assert!(matches!(coordinator.enter(), Entry::Waiter(_)));
        assert!(coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn settle_wakes_waiters_in_order_and_resets_state() {
        let coordinator = RefreshCoordinator::new();
        let Entry::Leader(lease) = coordinator.enter() else {
            panic!("first entrant must lead");
        };
        let Entry::Waiter(rx_a) = coordinator.enter() else {
            panic!("second entrant must wait");
        };
        let Entry::Waiter(rx_b) = coordinator.enter() else {
            panic!("third entrant must wait");
        };

        lease.settle(Ok(()));

        assert!(rx_a.await.unwrap().is_ok());
        assert!(rx_b.await.unwrap().is_ok());
        assert!(!coordinator.is_refreshing());
        // A fresh auth failure after settling claims a new refresh.
        assert!(matches!(coordinator.enter(), Entry::Leader(_)));
    }

    #[tokio::test]
    async fn settle_fans_failure_out_to_all_waiters() {
        let coordinator = RefreshCoordinator::new();
        let Entry::Leader(lease) = coordinator.enter() else {
            panic!("first entrant must lead");
        };
        let Entry::Waiter(rx) = coordinator.enter() else {
            panic!("second entrant must wait");
        };

        lease.settle(Err(RefreshFailure {
            message: "refresh endpoint returned 500".to_string(),
        }));

        let outcome = rx.await.unwrap();
        assert_eq!(
            outcome.unwrap_err().message,
            "refresh endpoint returned 500"
        );
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn dropped_lease_settles_batch_as_failure() {
        let coordinator = RefreshCoordinator::new();
        let Entry::Leader(lease) = coordinator.enter() else {
            panic!("first entrant must lead");
        };
        let Entry::Waiter(rx) = coordinator.enter() else {
            panic!("second entrant must wait");
        };

        // Leader cancelled before it could settle.
        drop(lease);

        let outcome = rx.await.unwrap();
        assert_eq!(outcome.unwrap_err().message, "token refresh was cancelled");
        assert!(!coordinator.is_refreshing());
        assert!(matches!(coordinator.enter(), Entry::Leader(_)));
    }

    #[test]
    fn settle_tolerates_dropped_waiters() {
        let coordinator = RefreshCoordinator::new();
        let Entry::Leader(lease) = coordinator.enter() else {
            panic!("first entrant must lead");
        };
        let Entry::Waiter(rx) = coordinator.enter() else {
            panic!("second entrant must wait");
        };
        drop(rx);
        lease.settle(Ok(()));
        assert!(!coordinator.is_refreshing());
    }
}
