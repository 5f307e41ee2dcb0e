use log::{error, info};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use std::time::Duration;

use super::chain::Blockchain;

/// A running auto-mining loop
#[derive(Debug)]
struct MiningTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Periodically seals the pending pool until stopped.
///
/// The next attempt is scheduled only after the previous one has finished, so
/// attempts never overlap. Stopping takes effect between attempts; a seal
/// already in progress runs to completion.
#[derive(Debug)]
pub struct MiningScheduler {
    blockchain: Blockchain,
    interval: Duration,
    task: Mutex<Option<MiningTask>>,
}

impl MiningScheduler {
    pub fn new(blockchain: Blockchain, interval: Duration) -> Self {
        Self {
            blockchain,
            interval,
            task: Mutex::new(None),
        }
    }

    /// Starts the loop on the current tokio runtime.
    ///
    /// Returns false if a loop is already running.
    pub fn start(&self) -> bool {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|running| !running.handle.is_finished()) {
            return false;
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(run(self.blockchain.clone(), self.interval, token.clone()));
        *task = Some(MiningTask { token, handle });

        info!("Automatic mining started, interval {:?}", self.interval);
        true
    }

    /// Stops the loop. Returns false if none was running.
    pub fn stop(&self) -> bool {
        match self.task.lock().take() {
            Some(running) => {
                running.token.cancel();
                info!("Automatic mining stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }
}

impl Drop for MiningScheduler {
    fn drop(&mut self) {
        if let Some(running) = self.task.get_mut().take() {
            running.token.cancel();
        }
    }
}

async fn run(blockchain: Blockchain, interval: Duration, token: CancellationToken) {
    while !token.is_cancelled() {
        match blockchain.mine().await {
            Ok(Some(block)) => info!("Auto-mined block with {} transactions", block.transactions.len()),
            Ok(None) => {}
            Err(err) => error!("Automatic mining failed: {}", err),
        }

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::transaction::{Transaction, TransactionOrigin};
    use crate::config::LedgerConfig;

    fn blockchain() -> Blockchain {
        Blockchain::new("miner", LedgerConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let scheduler = MiningScheduler::new(blockchain(), Duration::from_secs(60));

        assert!(!scheduler.is_running());
        assert!(scheduler.start());
        assert!(scheduler.is_running());
        assert!(!scheduler.start());

        assert!(scheduler.stop());
        assert!(!scheduler.stop());
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_loop_seals_pending_transactions() {
        let blockchain = blockchain();
        let scheduler = MiningScheduler::new(blockchain.clone(), Duration::from_millis(20));
        scheduler.start();

        blockchain
            .add_transaction(Transaction::new("a", "b", 2.0), &TransactionOrigin::Reward)
            .unwrap();

        let mut sealed = false;
        for _ in 0..500 {
            if blockchain.len() == 2 {
                sealed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        scheduler.stop();

        assert!(sealed);
        assert_eq!(blockchain.balance_of("b"), 2.0);
        assert_eq!(blockchain.balance_of("miner"), 1.0);
    }

    #[tokio::test]
    async fn test_stopped_loop_does_not_mine() {
        let blockchain = blockchain();
        let scheduler = MiningScheduler::new(blockchain.clone(), Duration::from_millis(10));
        scheduler.start();
        scheduler.stop();
        tokio::time::sleep(Duration::from_millis(50)).await;

        blockchain
            .add_transaction(Transaction::new("a", "b", 2.0), &TransactionOrigin::Reward)
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(blockchain.len(), 1);
        assert_eq!(blockchain.get_pending_transactions().len(), 1);
    }
}
