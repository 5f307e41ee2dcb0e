use log::{debug, warn};
use parking_lot::Mutex;

use super::transaction::{Transaction, TransactionError, TransactionOrigin};

/// Pending transactions waiting to be sealed into a block
#[derive(Debug, Default)]
pub struct TransactionPool {
    transactions: Mutex<Vec<Transaction>>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `transaction` against its origin and appends it.
    ///
    /// Reward transactions are always accepted. Signed transactions are
    /// accepted only if the signature verifies over the transaction digest;
    /// a rejected transaction leaves the pool untouched.
    pub fn add_transaction(
        &self,
        transaction: Transaction,
        origin: &TransactionOrigin,
    ) -> Result<(), TransactionError> {
        if let Err(err) = transaction.verify_origin(origin) {
            warn!(
                "Rejected transaction {} -> {} ({}): {}",
                transaction.sender_address, transaction.recipient_address, transaction.value, err
            );
            return Err(err);
        }

        debug!(
            "Accepted transaction {} -> {} ({})",
            transaction.sender_address, transaction.recipient_address, transaction.value
        );
        self.transactions.lock().push(transaction);
        Ok(())
    }

    /// Returns an independent copy of the pending transactions
    pub fn copy_pool(&self) -> Vec<Transaction> {
        self.transactions.lock().clone()
    }

    /// Atomically empties the pool and returns what it held
    pub fn drain_pool(&self) -> Vec<Transaction> {
        std::mem::take(&mut *self.transactions.lock())
    }

    /// Puts drained transactions back ahead of anything that arrived since
    pub fn restore(&self, drained: Vec<Transaction>) {
        let mut transactions = self.transactions.lock();
        let arrived = std::mem::replace(&mut *transactions, drained);
        transactions.extend(arrived);
    }

    pub fn len(&self) -> usize {
        self.transactions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::Wallet;

    fn signed(wallet: &Wallet, recipient: &str, value: f64) -> (Transaction, TransactionOrigin) {
        let transaction = Transaction::new(wallet.address(), recipient, value);
        let signature = wallet.sign(&transaction).unwrap();
        let origin = TransactionOrigin::UserSigned {
            public_key: wallet.public_key().clone(),
            signature,
        };
        (transaction, origin)
    }

    #[test]
    fn test_add_valid_transaction() {
        let pool = TransactionPool::new();
        let wallet = Wallet::new();
        let (transaction, origin) = signed(&wallet, "bob", 5.0);

        pool.add_transaction(transaction.clone(), &origin).unwrap();

        let pending = pool.copy_pool();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.iter().filter(|tx| **tx == transaction).count(), 1);
    }

    #[test]
    fn test_reject_invalid_signature() {
        let pool = TransactionPool::new();
        let wallet = Wallet::new();
        let (_, origin) = signed(&wallet, "bob", 5.0);
        let forged = Transaction::new(wallet.address(), "mallory", 5.0);

        let result = pool.add_transaction(forged, &origin);

        assert!(matches!(result, Err(TransactionError::InvalidSignature)));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_reward_needs_no_signature() {
        let pool = TransactionPool::new();

        pool.add_transaction(Transaction::new_reward("miner", 1.0), &TransactionOrigin::Reward)
            .unwrap();

        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_copy_is_independent() {
        let pool = TransactionPool::new();
        pool.add_transaction(Transaction::new_reward("miner", 1.0), &TransactionOrigin::Reward)
            .unwrap();

        let mut copy = pool.copy_pool();
        copy.clear();
        copy.push(Transaction::new("x", "y", 2.0));

        assert_eq!(pool.copy_pool(), vec![Transaction::new_reward("miner", 1.0)]);
    }

    #[test]
    fn test_drain_pool() {
        let pool = TransactionPool::new();
        let wallet = Wallet::new();
        let (first, origin) = signed(&wallet, "bob", 1.0);
        pool.add_transaction(first.clone(), &origin).unwrap();
        pool.add_transaction(Transaction::new_reward("miner", 1.0), &TransactionOrigin::Reward)
            .unwrap();

        let drained = pool.drain_pool();

        assert_eq!(drained, vec![first, Transaction::new_reward("miner", 1.0)]);
        assert!(pool.is_empty());
        assert!(pool.drain_pool().is_empty());
    }

    #[test]
    fn test_restore_keeps_order() {
        let pool = TransactionPool::new();
        let wallet = Wallet::new();
        let (first, origin) = signed(&wallet, "bob", 1.0);
        pool.add_transaction(first.clone(), &origin).unwrap();

        let drained = pool.drain_pool();
        let (late, origin) = signed(&wallet, "carol", 2.0);
        pool.add_transaction(late.clone(), &origin).unwrap();
        pool.restore(drained);

        assert_eq!(pool.copy_pool(), vec![first, late]);
    }
}
