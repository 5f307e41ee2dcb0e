// Runtime configuration
//
// Ledger parameters are fixed for the life of the process; the binaries only
// expose network settings and the auto-mining cadence on the command line.

use clap::Parser;

use std::time::Duration;

use crate::blockchain::pow::MINING_DIFFICULTY;

/// Amount paid to the chain owner for every sealed block
pub const MINING_REWARD: f64 = 1.0;

/// Seconds between two automatic seal attempts
pub const MINING_TIMER_SEC: u64 = 20;

/// Parameters of a ledger instance
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Leading zero hex characters required in a block hash
    pub difficulty: usize,

    /// Reward credited to the owner address per sealed block
    pub mining_reward: f64,

    /// Pause between automatic seal attempts
    pub mining_interval: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: MINING_DIFFICULTY,
            mining_reward: MINING_REWARD,
            mining_interval: Duration::from_secs(MINING_TIMER_SEC),
        }
    }
}

/// Command line of the ledger server
#[derive(Debug, Parser)]
#[command(version, about = "Single-node proof-of-work ledger")]
pub struct LedgerArgs {
    /// Interface to listen on
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// TCP port for the ledger API
    #[arg(short, long, default_value_t = 5655)]
    pub port: u16,

    /// Seconds between automatic seal attempts once mining is started
    #[arg(long, default_value_t = MINING_TIMER_SEC)]
    pub mining_interval: u64,
}

impl LedgerArgs {
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            mining_interval: Duration::from_secs(self.mining_interval),
            ..LedgerConfig::default()
        }
    }
}

/// Command line of the wallet gateway
#[derive(Debug, Parser)]
#[command(version, about = "Wallet gateway for the proof-of-work ledger")]
pub struct WalletServerArgs {
    /// Interface to listen on
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// TCP port for the wallet API
    #[arg(short, long, default_value_t = 9657)]
    pub port: u16,

    /// Base URL of the ledger server
    #[arg(short, long, default_value = "http://127.0.0.1:5655")]
    pub gateway: String,
}
