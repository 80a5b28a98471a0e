//! Account reads: balance and overview.

use alloy::primitives::Address;
use std::sync::Arc;

use crate::amount::Amount;
use crate::blockchain::client::ChainProvider;
use crate::blockchain::types::{BlockchainResult, NetworkKey};

/// Native balance of an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalance {
    pub address: Address,
    pub balance: Amount,
}

/// Balance, code presence and the head block at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOverview {
    pub address: Address,
    pub balance: Amount,
    pub is_contract: bool,
    pub block_number: u64,
    pub network: NetworkKey,
}

pub struct AccountReader {
    provider: Arc<dyn ChainProvider>,
}

impl AccountReader {
    pub fn new(provider: Arc<dyn ChainProvider>) -> Self {
        Self { provider }
    }

    pub async fn balance(&self, address: Address) -> BlockchainResult<AccountBalance> {
        let wei = self.provider.get_balance(address).await?;
        Ok(AccountBalance {
            address,
            balance: Amount::native(wei),
        })
    }

    /// All three reads run concurrently; any failure fails the overview.
    pub async fn overview(&self, address: Address) -> BlockchainResult<AccountOverview> {
        let (wei, is_contract, block_number) = tokio::try_join!(
            self.provider.get_balance(address),
            self.provider.is_contract_address(address),
            self.provider.get_block_number(),
        )?;

        tracing::debug!(network = %self.provider.network(), address = %address, is_contract, "Account overview");

        Ok(AccountOverview {
            address,
            balance: Amount::native(wei),
            is_contract,
            block_number,
            network: self.provider.network(),
        })
    }
}
