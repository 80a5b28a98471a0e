//! Shared utilities for integration tests.
//!
//! Boots the real HTTP server on an ephemeral port against in-memory
//! providers. Nothing here touches a real network.

#![allow(dead_code)]

use alloy::primitives::{Address, B256, U256};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use block_explorer::blockchain::mock::MockProviderFactory;
use block_explorer::blockchain::types::{BlockContents, BlockSummary, TransactionDetails};
use block_explorer::config::ExplorerConfig;
use block_explorer::http::HttpServer;
use block_explorer::lifecycle::Shutdown;

/// Anvil's first account.
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const RECIPIENT: &str = "0x2222222222222222222222222222222222222222";

/// A running explorer bound to `127.0.0.1:0`.
pub struct TestServer {
    pub addr: SocketAddr,
    pub factory: Arc<MockProviderFactory>,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the server with default configuration.
pub async fn start_server(factory: MockProviderFactory) -> TestServer {
    start_server_with(ExplorerConfig::default(), factory).await
}

/// Start the server with `config`; the listener is bound before returning.
pub async fn start_server_with(config: ExplorerConfig, factory: MockProviderFactory) -> TestServer {
    let factory = Arc::new(factory);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, factory.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    TestServer {
        addr,
        factory,
        client,
        shutdown,
    }
}

pub fn address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn tx_hash_hex(byte: u8) -> String {
    format!("0x{}", format!("{:02x}", byte).repeat(32))
}

/// A mined or pending transfer of 0.01 ETH priced at 1.5 gwei.
pub fn transaction(byte: u8, block_number: Option<u64>) -> TransactionDetails {
    TransactionDetails {
        hash: B256::repeat_byte(byte),
        from: address(0x11),
        to: Some(address(0x22)),
        value: U256::from(10_000_000_000_000_000u64),
        block_number,
        gas_price: Some(1_500_000_000),
        nonce: 0,
        gas_limit: 21_000,
    }
}

pub fn block(number: u64, transactions: Vec<TransactionDetails>) -> BlockSummary {
    BlockSummary {
        number,
        hash: B256::repeat_byte((number % 251) as u8 + 1),
        parent_hash: B256::repeat_byte((number % 251) as u8),
        timestamp: 1_700_000_000 + number * 12,
        gas_used: 21_000 * transactions.len() as u64,
        gas_limit: 30_000_000,
        miner: address(0x99),
        base_fee_per_gas: Some(1_000_000_000),
        transactions: BlockContents::Full(transactions),
    }
}
