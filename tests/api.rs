//! End-to-end tests of the JSON routes.

use alloy::primitives::B256;
use reqwest::StatusCode;
use serde_json::{json, Value};

use block_explorer::blockchain::mock::{raw_nft, raw_transfer, MockChainProvider, MockProviderFactory};
use block_explorer::blockchain::types::{NetworkKey, ReceiptSummary};
use block_explorer::nft::types::RawNftSource;

mod common;
use common::*;

#[tokio::test]
async fn test_health_and_request_id() {
    let server = start_server(MockProviderFactory::new()).await;

    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let id = res.headers().get("x-request-id").unwrap().to_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    let res = server
        .client
        .get(server.url("/health"))
        .header("x-request-id", "client-chosen")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers().get("x-request-id").unwrap(), "client-chosen");
}

#[tokio::test]
async fn test_send_transaction() {
    let factory = MockProviderFactory::new()
        .with_provider(MockChainProvider::new(NetworkKey::Sepolia).with_head(100).with_nonce(7));
    let server = start_server(factory).await;

    let res = server
        .client
        .post(server.url("/api/send-transaction"))
        .json(&json!({
            "toAddress": RECIPIENT,
            "amountInETH": "0.01",
            "privateKey": TEST_PRIVATE_KEY,
            "network": "sepolia",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "success");
    assert_eq!(body["blockNumber"], 101);
    assert_eq!(body["value"], "0.01");
    assert_eq!(body["network"], "sepolia");
    assert_eq!(body["from"].as_str().unwrap().to_lowercase(), TEST_ADDRESS);

    let provider = server.factory.provider(NetworkKey::Sepolia).unwrap();
    assert_eq!(provider.recorded().submitted.len(), 1);
}

#[tokio::test]
async fn test_send_accepts_numeric_amount() {
    let factory = MockProviderFactory::new().with_provider(MockChainProvider::new(NetworkKey::Sepolia));
    let server = start_server(factory).await;

    let res = server
        .client
        .post(server.url("/api/send-transaction"))
        .json(&json!({
            "toAddress": RECIPIENT,
            "amountInETH": 0.5,
            "privateKey": format!("0x{}", TEST_PRIVATE_KEY),
            "network": "xyz",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["value"], "0.5");
    // unknown keys fall back to the test network
    assert_eq!(body["network"], "sepolia");
}

#[tokio::test]
async fn test_send_validation_precedes_provider() {
    let factory = MockProviderFactory::new().with_provider(MockChainProvider::new(NetworkKey::Sepolia));
    let server = start_server(factory).await;

    let res = server
        .client
        .post(server.url("/api/send-transaction"))
        .json(&json!({ "toAddress": RECIPIENT, "network": "sepolia" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Missing required fields: amountInETH, privateKey");

    let short_recipient = &RECIPIENT[..41];
    let res = server
        .client
        .post(server.url("/api/send-transaction"))
        .json(&json!({
            "toAddress": short_recipient,
            "amountInETH": "1",
            "privateKey": TEST_PRIVATE_KEY,
            "network": "sepolia",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid address format"));

    assert!(server.factory.requested().is_empty());
    assert_eq!(server.factory.provider(NetworkKey::Sepolia).unwrap().recorded().calls, 0);
}

#[tokio::test]
async fn test_transaction_status() {
    let mined = transaction(0xaa, Some(500));
    let pending = transaction(0xbb, None);
    let provider = MockChainProvider::new(NetworkKey::Mainnet)
        .with_head(502)
        .with_block(block(500, vec![mined.clone()]))
        .with_transaction(mined)
        .with_transaction(pending)
        .with_receipt(
            B256::repeat_byte(0xaa),
            ReceiptSummary { success: true, gas_used: 21_000, block_number: Some(500) },
        );
    let server = start_server(MockProviderFactory::new().with_provider(provider)).await;

    let res = server
        .client
        .get(server.url("/api/transaction"))
        .query(&[("hash", tx_hash_hex(0xaa))])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["confirmations"], 3);
    assert_eq!(body["value"], "0.01");
    assert_eq!(body["gasUsed"], "21000");
    assert_eq!(body["gasPrice"], "1.50 Gwei");
    assert_eq!(body["timestamp"], 1_700_000_000u64 + 500 * 12);
    assert_eq!(body["network"], "mainnet");

    let res = server
        .client
        .get(server.url("/api/transaction"))
        .query(&[("hash", tx_hash_hex(0xbb)), ("network", "mainnet".to_string())])
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "pending");
    assert_eq!(body["confirmations"], 0);
    assert_eq!(body["gasUsed"], "N/A");
    assert!(body["timestamp"].is_null());
}

#[tokio::test]
async fn test_transaction_lookup_errors() {
    let server = start_server(
        MockProviderFactory::new().with_provider(MockChainProvider::new(NetworkKey::Mainnet)),
    )
    .await;

    let res = server
        .client
        .get(server.url("/api/transaction"))
        .query(&[("hash", tx_hash_hex(0x01))])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.client.get(server.url("/api/transaction")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .get(server.url("/api/transaction"))
        .query(&[("hash", "0xabc")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transfers_lookup() {
    let me = address(0x11);
    let shared = raw_transfer(0xab, "0x7", "external", address(0x33), Some(me));
    let provider = MockChainProvider::new(NetworkKey::Mainnet)
        .with_incoming(vec![
            shared.clone(),
            raw_transfer(0x01, "0x5", "external", address(0x33), Some(me)),
        ])
        .with_outgoing(vec![
            shared,
            raw_transfer(0x02, "0x10", "external", me, None),
            raw_transfer(0x03, "0xA", "external", me, Some(address(0x44))),
        ]);
    let server = start_server(MockProviderFactory::new().with_provider(provider)).await;

    let res = server
        .client
        .get(server.url("/api/transfers"))
        .query(&[("address", me.to_string()), ("category", "bogus".to_string())])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["network"], "mainnet");

    let transfers = body["transfers"].as_array().unwrap();
    let blocks: Vec<&str> = transfers.iter().map(|t| t["blockNum"].as_str().unwrap()).collect();
    assert_eq!(blocks, vec!["16", "10", "7", "5"]);
    assert_eq!(transfers[0]["formattedTo"], "Contract");
    assert_eq!(transfers[0]["direction"], "out");
    assert_eq!(transfers[2]["direction"], "in");
    assert_eq!(transfers[1]["value"], "1");

    let queries = server.factory.provider(NetworkKey::Mainnet).unwrap().recorded().transfer_queries;
    assert!(queries.iter().all(|q| q.category.len() == 1 && q.max_count == 25));
    assert_eq!(server.factory.requested(), vec![NetworkKey::Mainnet]);
}

#[tokio::test]
async fn test_account_history() {
    let me = address(0x11);
    let provider = MockChainProvider::new(NetworkKey::Sepolia)
        .with_outgoing(vec![raw_transfer(0x05, "0x20", "erc20", me, None)])
        .with_incoming(vec![raw_transfer(0x06, "0x30", "external", address(0x55), Some(me))]);
    let server = start_server(MockProviderFactory::new().with_provider(provider)).await;

    let res = server
        .client
        .get(server.url("/api/account/transactions"))
        .query(&[("address", me.to_string()), ("network", "xyz".to_string())])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let transfers: Vec<Value> = res.json().await.unwrap();
    assert_eq!(transfers.len(), 2);
    assert_eq!(transfers[0]["blockNum"], "48");
    assert_eq!(transfers[1]["formattedTo"], "");
    assert_eq!(server.factory.requested(), vec![NetworkKey::Sepolia]);

    let queries = server.factory.provider(NetworkKey::Sepolia).unwrap().recorded().transfer_queries;
    assert!(queries.iter().all(|q| q.with_metadata && q.category.len() == 4));
}

#[tokio::test]
async fn test_account_reads() {
    let contract = address(0x77);
    let provider = MockChainProvider::new(NetworkKey::Mainnet)
        .with_head(1_234)
        .with_balance(contract, alloy::primitives::U256::from(2_500_000_000_000_000_000u64))
        .with_contract(contract);
    let server = start_server(MockProviderFactory::new().with_provider(provider)).await;

    let res = server
        .client
        .get(server.url("/api/account"))
        .query(&[("address", contract.to_string())])
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["balance"], "2.5");
    assert_eq!(body["balanceWei"], "2500000000000000000");

    let res = server
        .client
        .get(server.url("/api/account/info"))
        .query(&[("address", contract.to_string())])
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["isContract"], true);
    assert_eq!(body["blockNumber"], 1_234);
    assert_eq!(body["formattedAddress"], "0x7777...7777");

    let res = server
        .client
        .get(server.url("/api/account"))
        .query(&[("address", "0x123")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blocks() {
    let provider = MockChainProvider::new(NetworkKey::Mainnet)
        .with_head(30)
        .with_block(block(30, vec![transaction(0x01, Some(30)), transaction(0x02, Some(30))]))
        .with_block(block(29, vec![]))
        .with_block(block(28, vec![transaction(0x03, Some(28))]));
    let server = start_server(MockProviderFactory::new().with_provider(provider)).await;

    let res = server.client.get(server.url("/api/blocks")).send().await.unwrap();
    let blocks: Vec<Value> = res.json().await.unwrap();
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0]["number"], 30);
    assert_eq!(blocks[0]["transactions"], 2);
    assert_eq!(blocks[0]["baseFeePerGas"], "0.000000001");

    let res = server
        .client
        .get(server.url("/api/blocks/with-transactions"))
        .query(&[("blockNumber", "28")])
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["transactionCount"], 1);
    assert_eq!(body["transactions"][0]["value"], "0.01");
    assert_eq!(body["transactions"][0]["formattedFrom"], "0x1111...1111");

    let res = server.client.get(server.url("/api/blocks/with-transactions")).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["blockNumber"], 30);
    assert_eq!(body["blocks"].as_array().unwrap().len(), 3);

    let res = server
        .client
        .get(server.url("/api/blocks/with-transactions"))
        .query(&[("blockNumber", "7")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .client
        .get(server.url("/api/blocks/with-transactions"))
        .query(&[("blockNumber", "latest")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_to_contract_uses_estimated_gas() {
    let factory = MockProviderFactory::new()
        .with_provider(MockChainProvider::new(NetworkKey::Sepolia).with_head(100).with_gas_required(52_000));
    let server = start_server(factory).await;

    let res = server
        .client
        .post(server.url("/api/send-transaction"))
        .json(&json!({
            "toAddress": RECIPIENT,
            "amountInETH": "0.5",
            "privateKey": TEST_PRIVATE_KEY,
            "network": "sepolia",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "success");

    let provider = server.factory.provider(NetworkKey::Sepolia).unwrap();
    assert_eq!(provider.recorded().gas_estimates.len(), 1);
}

#[tokio::test]
async fn test_nft_gallery() {
    let owner = address(0x11);
    let collection = address(0xaa);
    let mut named = raw_nft(collection, "1", Some("First"));
    named.contract.name = Some("Apes".to_string());
    let held = std::iter::once(named)
        .chain((2..=24).map(|id| raw_nft(collection, &id.to_string(), None)))
        .collect();
    let factory = MockProviderFactory::new()
        .with_provider(MockChainProvider::new(NetworkKey::Mainnet).with_nfts(owner, held));
    let server = start_server(factory).await;

    let res = server
        .client
        .get(server.url("/api/nft"))
        .query(&[("address", owner.to_string())])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["totalCount"], 24);
    let nfts = body["nfts"].as_array().unwrap();
    assert_eq!(nfts.len(), 20);
    assert_eq!(nfts[0]["name"], "First");
    assert_eq!(nfts[0]["collection"], "Apes");
    assert_eq!(nfts[1]["name"], "Token #2");
    assert_eq!(nfts[1]["collection"], "Unknown Collection");
    assert_eq!(nfts[1]["tokenId"], "2");

    let res = server.client.get(server.url("/api/nft")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Missing required fields: address");
}

#[tokio::test]
async fn test_nft_metadata() {
    let owner = address(0x11);
    let collection = address(0xaa);
    let mut nft = raw_nft(collection, "9", None);
    nft.raw = Some(RawNftSource {
        metadata: json!({"attributes": [{"trait_type": "Background", "value": "Blue"}]}),
    });
    let factory = MockProviderFactory::new()
        .with_provider(MockChainProvider::new(NetworkKey::Sepolia).with_nfts(owner, vec![nft]));
    let server = start_server(factory).await;

    let res = server
        .client
        .get(server.url("/api/nft/metadata"))
        .query(&[
            ("contractAddress", collection.to_string()),
            ("tokenId", "9".to_string()),
            ("network", "sepolia".to_string()),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Token #9");
    assert_eq!(body["description"], "No description available");
    assert_eq!(body["tokenType"], "ERC721");
    assert_eq!(body["attributes"][0]["value"], "Blue");

    let res = server
        .client
        .get(server.url("/api/nft/metadata"))
        .query(&[
            ("contractAddress", collection.to_string()),
            ("tokenId", "10".to_string()),
            ("network", "sepolia".to_string()),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nft_metadata_validation() {
    let server = start_server(MockProviderFactory::new().with_provider(MockChainProvider::new(NetworkKey::Mainnet))).await;

    let res = server.client.get(server.url("/api/nft/metadata")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Missing required fields: contractAddress, tokenId");

    let res = server
        .client
        .get(server.url("/api/nft/metadata"))
        .query(&[("contractAddress", RECIPIENT), ("tokenId", "twelve")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid token id: twelve");

    let provider = server.factory.provider(NetworkKey::Mainnet).unwrap();
    assert_eq!(provider.recorded().calls, 0);
}
