//! NFT reads: tokens held by an address and per-token metadata.

pub mod reader;
pub mod types;

pub use reader::{NftReader, OwnedNfts};
pub use types::{NftDetailView, NftOwnerQuery, NftView};
