//! HTTP boundary subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, span, required inputs)
//!     → transaction.rs / transfers.rs / account.rs / blocks.rs / nft.rs (handlers)
//!     → response.rs (error → status + JSON body)
//!     → Send to client
//! ```

pub mod account;
pub mod blocks;
pub mod nft;
pub mod request;
pub mod response;
pub mod server;
pub mod transaction;
pub mod transfers;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
