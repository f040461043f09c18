//! # Adapter Implementations
//!
//! Concrete implementations of the outbound ports the client depends on.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  LocalSigner  LnurlInvoiceProvider  ExternalWallet           │
//! │  RelayHistorySource  PoolSubscriptionPort                    │
//! └──────────────────────────────────────────────────────────────┘
//!                     ↑ implements ↑
//! ┌──────────────────────────────────────────────────────────────┐
//! │  EventSigner  InvoiceProvider  Wallet                        │
//! │  HistorySource (zp-06)  SubscriptionPort (zp-07)             │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod lnurl;
pub mod ports;
pub mod relay;
pub mod signer;
pub mod wallet;

pub use lnurl::LnurlInvoiceProvider;
pub use ports::{EventSigner, InvoiceProvider, Wallet};
pub use relay::{PoolSubscriptionPort, RelayHistorySource};
pub use signer::LocalSigner;
pub use wallet::ExternalWallet;
