//! Order execution and wallet plumbing for the CLOB.
//!
//! # Key Components
//!
//! - [`OrderExecutor`]: limit and market order protocols over an [`OrderSubmitter`]
//! - [`ApprovalManager`]: USDC.e allowance and outcome-token operator approvals
//! - [`KeyManager`]: loads the trading EOA key
//! - Collaborator traits: [`OrderSubmitter`], [`ApiKeyProvider`], [`ChainReader`],
//!   [`RelayClient`], [`RelayConnector`], [`Signer`]
//! - `encode`: Safe transaction builders (approve, transfer, split, merge, redeem)
//!
//! Every collaborator trait ships with a scripted `Mock*` implementation.

pub mod approvals;
pub mod chain;
pub mod clob;
pub mod encode;
pub mod error;
pub mod order_builder;
pub mod relay;
pub mod signer;

// Error types
pub use error::{ChainError, ClientError, RelayError};

// Order construction
pub use order_builder::{BestPrices, OrderExecutor, MAX_AGGRESSIVE_PRICE, MIN_AGGRESSIVE_PRICE};

// Approvals
pub use approvals::{ApprovalManager, ContractAddresses};

// Collaborators
pub use chain::{ChainReader, DynChainReader, MockChainReader};
pub use clob::{
    ApiKeyProvider, ClobCall, DynApiKeyProvider, DynOrderSubmitter, MockClobClient, OrderSubmitter,
};
pub use relay::{
    DynRelayClient, ExecutedBatch, MockRelayClient, MockRelayConnector, RelayClient,
    RelayConnector, RelayReceipt,
};

// Transaction encoding
pub use encode::{OperationType, SafeTransaction};

// Signing
pub use signer::{KeyError, KeyManager, KeySource, Signer};
