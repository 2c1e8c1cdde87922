//! Shared fixtures for session bootstrap tests.

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer as _;
use pmx_core::{derive_safe_address, SAFE_FACTORY};
use pmx_executor::{
    ApprovalManager, ContractAddresses, MockChainReader, MockClobClient, MockRelayClient,
    MockRelayConnector, RelayReceipt,
};
use pmx_session::{SessionBootstrapper, SessionConfig, SessionProgress, SessionStep};
use tokio::sync::mpsc;

/// Well-known development key (anvil account #0).
pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const RELAYER_URL: &str = "https://relayer.test";

pub struct Harness {
    pub relay: Arc<MockRelayClient>,
    pub connector: Arc<MockRelayConnector>,
    pub chain: Arc<MockChainReader>,
    pub clob: Arc<MockClobClient>,
    pub signer: Arc<PrivateKeySigner>,
    pub contracts: ContractAddresses,
    pub config: SessionConfig,
}

impl Harness {
    pub fn new() -> Self {
        let relay = Arc::new(MockRelayClient::new());
        Self {
            connector: Arc::new(MockRelayConnector::new(relay.clone())),
            relay,
            chain: Arc::new(MockChainReader::new()),
            clob: Arc::new(MockClobClient::new()),
            signer: Arc::new(PrivateKeySigner::from_str(TEST_PRIVATE_KEY).unwrap()),
            contracts: ContractAddresses::default(),
            config: SessionConfig {
                relayer_url: RELAYER_URL.to_string(),
                chain_id: 137,
                auto_deploy: true,
                safe_factory: SAFE_FACTORY,
            },
        }
    }

    pub fn eoa(&self) -> Address {
        self.signer.address()
    }

    pub fn safe(&self) -> Address {
        derive_safe_address(self.eoa(), SAFE_FACTORY)
    }

    /// Give the Safe bytecode.
    pub fn deploy_safe(&self) {
        self.chain.deploy(self.safe());
    }

    /// Make the relayer's deploy return the derived Safe.
    pub fn confirm_deploys(&self) {
        self.relay.set_deploy_result(Ok(RelayReceipt {
            transaction_hash: Some("0xdeploy".to_string()),
            proxy_address: Some(self.safe()),
            state: Some("STATE_MINED".to_string()),
        }));
    }

    /// Grant every allowance and operator approval to the Safe.
    pub fn approve_all(&self) {
        let owner = self.safe();
        for (_, spender) in self.contracts.usdc_spenders() {
            self.chain
                .set_allowance(self.contracts.usdc, owner, spender, U256::MAX);
        }
        for (_, operator) in self.contracts.outcome_token_operators() {
            self.chain
                .set_approved_for_all(self.contracts.ctf, owner, operator, true);
        }
    }

    pub fn bootstrapper(&self) -> SessionBootstrapper {
        SessionBootstrapper::new(
            self.config.clone(),
            self.connector.clone(),
            self.signer.clone(),
            self.chain.clone(),
            self.clob.clone(),
            ApprovalManager::new(self.chain.clone(), self.contracts),
        )
    }

    /// Bootstrapper wired to a channel observer.
    pub fn observed_bootstrapper(&self) -> (SessionBootstrapper, mpsc::UnboundedReceiver<SessionProgress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.bootstrapper().with_observer(Arc::new(tx)), rx)
    }
}

/// Drain every step received so far.
pub fn drain_steps(rx: &mut mpsc::UnboundedReceiver<SessionProgress>) -> Vec<SessionStep> {
    let mut steps = Vec::new();
    while let Ok(progress) = rx.try_recv() {
        steps.push(progress.step);
    }
    steps
}
