//! Session bootstrap state machine.
//!
//! ```text
//! init_relay_client → derive_safe → check_safe_deployed → [deploy_safe]
//!   → get_api_credentials → check_approvals → [set_approvals] → complete
//! ```
//!
//! Steps run strictly in order. Each step notifies the observer before doing
//! its work; the observer cannot influence control flow. Any failure aborts
//! the whole bootstrap.

use std::fmt;
use std::sync::Arc;

use alloy::primitives::Address;
use pmx_core::{derive_safe_address, ApiCredentials, ApprovalStatus, TradingSession};
use pmx_executor::{
    ApprovalManager, DynApiKeyProvider, DynChainReader, DynRelayClient, RelayConnector, Signer,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::{SessionError, SessionResult};

/// Batch description sent to the relayer with the approval transactions.
const APPROVAL_BATCH_DESCRIPTION: &str = "Set all token approvals for trading";

/// Bootstrap step identifiers, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    InitRelayClient,
    DeriveSafe,
    CheckSafeDeployed,
    DeploySafe,
    GetApiCredentials,
    CheckApprovals,
    SetApprovals,
    Complete,
}

impl SessionStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitRelayClient => "init_relay_client",
            Self::DeriveSafe => "derive_safe",
            Self::CheckSafeDeployed => "check_safe_deployed",
            Self::DeploySafe => "deploy_safe",
            Self::GetApiCredentials => "get_api_credentials",
            Self::CheckApprovals => "check_approvals",
            Self::SetApprovals => "set_approvals",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for SessionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress notification emitted when a step starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub step: SessionStep,
    pub message: String,
}

/// Receives bootstrap progress. Advisory only.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: SessionProgress);
}

impl ProgressObserver for mpsc::UnboundedSender<SessionProgress> {
    fn on_progress(&self, progress: SessionProgress) {
        if self.send(progress).is_err() {
            debug!("Progress receiver dropped");
        }
    }
}

/// Settings the bootstrap needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub relayer_url: String,
    pub chain_id: u64,
    /// Deploy the Safe when it has no bytecode; otherwise that is fatal.
    pub auto_deploy: bool,
    pub safe_factory: Address,
}

impl SessionConfig {
    fn validate(&self) -> SessionResult<()> {
        if self.relayer_url.trim().is_empty() {
            return Err(SessionError::MissingConfig("relayer_url".to_string()));
        }
        if self.chain_id == 0 {
            return Err(SessionError::MissingConfig("chain_id".to_string()));
        }
        Ok(())
    }
}

/// Drives a signer from nothing to a ready-to-trade [`TradingSession`].
pub struct SessionBootstrapper {
    config: SessionConfig,
    connector: Arc<dyn RelayConnector>,
    signer: Arc<dyn Signer>,
    chain: DynChainReader,
    api_keys: DynApiKeyProvider,
    approvals: ApprovalManager,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl SessionBootstrapper {
    pub fn new(
        config: SessionConfig,
        connector: Arc<dyn RelayConnector>,
        signer: Arc<dyn Signer>,
        chain: DynChainReader,
        api_keys: DynApiKeyProvider,
        approvals: ApprovalManager,
    ) -> Self {
        Self {
            config,
            connector,
            signer,
            chain,
            api_keys,
            approvals,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run every step and return the session, or the first fatal error.
    pub async fn bootstrap(&self) -> SessionResult<TradingSession> {
        match self.run().await {
            Ok(session) => {
                info!(
                    eoa = %session.eoa_address,
                    safe = %session.safe_address,
                    all_approved = session.approvals.all_approved,
                    "Trading session ready"
                );
                Ok(session)
            }
            Err(e) => {
                error!(error = %e, "Session bootstrap failed");
                Err(e)
            }
        }
    }

    async fn run(&self) -> SessionResult<TradingSession> {
        self.emit(SessionStep::InitRelayClient, "Initializing relay client");
        let relay = self.init_relay_client().await?;

        self.emit(SessionStep::DeriveSafe, "Deriving Safe address");
        let eoa_address = self.signer.address();
        let safe_address = derive_safe_address(eoa_address, self.config.safe_factory);
        debug!(eoa = %eoa_address, safe = %safe_address, "Derived Safe address");

        self.emit(SessionStep::CheckSafeDeployed, "Checking Safe deployment");
        if !self.is_deployed(safe_address).await? {
            if !self.config.auto_deploy {
                return Err(SessionError::SafeNotDeployed(safe_address));
            }
            self.emit(SessionStep::DeploySafe, "Deploying Safe");
            self.deploy_safe(&relay, safe_address).await?;
        }

        self.emit(SessionStep::GetApiCredentials, "Obtaining API credentials");
        let api_credentials = self.obtain_api_credentials().await?;

        self.emit(SessionStep::CheckApprovals, "Checking token approvals");
        let mut approvals = self.approvals.check_all_approvals(safe_address).await;

        if !approvals.all_approved {
            self.emit(SessionStep::SetApprovals, "Setting token approvals");
            approvals = self.set_approvals(&relay, safe_address, &approvals).await?;
        }

        self.emit(SessionStep::Complete, "Session ready");
        Ok(TradingSession {
            eoa_address,
            safe_address,
            api_credentials,
            approvals,
        })
    }

    async fn init_relay_client(&self) -> SessionResult<DynRelayClient> {
        self.config.validate()?;
        let relay = self
            .connector
            .connect(&self.config.relayer_url, self.config.chain_id)
            .await?;
        debug!(relayer_url = %self.config.relayer_url, chain_id = self.config.chain_id, "Relay client connected");
        Ok(relay)
    }

    async fn is_deployed(&self, safe_address: Address) -> SessionResult<bool> {
        let code = self.chain.get_bytecode(safe_address).await?;
        Ok(code.is_some_and(|code| !code.is_empty()))
    }

    async fn deploy_safe(&self, relay: &DynRelayClient, safe_address: Address) -> SessionResult<()> {
        let receipt = relay.deploy().await?;
        let proxy = receipt
            .proxy_address
            .ok_or(SessionError::DeploymentUnconfirmed)?;
        if proxy != safe_address {
            warn!(derived = %safe_address, deployed = %proxy, "Deployed Safe differs from derived address");
        }
        info!(safe = %proxy, tx = ?receipt.transaction_hash, "Safe deployed");
        Ok(())
    }

    /// Derive existing credentials, creating new ones if that fails.
    pub async fn obtain_api_credentials(&self) -> SessionResult<ApiCredentials> {
        match self.api_keys.derive_api_key().await {
            Ok(credentials) => {
                debug!("Derived existing API credentials");
                Ok(credentials)
            }
            Err(derive_err) => {
                warn!(error = %derive_err, "API key derivation failed, creating new credentials");
                let credentials = self
                    .api_keys
                    .create_api_key()
                    .await
                    .map_err(SessionError::Credentials)?;
                info!("Created new API credentials");
                Ok(credentials)
            }
        }
    }

    /// Submit the full approval batch and re-read the resulting state.
    async fn set_approvals(
        &self,
        relay: &DynRelayClient,
        safe_address: Address,
        before: &ApprovalStatus,
    ) -> SessionResult<ApprovalStatus> {
        info!(missing = ?before.missing(), "Submitting approval batch");
        let txs = self.approvals.create_all_approval_txs();
        let receipt = relay.execute(txs, APPROVAL_BATCH_DESCRIPTION).await?;
        debug!(tx = ?receipt.transaction_hash, state = ?receipt.state, "Approval batch executed");

        let after = self.approvals.check_all_approvals(safe_address).await;
        if !after.all_approved {
            warn!(missing = ?after.missing(), "Approvals still incomplete after batch");
        }
        Ok(after)
    }

    fn emit(&self, step: SessionStep, message: &str) {
        info!(step = %step, "{message}");
        if let Some(observer) = &self.observer {
            observer.on_progress(SessionProgress {
                step,
                message: message.to_string(),
            });
        }
    }
}
