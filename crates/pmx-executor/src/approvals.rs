//! Exchange approval management.
//!
//! Trading from a Safe needs two kinds of approvals:
//! - USDC.e allowance for the CTF contract, both exchanges and the neg-risk adapter
//! - ERC-1155 `setApprovalForAll` on the CTF for both exchanges and the adapter
//!
//! A failed read counts as "not approved". The worst case is an extra
//! approval batch, never a session that believes it can trade when it can't.

use std::collections::BTreeMap;

use alloy::primitives::{address, Address, U256};
use futures_util::future::join_all;
use pmx_core::ApprovalStatus;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::chain::DynChainReader;
use crate::encode::{erc1155_set_approval_for_all, erc20_approve_max, SafeTransaction};

/// Contract addresses the approvals target (Polygon mainnet by default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractAddresses {
    /// Collateral token (USDC.e).
    pub usdc: Address,
    /// Conditional Tokens Framework (ERC-1155 outcome tokens).
    pub ctf: Address,
    pub ctf_exchange: Address,
    pub neg_risk_ctf_exchange: Address,
    pub neg_risk_adapter: Address,
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self::POLYGON
    }
}

impl ContractAddresses {
    pub const POLYGON: Self = Self {
        usdc: address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
        ctf: address!("4D97DCd97eC945f40cF65F87097ACe5EA0476045"),
        ctf_exchange: address!("4bFb41d5B3570DeFd03C39a9A4D8dE6Bd8B8982E"),
        neg_risk_ctf_exchange: address!("C5d563A36AE78145C45a50134d48A1215220f80a"),
        neg_risk_adapter: address!("d91E80cF2E7be2e162c6513ceD06f1dD0dA35296"),
    };

    /// Spenders that need a USDC.e allowance.
    pub fn usdc_spenders(&self) -> [(&'static str, Address); 4] {
        [
            ("CTF Contract", self.ctf),
            ("CTF Exchange", self.ctf_exchange),
            ("Neg Risk CTF Exchange", self.neg_risk_ctf_exchange),
            ("Neg Risk Adapter", self.neg_risk_adapter),
        ]
    }

    /// Operators that need approval-for-all on outcome tokens.
    pub fn outcome_token_operators(&self) -> [(&'static str, Address); 3] {
        [
            ("CTF Exchange", self.ctf_exchange),
            ("Neg Risk CTF Exchange", self.neg_risk_ctf_exchange),
            ("Neg Risk Adapter", self.neg_risk_adapter),
        ]
    }
}

/// Reads approval state and builds the approval batch.
pub struct ApprovalManager {
    chain: DynChainReader,
    contracts: ContractAddresses,
}

impl ApprovalManager {
    pub fn new(chain: DynChainReader, contracts: ContractAddresses) -> Self {
        Self { chain, contracts }
    }

    pub fn contracts(&self) -> &ContractAddresses {
        &self.contracts
    }

    /// Query every allowance and operator approval for `owner` concurrently.
    pub async fn check_all_approvals(&self, owner: Address) -> ApprovalStatus {
        let usdc = self.contracts.usdc;
        let ctf = self.contracts.ctf;

        let allowance_reads = self.contracts.usdc_spenders().map(|(name, spender)| async move {
            let approved = match self.chain.erc20_allowance(usdc, owner, spender).await {
                Ok(allowance) => allowance > U256::ZERO,
                Err(e) => {
                    warn!(spender_name = name, %spender, error = %e, "USDC allowance read failed, treating as not approved");
                    false
                }
            };
            (name.to_string(), approved)
        });

        let operator_reads = self
            .contracts
            .outcome_token_operators()
            .map(|(name, operator)| async move {
                let approved = match self.chain.is_approved_for_all(ctf, owner, operator).await {
                    Ok(approved) => approved,
                    Err(e) => {
                        warn!(operator_name = name, %operator, error = %e, "Outcome token approval read failed, treating as not approved");
                        false
                    }
                };
                (name.to_string(), approved)
            });

        let (usdc_approvals, outcome_token_approvals) =
            tokio::join!(join_all(allowance_reads), join_all(operator_reads));

        let status = ApprovalStatus::from_maps(
            usdc_approvals.into_iter().collect::<BTreeMap<_, _>>(),
            outcome_token_approvals.into_iter().collect::<BTreeMap<_, _>>(),
        );
        debug!(%owner, all_approved = status.all_approved, missing = ?status.missing(), "Approval check complete");
        status
    }

    /// Full approval batch: max USDC.e allowance for every spender, then
    /// approval-for-all for every operator. Built regardless of current state.
    pub fn create_all_approval_txs(&self) -> Vec<SafeTransaction> {
        let approvals = self
            .contracts
            .usdc_spenders()
            .into_iter()
            .map(|(_, spender)| erc20_approve_max(self.contracts.usdc, spender));
        let operators = self
            .contracts
            .outcome_token_operators()
            .into_iter()
            .map(|(_, operator)| erc1155_set_approval_for_all(self.contracts.ctf, operator, true));
        approvals.chain(operators).collect()
    }
}
