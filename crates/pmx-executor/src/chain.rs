//! On-chain read abstraction.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use pmx_registry::BoxFuture;

use crate::error::ChainError;

/// Read-only chain access used for deployment and approval checks.
pub trait ChainReader: Send + Sync {
    /// Deployed bytecode at `address`, `None` when nothing is deployed.
    fn get_bytecode(&self, address: Address) -> BoxFuture<'_, Result<Option<Bytes>, ChainError>>;

    /// ERC-20 `allowance(owner, spender)` on `token`.
    fn erc20_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> BoxFuture<'_, Result<U256, ChainError>>;

    /// ERC-1155 `isApprovedForAll(owner, operator)` on `token`.
    fn is_approved_for_all(
        &self,
        token: Address,
        owner: Address,
        operator: Address,
    ) -> BoxFuture<'_, Result<bool, ChainError>>;
}

/// Arc wrapper for ChainReader trait objects.
pub type DynChainReader = Arc<dyn ChainReader>;

/// In-memory chain for testing.
///
/// Anything not explicitly set reads as zero / false / undeployed.
#[derive(Debug, Default)]
pub struct MockChainReader {
    code: parking_lot::Mutex<HashMap<Address, Bytes>>,
    allowances: parking_lot::Mutex<HashMap<(Address, Address, Address), U256>>,
    operator_approvals: parking_lot::Mutex<HashMap<(Address, Address, Address), bool>>,
    /// Spenders/operators whose reads fail.
    failing: parking_lot::Mutex<HashSet<Address>>,
    bytecode_reads: parking_lot::Mutex<Vec<Address>>,
}

impl MockChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `address` as a deployed contract.
    pub fn deploy(&self, address: Address) {
        self.code
            .lock()
            .insert(address, Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]));
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.allowances.lock().insert((token, owner, spender), amount);
    }

    pub fn set_approved_for_all(&self, token: Address, owner: Address, operator: Address, approved: bool) {
        self.operator_approvals
            .lock()
            .insert((token, owner, operator), approved);
    }

    /// Make every read involving `spender` fail.
    pub fn fail_for(&self, spender: Address) {
        self.failing.lock().insert(spender);
    }

    pub fn bytecode_reads(&self) -> Vec<Address> {
        self.bytecode_reads.lock().clone()
    }

    fn check_failure(&self, spender: Address) -> Result<(), ChainError> {
        if self.failing.lock().contains(&spender) {
            return Err(ChainError::Rpc(format!("execution reverted for {spender}")));
        }
        Ok(())
    }
}

impl ChainReader for MockChainReader {
    fn get_bytecode(&self, address: Address) -> BoxFuture<'_, Result<Option<Bytes>, ChainError>> {
        Box::pin(async move {
            self.bytecode_reads.lock().push(address);
            Ok(self.code.lock().get(&address).cloned())
        })
    }

    fn erc20_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> BoxFuture<'_, Result<U256, ChainError>> {
        Box::pin(async move {
            self.check_failure(spender)?;
            Ok(self
                .allowances
                .lock()
                .get(&(token, owner, spender))
                .copied()
                .unwrap_or(U256::ZERO))
        })
    }

    fn is_approved_for_all(
        &self,
        token: Address,
        owner: Address,
        operator: Address,
    ) -> BoxFuture<'_, Result<bool, ChainError>> {
        Box::pin(async move {
            self.check_failure(operator)?;
            Ok(self
                .operator_approvals
                .lock()
                .get(&(token, owner, operator))
                .copied()
                .unwrap_or(false))
        })
    }
}
