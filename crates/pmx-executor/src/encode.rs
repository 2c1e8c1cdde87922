//! Safe transaction encoding.
//!
//! Pure helpers that turn contract calls into [`SafeTransaction`]s for the
//! relayer. Calldata is ABI-encoded with alloy's `sol!` bindings.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};

sol! {
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
    }

    interface IERC1155 {
        function setApprovalForAll(address operator, bool approved) external;
        function safeTransferFrom(address from, address to, uint256 id, uint256 amount, bytes data) external;
    }

    interface IConditionalTokens {
        function splitPosition(address collateralToken, bytes32 parentCollectionId, bytes32 conditionId, uint256[] partition, uint256 amount) external;
        function mergePositions(address collateralToken, bytes32 parentCollectionId, bytes32 conditionId, uint256[] partition, uint256 amount) external;
        function redeemPositions(address collateralToken, bytes32 parentCollectionId, bytes32 conditionId, uint256[] indexSets) external;
    }
}

/// Safe operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum OperationType {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

/// One call executed by the Safe through the relayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeTransaction {
    pub to: Address,
    pub operation: OperationType,
    pub data: Bytes,
    pub value: U256,
}

impl SafeTransaction {
    /// Plain call with no value attached.
    pub fn call<C: SolCall>(to: Address, call: C) -> Self {
        Self {
            to,
            operation: OperationType::Call,
            data: call.abi_encode().into(),
            value: U256::ZERO,
        }
    }
}

/// Binary partition of a two-outcome condition (YES = 1, NO = 2).
pub fn binary_partition() -> Vec<U256> {
    vec![U256::from(1), U256::from(2)]
}

/// `approve(spender, amount)` on an ERC-20.
pub fn erc20_approve(token: Address, spender: Address, amount: U256) -> SafeTransaction {
    SafeTransaction::call(token, IERC20::approveCall { spender, amount })
}

/// `approve(spender, type(uint256).max)` on an ERC-20.
pub fn erc20_approve_max(token: Address, spender: Address) -> SafeTransaction {
    erc20_approve(token, spender, U256::MAX)
}

/// `transfer(to, amount)` on an ERC-20.
pub fn erc20_transfer(token: Address, to: Address, amount: U256) -> SafeTransaction {
    SafeTransaction::call(token, IERC20::transferCall { to, amount })
}

/// `setApprovalForAll(operator, approved)` on an ERC-1155.
pub fn erc1155_set_approval_for_all(token: Address, operator: Address, approved: bool) -> SafeTransaction {
    SafeTransaction::call(
        token,
        IERC1155::setApprovalForAllCall { operator, approved },
    )
}

/// `safeTransferFrom(from, to, id, amount, "")` on an ERC-1155.
pub fn erc1155_transfer(
    token: Address,
    from: Address,
    to: Address,
    token_id: U256,
    amount: U256,
) -> SafeTransaction {
    SafeTransaction::call(
        token,
        IERC1155::safeTransferFromCall {
            from,
            to,
            id: token_id,
            amount,
            data: Bytes::new(),
        },
    )
}

/// Split `amount` collateral into a full set of outcome tokens.
pub fn split_position(
    conditional_tokens: Address,
    collateral: Address,
    condition_id: B256,
    amount: U256,
) -> SafeTransaction {
    SafeTransaction::call(
        conditional_tokens,
        IConditionalTokens::splitPositionCall {
            collateralToken: collateral,
            parentCollectionId: B256::ZERO,
            conditionId: condition_id,
            partition: binary_partition(),
            amount,
        },
    )
}

/// Merge a full set of outcome tokens back into `amount` collateral.
pub fn merge_positions(
    conditional_tokens: Address,
    collateral: Address,
    condition_id: B256,
    amount: U256,
) -> SafeTransaction {
    SafeTransaction::call(
        conditional_tokens,
        IConditionalTokens::mergePositionsCall {
            collateralToken: collateral,
            parentCollectionId: B256::ZERO,
            conditionId: condition_id,
            partition: binary_partition(),
            amount,
        },
    )
}

/// Redeem both outcome slots of a resolved condition.
pub fn redeem_positions(
    conditional_tokens: Address,
    collateral: Address,
    condition_id: B256,
) -> SafeTransaction {
    SafeTransaction::call(
        conditional_tokens,
        IConditionalTokens::redeemPositionsCall {
            collateralToken: collateral,
            parentCollectionId: B256::ZERO,
            conditionId: condition_id,
            indexSets: binary_partition(),
        },
    )
}
