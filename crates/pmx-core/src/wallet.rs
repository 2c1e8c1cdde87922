//! Safe wallet address derivation.
//!
//! Each EOA owns one Safe deployed by the exchange's Safe proxy factory via
//! CREATE2, so the address is known before deployment:
//! `create2(factory, keccak256(abi.encode(eoa)), SAFE_INIT_CODE_HASH)`.

use alloy::primitives::{address, b256, keccak256, Address, B256};
use alloy::sol_types::SolValue;

/// Safe proxy factory on Polygon mainnet.
pub const SAFE_FACTORY: Address = address!("aacFeEa03eb1561C4e67d661e40682Bd20E3541b");

/// Init-code hash of the Safe proxy created by [`SAFE_FACTORY`].
pub const SAFE_INIT_CODE_HASH: B256 =
    b256!("2bce2127ff07fb632d16c8347c4ebf501f4841168bed00d9e6ef715ddb6fcecf");

/// Derive the Safe address owned by `eoa` under `factory`.
pub fn derive_safe_address(eoa: Address, factory: Address) -> Address {
    let salt = keccak256(eoa.abi_encode());
    factory.create2(salt, SAFE_INIT_CODE_HASH)
}
