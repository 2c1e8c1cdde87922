//! Trading session value types.
//!
//! A [`TradingSession`] is the output of a successful bootstrap: the signing
//! EOA, its Safe wallet, CLOB API credentials, and the approval state the
//! Safe had when the bootstrap finished. Sessions are immutable and are not
//! persisted.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// CLOB API credentials (L2 auth).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCredentials {
    #[serde(rename = "apiKey", alias = "key")]
    pub api_key: String,
    pub secret: String,
    pub passphrase: String,
}

impl fmt::Debug for ApiCredentials {
    // Never print secret material.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("secret", &"***")
            .field("passphrase", &"***")
            .finish()
    }
}

/// Approval state of a wallet across all exchange spenders.
///
/// Keys are human-readable spender names. Derived fresh on every check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStatus {
    pub all_approved: bool,
    pub usdc_approvals: BTreeMap<String, bool>,
    pub outcome_token_approvals: BTreeMap<String, bool>,
}

impl ApprovalStatus {
    /// Build from per-spender results; `all_approved` is the AND of every entry.
    pub fn from_maps(
        usdc_approvals: BTreeMap<String, bool>,
        outcome_token_approvals: BTreeMap<String, bool>,
    ) -> Self {
        let all_approved = usdc_approvals
            .values()
            .chain(outcome_token_approvals.values())
            .all(|approved| *approved);

        Self {
            all_approved,
            usdc_approvals,
            outcome_token_approvals,
        }
    }

    /// Names of spenders still missing an approval, prefixed by token kind.
    pub fn missing(&self) -> Vec<String> {
        let usdc = self
            .usdc_approvals
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(name, _)| format!("usdc:{name}"));
        let ctf = self
            .outcome_token_approvals
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(name, _)| format!("ctf:{name}"));
        usdc.chain(ctf).collect()
    }
}

/// A ready-to-trade session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingSession {
    pub eoa_address: Address,
    pub safe_address: Address,
    pub api_credentials: ApiCredentials,
    pub approvals: ApprovalStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, bool)]) -> BTreeMap<String, bool> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_all_approved_requires_every_entry() {
        let status = ApprovalStatus::from_maps(
            map(&[("CTF Exchange", true), ("Neg Risk Adapter", true)]),
            map(&[("CTF Exchange", true)]),
        );
        assert!(status.all_approved);
        assert!(status.missing().is_empty());

        let status = ApprovalStatus::from_maps(
            map(&[("CTF Exchange", true), ("Neg Risk Adapter", false)]),
            map(&[("CTF Exchange", true)]),
        );
        assert!(!status.all_approved);
        assert_eq!(status.missing(), vec!["usdc:Neg Risk Adapter".to_string()]);
    }

    #[test]
    fn test_outcome_token_gap_blocks_approval() {
        let status = ApprovalStatus::from_maps(
            map(&[("CTF Exchange", true)]),
            map(&[("CTF Exchange", false)]),
        );
        assert!(!status.all_approved);
        assert_eq!(status.missing(), vec!["ctf:CTF Exchange".to_string()]);
    }

    #[test]
    fn test_credentials_debug_masks_secrets() {
        let creds = ApiCredentials {
            api_key: "key-1".to_string(),
            secret: "top-secret".to_string(),
            passphrase: "pass".to_string(),
        };
        let printed = format!("{creds:?}");
        assert!(printed.contains("key-1"));
        assert!(!printed.contains("top-secret"));
        assert!(!printed.contains("\"pass\""));
    }

    #[test]
    fn test_credentials_deserialize_api_key_names() {
        let creds: ApiCredentials =
            serde_json::from_str(r#"{"apiKey":"k","secret":"s","passphrase":"p"}"#).unwrap();
        assert_eq!(creds.api_key, "k");
        let creds: ApiCredentials =
            serde_json::from_str(r#"{"key":"k2","secret":"s","passphrase":"p"}"#).unwrap();
        assert_eq!(creds.api_key, "k2");
    }
}
