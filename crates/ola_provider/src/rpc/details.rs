use alloy_primitives::{Address, B256, U256};

/// Details of an L1 batch, as returned by `ola_getL1BatchDetails`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDetails {
    /// Number of the batch
    pub number: u64,
    /// Timestamp of the batch
    pub timestamp: u64,
    /// Number of L1 transactions in the batch
    #[serde(default)]
    pub l1_tx_count: u64,
    /// Number of L2 transactions in the batch
    #[serde(default)]
    pub l2_tx_count: u64,
    /// Root hash of the state after the batch
    #[serde(default)]
    pub root_hash: Option<B256>,
    /// Status of the batch
    pub status: String,
    /// Hash of the L1 commit transaction
    #[serde(default)]
    pub commit_tx_hash: Option<B256>,
    /// Time of the L1 commit
    #[serde(default)]
    pub committed_at: Option<String>,
    /// Hash of the L1 prove transaction
    #[serde(default)]
    pub prove_tx_hash: Option<B256>,
    /// Time of the L1 proof
    #[serde(default)]
    pub proven_at: Option<String>,
    /// Hash of the L1 execute transaction
    #[serde(default)]
    pub execute_tx_hash: Option<B256>,
    /// Time of the L1 execution
    #[serde(default)]
    pub executed_at: Option<String>,
}

/// Details of a block, as returned by `ola_getBlockDetails`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDetails {
    /// Number of the block
    pub number: u64,
    /// Timestamp of the block
    pub timestamp: u64,
    /// Number of the containing L1 batch
    pub l1_batch_number: u64,
    /// Number of L1 transactions in the block
    #[serde(default)]
    pub l1_tx_count: u64,
    /// Number of L2 transactions in the block
    #[serde(default)]
    pub l2_tx_count: u64,
    /// Root hash of the state after the block
    #[serde(default)]
    pub root_hash: Option<B256>,
    /// Status of the block
    pub status: String,
    /// Hash of the L1 commit transaction
    #[serde(default)]
    pub commit_tx_hash: Option<B256>,
    /// Time of the L1 commit
    #[serde(default)]
    pub committed_at: Option<String>,
    /// Hash of the L1 prove transaction
    #[serde(default)]
    pub prove_tx_hash: Option<B256>,
    /// Time of the L1 proof
    #[serde(default)]
    pub proven_at: Option<String>,
    /// Hash of the L1 execute transaction
    #[serde(default)]
    pub execute_tx_hash: Option<B256>,
    /// Time of the L1 execution
    #[serde(default)]
    pub executed_at: Option<String>,
}

/// Details of a transaction, as returned by `ola_getTransactionDetails`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    /// Whether the transaction was submitted through L1
    pub is_l1_originated: bool,
    /// Status of the transaction
    pub status: String,
    /// Fee that was charged
    pub fee: U256,
    /// Gas per pubdata byte limit
    #[serde(default)]
    pub gas_per_pubdata: Option<U256>,
    /// Address that initiated the transaction
    pub initiator_address: Address,
    /// Time at which the node received the transaction
    pub received_at: String,
    /// Hash of the L1 commit transaction
    #[serde(default)]
    pub eth_commit_tx_hash: Option<B256>,
    /// Hash of the L1 prove transaction
    #[serde(default)]
    pub eth_prove_tx_hash: Option<B256>,
    /// Hash of the L1 execute transaction
    #[serde(default)]
    pub eth_execute_tx_hash: Option<B256>,
}

/// Bridge contracts, as returned by `ola_getBridgeContracts`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeContracts {
    pub l1_erc20_default_bridge: Option<Address>,
    pub l2_erc20_default_bridge: Option<Address>,
    pub l1_weth_bridge: Option<Address>,
    pub l2_weth_bridge: Option<Address>,
}

/// Default bridge addresses, cached by the provider after the first lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BridgeAddresses {
    pub erc20_l1: Option<Address>,
    pub erc20_l2: Option<Address>,
    pub weth_l1: Option<Address>,
    pub weth_l2: Option<Address>,
}

impl From<BridgeContracts> for BridgeAddresses {
    fn from(value: BridgeContracts) -> Self {
        Self {
            erc20_l1: value.l1_erc20_default_bridge,
            erc20_l2: value.l2_erc20_default_bridge,
            weth_l1: value.l1_weth_bridge,
            weth_l2: value.l2_weth_bridge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_details() -> anyhow::Result<()> {
        let details: BlockDetails = serde_json::from_value(serde_json::json!({
            "number": 100,
            "timestamp": 1_700_000_000,
            "l1BatchNumber": 4,
            "l1TxCount": 0,
            "l2TxCount": 2,
            "rootHash": "0x00000000000000000000000000000000000000000000000000000000000000cc",
            "status": "sealed",
            "commitTxHash": null,
            "committedAt": null,
            "proveTxHash": null,
            "provenAt": null,
            "executeTxHash": null,
            "executedAt": null,
        }))?;

        assert_eq!(details.l1_batch_number, 4);
        assert_eq!(details.status, "sealed");
        assert_eq!(details.commit_tx_hash, None);

        Ok(())
    }

    #[test]
    fn bridge_addresses_from_contracts() -> anyhow::Result<()> {
        let contracts: BridgeContracts = serde_json::from_value(serde_json::json!({
            "l1Erc20DefaultBridge": "0x0000000000000000000000000000000000000001",
            "l2Erc20DefaultBridge": "0x0000000000000000000000000000000000000002",
            "l1WethBridge": null,
        }))?;

        let addresses = BridgeAddresses::from(contracts);
        assert_eq!(addresses.erc20_l1, Some(Address::with_last_byte(1)));
        assert_eq!(addresses.erc20_l2, Some(Address::with_last_byte(2)));
        assert_eq!(addresses.weth_l1, None);
        assert_eq!(addresses.weth_l2, None);

        Ok(())
    }
}
