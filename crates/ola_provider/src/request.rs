use alloy_primitives::{Address, Bytes, U256};
use ola_transaction::{EIP712_TX_TYPE, Eip712Meta, TransactionRequest};

/// A transaction request as the node expects it in `eth_estimateGas`,
/// `eth_call` and `ola_estimateGasL1ToL2`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(
        rename = "type",
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub transaction_type: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none", with = "alloy_serde::quantity::opt")]
    pub gas: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", with = "alloy_serde::quantity::opt")]
    pub gas_price: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none", with = "alloy_serde::quantity::opt")]
    pub max_fee_per_gas: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none", with = "alloy_serde::quantity::opt")]
    pub max_priority_fee_per_gas: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none", with = "alloy_serde::quantity::opt")]
    pub nonce: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(skip_serializing_if = "Option::is_none", with = "alloy_serde::quantity::opt")]
    pub chain_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eip712_meta: Option<CallMeta>,
}

/// Rollup-specific extension in the shape the node deserializes.
///
/// Byte blobs are sent as arrays of numbers rather than hex strings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallMeta {
    #[serde(with = "alloy_serde::quantity")]
    pub gas_per_pubdata: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory_deps: Option<Vec<Vec<u8>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paymaster_params: Option<CallPaymasterParams>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallPaymasterParams {
    pub paymaster: Address,
    pub paymaster_input: Vec<u8>,
}

impl From<&Eip712Meta> for CallMeta {
    fn from(meta: &Eip712Meta) -> Self {
        let factory_deps = (!meta.factory_deps.is_empty()).then(|| {
            meta.factory_deps
                .iter()
                .map(|bytecode| bytecode.to_vec())
                .collect()
        });

        Self {
            gas_per_pubdata: meta.gas_per_pubdata,
            factory_deps,
            paymaster_params: meta.paymaster_params.as_ref().map(|params| CallPaymasterParams {
                paymaster: params.paymaster,
                paymaster_input: params.paymaster_input.to_vec(),
            }),
        }
    }
}

impl From<&TransactionRequest> for CallRequest {
    fn from(request: &TransactionRequest) -> Self {
        let eip712_meta = request.custom_data.as_ref().map(CallMeta::from);
        let transaction_type = if eip712_meta.is_some() {
            Some(EIP712_TX_TYPE)
        } else {
            request.transaction_type
        };

        Self {
            transaction_type,
            from: request.from,
            to: request.to,
            gas: request.gas_limit,
            gas_price: request.gas_price,
            max_fee_per_gas: request.max_fee_per_gas,
            max_priority_fee_per_gas: request.max_priority_fee_per_gas,
            nonce: request.nonce,
            value: request.value,
            data: request.data.clone(),
            chain_id: request.chain_id,
            eip712_meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::bytes;
    use ola_transaction::PaymasterParams;

    use super::*;

    #[test]
    fn standard_request() -> anyhow::Result<()> {
        let request = TransactionRequest {
            from: Some(Address::with_last_byte(1)),
            to: Some(Address::with_last_byte(2)),
            gas_limit: Some(21_000),
            value: Some(U256::from(7)),
            ..TransactionRequest::default()
        };

        assert_eq!(
            serde_json::to_value(CallRequest::from(&request))?,
            serde_json::json!({
                "from": "0x0000000000000000000000000000000000000001",
                "to": "0x0000000000000000000000000000000000000002",
                "gas": "0x5208",
                "value": "0x7",
            })
        );

        Ok(())
    }

    #[test]
    fn custom_data_becomes_eip712_meta() -> anyhow::Result<()> {
        let request = TransactionRequest {
            to: Some(Address::with_last_byte(2)),
            custom_data: Some(Eip712Meta {
                gas_per_pubdata: 50_000,
                factory_deps: vec![bytes!("0x0102")],
                custom_signature: None,
                paymaster_params: Some(PaymasterParams {
                    paymaster: Address::with_last_byte(3),
                    paymaster_input: bytes!("0xff00"),
                }),
            }),
            ..TransactionRequest::default()
        };

        assert_eq!(
            serde_json::to_value(CallRequest::from(&request))?,
            serde_json::json!({
                "type": "0x71",
                "to": "0x0000000000000000000000000000000000000002",
                "eip712Meta": {
                    "gasPerPubdata": "0xc350",
                    "factoryDeps": [[1, 2]],
                    "paymasterParams": {
                        "paymaster": "0x0000000000000000000000000000000000000003",
                        "paymasterInput": [255, 0],
                    },
                },
            })
        );

        Ok(())
    }
}
