use alloy_primitives::{Address, B256, Bytes, U64, U256};
use ola_rpc_client::{HeaderMap, RpcClient, Transport};
use ola_transaction::{ParsedTransaction, TransactionRequest, parse_transaction};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::{
    runtime,
    sync::{OnceCell, broadcast},
};

use crate::{
    ProviderConfig, ProviderError,
    block_spec::{BlockId, BlockSpec},
    event::ProviderEvent,
    filter::LogFilter,
    interval::Poller,
    poll::{PollEngine, PollTick},
    receipt::{ReceiptLookup, ReceiptResolver},
    request::CallRequest,
    rpc::{
        BatchDetails, Block, BlockDetails, BridgeAddresses, BridgeContracts, Log, Transaction,
        TransactionDetails, TransactionReceipt,
    },
    watch::{Watch, WatchId},
};

/// A transaction that was accepted by the node.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmittedTransaction {
    /// Hash reported by the node
    pub hash: B256,
    /// The submitted transaction, as decoded locally
    pub transaction: ParsedTransaction,
}

/// A JSON-RPC provider for the OLA rollup.
///
/// Wraps a [`Transport`] with the rollup's RPC methods, a poll engine that
/// delivers block, receipt and log events, and receipt waiting helpers.
pub struct OlaProvider<TransportT> {
    engine: PollEngine<TransportT>,
    chain_id: OnceCell<u64>,
    bridge_addresses: OnceCell<BridgeAddresses>,
    poller: Mutex<Option<Poller>>,
    runtime: runtime::Handle,
}

impl OlaProvider<RpcClient> {
    /// Constructs a provider that talks HTTP JSON-RPC to the configured URL.
    pub fn from_config(
        runtime: runtime::Handle,
        config: ProviderConfig,
    ) -> Result<Self, ProviderError> {
        let extra_headers = if config.extra_headers.is_empty() {
            None
        } else {
            Some(
                HeaderMap::try_from(&config.extra_headers)
                    .map_err(|error| ProviderError::InvalidHttpHeaders(error.to_string()))?,
            )
        };

        let client = RpcClient::new(&config.url, extra_headers)?;
        Ok(Self::new(runtime, client, config))
    }

    /// Constructs a provider for the URL from the environment, falling back
    /// to the local node.
    pub fn from_env(runtime: runtime::Handle) -> Result<Self, ProviderError> {
        Self::from_config(runtime, ProviderConfig::from_env())
    }
}

impl<TransportT: Transport> OlaProvider<TransportT> {
    /// Constructs a new instance.
    pub fn new(runtime: runtime::Handle, transport: TransportT, config: ProviderConfig) -> Self {
        Self {
            engine: PollEngine::new(transport, config),
            chain_id: OnceCell::new(),
            bridge_addresses: OnceCell::new(),
            poller: Mutex::new(None),
            runtime,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        self.engine.config()
    }

    pub fn engine(&self) -> &PollEngine<TransportT> {
        &self.engine
    }

    /// Sends a raw JSON-RPC request.
    pub async fn send<SuccessT: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Vec<serde_json::Value>,
    ) -> Result<SuccessT, ProviderError> {
        self.engine.request(method, params).await
    }

    /// Returns the chain head.
    pub async fn block_number(&self) -> Result<u64, ProviderError> {
        self.engine.fetch_block_number().await
    }

    /// Returns the chain ID, which is fetched once.
    pub async fn chain_id(&self) -> Result<u64, ProviderError> {
        self.chain_id
            .get_or_try_init(|| async {
                let chain_id: U64 = self.send("eth_chainId", Vec::new()).await?;
                Ok::<_, ProviderError>(chain_id.to::<u64>())
            })
            .await
            .copied()
    }

    /// Returns the number of the latest L1 batch.
    pub async fn get_l1_batch_number(&self) -> Result<u64, ProviderError> {
        let batch_number: U64 = self.send("ola_getL1BatchNumber", Vec::new()).await?;
        Ok(batch_number.to::<u64>())
    }

    pub async fn get_l1_batch_details(
        &self,
        batch_number: u64,
    ) -> Result<Option<BatchDetails>, ProviderError> {
        self.send("ola_getL1BatchDetails", vec![batch_number.into()])
            .await
    }

    pub async fn get_block_details(
        &self,
        block_number: u64,
    ) -> Result<Option<BlockDetails>, ProviderError> {
        self.send("ola_getBlockDetails", vec![block_number.into()])
            .await
    }

    pub async fn get_transaction_details(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionDetails>, ProviderError> {
        self.send("ola_getTransactionDetails", vec![to_param(&hash)?])
            .await
    }

    /// Estimates the gas of a transaction, including its rollup extension.
    pub async fn estimate_gas(&self, request: &TransactionRequest) -> Result<U256, ProviderError> {
        self.send("eth_estimateGas", vec![to_param(&CallRequest::from(request))?])
            .await
    }

    /// Estimates the gas of an L1-to-L2 transaction.
    pub async fn estimate_gas_l1(
        &self,
        request: &TransactionRequest,
    ) -> Result<U256, ProviderError> {
        self.send(
            "ola_estimateGasL1ToL2",
            vec![to_param(&CallRequest::from(request))?],
        )
        .await
    }

    /// Returns the gas price, optionally denominated in a fee token.
    pub async fn get_gas_price(&self, token: Option<Address>) -> Result<U256, ProviderError> {
        let params = token.map(|token| to_param(&token)).transpose()?;
        self.send("eth_gasPrice", params.into_iter().collect()).await
    }

    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, ProviderError> {
        self.engine.get_logs(filter).await
    }

    /// Returns a block with the hashes of its transactions.
    pub async fn get_block(
        &self,
        block: impl Into<BlockId>,
    ) -> Result<Option<Block<B256>>, ProviderError> {
        self.fetch_block(block.into(), false).await
    }

    /// Returns a block with its full transactions.
    pub async fn get_block_with_transactions(
        &self,
        block: impl Into<BlockId>,
    ) -> Result<Option<Block<Transaction>>, ProviderError> {
        self.fetch_block(block.into(), true).await
    }

    async fn fetch_block<T: DeserializeOwned>(
        &self,
        block: BlockId,
        full_transactions: bool,
    ) -> Result<Option<Block<T>>, ProviderError> {
        match block {
            BlockId::Hash(hash) => {
                self.send(
                    "eth_getBlockByHash",
                    vec![to_param(&hash)?, full_transactions.into()],
                )
                .await
            }
            BlockId::Spec(spec) => {
                self.send(
                    "eth_getBlockByNumber",
                    vec![to_param(&spec)?, full_transactions.into()],
                )
                .await
            }
        }
    }

    pub async fn get_transaction(&self, hash: B256) -> Result<Option<Transaction>, ProviderError> {
        self.send("eth_getTransactionByHash", vec![to_param(&hash)?])
            .await
    }

    /// Submits a signed transaction envelope.
    ///
    /// The envelope is decoded locally first. If its hash can be
    /// reconstructed, the node must report the same hash.
    pub async fn send_raw_transaction(
        &self,
        encoded: &[u8],
    ) -> Result<SubmittedTransaction, ProviderError> {
        let transaction = parse_transaction(encoded)?;

        let hash: B256 = self
            .send(
                "eth_sendRawTransaction",
                vec![to_param(&Bytes::copy_from_slice(encoded))?],
            )
            .await?;

        if let Some(expected) = transaction.hash() {
            if expected != hash {
                return Err(ProviderError::TransactionHashMismatch {
                    expected,
                    actual: hash,
                });
            }
        }

        Ok(SubmittedTransaction { hash, transaction })
    }

    /// Returns the receipt of a transaction.
    ///
    /// Returns `None` if the node does not know the transaction. While the
    /// receipt is not available yet, the lookup is repeated after the next
    /// poll cycle or one polling interval, whichever comes first.
    pub async fn get_transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        let mut events = self.engine.subscribe();
        let resolver = ReceiptResolver::new(self.engine.clone());

        loop {
            match resolver.resolve(hash).await? {
                ReceiptLookup::Found(receipt) => return Ok(Some(*receipt)),
                ReceiptLookup::Absent => return Ok(None),
                ReceiptLookup::Unresolved => self.wait_for_poll(&mut events).await,
            }
        }
    }

    /// Waits until the receipt of a transaction has at least `confirmations`
    /// confirmations.
    ///
    /// Returns `None` if the node does not know the transaction.
    pub async fn wait_for_transaction(
        &self,
        hash: B256,
        confirmations: u64,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        let mut events = self.engine.subscribe();

        loop {
            let Some(receipt) = self.get_transaction_receipt(hash).await? else {
                return Ok(None);
            };

            if receipt.confirmations.unwrap_or(0) >= confirmations {
                return Ok(Some(receipt));
            }

            self.wait_for_poll(&mut events).await;
        }
    }

    /// Waits until the block containing the transaction is finalized and
    /// returns the fresh receipt.
    pub async fn wait_finalize(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        let Some(receipt) = self.wait_for_transaction(hash, 1).await? else {
            return Ok(None);
        };

        loop {
            let finalized = self
                .get_block(BlockSpec::finalized())
                .await?
                .and_then(|block| block.number);

            let is_finalized = match (receipt.block_number, finalized) {
                (Some(block_number), Some(finalized)) => block_number <= finalized,
                // Rejected transactions never reach a block.
                (None, _) => true,
                (Some(_), None) => false,
            };

            if is_finalized {
                return self.get_transaction_receipt(receipt.transaction_hash).await;
            }

            tokio::time::sleep(self.config().polling_interval).await;
        }
    }

    /// Returns the default bridge addresses, which are fetched once.
    pub async fn get_default_bridge_addresses(&self) -> Result<BridgeAddresses, ProviderError> {
        self.bridge_addresses
            .get_or_try_init(|| async {
                let contracts: BridgeContracts =
                    self.send("ola_getBridgeContracts", Vec::new()).await?;
                Ok::<_, ProviderError>(BridgeAddresses::from(contracts))
            })
            .await
            .copied()
    }

    /// Subscribes to the events of the poll engine.
    pub fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.engine.subscribe()
    }

    /// Delivers [`ProviderEvent::Transaction`] events for the receipt of a
    /// transaction on every poll cycle until unwatched.
    pub fn watch_transaction(&self, hash: B256) -> WatchId {
        self.engine.add_watch(Watch::transaction(hash))
    }

    /// Delivers [`ProviderEvent::Log`] events for logs matching the filter
    /// that appear from the next poll cycle on.
    pub fn watch_logs(&self, filter: LogFilter) -> WatchId {
        self.engine.add_watch(Watch::filter(filter))
    }

    /// Releases a watch. Returns whether the watch was removed.
    pub fn unwatch(&self, id: WatchId) -> bool {
        self.engine.remove_watch(id)
    }

    /// Runs one poll cycle.
    pub async fn poll(&self) -> PollTick {
        self.engine.poll().await
    }

    /// Starts polling on the configured interval, if not already polling.
    pub fn start_polling(&self) {
        let mut poller = self.poller.lock();
        if poller.is_none() {
            log::debug!(
                "Polling every {} ms",
                self.config().polling_interval.as_millis()
            );
            *poller = Some(Poller::new(&self.runtime, self.engine.clone()));
        }
    }

    /// Stops polling.
    pub fn stop_polling(&self) {
        self.poller.lock().take();
    }

    pub fn is_polling(&self) -> bool {
        self.poller.lock().as_ref().is_some_and(Poller::is_running)
    }

    async fn wait_for_poll(&self, events: &mut broadcast::Receiver<ProviderEvent>) {
        let next_poll = async {
            loop {
                match events.recv().await {
                    Ok(ProviderEvent::Poll { .. }) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        return;
                    }
                    Ok(_) => (),
                    Err(broadcast::error::RecvError::Closed) => {
                        std::future::pending::<()>().await;
                    }
                }
            }
        };

        tokio::select! {
            () = next_poll => (),
            () = tokio::time::sleep(self.config().polling_interval) => (),
        }
    }
}

fn to_param(value: &impl serde::Serialize) -> Result<serde_json::Value, ProviderError> {
    serde_json::to_value(value).map_err(ProviderError::InvalidRequest)
}
