use crate::{metrics::HandleMetrics, BlockSubmissionResponse, EnclaveNode, EnclaveStatus, NodeError};

use alloy_primitives::B256;
use enclave_primitives::{Batch, BlockAndReceipts, L2Transaction, Rollup};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::error;

type Response<T> = oneshot::Sender<Result<T, NodeError>>;

/// The commands that can be sent to the enclave task.
#[derive(Debug)]
pub enum EnclaveCommand {
    /// Ingest an L1 block, flagged as the latest known block or not.
    SubmitL1Block(Box<BlockAndReceipts>, bool, Response<BlockSubmissionResponse>),
    /// Add a transaction to the mempool.
    SubmitTx(L2Transaction, Response<B256>),
    /// Validate and store a batch received from the sequencer.
    SubmitBatch(Box<Batch>, Response<()>),
    /// Create the next batch, unless no transaction is pending and the flag is set.
    CreateBatch(bool, Response<Option<Batch>>),
    /// Create a rollup, optionally starting from the provided sequence number.
    CreateRollup(Option<u64>, Response<Rollup>),
    /// Return the head batch.
    HeadBatch(Response<Option<Batch>>),
    /// Report the node status.
    Status(Response<EnclaveStatus>),
}

/// The handle used by the host to send commands to the enclave task.
#[derive(Debug, Clone)]
pub struct EnclaveHandle {
    /// The channel used to send commands to the enclave task.
    to_enclave_tx: mpsc::UnboundedSender<EnclaveCommand>,
    /// The metrics for the handle.
    handle_metrics: HandleMetrics,
}

impl EnclaveHandle {
    /// Create a new enclave handle.
    pub fn new(to_enclave_tx: mpsc::UnboundedSender<EnclaveCommand>) -> Self {
        Self { to_enclave_tx, handle_metrics: HandleMetrics::default() }
    }

    /// Sends a command to the enclave task.
    pub fn send_command(&self, command: EnclaveCommand) {
        if let Err(err) = self.to_enclave_tx.send(command) {
            self.handle_metrics.handle_send_command_failed.increment(1);
            error!(target: "enclave::handle", "Failed to send command to enclave: {}", err);
        }
    }

    /// Submits an L1 block to the enclave.
    pub async fn submit_l1_block(
        &self,
        block: BlockAndReceipts,
        is_latest: bool,
    ) -> Result<BlockSubmissionResponse, NodeError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(EnclaveCommand::SubmitL1Block(Box::new(block), is_latest, tx));
        rx.await.map_err(|_| NodeError::Shutdown)?
    }

    /// Submits an L2 transaction to the enclave mempool.
    pub async fn submit_tx(&self, transaction: L2Transaction) -> Result<B256, NodeError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(EnclaveCommand::SubmitTx(transaction, tx));
        rx.await.map_err(|_| NodeError::Shutdown)?
    }

    /// Submits a batch produced by the sequencer.
    pub async fn submit_batch(&self, batch: Batch) -> Result<(), NodeError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(EnclaveCommand::SubmitBatch(Box::new(batch), tx));
        rx.await.map_err(|_| NodeError::Shutdown)?
    }

    /// Requests the creation of the next batch.
    pub async fn create_batch(&self, skip_if_empty: bool) -> Result<Option<Batch>, NodeError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(EnclaveCommand::CreateBatch(skip_if_empty, tx));
        rx.await.map_err(|_| NodeError::Shutdown)?
    }

    /// Requests the creation of a rollup.
    pub async fn create_rollup(&self, from_seq: Option<u64>) -> Result<Rollup, NodeError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(EnclaveCommand::CreateRollup(from_seq, tx));
        rx.await.map_err(|_| NodeError::Shutdown)?
    }

    /// Returns the head batch of the enclave.
    pub async fn head_batch(&self) -> Result<Option<Batch>, NodeError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(EnclaveCommand::HeadBatch(tx));
        rx.await.map_err(|_| NodeError::Shutdown)?
    }

    /// Returns the status of the enclave.
    pub async fn status(&self) -> Result<EnclaveStatus, NodeError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(EnclaveCommand::Status(tx));
        rx.await.map_err(|_| NodeError::Shutdown)?
    }
}

/// Moves `node` to a blocking task serving the commands of the returned handle.
///
/// Commands are executed one at a time, in the order they were sent. The task stops once every
/// handle was dropped.
pub fn spawn_enclave<N: EnclaveNode>(node: N) -> (EnclaveHandle, JoinHandle<()>) {
    let (to_enclave_tx, mut from_handle_rx) = mpsc::unbounded_channel();
    let task = tokio::task::spawn_blocking(move || {
        tracing::info!(target: "enclave::handle", node_type = ?node.node_type(), "Enclave task started");
        while let Some(command) = from_handle_rx.blocking_recv() {
            handle_command(&node, command);
        }
        tracing::info!(target: "enclave::handle", "Enclave task stopped");
    });
    (EnclaveHandle::new(to_enclave_tx), task)
}

fn handle_command<N: EnclaveNode>(node: &N, command: EnclaveCommand) {
    // A dropped receiver means the caller stopped waiting, the result is discarded.
    match command {
        EnclaveCommand::SubmitL1Block(block, is_latest, tx) => {
            let _ = tx.send(node.submit_l1_block(&block, is_latest));
        }
        EnclaveCommand::SubmitTx(transaction, tx) => {
            let _ = tx.send(node.submit_tx(transaction));
        }
        EnclaveCommand::SubmitBatch(batch, tx) => {
            let _ = tx.send(node.submit_batch(&batch));
        }
        EnclaveCommand::CreateBatch(skip_if_empty, tx) => {
            let _ = tx.send(node.create_batch(skip_if_empty));
        }
        EnclaveCommand::CreateRollup(from_seq, tx) => {
            let _ = tx.send(node.create_rollup(from_seq));
        }
        EnclaveCommand::HeadBatch(tx) => {
            let _ = tx.send(node.head_batch());
        }
        EnclaveCommand::Status(tx) => {
            let _ = tx.send(node.status());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_utils::sequencer, NodeType};
    use alloy_primitives::{Address, U256};
    use alloy_signer_local::PrivateKeySigner;
    use enclave_primitives::{
        test_utils::{l1_chain, TestWallet},
        ChainConfig,
    };

    #[tokio::test]
    async fn test_handle_drives_the_node() {
        let mut wallet = TestWallet::random(ChainConfig::default().chain_id);
        let node = sequencer(PrivateKeySigner::random(), &[wallet.address()]).unwrap();
        let (handle, task) = spawn_enclave(node);

        let chain = l1_chain(100, 1);
        let response =
            handle.submit_l1_block(BlockAndReceipts::all_successful(chain[0].clone()), true).await.unwrap();
        assert_eq!(response.consumed_rollup, None);

        let genesis = handle.create_batch(false).await.unwrap().unwrap();
        let tx = wallet.transfer(Address::repeat_byte(1), U256::from(1));
        assert_eq!(handle.submit_tx(tx.clone()).await.unwrap(), tx.hash());
        let batch = handle.create_batch(true).await.unwrap().unwrap();
        assert_eq!(batch.parent_hash(), genesis.hash());
        assert_eq!(handle.head_batch().await.unwrap(), Some(batch.clone()));

        let status = handle.status().await.unwrap();
        assert_eq!(status.node_type, NodeType::Sequencer);
        assert_eq!(status.head_batch, Some(batch.hash()));

        let err = handle.submit_batch(batch).await.unwrap_err();
        assert!(matches!(err, NodeError::Unsupported { .. }));

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_stopped_task_reports_shutdown() {
        let (to_enclave_tx, from_handle_rx) = mpsc::unbounded_channel();
        drop(from_handle_rx);
        let handle = EnclaveHandle::new(to_enclave_tx);
        assert!(matches!(handle.status().await.unwrap_err(), NodeError::Shutdown));
    }
}
