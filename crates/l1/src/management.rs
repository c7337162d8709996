use crate::{
    abi::{
        addRollupCall, initializeNetworkSecretCall, requestNetworkSecretCall,
        respondNetworkSecretCall,
    },
    AttestationReport, InitializeSecretTx, RequestSecretTx, RespondSecretTx,
};
use alloy_primitives::{Address, Bytes};
use alloy_rlp::Decodable;
use alloy_sol_types::SolCall;
use enclave_primitives::{L1Transaction, Rollup};

/// A transaction sent to the management contract.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
pub enum ManagementContractTx {
    /// A rollup publication.
    Rollup(Rollup),
    /// The initialization of the network secret.
    InitializeSecret(InitializeSecretTx),
    /// A request for the network secret.
    RequestSecret(RequestSecretTx),
    /// A response to a network secret request.
    RespondSecret(RespondSecretTx),
}

impl ManagementContractTx {
    /// Tries to decode `tx` as a call to the management contract. Transactions to other contracts
    /// and unknown calls are ignored, malformed calls are logged and ignored.
    pub fn try_decode(tx: &L1Transaction, management_contract: Address) -> Option<Self> {
        if tx.to != management_contract {
            return None;
        }
        let calldata = tx.input.as_ref();
        let selector: [u8; 4] = calldata.get(0..4)?.try_into().ok()?;
        let decoded: Option<Self> = match selector {
            addRollupCall::SELECTOR => addRollupCall::abi_decode(calldata)
                .ok()
                .and_then(|call| Rollup::from_bytes(&call.rollup_data).ok())
                .map(Into::into),
            initializeNetworkSecretCall::SELECTOR => {
                initializeNetworkSecretCall::abi_decode(calldata).ok().and_then(|call| {
                    let attestation = decode_attestation(&call.attestation)?;
                    Some(
                        InitializeSecretTx {
                            enclave_id: call.enclave_id,
                            init_secret: call.init_secret,
                            attestation,
                        }
                        .into(),
                    )
                })
            }
            requestNetworkSecretCall::SELECTOR => requestNetworkSecretCall::abi_decode(calldata)
                .ok()
                .and_then(|call| decode_attestation(&call.attestation))
                .map(|attestation| RequestSecretTx { attestation }.into()),
            respondNetworkSecretCall::SELECTOR => respondNetworkSecretCall::abi_decode(calldata)
                .ok()
                .map(|call| {
                    RespondSecretTx {
                        attester_id: call.attester_id,
                        requester_id: call.requester_id,
                        attester_sig: call.attester_sig,
                        response_secret: call.response_secret,
                    }
                    .into()
                }),
            _ => return None,
        };

        if decoded.is_none() {
            tracing::warn!(target: "enclave::l1", tx_hash = ?tx.hash(), "Failed to decode management contract call");
        }
        decoded
    }

    /// Returns the calldata of the management contract call.
    pub fn calldata(&self) -> Bytes {
        let calldata = match self {
            Self::Rollup(rollup) => addRollupCall { rollup_data: rollup.to_bytes() }.abi_encode(),
            Self::InitializeSecret(tx) => initializeNetworkSecretCall {
                enclave_id: tx.enclave_id,
                init_secret: tx.init_secret.clone(),
                attestation: alloy_rlp::encode(&tx.attestation).into(),
            }
            .abi_encode(),
            Self::RequestSecret(tx) => requestNetworkSecretCall {
                attestation: alloy_rlp::encode(&tx.attestation).into(),
            }
            .abi_encode(),
            Self::RespondSecret(tx) => respondNetworkSecretCall {
                attester_id: tx.attester_id,
                requester_id: tx.requester_id,
                attester_sig: tx.attester_sig.clone(),
                response_secret: tx.response_secret.clone(),
            }
            .abi_encode(),
        };
        calldata.into()
    }

    /// Returns an L1 transaction from `from` carrying this call to the management contract.
    pub fn into_l1_transaction(
        self,
        from: Address,
        nonce: u64,
        management_contract: Address,
    ) -> L1Transaction {
        L1Transaction { nonce, from, to: management_contract, input: self.calldata() }
    }
}

fn decode_attestation(bytes: &Bytes) -> Option<AttestationReport> {
    AttestationReport::decode(&mut bytes.as_ref()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use enclave_primitives::{Batch, RollupHeader};

    const MANAGEMENT_CONTRACT: Address = address!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");

    #[test]
    fn test_decode_rollup() {
        let rollup = Rollup {
            header: RollupHeader { first_batch_seq_no: 2, last_batch_seq_no: 2, ..Default::default() },
            signature: None,
            batches: vec![Batch::default()],
        };
        let tx = ManagementContractTx::from(rollup.clone()).into_l1_transaction(
            Address::repeat_byte(1),
            0,
            MANAGEMENT_CONTRACT,
        );

        assert_eq!(
            ManagementContractTx::try_decode(&tx, MANAGEMENT_CONTRACT),
            Some(ManagementContractTx::Rollup(rollup))
        );
        assert_eq!(ManagementContractTx::try_decode(&tx, Address::ZERO), None);
    }

    #[test]
    fn test_decode_secret_request() {
        let attestation = AttestationReport {
            report: Bytes::from_static(b"report"),
            enclave_id: Address::repeat_byte(2),
            signing_key: Address::repeat_byte(3),
            host_address: "127.0.0.1:10000".to_string(),
        };
        let tx = ManagementContractTx::from(RequestSecretTx { attestation: attestation.clone() })
            .into_l1_transaction(Address::repeat_byte(1), 0, MANAGEMENT_CONTRACT);

        assert_eq!(
            ManagementContractTx::try_decode(&tx, MANAGEMENT_CONTRACT),
            Some(ManagementContractTx::RequestSecret(RequestSecretTx { attestation }))
        );
    }

    #[test]
    fn test_malformed_calls_are_ignored() {
        let mut input = addRollupCall::SELECTOR.to_vec();
        input.extend_from_slice(&[0xff; 7]);
        let tx = L1Transaction { to: MANAGEMENT_CONTRACT, input: input.into(), ..Default::default() };
        assert_eq!(ManagementContractTx::try_decode(&tx, MANAGEMENT_CONTRACT), None);
    }
}
