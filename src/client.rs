//! Boundary between the deployment pipeline and the wire transport.
//!
//! Everything that actually talks to a node lives behind the
//! [`LedgerClient`] trait: submitting transactions, fetching receipts
//! and deployed code, and the new-block notification stream that the
//! confirmation watch uses as its clock. This crate never blocks a
//! thread, every suspension point is one of these calls.

use {
  crate::primitives::{Address, Hash},
  async_trait::async_trait,
  futures::Stream,
  serde::{Deserialize, Serialize},
  std::pin::Pin,
  thiserror::Error,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
  #[error("Transport error: {0}")]
  Transport(String),

  #[error("The block subscription ended before the watch completed")]
  SubscriptionClosed,
}

/// A transaction as handed to the transport.
///
/// For deployments `to` is empty and `data` carries the creation
/// bytecode with the encoded constructor arguments appended. The
/// remaining fields are forwarded to the node untouched; this crate
/// does not estimate gas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
  #[serde(with = "serde_bytes_b58")]
  pub data: Vec<u8>,
  pub value: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub to: Option<Address>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub from: Option<Address>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gas: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gas_price: Option<u64>,
}

/// What the ledger reports about a mined transaction.
///
/// A receipt without a block hash is a transaction that is known to
/// the node but not yet included anywhere, it proves nothing about
/// deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
  pub block_hash: Option<Hash>,
  pub contract_address: Option<Address>,
}

/// One tick of chain progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
  pub height: u64,
  pub hash: Hash,
}

/// New-block notifications as delivered by the transport.
///
/// Faulty notifications are items, not stream termination; the stream
/// ends only when the subscription itself dies. Dropping the stream
/// unsubscribes.
pub type BlockStream =
  Pin<Box<dyn Stream<Item = Result<BlockHeader, ClientError>> + Send>>;

/// The narrow transport contract the deployment pipeline consumes.
///
/// Implementations wrap whatever RPC flavor the target ledger speaks.
/// All methods are cheap to call repeatedly; the confirmation watch
/// issues `transaction_receipt` and `code_at` once per block tick
/// until it reaches a terminal state.
#[async_trait]
pub trait LedgerClient: Send + Sync {
  /// Submits a signed-or-signable transaction, returning its hash.
  async fn send_transaction(
    &self,
    tx: TransactionRequest,
  ) -> Result<Hash, ClientError>;

  /// The receipt for a transaction, or `None` while unknown.
  async fn transaction_receipt(
    &self,
    hash: &Hash,
  ) -> Result<Option<Receipt>, ClientError>;

  /// The code stored at an address, or `None` while not visible.
  ///
  /// An empty byte vector is a meaningful answer: the address exists
  /// but holds no code.
  async fn code_at(
    &self,
    address: &Address,
  ) -> Result<Option<Vec<u8>>, ClientError>;

  /// Subscribes to new-block notifications.
  async fn subscribe_blocks(&self) -> Result<BlockStream, ClientError>;
}

mod serde_bytes_b58 {
  use {
    crate::primitives::ToBase58String,
    serde::{Deserialize, Deserializer, Serialize, Serializer},
  };

  pub fn serialize<S: Serializer>(
    v: &[u8],
    s: S,
  ) -> Result<S::Ok, S::Error> {
    String::serialize(&v.to_b58(), s)
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    d: D,
  ) -> Result<Vec<u8>, D::Error> {
    let b58 = String::deserialize(d)?;
    bs58::decode(b58.as_bytes())
      .into_vec()
      .map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod test {
  use {
    super::{Receipt, TransactionRequest},
    crate::primitives::Address,
  };

  #[test]
  fn request_serializes_optionals_sparsely() {
    let request = TransactionRequest {
      data: vec![1, 2, 3],
      value: 7,
      ..TransactionRequest::default()
    };

    let json = serde_json::to_value(&request).unwrap();
    assert!(json.get("to").is_none());
    assert!(json.get("gasPrice").is_none());
    assert_eq!(json["value"], 7);
  }

  #[test]
  fn receipt_roundtrips() {
    let receipt = Receipt {
      block_hash: Some([3u8; 32].into()),
      contract_address: Some(Address::from([9u8; 32])),
    };

    let json = serde_json::to_string(&receipt).unwrap();
    assert!(json.contains("blockHash"));
    let back: Receipt = serde_json::from_str(&json).unwrap();
    assert_eq!(receipt, back);
  }
}
