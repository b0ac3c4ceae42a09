use {
  crate::{
    abi::{AbiEntry, Codec, CodecError},
    client::{ClientError, LedgerClient, TransactionRequest},
    primitives::{Address, Hash},
  },
  serde_json::Value,
  thiserror::Error,
};

#[derive(Debug, Error)]
pub enum CallError {
  #[error("The contract is not deployed yet, no address is bound")]
  NotDeployed,

  #[error("The interface declares no function named {0}")]
  UnknownFunction(String),

  #[error(transparent)]
  Codec(#[from] CodecError),

  #[error(transparent)]
  Client(#[from] ClientError),
}

/// A callable function of a contract instance.
///
/// This is plain data: the signature from the interface descriptor
/// plus the address it was bound against. Handles bound before the
/// deployment confirmed carry no address and refuse to be invoked;
/// they are replaced wholesale when the address becomes known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundFunction {
  pub name: String,
  pub inputs: Vec<String>,
  pub address: Option<Address>,
}

impl BoundFunction {
  pub(crate) fn bind(entry: &AbiEntry, address: Option<Address>) -> Self {
    Self {
      name: entry.name.clone(),
      inputs: entry.input_types(),
      address,
    }
  }

  /// Encodes an argument list for this function through the codec.
  pub fn encode_args(
    &self,
    codec: &dyn Codec,
    args: &[Value],
  ) -> Result<Vec<u8>, CodecError> {
    codec.encode_parameters(&self.inputs, args)
  }

  /// Submits an invocation of this function as a transaction.
  ///
  /// The invoker is stateless: it borrows the transport and codec for
  /// the duration of the call instead of closing over them.
  pub async fn send(
    &self,
    client: &dyn LedgerClient,
    codec: &dyn Codec,
    args: &[Value],
  ) -> Result<Hash, CallError> {
    let address = self.address.ok_or(CallError::NotDeployed)?;
    let request = TransactionRequest {
      data: self.encode_args(codec, args)?,
      to: Some(address),
      ..TransactionRequest::default()
    };
    Ok(client.send_transaction(request).await?)
  }
}

/// A subscription handle for one event of a contract instance, or for
/// all of them when `name` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundEvent {
  pub name: Option<String>,
  pub address: Option<Address>,
}

impl BoundEvent {
  pub(crate) fn bind(entry: &AbiEntry, address: Option<Address>) -> Self {
    Self {
      name: Some(entry.name.clone()),
      address,
    }
  }

  /// The aggregate handle covering every event of the instance.
  pub(crate) fn all(address: Option<Address>) -> Self {
    Self {
      name: None,
      address,
    }
  }

  /// Describes this subscription for the log-filtering collaborator.
  /// Decoding the matched logs is out of scope here.
  pub fn filter(&self) -> EventFilter {
    EventFilter {
      address: self.address,
      event: self.name.clone(),
    }
  }
}

/// A log filter descriptor: which address to watch and, optionally,
/// which named event. `event: None` matches all events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
  pub address: Option<Address>,
  pub event: Option<String>,
}
