use {
  super::binding::{BoundEvent, BoundFunction, CallError},
  crate::{
    abi::{Abi, Codec},
    client::LedgerClient,
    primitives::{Address, Hash},
  },
  dashmap::DashMap,
  once_cell::sync::OnceCell,
  serde_json::Value,
  std::sync::Arc,
  tracing::{debug, warn},
};

/// A handle to a contract that is deployed, or in the process of
/// being deployed.
///
/// The handle is cheap to clone and shared between the caller and the
/// confirmation watch. `transaction_hash` is set once at submission,
/// `address` is set once when deployed code has been observed; the
/// callable surface is rebound on that transition so handles that
/// were created against no address get replaced.
#[derive(Clone)]
pub struct ContractInstance {
  inner: Arc<Inner>,
}

struct Inner {
  client: Arc<dyn LedgerClient>,
  codec: Arc<dyn Codec>,
  abi: Abi,
  address: OnceCell<Address>,
  transaction_hash: OnceCell<Hash>,
  functions: DashMap<String, BoundFunction>,
  events: DashMap<String, BoundEvent>,
}

impl ContractInstance {
  pub(crate) fn new(
    client: Arc<dyn LedgerClient>,
    codec: Arc<dyn Codec>,
    abi: Abi,
  ) -> Self {
    let instance = Self {
      inner: Arc::new(Inner {
        client,
        codec,
        abi,
        address: OnceCell::new(),
        transaction_hash: OnceCell::new(),
        functions: DashMap::new(),
        events: DashMap::new(),
      }),
    };
    instance.rebind();
    instance
  }

  pub fn abi(&self) -> &Abi {
    &self.inner.abi
  }

  pub fn client(&self) -> &Arc<dyn LedgerClient> {
    &self.inner.client
  }

  pub fn codec(&self) -> &Arc<dyn Codec> {
    &self.inner.codec
  }

  /// The deployed address, once the deployment has been confirmed.
  pub fn address(&self) -> Option<Address> {
    self.inner.address.get().copied()
  }

  /// The deployment transaction hash, once submitted.
  pub fn transaction_hash(&self) -> Option<Hash> {
    self.inner.transaction_hash.get().copied()
  }

  /// The bound callable for a declared function.
  pub fn function(&self, name: &str) -> Option<BoundFunction> {
    self.inner.functions.get(name).map(|f| f.clone())
  }

  /// The bound subscription handle for a declared event.
  pub fn event(&self, name: &str) -> Option<BoundEvent> {
    self.inner.events.get(name).map(|e| e.clone())
  }

  /// The aggregate handle covering every declared event.
  pub fn all_events(&self) -> BoundEvent {
    BoundEvent::all(self.address())
  }

  /// Encodes and submits an invocation of a declared function using
  /// the instance's own transport and codec.
  pub async fn send(
    &self,
    function: &str,
    args: &[Value],
  ) -> Result<Hash, CallError> {
    let handle = self
      .function(function)
      .ok_or_else(|| CallError::UnknownFunction(function.to_owned()))?;
    handle
      .send(self.inner.client.as_ref(), self.inner.codec.as_ref(), args)
      .await
  }

  /// Recomputes the callable surface from the interface descriptor
  /// against the current address. Idempotent, safe to re-run.
  pub fn rebind(&self) {
    let address = self.address();

    self.inner.functions.clear();
    for entry in self.inner.abi.functions() {
      self
        .inner
        .functions
        .insert(entry.name.clone(), BoundFunction::bind(entry, address));
    }

    self.inner.events.clear();
    for entry in self.inner.abi.events() {
      self
        .inner
        .events
        .insert(entry.name.clone(), BoundEvent::bind(entry, address));
    }
  }

  pub(crate) fn set_transaction_hash(&self, hash: Hash) {
    if self.inner.transaction_hash.set(hash).is_err() {
      warn!("transaction hash is already set on this instance");
    }
  }

  /// Attaches the deployed address and rebinds the callable surface.
  ///
  /// The address can transition from unset to set exactly once; a
  /// second attachment is ignored.
  pub(crate) fn attach(&self, address: Address) {
    match self.inner.address.set(address) {
      Ok(()) => {
        debug!("contract bound at {address}");
        self.rebind();
      }
      Err(_) => warn!("instance is already bound at {address}"),
    }
  }
}

impl std::fmt::Debug for ContractInstance {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ContractInstance")
      .field("address", &self.address())
      .field("transaction_hash", &self.transaction_hash())
      .field("functions", &self.inner.functions.len())
      .field("events", &self.inner.events.len())
      .finish()
  }
}
