use {
  super::{
    confirm::{self, Reporter, WATCH_BLOCKS},
    instance::ContractInstance,
  },
  crate::{
    abi::{
      encode_constructor_args,
      validate,
      Abi,
      Codec,
      CodecError,
      TypeMismatch,
    },
    client::{ClientError, LedgerClient, TransactionRequest},
    primitives::Address,
  },
  serde_json::Value,
  std::sync::Arc,
  thiserror::Error,
  tokio::sync::oneshot,
  tracing::debug,
};

#[derive(Debug, Error, PartialEq)]
pub enum DeployError {
  #[error("A value of {value} was sent to a constructor that is not payable")]
  NotPayable { value: u64 },

  #[error(transparent)]
  Codec(#[from] CodecError),

  #[error(transparent)]
  Client(#[from] ClientError),

  #[error("The transaction was not found within {blocks} blocks")]
  Timeout { blocks: u64 },

  #[error(
    "The transaction was mined but no code is stored at the contract \
     address, the deployment probably ran out of gas"
  )]
  NoCode,
}

/// Progress notifications for callback-style deployments.
///
/// A deployment emits `Submitted` exactly once as soon as the
/// transaction hash is known, and later exactly one of `Confirmed`
/// or `Failed`. Callers must tolerate being invoked twice.
#[derive(Debug)]
pub enum DeployEvent {
  /// Accepted by the transport, not confirmed yet. The instance
  /// carries a transaction hash but no address.
  Submitted(ContractInstance),
  /// Code was observed at the deployed address; the instance is
  /// fully bound.
  Confirmed(ContractInstance),
  /// The terminal failure of this deployment attempt.
  Failed(DeployError),
}

/// Options of a single deployment.
///
/// `data` is the creation bytecode; the encoded constructor
/// arguments are appended to it before submission. All other fields
/// are forwarded to the transport untouched.
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
  pub data: Vec<u8>,
  pub value: u64,
  pub from: Option<Address>,
  pub gas: Option<u64>,
  pub gas_price: Option<u64>,
}

/// A submitted deployment whose confirmation is still pending.
///
/// The unconfirmed instance is available immediately; awaiting
/// [`confirmed`] yields the terminal outcome of the watch.
pub struct PendingDeployment {
  instance: ContractInstance,
  outcome: oneshot::Receiver<Result<ContractInstance, DeployError>>,
}

impl PendingDeployment {
  /// The unconfirmed instance. Its transaction hash is set, its
  /// address is not.
  pub fn instance(&self) -> &ContractInstance {
    &self.instance
  }

  /// Waits for the confirmation watch to reach a terminal state.
  pub async fn confirmed(self) -> Result<ContractInstance, DeployError> {
    match self.outcome.await {
      Ok(outcome) => outcome,
      // the watch always reports before returning, this only happens
      // when the runtime is torn down underneath it
      Err(_) => Err(DeployError::Client(ClientError::SubscriptionClosed)),
    }
  }
}

impl std::fmt::Debug for PendingDeployment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PendingDeployment")
      .field("instance", &self.instance)
      .finish()
  }
}

/// Builds and deploys contract instances from an interface
/// descriptor and creation bytecode.
pub struct ContractFactory {
  client: Arc<dyn LedgerClient>,
  codec: Arc<dyn Codec>,
  abi: Abi,
}

impl ContractFactory {
  pub fn new(
    client: Arc<dyn LedgerClient>,
    codec: Arc<dyn Codec>,
    abi: Abi,
  ) -> Self {
    Self { client, codec, abi }
  }

  pub fn abi(&self) -> &Abi {
    &self.abi
  }

  /// Checks declared argument types and values against the
  /// constructor overload matching their count, see [`validate`].
  pub fn validate(
    &self,
    declared: &[String],
    params: &[Value],
  ) -> Option<TypeMismatch> {
    validate(&self.abi, declared, params)
  }

  /// An instance bound to an already-deployed contract.
  ///
  /// Callables are bound synchronously; nothing is fetched and no
  /// subscription is opened, the address is trusted as given.
  pub fn at(&self, address: Address) -> ContractInstance {
    let instance = ContractInstance::new(
      self.client.clone(),
      self.codec.clone(),
      self.abi.clone(),
    );
    instance.attach(address);
    instance
  }

  /// Deploys the contract and returns as soon as the transaction is
  /// submitted. The confirmation watch runs in the background and
  /// settles the returned [`PendingDeployment`].
  pub async fn deploy(
    &self,
    args: &[Value],
    options: DeployOptions,
  ) -> Result<PendingDeployment, DeployError> {
    let (sender, outcome) = oneshot::channel();
    let instance = self
      .submit(args, options, Reporter::Channel(sender))
      .await?;
    Ok(PendingDeployment { instance, outcome })
  }

  /// Deploys the contract, reporting progress through `events`.
  ///
  /// `events` receives [`DeployEvent::Submitted`] once immediately
  /// after submission and later exactly one terminal event. Errors
  /// that occur before a transaction hash exists are returned
  /// directly instead.
  pub async fn deploy_with_events<F>(
    &self,
    args: &[Value],
    options: DeployOptions,
    events: F,
  ) -> Result<ContractInstance, DeployError>
  where
    F: FnMut(DeployEvent) + Send + 'static,
  {
    self
      .submit(args, options, Reporter::Callback(Box::new(events)))
      .await
  }

  /// The single submission path behind both deployment modes.
  async fn submit(
    &self,
    args: &[Value],
    options: DeployOptions,
    mut reporter: Reporter,
  ) -> Result<ContractInstance, DeployError> {
    // a paid deployment requires a constructor that accepts value,
    // checked before anything touches the network
    if options.value > 0 {
      let payable = self
        .abi
        .constructor_for_arity(args.len())
        .map(|ctor| ctor.payable)
        .unwrap_or(false);
      if !payable {
        return Err(DeployError::NotPayable {
          value: options.value,
        });
      }
    }

    let mut data = options.data;
    data.extend(encode_constructor_args(
      &self.abi,
      self.codec.as_ref(),
      args,
    )?);

    let request = TransactionRequest {
      data,
      value: options.value,
      to: None,
      from: options.from,
      gas: options.gas,
      gas_price: options.gas_price,
    };

    let instance = ContractInstance::new(
      self.client.clone(),
      self.codec.clone(),
      self.abi.clone(),
    );

    let hash = self.client.send_transaction(request).await?;
    instance.set_transaction_hash(hash);
    debug!(
      "deployment transaction {hash} submitted, \
       watching up to {WATCH_BLOCKS} blocks"
    );

    reporter.submitted(&instance);
    tokio::spawn(confirm::watch(
      self.client.clone(),
      instance.clone(),
      reporter,
    ));

    Ok(instance)
  }
}
