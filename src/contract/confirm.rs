//! Deployment confirmation watch.
//!
//! After a deployment transaction is submitted nothing about it is
//! known except its hash. This module drives a bounded state machine
//! over the transport's new-block notifications: on every tick it
//! re-checks whether the transaction produced a receipt and whether
//! real code is stored at the receipt's contract address. The watch
//! ends in exactly one of three terminal states: confirmed, timed out
//! after [`WATCH_BLOCKS`] ticks, or failed because the transaction
//! was mined without storing any code.
//!
//! Receipt and code lookups are asynchronous and run concurrently
//! with later ticks, so two lookups may both observe "ready". The
//! one-shot [`Latch`] guarantees that at most one of them performs
//! the terminal transition.

use {
  super::{
    deploy::{DeployError, DeployEvent},
    instance::ContractInstance,
  },
  crate::{
    client::{ClientError, LedgerClient},
    primitives::{Address, Hash},
  },
  futures::{stream::FuturesUnordered, StreamExt},
  std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  tokio::sync::oneshot,
  tracing::{debug, error, warn},
};

/// Number of block ticks the watch waits for deployed code before
/// giving up. Chain progress is the only clock here, there is no
/// wall-time timeout.
pub const WATCH_BLOCKS: u64 = 50;

/// Where the watch delivers its reports.
///
/// Callback reporters are invoked twice per deployment: once right
/// after submission and once with the terminal outcome. Channel
/// reporters only carry the terminal outcome to an awaiting caller.
pub(crate) enum Reporter {
  Channel(oneshot::Sender<Result<ContractInstance, DeployError>>),
  Callback(Box<dyn FnMut(DeployEvent) + Send>),
}

impl Reporter {
  pub(crate) fn submitted(&mut self, instance: &ContractInstance) {
    if let Reporter::Callback(notify) = self {
      notify(DeployEvent::Submitted(instance.clone()));
    }
  }

  fn report(self, outcome: Result<ContractInstance, DeployError>) {
    match self {
      Reporter::Channel(sender) => {
        if let Err(outcome) = sender.send(outcome) {
          // nobody is listening anymore, don't swallow the outcome
          error!("undeliverable deployment outcome: {outcome:?}");
        }
      }
      Reporter::Callback(mut notify) => notify(match outcome {
        Ok(instance) => DeployEvent::Confirmed(instance),
        Err(error) => DeployEvent::Failed(error),
      }),
    }
  }
}

/// One-shot flag guarding the terminal transition.
///
/// Interleaved lookup completions may both conclude that the watch
/// should end. Firing is a compare-and-set, so exactly one caller
/// wins even if the runtime ever runs lookups in parallel.
struct Latch(AtomicBool);

impl Latch {
  fn new() -> Self {
    Self(AtomicBool::new(false))
  }

  /// Returns true for exactly one caller.
  fn fire(&self) -> bool {
    self
      .0
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_ok()
  }

  fn fired(&self) -> bool {
    self.0.load(Ordering::Acquire)
  }
}

enum Probe {
  /// No receipt, unmined receipt, or code not visible yet. Checked
  /// again on a later tick.
  NotVisible,
  /// Real bytecode observed at the deployed address.
  Deployed(Address),
  /// The transaction was mined but stored no code, the deployment
  /// consumed its gas without completing.
  EmptyCode,
}

/// Watches new blocks until the deployment reaches a terminal state,
/// then reports it and unsubscribes by dropping the block stream.
pub(crate) async fn watch(
  client: Arc<dyn LedgerClient>,
  instance: ContractInstance,
  reporter: Reporter,
) {
  let hash = match instance.transaction_hash() {
    Some(hash) => hash,
    None => {
      // the orchestrator sets the hash before spawning the watch
      error!("confirmation watch started without a transaction hash");
      return reporter.report(Err(DeployError::Client(ClientError::Transport(
        "no transaction hash to watch".to_owned(),
      ))));
    }
  };

  let mut blocks = match client.subscribe_blocks().await {
    Ok(blocks) => blocks,
    Err(error) => return reporter.report(Err(error.into())),
  };

  let latch = Arc::new(Latch::new());
  let mut lookups = FuturesUnordered::new();
  let mut ticks = 0u64;

  loop {
    tokio::select! {
      tick = blocks.next() => match tick {
        Some(Ok(header)) => {
          ticks += 1;
          if ticks > WATCH_BLOCKS {
            if latch.fire() {
              debug!("giving up on transaction {hash} at block {}", header.height);
              return reporter.report(Err(DeployError::Timeout {
                blocks: WATCH_BLOCKS,
              }));
            }
          } else {
            lookups.push(probe(client.clone(), hash, latch.clone()));
          }
        }
        Some(Err(error)) => {
          // a faulty notification is not chain progress
          warn!("ignoring faulty block notification: {error}");
        }
        None => {
          // the subscription is the only clock, without it the
          // deployment can never be confirmed
          if latch.fire() {
            return reporter
              .report(Err(DeployError::Client(ClientError::SubscriptionClosed)));
          }
          return;
        }
      },
      Some(outcome) = lookups.next() => match outcome {
        Probe::NotVisible => {}
        Probe::Deployed(address) => {
          if latch.fire() {
            instance.attach(address);
            debug!("transaction {hash} confirmed at {address}");
            return reporter.report(Ok(instance));
          }
        }
        Probe::EmptyCode => {
          if latch.fire() {
            return reporter.report(Err(DeployError::NoCode));
          }
        }
      },
    }
  }
}

/// One receipt-then-code lookup for a single block tick.
///
/// Transport failures on either fetch are treated as "not visible
/// yet" rather than terminal, the next tick retries them.
async fn probe(
  client: Arc<dyn LedgerClient>,
  hash: Hash,
  latch: Arc<Latch>,
) -> Probe {
  let receipt = match client.transaction_receipt(&hash).await {
    Ok(Some(receipt)) => receipt,
    Ok(None) | Err(_) => return Probe::NotVisible,
  };

  let address = match (receipt.block_hash, receipt.contract_address) {
    (Some(_), Some(address)) => address,
    _ => return Probe::NotVisible,
  };

  if latch.fired() {
    return Probe::NotVisible;
  }

  match client.code_at(&address).await {
    Ok(Some(code)) if !code.is_empty() => Probe::Deployed(address),
    Ok(Some(_)) => Probe::EmptyCode,
    Ok(None) | Err(_) => Probe::NotVisible,
  }
}
