use {
  crate::{
    client::{
      BlockHeader,
      BlockStream,
      ClientError,
      LedgerClient,
      Receipt,
      TransactionRequest,
    },
    primitives::{Address, Hash},
    test::utils::random_hash,
  },
  async_trait::async_trait,
  futures::Stream,
  std::{
    collections::HashMap,
    pin::Pin,
    sync::{
      atomic::{AtomicU64, AtomicUsize, Ordering},
      Arc,
      Mutex,
    },
    task::{Context, Poll},
    time::Duration,
  },
  tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
};

type Notification = Result<BlockHeader, ClientError>;

/// Scripted in-memory ledger for deployment tests.
///
/// Tests drive chain progress explicitly through [`tick`] and script
/// what the node would answer for receipts and code. Every transport
/// call is counted so tests can assert which interactions happened,
/// and which did not.
#[derive(Clone, Default)]
pub struct MockLedger {
  shared: Arc<Shared>,
}

#[derive(Default)]
struct Shared {
  sent: Mutex<Vec<TransactionRequest>>,
  receipt: Mutex<Option<Receipt>>,
  code: Mutex<HashMap<Address, Vec<u8>>>,
  send_failure: Mutex<Option<String>>,
  code_failure: Mutex<Option<String>>,
  receipt_delay: Mutex<Option<Duration>>,
  subscribers: Mutex<Vec<UnboundedSender<Notification>>>,
  height: AtomicU64,
  receipt_calls: AtomicUsize,
  code_calls: AtomicUsize,
  subscribe_calls: AtomicUsize,
  live_subscriptions: Arc<AtomicUsize>,
}

impl MockLedger {
  pub fn new() -> Self {
    Self::default()
  }

  /// Announces one new block to every live subscription.
  pub fn tick(&self) {
    let height = self.shared.height.fetch_add(1, Ordering::SeqCst) + 1;
    let header = BlockHeader {
      height,
      hash: [height as u8; 32].into(),
    };
    self.notify(Ok(header));
  }

  /// Announces a faulty notification that carries no block.
  pub fn tick_faulty(&self) {
    self.notify(Err(ClientError::Transport("bad notification".to_owned())));
  }

  fn notify(&self, notification: Notification) {
    let mut subscribers = self.shared.subscribers.lock().unwrap();
    subscribers.retain(|s| s.send(notification.clone()).is_ok());
  }

  /// Ends every live subscription stream.
  pub fn close_subscriptions(&self) {
    self.shared.subscribers.lock().unwrap().clear();
  }

  pub fn set_receipt(&self, receipt: Receipt) {
    *self.shared.receipt.lock().unwrap() = Some(receipt);
  }

  pub fn set_code(&self, address: Address, code: Vec<u8>) {
    self.shared.code.lock().unwrap().insert(address, code);
  }

  pub fn fail_sends(&self, reason: &str) {
    *self.shared.send_failure.lock().unwrap() = Some(reason.to_owned());
  }

  pub fn fail_code(&self, reason: &str) {
    *self.shared.code_failure.lock().unwrap() = Some(reason.to_owned());
  }

  pub fn heal_code(&self) {
    *self.shared.code_failure.lock().unwrap() = None;
  }

  /// Makes receipt lookups resolve slowly, so tests can pile up
  /// several in-flight lookups before any of them completes.
  pub fn delay_receipts(&self, delay: Duration) {
    *self.shared.receipt_delay.lock().unwrap() = Some(delay);
  }

  pub fn sent(&self) -> Vec<TransactionRequest> {
    self.shared.sent.lock().unwrap().clone()
  }

  pub fn sends(&self) -> usize {
    self.shared.sent.lock().unwrap().len()
  }

  pub fn receipt_calls(&self) -> usize {
    self.shared.receipt_calls.load(Ordering::SeqCst)
  }

  pub fn code_calls(&self) -> usize {
    self.shared.code_calls.load(Ordering::SeqCst)
  }

  pub fn subscriptions(&self) -> usize {
    self.shared.subscribe_calls.load(Ordering::SeqCst)
  }

  pub fn live_subscriptions(&self) -> usize {
    self.shared.live_subscriptions.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl LedgerClient for MockLedger {
  async fn send_transaction(
    &self,
    tx: TransactionRequest,
  ) -> Result<Hash, ClientError> {
    if let Some(reason) = self.shared.send_failure.lock().unwrap().clone() {
      return Err(ClientError::Transport(reason));
    }
    self.shared.sent.lock().unwrap().push(tx);
    Ok(random_hash())
  }

  async fn transaction_receipt(
    &self,
    _hash: &Hash,
  ) -> Result<Option<Receipt>, ClientError> {
    self.shared.receipt_calls.fetch_add(1, Ordering::SeqCst);
    let delay = *self.shared.receipt_delay.lock().unwrap();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    Ok(self.shared.receipt.lock().unwrap().clone())
  }

  async fn code_at(
    &self,
    address: &Address,
  ) -> Result<Option<Vec<u8>>, ClientError> {
    self.shared.code_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(reason) = self.shared.code_failure.lock().unwrap().clone() {
      return Err(ClientError::Transport(reason));
    }
    Ok(self.shared.code.lock().unwrap().get(address).cloned())
  }

  async fn subscribe_blocks(&self) -> Result<BlockStream, ClientError> {
    let (sender, receiver) = mpsc::unbounded_channel();
    self.shared.subscribers.lock().unwrap().push(sender);
    self.shared.subscribe_calls.fetch_add(1, Ordering::SeqCst);
    self
      .shared
      .live_subscriptions
      .fetch_add(1, Ordering::SeqCst);

    Ok(Box::pin(Subscription {
      receiver,
      live: self.shared.live_subscriptions.clone(),
    }))
  }
}

/// A block subscription backed by an in-memory channel. Dropping it
/// is the unsubscribe, which the live counter makes observable.
struct Subscription {
  receiver: UnboundedReceiver<Notification>,
  live: Arc<AtomicUsize>,
}

impl Stream for Subscription {
  type Item = Notification;

  fn poll_next(
    mut self: Pin<&mut Self>,
    cx: &mut Context<'_>,
  ) -> Poll<Option<Self::Item>> {
    self.receiver.poll_recv(cx)
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    self.live.fetch_sub(1, Ordering::SeqCst);
  }
}
