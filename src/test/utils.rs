use {
  crate::{
    abi::{Abi, Codec, CodecError},
    primitives::{Address, Hash},
  },
  rand::RngCore,
  serde_json::Value,
  std::sync::Mutex,
};

/// Installs a compact tracing subscriber for a test run. Repeated
/// calls are no-ops, every test can call it unconditionally.
pub fn init_logs() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .try_init();
}

/// A deterministic address for fixtures: all 32 bytes set to `tag`.
pub fn address(tag: u8) -> Address {
  Address::from([tag; 32])
}

pub fn random_hash() -> Hash {
  let mut bytes = [0u8; 32];
  rand::thread_rng().fill_bytes(&mut bytes);
  Hash::from(bytes)
}

/// A small token interface: one non-payable constructor, one
/// function and one event.
pub fn token_abi() -> Abi {
  Abi::parse(
    r#"[
      {"type": "constructor",
       "inputs": [{"type": "uint256", "name": "supply"}],
       "payable": false},
      {"type": "function", "name": "transfer",
       "inputs": [{"type": "address", "name": "to"},
                  {"type": "uint256", "name": "amount"}]},
      {"type": "event", "name": "Transfer",
       "inputs": [{"type": "address", "name": "from"},
                  {"type": "address", "name": "to"},
                  {"type": "uint256", "name": "amount"}]}
    ]"#,
  )
  .unwrap()
}

/// A vault interface with a payable two-argument constructor next to
/// a non-payable zero-argument one.
pub fn vault_abi() -> Abi {
  Abi::parse(
    r#"[
      {"type": "constructor", "inputs": [], "payable": false},
      {"type": "constructor",
       "inputs": [{"type": "address", "name": "owner"},
                  {"type": "uint256", "name": "cap"}],
       "payable": true},
      {"type": "event", "name": "Deposit",
       "inputs": [{"type": "address", "name": "from"}]},
      {"type": "event", "name": "Withdrawal",
       "inputs": [{"type": "address", "name": "to"}]}
    ]"#,
  )
  .unwrap()
}

/// A codec that packs `(types, values)` as canonical JSON bytes and
/// records every call. The encoding is meaningless on a real chain
/// but deterministic, which is all the pipeline tests need.
#[derive(Default)]
pub struct RecordingCodec {
  recorded: Mutex<Vec<(Vec<String>, Vec<Value>)>>,
}

impl RecordingCodec {
  pub fn calls(&self) -> usize {
    self.recorded.lock().unwrap().len()
  }

  pub fn recorded_types(&self, call: usize) -> Vec<String> {
    self.recorded.lock().unwrap()[call].0.clone()
  }
}

impl Codec for RecordingCodec {
  fn encode_parameters(
    &self,
    types: &[String],
    values: &[Value],
  ) -> Result<Vec<u8>, CodecError> {
    self
      .recorded
      .lock()
      .unwrap()
      .push((types.to_vec(), values.to_vec()));
    serde_json::to_vec(&(types, values)).map_err(|e| CodecError(e.to_string()))
  }
}

/// A codec that always refuses, for error path tests.
pub struct FailingCodec;

impl Codec for FailingCodec {
  fn encode_parameters(
    &self,
    _types: &[String],
    _values: &[Value],
  ) -> Result<Vec<u8>, CodecError> {
    Err(CodecError("unsupported type".to_owned()))
  }
}
