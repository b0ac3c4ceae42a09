use {
  serde::{Deserialize, Serialize},
  std::str::FromStr,
  thiserror::Error,
};

#[derive(Debug, Error)]
pub enum AbiError {
  #[error("Malformed interface descriptor: {0}")]
  MalformedJson(#[from] serde_json::Error),
}

/// The role of a single interface entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
  Constructor,
  Function,
  Event,
}

/// A single typed input parameter of an interface entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiInput {
  #[serde(rename = "type")]
  pub datatype: String,

  #[serde(default)]
  pub name: String,
}

/// One entry of an interface descriptor.
///
/// Constructors have no name in the JSON form, so [`name`] defaults
/// to an empty string. Entries are immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEntry {
  #[serde(rename = "type")]
  pub kind: EntryKind,

  #[serde(default)]
  pub name: String,

  #[serde(default)]
  pub inputs: Vec<AbiInput>,

  #[serde(default)]
  pub payable: bool,
}

impl AbiEntry {
  pub fn arity(&self) -> usize {
    self.inputs.len()
  }

  /// The declared parameter types of this entry, in order.
  pub fn input_types(&self) -> Vec<String> {
    self.inputs.iter().map(|i| i.datatype.clone()).collect()
  }
}

/// An ordered interface descriptor of a contract.
///
/// Entries are unique by (kind, name, input types) in practice, but
/// duplicates with matching arity are tolerated and resolved by
/// declaration order, first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Abi {
  entries: Vec<AbiEntry>,
}

impl Abi {
  /// Parses a descriptor from its JSON form, an array of entries
  /// shaped like:
  ///
  /// ```json
  /// [{"type": "constructor",
  ///   "inputs": [{"type": "uint256", "name": "supply"}],
  ///   "payable": false}]
  /// ```
  pub fn parse(json: &str) -> Result<Self, AbiError> {
    Ok(serde_json::from_str(json)?)
  }

  pub fn entries(&self) -> &[AbiEntry] {
    &self.entries
  }

  /// Selects the constructor overload for a given argument count.
  ///
  /// Overloads with identical arity are not further disambiguated by
  /// type compatibility, the first declared one wins. This coarse
  /// match is intentional.
  pub fn constructor_for_arity(&self, arity: usize) -> Option<&AbiEntry> {
    self
      .entries
      .iter()
      .find(|e| e.kind == EntryKind::Constructor && e.arity() == arity)
  }

  pub fn functions(&self) -> impl Iterator<Item = &AbiEntry> {
    self.entries.iter().filter(|e| e.kind == EntryKind::Function)
  }

  pub fn events(&self) -> impl Iterator<Item = &AbiEntry> {
    self.entries.iter().filter(|e| e.kind == EntryKind::Event)
  }

  pub fn function(&self, name: &str) -> Option<&AbiEntry> {
    self.functions().find(|e| e.name == name)
  }

  pub fn event(&self, name: &str) -> Option<&AbiEntry> {
    self.events().find(|e| e.name == name)
  }
}

impl From<Vec<AbiEntry>> for Abi {
  fn from(entries: Vec<AbiEntry>) -> Self {
    Self { entries }
  }
}

impl FromStr for Abi {
  type Err = AbiError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}
