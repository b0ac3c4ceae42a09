use {
  serde::{
    de::{self, Visitor},
    Deserialize,
    Deserializer,
    Serialize,
  },
  std::{
    fmt::{Debug, Display, Formatter},
    marker::PhantomData,
    ops::Deref,
    str::FromStr,
  },
};

/// Represents an address of an account on the target ledger.
///
/// The ledger client is the authority on how addresses are derived;
/// on this side they are opaque 32-byte identifiers rendered in
/// base58 wherever they are displayed or serialized.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 32]);

/// A transaction or block hash as reported by the ledger client.
///
/// Like [`Address`] this is an opaque identifier on this side of the
/// transport boundary. The client computes it, this crate only stores
/// and compares it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; 32]);

/// Deserializes a 32-byte identifier from its user-friendly
/// base58 representation.
struct B58Visitor<T>(PhantomData<fn() -> T>);

impl<'de, T> Visitor<'de> for B58Visitor<T>
where
  T: FromStr<Err = bs58::decode::Error>,
{
  type Value = T;

  fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
    formatter.write_str("base58 string")
  }

  fn visit_str<E>(self, value: &str) -> Result<T, E>
  where
    E: de::Error,
  {
    FromStr::from_str(value).map_err(|e| de::Error::custom(format!("{e:?}")))
  }
}

impl Deref for Address {
  type Target = [u8];

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", bs58::encode(self.0).into_string())
  }
}

impl Debug for Address {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Address({})", bs58::encode(self.0).into_string())
  }
}

impl From<[u8; 32]> for Address {
  fn from(bytes: [u8; 32]) -> Self {
    Self(bytes)
  }
}

impl From<Address> for String {
  fn from(addr: Address) -> Self {
    bs58::encode(addr.0).into_string()
  }
}

impl FromStr for Address {
  type Err = bs58::decode::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut bytes = [0u8; 32];
    bs58::decode(s).into(&mut bytes)?;
    Ok(Self(bytes))
  }
}

impl Serialize for Address {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&bs58::encode(self.0).into_string())
  }
}

impl<'de> Deserialize<'de> for Address {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    deserializer.deserialize_str(B58Visitor(PhantomData))
  }
}

impl Deref for Hash {
  type Target = [u8];

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl Display for Hash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", bs58::encode(self.0).into_string())
  }
}

impl Debug for Hash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Hash({})", bs58::encode(self.0).into_string())
  }
}

impl From<[u8; 32]> for Hash {
  fn from(bytes: [u8; 32]) -> Self {
    Self(bytes)
  }
}

impl From<Hash> for String {
  fn from(hash: Hash) -> Self {
    bs58::encode(hash.0).into_string()
  }
}

impl FromStr for Hash {
  type Err = bs58::decode::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut bytes = [0u8; 32];
    bs58::decode(s).into(&mut bytes)?;
    Ok(Self(bytes))
  }
}

impl Serialize for Hash {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&bs58::encode(self.0).into_string())
  }
}

impl<'de> Deserialize<'de> for Hash {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    deserializer.deserialize_str(B58Visitor(PhantomData))
  }
}
