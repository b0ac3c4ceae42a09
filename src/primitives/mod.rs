mod b58;
mod ids;

pub use {
  b58::ToBase58String,
  ids::{Address, Hash},
};
