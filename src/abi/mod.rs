//! Interface descriptors for deployable contracts.
//!
//! An ABI is an ordered list of typed constructor, function and event
//! signatures. This module owns parsing the descriptor from its JSON
//! form, selecting constructor overloads by arity and loosely checking
//! supplied argument values against declared parameter types. Actual
//! byte packing of parameters is delegated to an external [`Codec`].

mod descriptor;
mod encode;
mod typecheck;

pub use {
  descriptor::{Abi, AbiEntry, AbiError, AbiInput, EntryKind},
  encode::{encode_constructor_args, Codec, CodecError},
  typecheck::{matches, validate, TypeFamily, TypeMismatch},
};
