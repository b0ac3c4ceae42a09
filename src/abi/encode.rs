use {super::Abi, serde_json::Value, thiserror::Error};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Parameter encoding failed: {0}")]
pub struct CodecError(pub String);

/// Byte packer for typed parameter lists.
///
/// Packing arithmetic lives outside of this crate. The deployment
/// pipeline only decides which signature a value list belongs to and
/// hands the `(types, values)` pair over this seam.
pub trait Codec: Send + Sync {
  fn encode_parameters(
    &self,
    types: &[String],
    values: &[Value],
  ) -> Result<Vec<u8>, CodecError>;
}

/// Encodes constructor arguments against the overload matching their
/// count.
///
/// With no matching constructor the argument list is treated as "no
/// constructor arguments to encode" and the result is empty, not an
/// error. The selected overload is the first declared one with that
/// arity, see [`Abi::constructor_for_arity`].
pub fn encode_constructor_args(
  abi: &Abi,
  codec: &dyn Codec,
  args: &[Value],
) -> Result<Vec<u8>, CodecError> {
  match abi.constructor_for_arity(args.len()) {
    Some(ctor) => codec.encode_parameters(&ctor.input_types(), args),
    None => Ok(Vec::new()),
  }
}
