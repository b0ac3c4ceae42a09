use {
  super::Abi,
  serde_json::Value,
  std::fmt::{Display, Formatter},
};

/// Loose family classification of a declared parameter type.
///
/// Values are checked against the family of their declared type only,
/// never against ranges, byte lengths or nested element types. That
/// level of precision belongs to the codec that packs the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
  /// Arrays and other bracketed composites, e.g. `uint256[]`.
  Aggregate,
  /// Addresses and strings, carried as text.
  Text,
  /// Signed and unsigned integers of any width.
  Numeric,
  /// Booleans.
  Boolean,
  /// Anything else, e.g. `bytes32`. Accepts every value.
  Unconstrained,
}

impl TypeFamily {
  /// Classifies a declared type string.
  ///
  /// Tested in priority order: a bracket anywhere marks an aggregate
  /// before the element type is considered, so `uint256[]` is an
  /// aggregate and not numeric. `int` intentionally also catches
  /// `uint*` variants.
  pub fn of(datatype: &str) -> Self {
    if datatype.contains('[') {
      TypeFamily::Aggregate
    } else if datatype.contains("address") || datatype.contains("string") {
      TypeFamily::Text
    } else if datatype.contains("int") {
      TypeFamily::Numeric
    } else if datatype.contains("bool") {
      TypeFamily::Boolean
    } else {
      TypeFamily::Unconstrained
    }
  }

  /// Whether the runtime kind of `value` belongs to this family.
  pub fn admits(&self, value: &Value) -> bool {
    match self {
      TypeFamily::Aggregate => value.is_array() || value.is_object(),
      TypeFamily::Text => value.is_string(),
      TypeFamily::Numeric => value.is_number(),
      TypeFamily::Boolean => value.is_boolean(),
      TypeFamily::Unconstrained => true,
    }
  }
}

/// Checks a single value against a declared type.
pub fn matches(datatype: &str, value: &Value) -> bool {
  TypeFamily::of(datatype).admits(value)
}

/// A declared-type or value-kind mismatch found by [`validate`].
///
/// Returned as a value, never raised. Callers decide whether a
/// mismatch is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
  /// Position of the offending argument.
  pub index: usize,
  /// The type the interface declares at that position.
  pub expected: String,
  /// What the caller supplied instead, rendered for diagnostics.
  pub found: String,
}

impl Display for TypeMismatch {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "argument {} expects {}, got {}",
      self.index, self.expected, self.found
    )
  }
}

/// Validates caller-declared types and actual values against the
/// constructor overload matching their arity.
///
/// Reports the first mismatch encountered: either the declared type
/// at position `i` disagrees with the interface, or the value at
/// position `i` is of the wrong kind for the declared family. With no
/// matching constructor there is nothing to check.
pub fn validate(
  abi: &Abi,
  declared: &[String],
  params: &[Value],
) -> Option<TypeMismatch> {
  let ctor = abi.constructor_for_arity(declared.len())?;

  for (index, input) in ctor.inputs.iter().enumerate() {
    if declared[index] != input.datatype {
      return Some(TypeMismatch {
        index,
        expected: input.datatype.clone(),
        found: format!("declared type {}", declared[index]),
      });
    }

    let value = match params.get(index) {
      Some(value) => value,
      None => {
        return Some(TypeMismatch {
          index,
          expected: input.datatype.clone(),
          found: "no value".to_owned(),
        })
      }
    };

    if !matches(&input.datatype, value) {
      return Some(TypeMismatch {
        index,
        expected: input.datatype.clone(),
        found: format!("value {value}"),
      });
    }
  }

  None
}
