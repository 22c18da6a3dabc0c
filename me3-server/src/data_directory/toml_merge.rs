//!
//! Deep merge of two TOML documents.
//!
//! Tables are merged key by key, everything else in `other` replaces the
//! value in `base`. Arrays are replaced, not extended, so a user can shorten
//! a default list.
//!

use toml::{map::Map, Value};

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Incompatible types at path \"{path}\", expected \"{expected}\" received \"{received}\".")]
pub struct MergeError {
    pub path: String,
    pub expected: &'static str,
    pub received: &'static str,
}

pub fn merge(base: Value, other: Value) -> Result<Value, MergeError> {
    merge_at(base, other, "$")
}

fn merge_at(base: Value, other: Value, path: &str) -> Result<Value, MergeError> {
    match (base, other) {
        (Value::Table(mut existing), Value::Table(incoming)) => {
            merge_tables(&mut existing, incoming, path)?;
            Ok(Value::Table(existing))
        }
        (base, other) if base.same_type(&other) => Ok(other),
        // An integer where a float is expected is fine, e.g. `ratio = 1`.
        (Value::Float(_), Value::Integer(i)) => Ok(Value::Float(i as f64)),
        (base, other) => Err(MergeError {
            path: path.to_string(),
            expected: base.type_str(),
            received: other.type_str(),
        }),
    }
}

fn merge_tables(
    existing: &mut Map<String, Value>,
    incoming: Map<String, Value>,
    path: &str,
) -> Result<(), MergeError> {
    for (key, value) in incoming {
        let key_path = format!("{path}.{key}");
        let merged = match existing.remove(&key) {
            Some(current) => merge_at(current, value, &key_path)?,
            None => value,
        };
        existing.insert(key, merged);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Value {
        s.parse().unwrap()
    }

    #[test]
    fn nested_tables_are_merged() {
        let base = parse("[a]\nx = 1\ny = \"keep\"\n[b]\nz = true\n");
        let other = parse("[a]\nx = 2\n");
        let merged = merge(base, other).unwrap();
        assert_eq!(merged, parse("[a]\nx = 2\ny = \"keep\"\n[b]\nz = true\n"));
    }

    #[test]
    fn new_keys_are_added() {
        let base = parse("[templates]\n\"1.0\" = \"onchain\"\n");
        let other = parse("[templates]\n\"3.0\" = \"minimal\"\n");
        let merged = merge(base, other).unwrap();
        assert_eq!(
            merged,
            parse("[templates]\n\"1.0\" = \"onchain\"\n\"3.0\" = \"minimal\"\n")
        );
    }

    #[test]
    fn arrays_are_replaced() {
        let base = parse("levels = [\"a\", \"b\"]\n");
        let other = parse("levels = [\"c\"]\n");
        assert_eq!(merge(base, other).unwrap(), parse("levels = [\"c\"]\n"));
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let base = parse("[http]\nport = 1\n");
        let other = parse("[http]\nport = \"one\"\n");
        let err = merge(base, other).unwrap_err();
        assert_eq!(err.path, "$.http.port");
        assert_eq!(err.expected, "integer");
        assert_eq!(err.received, "string");
    }
}
