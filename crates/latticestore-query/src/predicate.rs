//! Component B: compiles an attribute-name → predicate-value mapping into a
//! parameterised `WHERE` fragment. Never interpolates a value into the
//! query text.

use std::collections::BTreeMap;

use latticestore_types::{StoreError, StoreResult, Value};
use serde::{Deserialize, Serialize};

use crate::statement::quote_ident;

/// A single predicate value: either a bare scalar (equality) or a
/// single-key operator object (`{"between": [1, 2]}`). Structurally
/// permissive by design — operator validity is checked by [`compile`], not
/// at deserialization time, so an unknown operator surfaces as a
/// `StoreError` rather than a deserialize failure.
///
/// `Operator` is listed before `Scalar`: any JSON object (any number of
/// keys) must be tried as an operator object first, matching §4.B's rule
/// that a map-shaped predicate value is always operator syntax — never a
/// scalar equality against a JSON object. If `Scalar` came first, its
/// `Value::Json` arm would swallow every operator object before `Operator`
/// ever got a chance to match.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PredicateInput {
    Operator(BTreeMap<String, Value>),
    Scalar(Value),
}

impl From<Value> for PredicateInput {
    fn from(v: Value) -> Self {
        PredicateInput::Scalar(v)
    }
}

pub type Predicate = BTreeMap<String, PredicateInput>;

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPredicate {
    pub query: String,
    pub params: Vec<Value>,
}

/// Compile a predicate into a `col = ? AND col2 >= ? AND ...` fragment.
/// Fragments are emitted in attribute-name order (the map is a `BTreeMap`),
/// so output is deterministic independent of construction order.
pub fn compile(predicate: &Predicate) -> StoreResult<CompiledPredicate> {
    let mut clauses = Vec::with_capacity(predicate.len());
    let mut params = Vec::new();

    for (column, input) in predicate {
        let ident = quote_ident(column);
        match input {
            PredicateInput::Scalar(value) => {
                clauses.push(format!("{ident} = ?"));
                params.push(value.clone());
            }
            PredicateInput::Operator(ops) => {
                if ops.len() != 1 {
                    return Err(StoreError::schema(format!(
                        "predicate for '{column}' must name exactly one operator"
                    )));
                }
                let (op, value) = ops.iter().next().expect("checked len == 1");
                compile_operator(&ident, column, op, value, &mut clauses, &mut params)?;
            }
        }
    }

    Ok(CompiledPredicate { query: clauses.join(" AND "), params })
}

fn compile_operator(
    ident: &str,
    column: &str,
    op: &str,
    value: &Value,
    clauses: &mut Vec<String>,
    params: &mut Vec<Value>,
) -> StoreResult<()> {
    match op.to_ascii_lowercase().as_str() {
        "eq" => {
            clauses.push(format!("{ident} = ?"));
            params.push(value.clone());
        }
        "ne" => {
            clauses.push(format!("{ident} != ?"));
            params.push(value.clone());
        }
        "lt" => {
            clauses.push(format!("{ident} < ?"));
            params.push(value.clone());
        }
        "gt" => {
            clauses.push(format!("{ident} > ?"));
            params.push(value.clone());
        }
        "le" => {
            clauses.push(format!("{ident} <= ?"));
            params.push(value.clone());
        }
        "ge" => {
            clauses.push(format!("{ident} >= ?"));
            params.push(value.clone());
        }
        "between" => {
            let Value::Set(bounds) = value else {
                return Err(StoreError::schema(format!(
                    "'between' predicate for '{column}' requires a two-element array"
                )));
            };
            let [lo, hi] = <&[Value; 2]>::try_from(bounds.as_slice()).map_err(|_| {
                StoreError::schema(format!(
                    "'between' predicate for '{column}' requires exactly two values"
                ))
            })?;
            clauses.push(format!("{ident} >= ? AND {ident} <= ?"));
            params.push(lo.clone());
            params.push(hi.clone());
        }
        other => {
            return Err(StoreError::schema(format!("unknown predicate operator '{other}'")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predicate_from(pairs: Vec<(&str, PredicateInput)>) -> Predicate {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn compiles_scalar_equality() {
        let predicate = predicate_from(vec![("key", Value::Text("foo".into()).into())]);
        let compiled = compile(&predicate).unwrap();
        assert_eq!(compiled.query, "\"key\" = ?");
        assert_eq!(compiled.params, vec![Value::Text("foo".into())]);
    }

    #[test]
    fn between_operator_survives_wire_deserialization() {
        // Exercises the actual request path: a `Predicate` parsed from JSON,
        // not an `Operator(...)` built directly in Rust.
        let predicate: Predicate = serde_json::from_value(serde_json::json!({
            "key": "foo",
            "ts": {"between": [1, 2]}
        }))
        .unwrap();
        let compiled = compile(&predicate).unwrap();
        assert_eq!(compiled.query, "\"key\" = ? AND \"ts\" >= ? AND \"ts\" <= ?");
        assert_eq!(
            compiled.params,
            vec![Value::Text("foo".into()), Value::Varint(1), Value::Varint(2)]
        );
    }

    #[test]
    fn single_key_operator_object_deserializes_to_operator_not_scalar_json() {
        let predicate: Predicate = serde_json::from_value(serde_json::json!({
            "age": {"gt": 5}
        }))
        .unwrap();
        assert!(matches!(predicate["age"], PredicateInput::Operator(_)));
        let compiled = compile(&predicate).unwrap();
        assert_eq!(compiled.query, "\"age\" > ?");
        assert_eq!(compiled.params, vec![Value::Varint(5)]);
    }

    #[test]
    fn compiles_between_and_equality_in_name_order() {
        let mut predicate: Predicate = BTreeMap::new();
        predicate.insert("key".into(), Value::Text("foo".into()).into());
        predicate.insert(
            "ts".into(),
            PredicateInput::Operator(BTreeMap::from([(
                "between".to_string(),
                Value::Set(vec![Value::Varint(1), Value::Varint(2)]),
            )])),
        );

        let compiled = compile(&predicate).unwrap();
        assert_eq!(compiled.query, "\"key\" = ? AND \"ts\" >= ? AND \"ts\" <= ?");
        assert_eq!(
            compiled.params,
            vec![Value::Text("foo".into()), Value::Varint(1), Value::Varint(2)]
        );
    }

    #[test]
    fn placeholder_count_always_matches_param_count() {
        let mut predicate: Predicate = BTreeMap::new();
        predicate.insert("a".into(), Value::Varint(1).into());
        predicate.insert(
            "b".into(),
            PredicateInput::Operator(BTreeMap::from([("gt".to_string(), Value::Varint(2))])),
        );
        let compiled = compile(&predicate).unwrap();
        assert_eq!(compiled.query.matches('?').count(), compiled.params.len());
    }

    #[test]
    fn rejects_unknown_operator() {
        let mut predicate: Predicate = BTreeMap::new();
        predicate.insert(
            "a".into(),
            PredicateInput::Operator(BTreeMap::from([("contains".to_string(), Value::Varint(1))])),
        );
        assert!(compile(&predicate).is_err());
    }

    #[test]
    fn rejects_multi_key_operator_object() {
        let mut predicate: Predicate = BTreeMap::new();
        predicate.insert(
            "a".into(),
            PredicateInput::Operator(BTreeMap::from([
                ("gt".to_string(), Value::Varint(1)),
                ("lt".to_string(), Value::Varint(2)),
            ])),
        );
        assert!(compile(&predicate).is_err());
    }
}
