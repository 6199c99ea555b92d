//! Output schemas for constrained generation.
//!
//! The generation API accepts an OpenAPI-style subset of JSON Schema:
//! uppercase type names, no `$ref`, no definitions, and `nullable` in
//! place of `null` type unions. [`StructuredOutput::response_schema`]
//! derives that form from the `schemars` description of a Rust type.
//!
//! ```
//! use funnel_topics::model::TopicTree;
//! use funnel_topics::schema::StructuredOutput;
//!
//! let schema = TopicTree::response_schema();
//! assert_eq!(schema["type"], "OBJECT");
//! ```

use schemars::{JsonSchema, schema_for};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Types that can be requested as structured model output
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Schema descriptor in the generation API's dialect.
    fn response_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();
        inline_refs(&mut value);
        to_api_dialect(value)
    }

    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

/// Replace every `$ref` with the definition it points at.
fn inline_refs(value: &mut Value) {
    let definitions = match value {
        Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };
    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ref_path)) = map.get("$ref").cloned() {
                if let Some(def) = ref_path
                    .strip_prefix("#/definitions/")
                    .and_then(|name| definitions.get(name))
                {
                    *value = def.clone();
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }
            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

/// Rewrite an inlined JSON Schema node into the API's schema subset.
///
/// Unsupported keywords (`$schema`, `title`, `definitions`, `format`,
/// `default`, `additionalProperties`, ...) are dropped.
fn to_api_dialect(value: Value) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };

    // Single-element allOf wraps a $ref that carried a description.
    if let Some(Value::Array(mut all_of)) = map.remove("allOf") {
        if all_of.len() == 1 {
            merge_missing(&mut map, all_of.remove(0));
        }
    }

    // Option<Struct> comes out as anyOf [schema, {type: null}].
    let mut nullable = false;
    if let Some(Value::Array(any_of)) = map.remove("anyOf") {
        let (nulls, others): (Vec<_>, Vec<_>) = any_of
            .into_iter()
            .partition(|s| s.get("type").and_then(Value::as_str) == Some("null"));
        nullable = !nulls.is_empty();
        if let [only] = others.as_slice() {
            merge_missing(&mut map, only.clone());
        }
    }

    let mut out = Map::new();
    for (key, v) in map {
        match key.as_str() {
            "type" => {
                let (ty, null_in_union) = api_type(&v);
                if let Some(ty) = ty {
                    out.insert("type".into(), Value::String(ty));
                }
                nullable |= null_in_union;
            }
            "properties" => {
                if let Value::Object(props) = v {
                    let props = props
                        .into_iter()
                        .map(|(name, schema)| (name, to_api_dialect(schema)))
                        .collect();
                    out.insert("properties".into(), Value::Object(props));
                }
            }
            "items" => {
                out.insert("items".into(), to_api_dialect(v));
            }
            "required" | "enum" | "description" => {
                out.insert(key, v);
            }
            _ => {}
        }
    }
    if nullable {
        out.insert("nullable".into(), Value::Bool(true));
    }
    Value::Object(out)
}

fn merge_missing(map: &mut Map<String, Value>, other: Value) {
    if let Value::Object(inner) = other {
        for (k, v) in inner {
            map.entry(k).or_insert(v);
        }
    }
}

/// Uppercase type name plus whether `null` was part of a type union
fn api_type(value: &Value) -> (Option<String>, bool) {
    match value {
        Value::String(s) if s != "null" => (Some(s.to_uppercase()), false),
        Value::Array(types) => {
            let nullable = types.iter().any(|t| t.as_str() == Some("null"));
            let ty = types
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null")
                .map(str::to_uppercase);
            (ty, nullable)
        }
        _ => (None, false),
    }
}
