//! Extended JSON rendering of host values.
//!
//! Special types map to `$`-keyed wrapper objects (`$oid`, `$date`,
//! `$binary`, `$regularExpression`, `$code`/`$scope`); plain values map to
//! plain JSON. Wrappers are strict on the way back in: a wrapper object
//! with extra keys is rejected rather than silently passed through.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{Map, Value};

use crate::{subtype, BinData, Code, HostValue, MarshalError, ObjectId, Regex, UtcDate};

/// Renders a host value as Extended JSON.
pub fn to_json(value: &HostValue) -> Value {
    match value {
        HostValue::Null => Value::Null,
        HostValue::Bool(b) => Value::Bool(*b),
        HostValue::Int(n) => Value::from(*n),
        // non-finite floats have no JSON form
        HostValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        HostValue::Str(s) => Value::from(s.as_str()),
        HostValue::Bytes(bytes) => binary_wrapper(bytes, subtype::GENERIC),
        HostValue::Array(items) => Value::Array(items.iter().map(to_json).collect()),
        HostValue::Document(fields) => {
            let mut map = Map::new();
            for (key, value) in fields {
                map.insert(key.clone(), to_json(value));
            }
            Value::Object(map)
        }
        HostValue::ObjectId(id) => wrapper("$oid", Value::from(id.to_string())),
        HostValue::Date(date) => wrapper("$date", Value::from(date.to_millis())),
        HostValue::BinData(bin) => binary_wrapper(bin.bytes(), bin.subtype()),
        HostValue::Regex(re) => {
            let mut inner = Map::new();
            inner.insert("pattern".to_owned(), Value::from(re.pattern()));
            inner.insert("options".to_owned(), Value::from(re.flags()));
            wrapper("$regularExpression", Value::Object(inner))
        }
        HostValue::Code(code) => {
            let mut map = Map::new();
            map.insert("$code".to_owned(), Value::from(code.code()));
            let mut scope = Map::new();
            for (key, value) in code.scope() {
                scope.insert(key.clone(), to_json(value));
            }
            map.insert("$scope".to_owned(), Value::Object(scope));
            Value::Object(map)
        }
    }
}

/// Parses Extended JSON back into a host value.
pub fn from_json(value: &Value) -> Result<HostValue, MarshalError> {
    Ok(match value {
        Value::Null => HostValue::Null,
        Value::Bool(b) => HostValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => HostValue::Int(i),
            None => HostValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => HostValue::Str(s.clone()),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(from_json(item)?);
            }
            HostValue::Array(out)
        }
        Value::Object(map) => return from_object(map),
    })
}

fn from_object(map: &Map<String, Value>) -> Result<HostValue, MarshalError> {
    if map.contains_key("$oid") {
        let hex = single_key_str(map, "$oid")?;
        return Ok(HostValue::ObjectId(ObjectId::parse(hex)?));
    }
    if map.contains_key("$date") {
        if map.len() != 1 {
            return Err(MarshalError::InvalidExtendedJson("$date"));
        }
        let millis = map["$date"]
            .as_i64()
            .ok_or(MarshalError::InvalidExtendedJson("$date"))?;
        return Ok(HostValue::Date(UtcDate::from_millis(millis)));
    }
    if map.contains_key("$binary") {
        return from_binary(map);
    }
    if map.contains_key("$regularExpression") {
        return from_regex(map);
    }
    if map.contains_key("$code") {
        return from_code(map);
    }
    let mut fields = Vec::with_capacity(map.len());
    for (key, value) in map {
        fields.push((key.clone(), from_json(value)?));
    }
    Ok(HostValue::Document(fields))
}

fn from_binary(map: &Map<String, Value>) -> Result<HostValue, MarshalError> {
    if map.len() != 1 {
        return Err(MarshalError::InvalidExtendedJson("$binary"));
    }
    let inner = map["$binary"]
        .as_object()
        .ok_or(MarshalError::InvalidExtendedJson("$binary"))?;
    if inner.len() != 2 {
        return Err(MarshalError::InvalidExtendedJson("$binary"));
    }
    let payload = inner
        .get("base64")
        .and_then(Value::as_str)
        .ok_or(MarshalError::InvalidExtendedJson("$binary"))?;
    let tag = inner
        .get("subType")
        .and_then(Value::as_str)
        .ok_or(MarshalError::InvalidExtendedJson("$binary"))?;
    let bytes = BASE64
        .decode(payload)
        .map_err(|_| MarshalError::InvalidExtendedJson("$binary"))?;
    let tag =
        u8::from_str_radix(tag, 16).map_err(|_| MarshalError::InvalidExtendedJson("$binary"))?;
    Ok(HostValue::BinData(BinData::new(bytes, tag)))
}

fn from_regex(map: &Map<String, Value>) -> Result<HostValue, MarshalError> {
    if map.len() != 1 {
        return Err(MarshalError::InvalidExtendedJson("$regularExpression"));
    }
    let inner = map["$regularExpression"]
        .as_object()
        .ok_or(MarshalError::InvalidExtendedJson("$regularExpression"))?;
    if inner.len() != 2 {
        return Err(MarshalError::InvalidExtendedJson("$regularExpression"));
    }
    let pattern = inner
        .get("pattern")
        .and_then(Value::as_str)
        .ok_or(MarshalError::InvalidExtendedJson("$regularExpression"))?;
    let options = inner
        .get("options")
        .and_then(Value::as_str)
        .ok_or(MarshalError::InvalidExtendedJson("$regularExpression"))?;
    Ok(HostValue::Regex(Regex::new(pattern, options)?))
}

fn from_code(map: &Map<String, Value>) -> Result<HostValue, MarshalError> {
    let code = map["$code"]
        .as_str()
        .ok_or(MarshalError::InvalidExtendedJson("$code"))?;
    let scope = match (map.len(), map.get("$scope")) {
        (1, None) => Vec::new(),
        (2, Some(Value::Object(scope))) => {
            let mut fields = Vec::with_capacity(scope.len());
            for (key, value) in scope {
                fields.push((key.clone(), from_json(value)?));
            }
            fields
        }
        _ => return Err(MarshalError::InvalidExtendedJson("$code")),
    };
    Ok(HostValue::Code(Code::with_scope(code, scope)))
}

fn single_key_str<'a>(
    map: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, MarshalError> {
    if map.len() != 1 {
        return Err(MarshalError::InvalidExtendedJson(key));
    }
    map[key]
        .as_str()
        .ok_or(MarshalError::InvalidExtendedJson(key))
}

fn wrapper(key: &str, inner: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_owned(), inner);
    Value::Object(map)
}

fn binary_wrapper(bytes: &[u8], tag: u8) -> Value {
    let mut inner = Map::new();
    inner.insert("base64".to_owned(), Value::from(BASE64.encode(bytes)));
    inner.insert("subType".to_owned(), Value::from(format!("{tag:02x}")));
    wrapper("$binary", Value::Object(inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn special_types_roundtrip() {
        let id = ObjectId::parse("4af9f23d8ead0e1d32000000").unwrap();
        let cases = vec![
            HostValue::ObjectId(id),
            HostValue::Date(UtcDate::new(1, 500_000)),
            HostValue::BinData(BinData::new(vec![0, 1, 2, 255], subtype::USER_DEFINED)),
            HostValue::Regex(Regex::parse("/foo/i").unwrap()),
            HostValue::Code(Code::with_scope(
                "return x;",
                vec![("x".to_owned(), HostValue::Int(5))],
            )),
        ];
        for case in cases {
            let rendered = to_json(&case);
            let back = from_json(&rendered).unwrap_or_else(|e| panic!("{rendered}: {e}"));
            assert_eq!(back, case);
        }
    }

    #[test]
    fn wrappers_render_the_expected_shapes() {
        let id = ObjectId::parse("4af9f23d8ead0e1d32000000").unwrap();
        assert_eq!(
            to_json(&HostValue::ObjectId(id)),
            json!({"$oid": "4af9f23d8ead0e1d32000000"})
        );
        assert_eq!(
            to_json(&HostValue::Date(UtcDate::new(1, 500_000))),
            json!({"$date": 1500})
        );
        assert_eq!(
            to_json(&HostValue::BinData(BinData::generic(vec![1, 2, 3]))),
            json!({"$binary": {"base64": "AQID", "subType": "00"}})
        );
    }

    #[test]
    fn bytes_render_as_generic_binary() {
        assert_eq!(
            to_json(&HostValue::Bytes(vec![1, 2, 3])),
            json!({"$binary": {"base64": "AQID", "subType": "00"}})
        );
    }

    #[test]
    fn plain_documents_pass_through_in_order() {
        let doc = HostValue::Document(vec![
            ("z".to_owned(), HostValue::Int(1)),
            ("a".to_owned(), HostValue::from("x")),
        ]);
        let rendered = to_json(&doc);
        assert_eq!(rendered, json!({"z": 1, "a": "x"}));
        assert_eq!(from_json(&rendered).unwrap(), doc);
    }

    #[test]
    fn wrappers_with_extra_keys_are_rejected() {
        let bad = json!({"$oid": "4af9f23d8ead0e1d32000000", "extra": 1});
        assert!(matches!(
            from_json(&bad),
            Err(MarshalError::InvalidExtendedJson("$oid"))
        ));
        let bad = json!({"$date": "not millis"});
        assert!(matches!(
            from_json(&bad),
            Err(MarshalError::InvalidExtendedJson("$date"))
        ));
    }

    #[test]
    fn code_without_scope_parses_to_empty_scope() {
        let value = json!({"$code": "return 1;"});
        match from_json(&value).unwrap() {
            HostValue::Code(code) => {
                assert_eq!(code.code(), "return 1;");
                assert!(code.scope().is_empty());
            }
            other => panic!("expected code, got {other:?}"),
        }
    }
}
