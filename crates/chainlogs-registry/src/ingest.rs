//! Contract ABI JSON → `AbiEventDef`.
//!
//! Only items with `"type": "event"` are consumed. Each item is validated on
//! its own: a malformed item produces an `AbiError` for that item and has no
//! effect on its siblings.

use chainlogs_core::{AbiError, AbiEventDef, AbiParameter};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct EventItem {
    name: Option<String>,
    inputs: Option<Vec<InputItem>>,
    #[serde(default)]
    anonymous: bool,
}

#[derive(Debug, Deserialize)]
struct InputItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type")]
    ty: Option<String>,
    #[serde(default)]
    indexed: bool,
    #[serde(default)]
    components: Option<Vec<InputItem>>,
}

/// Parse an ABI document: either a bare JSON array of items or a build
/// artifact object carrying an `"abi"` array.
pub fn parse_abi_json(json: &str) -> Result<Vec<Value>, AbiError> {
    let doc: Value = serde_json::from_str(json)?;
    match doc {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match obj.remove("abi") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(AbiError::MalformedAbi {
                index: 0,
                reason: "expected a JSON array or an object with an \"abi\" array".into(),
            }),
        },
        _ => Err(AbiError::MalformedAbi {
            index: 0,
            reason: "expected a JSON array of ABI items".into(),
        }),
    }
}

/// Parse one ABI item.
///
/// Returns `Ok(None)` for non-event items (functions, errors, constructors).
pub fn parse_event_item(index: usize, item: &Value) -> Result<Option<AbiEventDef>, AbiError> {
    let malformed = |reason: String| AbiError::MalformedAbi { index, reason };

    match item.get("type").and_then(Value::as_str) {
        Some("event") => {}
        _ => return Ok(None),
    }

    let event: EventItem = serde_json::from_value(item.clone())
        .map_err(|e| malformed(format!("invalid event item: {e}")))?;

    let name = match event.name {
        Some(n) if !n.trim().is_empty() => n,
        _ => return Err(malformed("event has no name".into())),
    };
    if event.anonymous {
        return Err(malformed(format!(
            "anonymous event '{name}' has no signature topic"
        )));
    }
    let inputs = event
        .inputs
        .ok_or_else(|| malformed(format!("event '{name}' has no inputs")))?;

    let params = inputs
        .iter()
        .map(|input| {
            Ok(AbiParameter {
                name: input.name.clone().unwrap_or_default(),
                ty: canonical_type(input)?,
                indexed: input.indexed,
            })
        })
        .collect::<Result<Vec<_>, String>>()
        .map_err(|reason| malformed(format!("event '{name}': {reason}")))?;

    Ok(Some(AbiEventDef::new(name, params)))
}

/// Canonical type string; `tuple` types expand to `(t1,t2,...)` plus any
/// array suffix.
fn canonical_type(input: &InputItem) -> Result<String, String> {
    let ty = input
        .ty
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| "input has no type".to_string())?;

    match ty.strip_prefix("tuple") {
        Some(suffix) => {
            let components = input
                .components
                .as_ref()
                .ok_or_else(|| format!("'{ty}' input has no components"))?;
            let inner = components
                .iter()
                .map(canonical_type)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("({}){suffix}", inner.join(",")))
        }
        None => Ok(ty.to_string()),
    }
}
