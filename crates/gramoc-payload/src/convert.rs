use std::fmt::Display;
use std::str::FromStr;

use gramoc_frame::DataType;
use tracing::warn;

use crate::config::{DecodeConfig, MapFallback};
use crate::error::{PayloadError, Result};
use crate::value::Value;

/// Encode a value into payload bytes and the data type they travel under.
///
/// Maps have no wire encoding and fail with [`PayloadError::Unsupported`].
pub fn encode_value(value: &Value) -> Result<(Vec<u8>, DataType)> {
    match value {
        Value::Map(_) => Err(PayloadError::Unsupported(DataType::Map)),
        Value::String(text) => Ok((text.as_bytes().to_vec(), DataType::String)),
        Value::Int(_) | Value::Float(_) | Value::ListInt(_) | Value::ListFloat(_) => {
            Ok((value.to_string().into_bytes(), value.data_type()))
        }
    }
}

/// Decode payload bytes according to their declared data type.
///
/// `NotFound` yields `Ok(None)`.
pub fn decode_value(payload: &[u8], data_type: DataType) -> Result<Option<Value>> {
    decode_value_with_config(payload, data_type, &DecodeConfig::default())
}

/// Decode payload bytes with explicit configuration.
pub fn decode_value_with_config(
    payload: &[u8],
    data_type: DataType,
    config: &DecodeConfig,
) -> Result<Option<Value>> {
    let value = match data_type {
        DataType::NotFound => return Ok(None),
        DataType::Map => decode_map(payload, config.map_fallback)?,
        DataType::String => Value::String(utf8(payload, data_type)?.to_string()),
        DataType::Int => Value::Int(parse_scalar(utf8(payload, data_type)?, data_type)?),
        DataType::Float => Value::Float(parse_scalar(utf8(payload, data_type)?, data_type)?),
        DataType::ListInt => Value::ListInt(parse_list(utf8(payload, data_type)?, data_type)?),
        DataType::ListFloat => Value::ListFloat(parse_list(utf8(payload, data_type)?, data_type)?),
    };
    Ok(Some(value))
}

fn decode_map(payload: &[u8], fallback: MapFallback) -> Result<Value> {
    let text = utf8(payload, DataType::Map)?;
    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(text) {
        Ok(map) => Ok(Value::Map(map)),
        Err(err) => match fallback {
            MapFallback::Reject => Err(PayloadError::parse(DataType::Map, err.to_string())),
            MapFallback::Text => {
                warn!(error = %err, "map payload is not a JSON object, decoding as text");
                Ok(Value::String(text.to_string()))
            }
        },
    }
}

fn utf8(payload: &[u8], data_type: DataType) -> Result<&str> {
    std::str::from_utf8(payload).map_err(|err| PayloadError::parse(data_type, err.to_string()))
}

fn parse_scalar<T>(text: &str, data_type: DataType) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    text.parse::<T>()
        .map_err(|err| PayloadError::parse(data_type, format!("{text:?}: {err}")))
}

fn parse_list<T>(text: &str, data_type: DataType) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let body = text
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| PayloadError::parse(data_type, format!("{text:?}: missing brackets")))?;

    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    body.split(',')
        .map(|item| parse_scalar(item.trim(), data_type))
        .collect()
}
