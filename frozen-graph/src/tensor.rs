//! Tensor payload decoding and shape accessors.
//!
//! A parameter node carries a [`TensorRecord`]: a dtype code plus either a
//! typed value list or, when the exporter chose the compact encoding, a raw
//! byte buffer of packed little-endian 4-byte words. [`tensor_value`] returns
//! the flat contents either way.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum TensorError {
    #[error("unsupported tensor dtype code {0}")]
    UnsupportedDtype(i32),
    #[error("packed tensor content of {0} bytes is not a multiple of 4")]
    PackedLength(usize),
}

/// Raw tensor record as carried by a parameter node.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TensorRecord {
    #[serde(default)]
    pub dtype: i32,
    #[serde(default)]
    pub float_val: Vec<f32>,
    #[serde(default)]
    pub int_val: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tensor_content: Vec<u8>,
}

/// Flat decoded contents of a tensor record.
#[derive(Clone, Debug, PartialEq)]
pub enum TensorData {
    Floats(Vec<f32>),
    Ints(Vec<i64>),
}

impl TensorData {
    pub fn len(&self) -> usize {
        match self {
            TensorData::Floats(v) => v.len(),
            TensorData::Ints(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Returns the flat numeric contents of `record`.
///
/// Dispatches on the dtype code: `0` and `1` select the float list, `3` the
/// int list; any other code fails with [`TensorError::UnsupportedDtype`].
/// When the selected typed list is empty the payload was stored as packed
/// bytes instead, and [`decode_packed`] takes over.
pub fn tensor_value(record: &TensorRecord) -> Result<TensorData, TensorError> {
    let data = match record.dtype {
        // both float codes seen in frozen graphs carry their values in float_val
        0 | 1 => TensorData::Floats(record.float_val.clone()),
        3 => TensorData::Ints(record.int_val.iter().map(|&v| i64::from(v)).collect()),
        code => return Err(TensorError::UnsupportedDtype(code)),
    };
    if data.is_empty() {
        return Ok(TensorData::Ints(decode_packed(&record.tensor_content)?));
    }
    Ok(data)
}

/// Decodes packed little-endian 4-byte words.
///
/// The buffer length must be an exact multiple of 4, otherwise
/// [`TensorError::PackedLength`]. A word equal to `0xFFFF_FFFF` is folded back
/// to `-1`; every other value passes through as a non-negative integer. Only
/// the all-ones word gets this treatment; the asymmetry is long-standing
/// observed behavior that downstream consumers rely on, so it is kept rather
/// than widened into a full signed conversion.
pub fn decode_packed(content: &[u8]) -> Result<Vec<i64>, TensorError> {
    let chunks = content.chunks_exact(4);
    if !chunks.remainder().is_empty() {
        return Err(TensorError::PackedLength(content.len()));
    }
    Ok(chunks
        .map(|raw| {
            let word = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            if word == u32::MAX {
                -1
            } else {
                i64::from(word)
            }
        })
        .collect())
}

/// Width of a shape: index 1 of a 4-dim shape, index 0 of a 2-dim shape.
/// Other lengths are unsupported and yield `None`.
pub fn shape_width(shape: &[i64]) -> Option<i64> {
    match shape.len() {
        4 => Some(shape[1]),
        2 => Some(shape[0]),
        _ => None,
    }
}

/// Height of a shape: index 2 of a 4-dim shape, index 1 of a 2-dim shape.
/// Other lengths are unsupported and yield `None`.
pub fn shape_height(shape: &[i64]) -> Option<i64> {
    match shape.len() {
        4 => Some(shape[2]),
        2 => Some(shape[1]),
        _ => None,
    }
}
