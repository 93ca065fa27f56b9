//! Safe-ish conversions between rust and sql types.
//! Ideally this will be ripped out and implemented as whatever custom diesel types end up being necessary.

use crate::{AnswerValue, EngineError};

pub fn i32_to_u32(i: i32) -> Result<u32, EngineError> {
    if i < 0 {
        Err(EngineError::storage(
            "i32 value is negative and cannot be converted to u32",
        ))
    } else {
        Ok(i as u32)
    }
}

pub fn u32_to_i32(i: u32) -> Result<i32, EngineError> {
    if i > i32::MAX as u32 {
        Err(EngineError::storage(
            "u32 value exceeds i32::MAX and cannot be converted to i32",
        ))
    } else {
        Ok(i as i32)
    }
}

pub fn i64_to_u32(i: i64) -> Result<u32, EngineError> {
    if i < 0 || i > i64::from(u32::MAX) {
        Err(EngineError::storage(
            "i64 value is out of range for u32",
        ))
    } else {
        Ok(i as u32)
    }
}

pub fn deserialize_answer(token: String) -> Result<AnswerValue, EngineError> {
    AnswerValue::parse(&token).ok_or_else(|| {
        EngineError::storage(format!("unexpected answer value in storage: {token:?}"))
    })
}

pub fn serialize_answer(value: AnswerValue) -> String {
    value.as_str().to_string()
}
