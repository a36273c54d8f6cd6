//! Serde encoding for tempo values.
//!
//! Tempo is not range-checked, so infinities and NaN must survive a save.
//! JSON has no literal for them; they are written as the strings `"inf"`,
//! `"-inf"` and `"NaN"`, finite values as plain numbers.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serializer};

const INF: &str = "inf";
const NEG_INF: &str = "-inf";
const NAN: &str = "NaN";

pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f32(*value)
    } else if value.is_nan() {
        serializer.serialize_str(NAN)
    } else if value.is_sign_positive() {
        serializer.serialize_str(INF)
    } else {
        serializer.serialize_str(NEG_INF)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Encoded {
    Number(f32),
    Text(String),
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    match Encoded::deserialize(deserializer)? {
        Encoded::Number(v) => Ok(v),
        Encoded::Text(s) => match s.as_str() {
            INF => Ok(f32::INFINITY),
            NEG_INF => Ok(f32::NEG_INFINITY),
            NAN => Ok(f32::NAN),
            other => Err(de::Error::custom(format!("invalid tempo '{other}'"))),
        },
    }
}
