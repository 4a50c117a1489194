//! JSON shapes for `kv.KVService`.
//!
//! Every field carries `#[serde(default)]`, so a missing field decodes as its
//! zero value and unknown fields are ignored. Responses always serialize every
//! field, including `false` and `""`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveValueRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveValueResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadValueRequest {
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadValueResponse {
    pub value: String,
    pub found: bool,
}
