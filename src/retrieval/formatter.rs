use std::sync::Arc;

use serde_json::Value;

use super::reconstruct::Reconstructor;
use crate::core::errors::KnowledgeError;
use crate::object::ObjectId;

pub const NO_MORE_INFORMATION: &str = "*** I have no more information for your reference.\n";
pub const PROVIDED_PREAMBLE: &str =
    "*** I have provided the following known information for your reference with json format:\n";

/// Renders one ranked match, selected by offset, as a prompt-ready block.
pub struct ContextFormatter {
    reconstructor: Arc<Reconstructor>,
}

impl ContextFormatter {
    pub fn new(reconstructor: Arc<Reconstructor>) -> Self {
        Self { reconstructor }
    }

    pub async fn format(
        &self,
        object_ids: &[ObjectId],
        offset: usize,
    ) -> Result<String, KnowledgeError> {
        let Some(selected) = object_ids.get(offset) else {
            return Ok(NO_MORE_INFORMATION.to_string());
        };

        let descriptions = self
            .reconstructor
            .reconstruct(std::slice::from_ref(selected))
            .await?;
        let json = serde_json::to_string(&descriptions).map_err(KnowledgeError::resolution)?;

        Ok(format!("{}{}.\n", PROVIDED_PREAMBLE, json))
    }
}

/// Coerces a caller-supplied offset (`"2"`, `2`, `" 2 "`) to an index.
pub fn parse_offset(value: &Value) -> Result<usize, KnowledgeError> {
    match value {
        Value::String(raw) => parse_offset_str(raw),
        Value::Number(number) => number
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| KnowledgeError::InvalidOffset(number.to_string())),
        other => Err(KnowledgeError::InvalidOffset(other.to_string())),
    }
}

pub fn parse_offset_str(raw: &str) -> Result<usize, KnowledgeError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| KnowledgeError::InvalidOffset(format!("{:?}", raw)))
}
