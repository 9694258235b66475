/*
 * Responsibility
 * - 何切るアドバイスの request DTO
 * - JSON parse (失敗 → 400 Invalid JSON body) と shape チェック (hand/doras が配列か)
 * - 牌の中身は検査しない: 配列要素はそのまま upstream prompt に埋め込む
 */
use serde_json::Value;

use crate::error::AppError;
use crate::services::advice::{ChatCompletionRequest, DEFAULT_TEMPERATURE};

#[derive(Debug, Clone, PartialEq)]
pub struct AdviceRequest {
    pub hand: Vec<Value>,
    pub doras: Vec<Value>,
    pub temperature: f64,
}

impl AdviceRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self, AppError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            tracing::debug!(error = %e, "advice body is not JSON");
            AppError::InvalidJson
        })?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, AppError> {
        // A JSON body that is not an object has neither field.
        let Value::Object(mut fields) = value else {
            return Err(AppError::InvalidShape);
        };

        let (Some(Value::Array(hand)), Some(Value::Array(doras))) =
            (fields.remove("hand"), fields.remove("doras"))
        else {
            return Err(AppError::InvalidShape);
        };

        // Non-numeric temperatures fall back to the default instead of failing.
        let temperature = fields
            .get("temperature")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_TEMPERATURE);

        Ok(Self {
            hand,
            doras,
            temperature,
        })
    }

    pub fn to_payload(&self) -> ChatCompletionRequest {
        ChatCompletionRequest::for_hand(&self.hand, &self.doras, self.temperature)
    }
}
