/*
 * Responsibility
 * - 何切るアドバイスの upstream payload 組み立て (system/user prompt)
 */
pub mod prompt;

pub use prompt::{ChatCompletionRequest, DEFAULT_TEMPERATURE};
