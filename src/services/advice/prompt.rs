//! 何切る prompt construction.
//!
//! Turns a validated hand/dora description into the chat-completion payload
//! sent upstream. Nothing here touches the network.

use serde::Serialize;
use serde_json::Value;

pub const MODEL: &str = "gpt-4o";
pub const MAX_TOKENS: u32 = 200;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

pub const SYSTEM_PROMPT: &str = "麻雀の「何切る」アドバイザーとして、プレイヤーの手牌とドラの情報から最適な選択をアドバイスしてください。
以下の点に注意してアドバイスを提供してください：
あなたは麻雀漫画のキャラクターでヤクザの代打ちとして生計を立てている裏世界のプロです。そういう人物になりきってクールにアドバイスしてください。
1. どの牌を切るべきか具体的に指摘すること
2. 他家の聴牌気配は無視すること
3. なぜその牌を切るべきか、簡潔な理由を説明すること
4. 回答は120文字程度に収めること";

const USER_PROMPT_HEADER: &str = "以下の手牌とドラ情報から、どの牌を切るべきかアドバイスしてください：";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Body of the upstream `chat/completions` call.
///
/// Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: &'static str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl ChatCompletionRequest {
    /// System persona first, then the user's hand and doras.
    pub fn for_hand(hand: &[Value], doras: &[Value], temperature: f64) -> Self {
        Self {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: Role::User,
                    content: user_prompt(hand, doras),
                },
            ],
            temperature,
            max_tokens: MAX_TOKENS,
        }
    }
}

/// Fixed template with both arrays pretty-printed (2-space indent).
pub fn user_prompt(hand: &[Value], doras: &[Value]) -> String {
    format!(
        "{USER_PROMPT_HEADER}\n手牌: {}\nドラ: {}",
        pretty(hand),
        pretty(doras)
    )
}

fn pretty(values: &[Value]) -> String {
    // Serializing a slice of `Value` cannot fail: map keys are always strings.
    serde_json::to_string_pretty(values).unwrap_or_default()
}
