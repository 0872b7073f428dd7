// Public JSON API request and response bodies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Emotion categories recognised by the journaling app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    #[default]
    Normal,
    Sad,
    Angry,
}

impl Emotion {
    pub const ALL: [Emotion; 4] = [Emotion::Happy, Emotion::Normal, Emotion::Sad, Emotion::Angry];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Normal => "normal",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
        }
    }

    /// Lenient parse for client-supplied labels; unknown labels become `Normal`.
    pub fn parse_or_normal(label: Option<&str>) -> Self {
        label.and_then(|l| l.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "happy" => Ok(Emotion::Happy),
            "normal" => Ok(Emotion::Normal),
            "sad" => Ok(Emotion::Sad),
            "angry" => Ok(Emotion::Angry),
            other => Err(format!("unknown emotion: {}", other)),
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionResult {
    pub emotion: Emotion,
    /// Always within `0.0..=1.0`.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    /// Reserved; currently always empty.
    #[serde(default)]
    pub followup_questions: Vec<String>,
}

/// Prompt-of-the-day categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptType {
    Morning,
    Afternoon,
    Evening,
    EmotionBased,
}

impl PromptType {
    pub const ALL: [PromptType; 4] = [
        PromptType::Morning,
        PromptType::Afternoon,
        PromptType::Evening,
        PromptType::EmotionBased,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptType::Morning => "morning",
            PromptType::Afternoon => "afternoon",
            PromptType::Evening => "evening",
            PromptType::EmotionBased => "emotion-based",
        }
    }
}

impl FromStr for PromptType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PromptType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown prompt type: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptResult {
    pub prompt: String,
    #[serde(rename = "type")]
    pub prompt_type: PromptType,
}

/// Response of the combined classify-then-reply endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageAnalysis {
    pub emotion: EmotionResult,
    pub response: ChatReply,
}

// Request bodies. Fields are optional so that presence is validated by the
// handlers and reported with the API's own error shape.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OgpRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptRequest {
    #[serde(default, rename = "type")]
    pub prompt_type: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emotion_wire_format() {
        let result = EmotionResult {
            emotion: Emotion::Sad,
            confidence: 0.8,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["emotion"], "sad");
        assert_eq!(json["confidence"], 0.8);
    }

    #[test]
    fn test_emotion_parse_or_normal() {
        assert_eq!(Emotion::parse_or_normal(Some("HAPPY")), Emotion::Happy);
        assert_eq!(Emotion::parse_or_normal(Some("ecstatic")), Emotion::Normal);
        assert_eq!(Emotion::parse_or_normal(None), Emotion::Normal);
    }

    #[test]
    fn test_prompt_type_round_trip_names() {
        assert_eq!("emotion-based".parse::<PromptType>().unwrap(), PromptType::EmotionBased);
        assert!("invalid-type".parse::<PromptType>().is_err());
        assert!("Morning".parse::<PromptType>().is_err());

        let json = serde_json::to_value(PromptResult {
            prompt: "p".to_string(),
            prompt_type: PromptType::EmotionBased,
        })
        .unwrap();
        assert_eq!(json["type"], "emotion-based");
    }

    #[test]
    fn test_chat_reply_camel_case() {
        let json = serde_json::to_value(ChatReply {
            message: "hi".to_string(),
            followup_questions: vec![],
        })
        .unwrap();
        assert_eq!(json["followupQuestions"], serde_json::json!([]));
    }
}
