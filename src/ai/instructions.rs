// System instructions and output schemas sent to the backend

use crate::models::{Emotion, PromptType};
use serde_json::{json, Value};

pub const CLASSIFY_EMOTION: &str = "You analyse short diary entries. Classify the writer's dominant emotion \
as exactly one of: happy, normal, sad, angry. Use normal when the entry is neutral or mixed. \
Report your confidence as a number between 0 and 1. Answer with JSON only.";

pub fn emotion_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "emotion": {
                "type": "STRING",
                "enum": Emotion::ALL.iter().map(Emotion::as_str).collect::<Vec<_>>()
            },
            "confidence": { "type": "NUMBER" }
        },
        "required": ["emotion", "confidence"]
    })
}

pub fn reply(emotion: Emotion) -> String {
    let tone = match emotion {
        Emotion::Happy => "Share in their joy warmly.",
        Emotion::Normal => "Respond calmly and with genuine interest.",
        Emotion::Sad => "Be gentle and comforting; acknowledge the feeling without rushing to fix it.",
        Emotion::Angry => "Stay calm and validating; acknowledge the frustration without judging.",
    };
    format!(
        "You are a kind companion inside a diary app. The user just wrote an entry and seems {}. {} \
         Reply in two or three short sentences, in the same language the user wrote in. \
         Do not ask more than one question and do not give medical advice.",
        emotion, tone
    )
}

pub fn prompt(prompt_type: PromptType, emotion: Option<Emotion>) -> String {
    let moment = match prompt_type {
        PromptType::Morning => "for the start of the day".to_string(),
        PromptType::Afternoon => "for the middle of the day".to_string(),
        PromptType::Evening => "for reflecting at the end of the day".to_string(),
        PromptType::EmotionBased => format!(
            "for someone who is currently feeling {}",
            emotion.unwrap_or_default()
        ),
    };
    format!(
        "You write journaling prompts for a diary app. Write one short, warm, open-ended question {}. \
         Answer with the question only, without quotes or explanations.",
        moment
    )
}

pub const PROMPT_USER_CONTENT: &str = "Give me today's journaling prompt.";
