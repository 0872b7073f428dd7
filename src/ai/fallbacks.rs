// Fixed answers used when the AI backend cannot be used

use crate::models::{ChatReply, Emotion, EmotionResult, PromptResult, PromptType};

pub const FALLBACK_CONFIDENCE: f64 = 0.5;

pub const FALLBACK_REPLY: &str =
    "Thank you for sharing that with me. I couldn't put together a proper reply just now, but I'm still here to listen.";

pub fn emotion() -> EmotionResult {
    EmotionResult {
        emotion: Emotion::Normal,
        confidence: FALLBACK_CONFIDENCE,
    }
}

pub fn reply() -> ChatReply {
    ChatReply {
        message: FALLBACK_REPLY.to_string(),
        followup_questions: Vec::new(),
    }
}

/// Prompts served when no API key is configured. No backend call is made.
pub fn offline_prompt(prompt_type: PromptType) -> PromptResult {
    let prompt = match prompt_type {
        PromptType::Morning => "Good morning! What is one thing you are looking forward to today?",
        PromptType::Afternoon => "How is your day going so far? Take a moment to note something that happened.",
        PromptType::Evening => "The day is winding down. What was the best moment of today?",
        PromptType::EmotionBased => "How are you feeling right now? Try putting it into a few words.",
    };
    PromptResult {
        prompt: prompt.to_string(),
        prompt_type,
    }
}

/// Prompts served when a key is configured but the backend call failed.
/// Kept apart from the offline table so the two modes stay distinguishable.
pub fn degraded_prompt(prompt_type: PromptType) -> PromptResult {
    let prompt = match prompt_type {
        PromptType::Morning => "A new day has started. How did you sleep, and how do you feel this morning?",
        PromptType::Afternoon => "Halfway through the day. What has been on your mind since this morning?",
        PromptType::Evening => "Looking back on today, what would you like to remember?",
        PromptType::EmotionBased => "What feeling has stayed with you the most today, and where did it come from?",
    };
    PromptResult {
        prompt: prompt.to_string(),
        prompt_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_cover_every_type_and_differ() {
        for prompt_type in PromptType::ALL {
            let offline = offline_prompt(prompt_type);
            let degraded = degraded_prompt(prompt_type);
            assert_eq!(offline.prompt_type, prompt_type);
            assert_eq!(degraded.prompt_type, prompt_type);
            assert!(!offline.prompt.is_empty());
            assert_ne!(offline.prompt, degraded.prompt);
        }
    }

    #[test]
    fn test_emotion_fallback() {
        assert_eq!(
            emotion(),
            EmotionResult {
                emotion: Emotion::Normal,
                confidence: 0.5
            }
        );
    }

    #[test]
    fn test_reply_fallback_has_no_followups() {
        let reply = reply();
        assert_eq!(reply.message, FALLBACK_REPLY);
        assert!(reply.followup_questions.is_empty());
    }
}
