//! Built-in prompt templates

use std::collections::HashMap;

/// Values filled into [`TRANSLATION`]
#[derive(Debug, Clone)]
pub struct TranslateValues {
    pub tone: String,
    pub audience: String,
    pub target_language: String,
    pub user_language: String,
    /// Left unset, `{{CUSTOM_INSTRUCTION}}` reaches the model as written
    pub custom_instruction: Option<String>,
}

impl Default for TranslateValues {
    fn default() -> Self {
        Self {
            tone: "neutral".to_string(),
            audience: "general".to_string(),
            target_language: "English".to_string(),
            user_language: "English".to_string(),
            custom_instruction: None,
        }
    }
}

impl TranslateValues {
    pub fn into_map(self) -> HashMap<String, String> {
        let mut map = HashMap::from([
            ("TONE".to_string(), self.tone),
            ("AUDIENCE".to_string(), self.audience),
            ("TARGET_LANGUAGE".to_string(), self.target_language),
            ("USER_LANGUAGE".to_string(), self.user_language),
        ]);
        if let Some(instruction) = self.custom_instruction {
            map.insert("CUSTOM_INSTRUCTION".to_string(), instruction);
        }
        map
    }
}

/// Translation prompt. Trailing spaces on two lines are part of the text.
pub const TRANSLATION: &str = r#"You are an expert simultaneous interpreter and a professionally trained translator.
Translate the following CONTENT into {{TARGET_LANGUAGE}}. 
The translation MUST be written for a {{AUDIENCE}} audience in a {{TONE}} tone.

RULES:
- IMPORTANT RULE: MUST {{CUSTOM_INSTRUCTION}}.
- response MUST NOT be wrapped in Markdown code formatting block ``` 
- Adjust grammar and sentence structure to sound best for the target language
- Keep common anglicisms and terms in English, if they are widely used in the target language.
- Translate using terms and phrases that are a perfect match for the AUDIENCE and CONTEXT.
- Language detection should respect transliterated text (e.g. "Sawatdee krap" for "สวัสดีครับ")
- Must format response as Markdown.
- Translate metaphors and idioms into the target language, matching meaning.
- Always translate pronouns and gender AS IS.
- Reformat numbers, currency and dates into target language standard format.
- If the message looks like a personal email, letter etc., translate it as such and use the correct salutation and closing for the tone.
- Make sure the spelling and grammar are correct.
- Must remove irrelevant links, such as share links, advertisements, icons, category or tag cloud links etc.
- MUST translate CONTENT into language: "{{TARGET_LANGUAGE}}".
END OF RULES.

CONTENT:
{{CONTENT}}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::template::{interpolate, placeholders, unresolved};

    #[test]
    fn test_translation_placeholders() {
        assert_eq!(
            placeholders(TRANSLATION),
            vec!["TARGET_LANGUAGE", "AUDIENCE", "TONE", "CUSTOM_INSTRUCTION", "CONTENT"]
        );
    }

    #[test]
    fn test_custom_instruction_passes_through_when_unset() {
        let mut values = TranslateValues::default().into_map();
        values.insert("CONTENT".to_string(), "Hallo Welt".to_string());

        let text = interpolate(TRANSLATION, &values);
        assert_eq!(unresolved(TRANSLATION, &values), vec!["CUSTOM_INSTRUCTION"]);
        assert!(text.contains("MUST {{CUSTOM_INSTRUCTION}}."));
        assert!(text.ends_with("CONTENT:\nHallo Welt"));
        assert!(text.contains("language: \"English\""));
    }

    #[test]
    fn test_template_keeps_trailing_spaces() {
        assert!(TRANSLATION.contains("into {{TARGET_LANGUAGE}}. \nThe translation"));
        assert!(TRANSLATION.contains("formatting block ``` \n- Adjust"));
    }

    #[test]
    fn test_custom_instruction_fills_when_set() {
        let values = TranslateValues {
            target_language: "German".to_string(),
            custom_instruction: Some("keep product names in English".to_string()),
            ..Default::default()
        }
        .into_map();

        let text = interpolate(TRANSLATION, &values);
        assert!(text.contains("MUST keep product names in English."));
        assert!(text.contains("into German."));
    }
}
