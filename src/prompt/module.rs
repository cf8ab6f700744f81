//! Use-case modules binding a template to an editor slot

use std::collections::HashMap;

use super::prepared::{generate_prompt, Prompt};
use super::templates::{TranslateValues, TRANSLATION};
use crate::ai::models::ModelName;
use crate::errors::PromptError;

/// A named use case: which template renders against which editor slot
#[derive(Debug, Clone)]
pub struct Module {
    pub name: &'static str,
    pub default_template: &'static str,
    /// Expected output size relative to the input token count
    pub output_token_scale_factor: f64,
    pub default_model: ModelName,
    defaults: fn() -> HashMap<String, String>,
}

impl Module {
    /// Editor slot the module's content lives in
    pub fn slot(&self) -> &'static str {
        self.name
    }

    /// Default prompt values, without `CONTENT`
    pub fn default_values(&self) -> HashMap<String, String> {
        (self.defaults)()
    }

    /// Assemble the value map for a recompute.
    ///
    /// `CONTENT` comes from the editor; module defaults and then `overrides`
    /// are layered on top of it, later layers winning.
    pub fn values(
        &self,
        editor_content: &str,
        overrides: &HashMap<String, String>,
    ) -> HashMap<String, String> {
        let mut values = HashMap::from([("CONTENT".to_string(), editor_content.to_string())]);
        values.extend(self.default_values());
        values.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        values
    }

    /// Render `template` (or the module default) against the editor content
    pub fn prepare(
        &self,
        template: Option<&str>,
        editor_content: &str,
        overrides: &HashMap<String, String>,
        model: ModelName,
        output_scale: Option<f64>,
    ) -> Prompt {
        generate_prompt(
            template.unwrap_or(self.default_template),
            &self.values(editor_content, overrides),
            model,
            output_scale.unwrap_or(self.output_token_scale_factor),
        )
    }
}

pub const MODULES: &[Module] = &[Module {
    name: "translation",
    default_template: TRANSLATION,
    // A translation is about as long as its source
    output_token_scale_factor: 1.0,
    default_model: ModelName::Gpt4o,
    defaults: translation_defaults,
}];

fn translation_defaults() -> HashMap<String, String> {
    TranslateValues::default().into_map()
}

/// Look up a module by name
pub fn module(name: &str) -> Result<&'static Module, PromptError> {
    MODULES
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| PromptError::UnknownModule(name.to_string()))
}

/// Parse `KEY=VALUE` arguments into a value map
pub fn parse_values(pairs: &[String]) -> Result<HashMap<String, String>, PromptError> {
    pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| PromptError::InvalidValue(pair.clone()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(PromptError::InvalidValue(pair.clone()));
            }
            Ok((key.to_ascii_uppercase(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(module("translation").unwrap().slot(), "translation");
        assert_eq!(module("Translation").unwrap().name, "translation");
        assert!(matches!(module("summary"), Err(PromptError::UnknownModule(_))));
    }

    #[test]
    fn test_values_layering() {
        let module = module("translation").unwrap();
        let overrides = HashMap::from([("TARGET_LANGUAGE".to_string(), "German".to_string())]);

        let values = module.values("Hello", &overrides);
        assert_eq!(values["CONTENT"], "Hello");
        assert_eq!(values["TARGET_LANGUAGE"], "German");
        assert_eq!(values["TONE"], "neutral");
    }

    #[test]
    fn test_overrides_can_replace_content() {
        let module = module("translation").unwrap();
        let overrides = HashMap::from([("CONTENT".to_string(), "other".to_string())]);
        assert_eq!(module.values("editor", &overrides)["CONTENT"], "other");
    }

    #[test]
    fn test_prepare_uses_module_defaults() {
        let module = module("translation").unwrap();
        let prompt = module.prepare(None, "Bonjour", &HashMap::new(), module.default_model, None);

        assert!(prompt.text.ends_with("Bonjour"));
        assert_eq!(prompt.original, TRANSLATION);
        assert_eq!(prompt.estimated_output_tokens, prompt.estimated_input_tokens);
    }

    #[test]
    fn test_prepare_with_custom_template() {
        let module = module("translation").unwrap();
        let prompt = module.prepare(
            Some("Summarize: {{CONTENT}}"),
            "text",
            &HashMap::new(),
            ModelName::PerplexitySonar,
            Some(0.5),
        );
        assert_eq!(prompt.text, "Summarize: text");
        assert_eq!(prompt.model, ModelName::PerplexitySonar);
    }

    #[test]
    fn test_parse_values() {
        let values = parse_values(&["tone=formal".to_string(), "X= a=b".to_string()]).unwrap();
        assert_eq!(values["TONE"], "formal");
        assert_eq!(values["X"], " a=b");

        assert!(parse_values(&["novalue".to_string()]).is_err());
        assert!(parse_values(&["=x".to_string()]).is_err());
    }
}
