//! Prepared prompts with token and price estimates

use serde::Serialize;
use std::collections::HashMap;

use super::{template, tokens};
use crate::ai::models::ModelName;

/// A rendered prompt ready to be sent
///
/// Produced by [`generate_prompt`] on every recompute and never mutated
/// afterwards; the next recompute replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prompt {
    /// Template the prompt was rendered from
    pub original: String,
    /// Interpolated prompt text
    pub text: String,
    /// Token ids of `text`
    #[serde(skip_serializing)]
    pub encoded: Vec<u32>,
    pub model: ModelName,
    pub estimated_input_tokens: usize,
    pub estimated_output_tokens: usize,
    pub price_input: f64,
    pub price_output: f64,
    pub price: f64,
}

impl Prompt {
    /// Placeholder before the first recompute
    pub fn empty(original: &str, model: ModelName) -> Self {
        Self {
            original: original.to_string(),
            text: String::new(),
            encoded: Vec::new(),
            model,
            estimated_input_tokens: 0,
            estimated_output_tokens: 0,
            price_input: 0.0,
            price_output: 0.0,
            price: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn total_tokens(&self) -> usize {
        self.estimated_input_tokens
            .saturating_add(self.estimated_output_tokens)
    }

    /// Whether the estimate no longer fits the model's context window
    pub fn exceeds_context(&self) -> bool {
        self.total_tokens() > self.model.context_window()
    }

    /// One-line token and price summary
    pub fn summary(&self, locale: &str) -> String {
        format!(
            "Tokens: {} I/O ~{} ≈ {}",
            self.encoded.len(),
            self.estimated_output_tokens,
            format_price(self.price, locale)
        )
    }
}

/// Format a USD amount with two decimals and the locale's separator
pub fn format_price(price: f64, locale: &str) -> String {
    let amount = format!("{:.2}", price);
    if uses_decimal_comma(locale) {
        format!("${}", amount.replace('.', ","))
    } else {
        format!("${}", amount)
    }
}

fn uses_decimal_comma(locale: &str) -> bool {
    let lang = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(lang.as_str(), "de" | "fr" | "es" | "it" | "nl" | "pt")
}

/// Largest output scale factor applied to an estimate
pub const MAX_OUTPUT_SCALE: f64 = 100.0;

/// Interpolate `template` and estimate its cost on `model`.
///
/// Output tokens are estimated as the input token count scaled by
/// `output_scale`, clamped to `0..=MAX_OUTPUT_SCALE` (NaN counts as zero).
pub fn generate_prompt(
    original: &str,
    values: &HashMap<String, String>,
    model: ModelName,
    output_scale: f64,
) -> Prompt {
    let text = template::interpolate(original, values);
    let encoded = tokens::encode(&text);

    let input_tokens = encoded.len();
    let output_tokens = (input_tokens as f64 * clamp_scale(output_scale)).ceil() as usize;

    let price_input = input_tokens as f64 * model.input_price() / 1_000_000.0;
    let price_output = output_tokens as f64 * model.output_price() / 1_000_000.0;

    Prompt {
        original: original.to_string(),
        text,
        encoded,
        model,
        estimated_input_tokens: input_tokens,
        estimated_output_tokens: output_tokens,
        price_input,
        price_output,
        price: price_input + price_output,
    }
}

fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        0.0
    } else {
        scale.clamp(0.0, MAX_OUTPUT_SCALE)
    }
}
