use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Catalog entry for a model reachable through OpenRouter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub key: &'static str,
    /// Provider-qualified id sent in the request.
    pub name: &'static str,
    pub max_context_tokens: usize,
    pub max_output_tokens: usize,
    pub description: &'static str,
}

/// Model used when nothing else is requested, and by auto-selection for small prompts.
pub const DEFAULT_MODEL_KEY: &str = "claude-3.5-sonnet";

/// Model auto-selection switches to for large prompts.
pub const HIGH_CAPACITY_MODEL_KEY: &str = "gemini-2.0-flash";

/// Estimated input tokens above which auto-selection picks the high-capacity model.
///
/// A tuning knob, not derived from any model's limits.
pub const AUTO_SELECT_THRESHOLD_TOKENS: usize = 150_000;

const MODEL_CATALOG: &[ModelDescriptor] = &[
    ModelDescriptor {
        key: "claude-3.5-sonnet",
        name: "anthropic/claude-3.5-sonnet",
        max_context_tokens: 200_000,
        max_output_tokens: 16_000,
        description: "Fast, high quality (200K context)",
    },
    ModelDescriptor {
        key: "claude-3.7-sonnet",
        name: "anthropic/claude-3.7-sonnet",
        max_context_tokens: 200_000,
        max_output_tokens: 16_000,
        description: "Claude 3.7 Sonnet (200K context)",
    },
    ModelDescriptor {
        key: "claude-sonnet-4",
        name: "anthropic/claude-sonnet-4",
        max_context_tokens: 200_000,
        max_output_tokens: 16_000,
        description: "Claude Sonnet 4 (200K context)",
    },
    ModelDescriptor {
        key: "gemini-2.0-flash",
        name: "google/gemini-2.0-flash-exp:free",
        max_context_tokens: 1_000_000,
        max_output_tokens: 64_000,
        description: "Gemini 2.0 Flash (1M context, free tier)",
    },
    ModelDescriptor {
        key: "gemini-2.0-flash-thinking",
        name: "google/gemini-2.0-flash-thinking-exp:free",
        max_context_tokens: 1_000_000,
        max_output_tokens: 64_000,
        description: "Gemini 2.0 Flash thinking mode (1M context, free tier)",
    },
    ModelDescriptor {
        key: "gemini-exp-1206",
        name: "google/gemini-exp-1206:free",
        max_context_tokens: 2_000_000,
        max_output_tokens: 64_000,
        description: "Gemini experimental 1206 (2M context, free tier)",
    },
    ModelDescriptor {
        key: "gemini-2.5-pro",
        name: "google/gemini-2.5-pro-exp-0827:free",
        max_context_tokens: 2_000_000,
        max_output_tokens: 64_000,
        description: "Gemini 2.5 Pro experimental (2M context, free tier)",
    },
    ModelDescriptor {
        key: "grok-2",
        name: "x-ai/grok-2-1212",
        max_context_tokens: 131_072,
        max_output_tokens: 32_768,
        description: "Grok 2 (131K context)",
    },
    ModelDescriptor {
        key: "grok-vision",
        name: "x-ai/grok-2-vision-1212",
        max_context_tokens: 32_768,
        max_output_tokens: 16_384,
        description: "Grok 2 Vision (32K context)",
    },
    ModelDescriptor {
        key: "deepseek-chat",
        name: "deepseek/deepseek-chat",
        max_context_tokens: 64_000,
        max_output_tokens: 8_000,
        description: "DeepSeek Chat (64K context, fast)",
    },
];

/// The static model catalog, in display order.
pub fn catalog() -> &'static [ModelDescriptor] {
    MODEL_CATALOG
}

fn available_keys() -> String {
    MODEL_CATALOG
        .iter()
        .map(|m| m.key)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Exact catalog lookup; unknown keys are a configuration error.
pub fn lookup(key: &str) -> Result<&'static ModelDescriptor> {
    MODEL_CATALOG
        .iter()
        .find(|m| m.key == key)
        .ok_or_else(|| AnalysisError::UnknownModel {
            key: key.to_string(),
            available: available_keys(),
        })
}

/// Resolve a catalog key, or failing that a provider model name.
///
/// Provider names match with or without their `:variant` suffix, so
/// `google/gemini-2.0-flash-exp` finds the `gemini-2.0-flash` entry.
pub fn resolve(key_or_name: &str) -> Result<&'static ModelDescriptor> {
    lookup(key_or_name).or_else(|err| {
        MODEL_CATALOG
            .iter()
            .find(|m| {
                m.name == key_or_name
                    || m.name.split_once(':').map(|(base, _)| base) == Some(key_or_name)
            })
            .ok_or(err)
    })
}

/// How the operator asked for a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "key")]
pub enum ModelChoice {
    /// Pick by estimated prompt size.
    Auto,
    /// Use this catalog key.
    Manual(String),
}

impl Default for ModelChoice {
    fn default() -> Self {
        ModelChoice::Manual(DEFAULT_MODEL_KEY.to_string())
    }
}

/// Two-bucket size rule: strictly above the threshold goes to the high-capacity model.
pub fn auto_select(estimated_input_tokens: usize) -> &'static ModelDescriptor {
    let key = if estimated_input_tokens > AUTO_SELECT_THRESHOLD_TOKENS {
        HIGH_CAPACITY_MODEL_KEY
    } else {
        DEFAULT_MODEL_KEY
    };
    MODEL_CATALOG
        .iter()
        .find(|m| m.key == key)
        .unwrap_or(&MODEL_CATALOG[0])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSelection {
    pub model: &'static ModelDescriptor,
    pub estimated_input_tokens: usize,
    /// Estimated input plus the full output reservation.
    pub total_tokens: usize,
    pub auto_selected: bool,
    /// Large prompt sent to a model other than the high-capacity one.
    pub large_input_advisory: bool,
}

/// Fail when input plus reserved output cannot fit the model's context window.
pub fn check_context_fit(model: &ModelDescriptor, estimated_input_tokens: usize) -> Result<usize> {
    let total = estimated_input_tokens + model.max_output_tokens;
    if total > model.max_context_tokens {
        return Err(AnalysisError::ContextWindowExceeded {
            model: model.name.to_string(),
            required: total,
            limit: model.max_context_tokens,
            deficit: total - model.max_context_tokens,
        });
    }
    Ok(total)
}

/// Resolve the model for a prompt of the given size and verify it fits.
pub fn select_model(estimated_input_tokens: usize, choice: &ModelChoice) -> Result<ModelSelection> {
    let (model, auto_selected) = match choice {
        ModelChoice::Auto => (auto_select(estimated_input_tokens), true),
        ModelChoice::Manual(key) => (lookup(key)?, false),
    };
    let total_tokens = check_context_fit(model, estimated_input_tokens)?;
    Ok(ModelSelection {
        model,
        estimated_input_tokens,
        total_tokens,
        auto_selected,
        large_input_advisory: estimated_input_tokens > AUTO_SELECT_THRESHOLD_TOKENS
            && model.key != HIGH_CAPACITY_MODEL_KEY,
    })
}

/// API usage information returned by the provider.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
    /// Cost in USD as reported by the provider (`total_cost`).
    #[serde(default, alias = "total_cost")]
    pub cost: Option<f64>,
}
