use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents a model identifier on the completion service.
///
/// This can be a predefined model version or a custom string value for
/// models the service adds later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for future or private models)
    Custom(String),
}

/// Model versions the service is known to host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KnownModel {
    /// Mistral Large (latest version)
    MistralLargeLatest,

    /// Mistral Medium (latest version)
    MistralMediumLatest,

    /// Mistral Small (latest version)
    MistralSmallLatest,

    /// Llama 3.1 70B instruct
    #[serde(rename = "llama-3.1-70b-instruct")]
    Llama3170bInstruct,

    /// Llama 3.1 8B instruct
    #[serde(rename = "llama-3.1-8b-instruct")]
    Llama318bInstruct,
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{}", known_model),
            Model::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnownModel::MistralLargeLatest => write!(f, "mistral-large-latest"),
            KnownModel::MistralMediumLatest => write!(f, "mistral-medium-latest"),
            KnownModel::MistralSmallLatest => write!(f, "mistral-small-latest"),
            KnownModel::Llama3170bInstruct => write!(f, "llama-3.1-70b-instruct"),
            KnownModel::Llama318bInstruct => write!(f, "llama-3.1-8b-instruct"),
        }
    }
}

/// Error returned when parsing a model name that is not a known version.
#[derive(Debug)]
pub struct UnknownModelError {
    /// The string that did not match a known model version.
    pub invalid_value: String,
}

impl fmt::Display for UnknownModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown model: {}", self.invalid_value)
    }
}

impl std::error::Error for UnknownModelError {}

impl FromStr for Model {
    type Err = UnknownModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mistral-large-latest" => Ok(Model::Known(KnownModel::MistralLargeLatest)),
            "mistral-medium-latest" => Ok(Model::Known(KnownModel::MistralMediumLatest)),
            "mistral-small-latest" => Ok(Model::Known(KnownModel::MistralSmallLatest)),
            "llama-3.1-70b-instruct" => Ok(Model::Known(KnownModel::Llama3170bInstruct)),
            "llama-3.1-8b-instruct" => Ok(Model::Known(KnownModel::Llama318bInstruct)),
            _ => Err(UnknownModelError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Model::Custom(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::Custom(model.to_string())
    }
}
