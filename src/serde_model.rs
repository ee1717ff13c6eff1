//! JSON model serialization (feature: `serde`).
//!
//! The JSON document wraps a [`ModelSnapshot`] with a format version, so the file
//! format stays stable even if the in-memory network changes. Loading validates
//! the version, every shape, the activation/loss names, and that all parameters
//! are finite.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::linalg::Real;
use crate::model_file::ModelSnapshot;
use crate::network::NeuralNetwork;
use crate::{Error, Result};

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedModel<T> {
    pub format_version: u32,
    pub model: ModelSnapshot<T>,
}

impl<T: Real> SerializedModel<T> {
    pub fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::MalformedModel(format!(
                "unsupported model format_version {}; expected {}",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }
        self.model.validate()
    }
}

impl<T: Real> From<&NeuralNetwork<T>> for SerializedModel<T> {
    fn from(net: &NeuralNetwork<T>) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            model: ModelSnapshot::from(net),
        }
    }
}

impl<T: Real> TryFrom<SerializedModel<T>> for NeuralNetwork<T> {
    type Error = Error;

    fn try_from(value: SerializedModel<T>) -> std::result::Result<Self, Self::Error> {
        value.validate()?;
        value.model.try_into()
    }
}

impl<T: Real + Serialize + DeserializeOwned> NeuralNetwork<T> {
    /// Serialize the model to a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&SerializedModel::from(self))
            .map_err(|e| Error::MalformedModel(format!("failed to serialize model: {e}")))
    }

    /// Serialize the model to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(&SerializedModel::from(self))
            .map_err(|e| Error::MalformedModel(format!("failed to serialize model: {e}")))
    }

    /// Parse a model from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let ser: SerializedModel<T> = serde_json::from_str(s)
            .map_err(|e| Error::MalformedModel(format!("failed to parse model json: {e}")))?;
        ser.try_into()
    }

    /// Save the model to a JSON file (pretty-printed).
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let s = self.to_json_string_pretty()?;
        let p = path.as_ref();
        std::fs::write(p, s)
            .map_err(|e| Error::Io(format!("failed to write {}: {e}", p.display())))?;
        log::info!("saved model {:?} to {}", self.layers(), p.display());
        Ok(())
    }

    /// Load a model from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p)
            .map_err(|e| Error::Io(format!("failed to read {}: {e}", p.display())))?;
        let net = Self::from_json_str(&s)?;
        log::info!("loaded model {:?} from {}", net.layers(), p.display());
        Ok(net)
    }
}
