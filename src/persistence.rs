use serde::{Serialize, Deserialize};
use ndarray::{Array2, Dimension};
use std::fs::File;
use std::io::{Write, Read};
use std::path::Path;
use thiserror::Error;

use crate::layers::linear::LinearLayer;
use crate::layers::lstm_cell::LSTMCell;
use crate::models::lstm_network::LSTMNetwork;
use crate::models::regressor::SequenceRegressor;

/// Serializable version of Array2<f64> for persistence
#[derive(Serialize, Deserialize)]
struct SerializableArray2 {
    data: Vec<f64>,
    shape: (usize, usize),
}

impl From<&Array2<f64>> for SerializableArray2 {
    fn from(array: &Array2<f64>) -> Self {
        Self {
            data: array.iter().cloned().collect(),
            shape: array.raw_dim().into_pattern(),
        }
    }
}

impl TryFrom<SerializableArray2> for Array2<f64> {
    type Error = PersistenceError;

    fn try_from(array: SerializableArray2) -> Result<Self, Self::Error> {
        Array2::from_shape_vec(array.shape, array.data)
            .map_err(|e| PersistenceError::InvalidModel(format!("array shape {:?}: {}", array.shape, e)))
    }
}

/// Serializable LSTM cell parameters
#[derive(Serialize, Deserialize)]
pub struct SerializableLSTMCell {
    w_ih: SerializableArray2,
    w_hh: SerializableArray2,
    b_ih: SerializableArray2,
    b_hh: SerializableArray2,
    hidden_size: usize,
}

impl From<&LSTMCell> for SerializableLSTMCell {
    fn from(cell: &LSTMCell) -> Self {
        Self {
            w_ih: (&cell.w_ih).into(),
            w_hh: (&cell.w_hh).into(),
            b_ih: (&cell.b_ih).into(),
            b_hh: (&cell.b_hh).into(),
            hidden_size: cell.hidden_size,
        }
    }
}

impl TryFrom<SerializableLSTMCell> for LSTMCell {
    type Error = PersistenceError;

    fn try_from(cell: SerializableLSTMCell) -> Result<Self, Self::Error> {
        Ok(LSTMCell {
            w_ih: cell.w_ih.try_into()?,
            w_hh: cell.w_hh.try_into()?,
            b_ih: cell.b_ih.try_into()?,
            b_hh: cell.b_hh.try_into()?,
            hidden_size: cell.hidden_size,
        })
    }
}

/// Serializable sequence regressor: LSTM stack plus dense head
#[derive(Serialize, Deserialize)]
pub struct SerializableRegressor {
    cells: Vec<SerializableLSTMCell>,
    input_size: usize,
    hidden_size: usize,
    num_layers: usize,
    head_weight: SerializableArray2,
    head_bias: SerializableArray2,
    time_step: Option<usize>,
}

impl From<&SequenceRegressor> for SerializableRegressor {
    fn from(model: &SequenceRegressor) -> Self {
        Self {
            cells: model.network.get_cells().iter().map(|cell| cell.into()).collect(),
            input_size: model.network.input_size,
            hidden_size: model.network.hidden_size,
            num_layers: model.network.num_layers,
            head_weight: (&model.head.weight).into(),
            head_bias: (&model.head.bias).into(),
            time_step: model.time_step,
        }
    }
}

impl TryFrom<SerializableRegressor> for SequenceRegressor {
    type Error = PersistenceError;

    fn try_from(model: SerializableRegressor) -> Result<Self, Self::Error> {
        let cells = model
            .cells
            .into_iter()
            .map(LSTMCell::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let network = LSTMNetwork::from_cells(cells, model.input_size, model.hidden_size, model.num_layers);
        let head = LinearLayer::from_weights(model.head_weight.try_into()?, model.head_bias.try_into()?)
            .map_err(PersistenceError::InvalidModel)?;

        SequenceRegressor::from_parts(network, head, model.time_step).map_err(PersistenceError::InvalidModel)
    }
}

/// Descriptive information stored alongside the weights
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ModelMetadata {
    pub model_name: String,
    pub version: String,
    pub created_at: String,
    pub time_step: Option<usize>,
    pub hidden_size: usize,
    pub num_layers: usize,
    pub description: Option<String>,
}

impl ModelMetadata {
    /// Metadata describing `model`, stamped with the crate version and current time
    pub fn for_model(model: &SequenceRegressor, model_name: impl Into<String>, description: Option<String>) -> Self {
        ModelMetadata {
            model_name: model_name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            time_step: model.time_step,
            hidden_size: model.network.hidden_size,
            num_layers: model.network.num_layers,
            description,
        }
    }
}

/// Complete saved model including network and metadata
#[derive(Serialize, Deserialize)]
pub struct SavedModel {
    pub model: SerializableRegressor,
    pub metadata: ModelMetadata,
}

/// Errors that can occur during model persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Invalid model: {0}")]
    InvalidModel(String),
}

impl From<serde_json::Error> for PersistenceError {
    fn from(error: serde_json::Error) -> Self {
        PersistenceError::SerializationError(error.to_string())
    }
}

impl From<bincode::Error> for PersistenceError {
    fn from(error: bincode::Error) -> Self {
        PersistenceError::SerializationError(error.to_string())
    }
}

/// Model persistence operations
pub struct ModelPersistence;

impl ModelPersistence {
    /// Save model to JSON format (human-readable)
    pub fn save_to_json<P: AsRef<Path>>(
        model: &SavedModel,
        path: P,
    ) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(model)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Load model from JSON format
    pub fn load_from_json<P: AsRef<Path>>(
        path: P,
    ) -> Result<SavedModel, PersistenceError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let model = serde_json::from_str(&contents)?;
        Ok(model)
    }

    /// Save model to binary format (compact and fast)
    pub fn save_to_binary<P: AsRef<Path>>(
        model: &SavedModel,
        path: P,
    ) -> Result<(), PersistenceError> {
        let encoded = bincode::serialize(model)?;
        let mut file = File::create(path)?;
        file.write_all(&encoded)?;
        Ok(())
    }

    /// Load model from binary format
    pub fn load_from_binary<P: AsRef<Path>>(
        path: P,
    ) -> Result<SavedModel, PersistenceError> {
        let mut file = File::open(path)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        let model = bincode::deserialize(&contents)?;
        Ok(model)
    }
}

fn is_json<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().extension().and_then(|s| s.to_str()) == Some("json")
}

/// Convenience trait for easy model saving/loading
pub trait PersistentModel {
    /// Save model to file (`.json` is JSON, anything else is bincode)
    fn save<P: AsRef<Path>>(&self, path: P, metadata: ModelMetadata) -> Result<(), PersistenceError>;

    /// Load model from file (format determined by file extension)
    fn load<P: AsRef<Path>>(path: P) -> Result<(Self, ModelMetadata), PersistenceError>
    where
        Self: Sized;
}

impl PersistentModel for SequenceRegressor {
    fn save<P: AsRef<Path>>(&self, path: P, metadata: ModelMetadata) -> Result<(), PersistenceError> {
        let saved_model = SavedModel {
            model: self.into(),
            metadata,
        };

        if is_json(&path) {
            ModelPersistence::save_to_json(&saved_model, path)
        } else {
            ModelPersistence::save_to_binary(&saved_model, path)
        }
    }

    fn load<P: AsRef<Path>>(path: P) -> Result<(Self, ModelMetadata), PersistenceError> {
        let saved_model = if is_json(&path) {
            ModelPersistence::load_from_json(path)?
        } else {
            ModelPersistence::load_from_binary(path)?
        };

        Ok((saved_model.model.try_into()?, saved_model.metadata))
    }
}
