use std::fs;

use lstm_forecast::{
    persistence::{ModelMetadata, ModelPersistence, PersistentModel, SavedModel},
    ForecastError, Forecaster, InputShape, PersistenceError, Predictor, SequenceRegressor,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::tempdir;

fn sample_window() -> Vec<f64> {
    (0..20).map(|i| i as f64 / 20.0).collect()
}

#[test]
fn test_model_metadata_creation() {
    let metadata = ModelMetadata {
        model_name: "test_model".to_string(),
        version: "0.1.0".to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        time_step: Some(100),
        hidden_size: 50,
        num_layers: 2,
        description: Some("Test model for validation".to_string()),
    };

    assert_eq!(metadata.model_name, "test_model");
    assert_eq!(metadata.time_step, Some(100));
    assert_eq!(metadata.hidden_size, 50);
    assert_eq!(metadata.num_layers, 2);
}

#[test]
fn test_regressor_save_load_json() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("model.json");

    let model = SequenceRegressor::new_using(6, 2, Some(20), &mut StdRng::seed_from_u64(42));
    let before = model.predict_slice(&sample_window());

    let metadata = ModelMetadata::for_model(&model, "json_model", Some("JSON persistence".to_string()));
    model.save(&file_path, metadata).unwrap();
    assert!(file_path.exists());

    // Human-readable format
    let text = fs::read_to_string(&file_path).unwrap();
    assert!(text.contains("\"json_model\""));

    let (loaded, loaded_metadata) = SequenceRegressor::load(&file_path).unwrap();
    assert_eq!(loaded_metadata.model_name, "json_model");
    assert_eq!(loaded_metadata.hidden_size, 6);
    assert_eq!(loaded.input_shape(), InputShape::fixed(20));
    assert_eq!(loaded.network.num_layers, 2);

    let after = loaded.predict_slice(&sample_window());
    assert!((before - after).abs() < 1e-12, "loaded model output differs: {} vs {}", before, after);
}

#[test]
fn test_regressor_save_load_binary() {
    let dir = tempdir().unwrap();

    for name in ["model.bin", "model.model", "model"] {
        let file_path = dir.path().join(name);
        let model = SequenceRegressor::new(4, 1, None);
        let before = model.predict_slice(&sample_window());

        model.save(&file_path, ModelMetadata::for_model(&model, name, None)).unwrap();
        let (loaded, metadata) = SequenceRegressor::load(&file_path).unwrap();

        assert_eq!(metadata.model_name, name);
        assert_eq!(metadata.time_step, None);
        assert_eq!(loaded.predict_slice(&sample_window()), before);
    }
}

#[test]
fn test_json_and_binary_agree() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("m.json");
    let bin_path = dir.path().join("m.bin");

    let model = SequenceRegressor::new(5, 3, Some(20));
    let metadata = ModelMetadata::for_model(&model, "both", None);
    model.save(&json_path, metadata.clone()).unwrap();
    model.save(&bin_path, metadata).unwrap();

    let (from_json, _) = SequenceRegressor::load(&json_path).unwrap();
    let (from_bin, _) = SequenceRegressor::load(&bin_path).unwrap();

    let diff = (from_json.predict_slice(&sample_window()) - from_bin.predict_slice(&sample_window())).abs();
    assert!(diff < 1e-10, "JSON and binary models disagree by {}", diff);
    assert!(fs::metadata(&bin_path).unwrap().len() < fs::metadata(&json_path).unwrap().len());
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let result = SequenceRegressor::load(dir.path().join("absent.json"));
    assert!(matches!(result, Err(PersistenceError::IoError(_))));

    let result = Forecaster::from_model_file(dir.path().join("absent.bin"));
    assert!(matches!(result, Err(ForecastError::ModelLoad(PersistenceError::IoError(_)))));
}

#[test]
fn test_load_corrupt_file() {
    let dir = tempdir().unwrap();

    let json_path = dir.path().join("corrupt.json");
    fs::write(&json_path, "{ \"model\": ").unwrap();
    assert!(matches!(
        SequenceRegressor::load(&json_path),
        Err(PersistenceError::SerializationError(_))
    ));

    let bin_path = dir.path().join("corrupt.bin");
    fs::write(&bin_path, [1u8, 2, 3]).unwrap();
    assert!(matches!(
        SequenceRegressor::load(&bin_path),
        Err(PersistenceError::SerializationError(_))
    ));
}

#[test]
fn test_load_incompatible_model() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("wide.json");

    // Save a valid model, then edit the JSON so the head no longer fits the LSTM
    let model = SequenceRegressor::new(4, 1, Some(10));
    model.save(&file_path, ModelMetadata::for_model(&model, "wide", None)).unwrap();

    let mut saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&file_path).unwrap()).unwrap();
    saved["model"]["head_weight"] = serde_json::json!({ "data": [0.1, 0.2, 0.3], "shape": [1, 3] });
    fs::write(&file_path, serde_json::to_string(&saved).unwrap()).unwrap();

    let result = Forecaster::from_model_file(&file_path);
    assert!(matches!(result, Err(ForecastError::ModelLoad(PersistenceError::InvalidModel(_)))));
}

#[test]
fn test_model_persistence_low_level_api() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("low_level.json");

    let model = SequenceRegressor::new(3, 1, Some(8));
    let saved = SavedModel {
        model: (&model).into(),
        metadata: ModelMetadata::for_model(&model, "low_level", None),
    };
    ModelPersistence::save_to_json(&saved, &file_path).unwrap();

    let loaded = ModelPersistence::load_from_json(&file_path).unwrap();
    assert_eq!(loaded.metadata.model_name, "low_level");
    assert_eq!(loaded.metadata.time_step, Some(8));
}

#[test]
fn test_load_overflowing_hidden_size() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("huge.json");

    let model = SequenceRegressor::new(4, 1, Some(10));
    model.save(&file_path, ModelMetadata::for_model(&model, "huge", None)).unwrap();

    // 4 * 2^62 gates does not fit in usize
    let huge = 1u64 << 62;
    let mut saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&file_path).unwrap()).unwrap();
    saved["model"]["hidden_size"] = serde_json::json!(huge);
    saved["model"]["cells"][0]["hidden_size"] = serde_json::json!(huge);
    fs::write(&file_path, serde_json::to_string(&saved).unwrap()).unwrap();

    assert!(matches!(
        SequenceRegressor::load(&file_path),
        Err(PersistenceError::InvalidModel(_))
    ));
    let result = Forecaster::from_model_file(&file_path);
    assert!(matches!(result, Err(ForecastError::ModelLoad(PersistenceError::InvalidModel(_)))));
}
