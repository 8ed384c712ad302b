use ndarray::array;
use sketchlearn::models::factory::build_model;
use sketchlearn::{Activation, Classifier, MlpConfig, ModelConfig, ModelError, TrainMethod};

#[test]
fn factory_builds_and_trains_both_presets() -> anyhow::Result<()> {
    let x = array![[0.0, 0.0], [1.0, 1.0], [5.0, 5.0], [6.0, 6.0]];
    let y = vec![0, 0, 1, 1];

    let mut svm = build_model("svm".parse::<ModelConfig>().unwrap());
    assert_eq!(svm.name(), "svm");
    svm.train(&x, &y)?;
    assert_eq!(svm.predict(&[0.1, 0.1])?, 0.0);

    let mut mlp = build_model("mlp".parse::<ModelConfig>().unwrap());
    assert_eq!(mlp.name(), "mlp");
    mlp.train(&x, &y)?;
    assert!(mlp.predict(&[0.1, 0.1])?.is_finite());
    Ok(())
}

#[test]
fn unknown_preset_is_rejected() {
    let err = "boosted-stumps".parse::<ModelConfig>().unwrap_err();
    assert!(err.contains("Unknown model type"));
}

#[test]
fn linear_mlp_learns_a_signed_boundary() -> anyhow::Result<()> {
    let x = array![[0.0, 0.0], [1.0, 1.0], [5.0, 5.0], [6.0, 6.0]];
    let y = vec![-1, -1, 1, 1];

    let config = MlpConfig {
        activation: Activation::Identity,
        neurons: 0,
        layers: 0,
        training: TrainMethod::rprop_defaults(),
        max_iter: 500,
        epsilon: 1e-6,
        seed: 11,
    };
    let mut mlp = build_model(ModelConfig::Mlp(config));
    mlp.train(&x, &y)?;

    assert!(mlp.predict(&[0.1, 0.1])? < 0.0);
    assert!(mlp.predict(&[5.9, 5.9])? > 0.0);
    assert_eq!(
        mlp.predict_scores(&[0.1, 0.1])?,
        vec![mlp.predict(&[0.1, 0.1])?]
    );
    Ok(())
}

#[test]
fn mlp_rejects_wrong_dimensionality_after_training() -> anyhow::Result<()> {
    let x = array![[0.0], [1.0]];
    let y = vec![-1, 1];
    let mut mlp = build_model(ModelConfig::Mlp(MlpConfig::default()));
    mlp.train(&x, &y)?;

    assert_eq!(
        mlp.predict(&[0.0, 1.0]),
        Err(ModelError::DimensionMismatch {
            expected: 1,
            got: 2
        })
    );
    Ok(())
}

#[test]
fn default_model_config_is_the_svm_preset() {
    assert_eq!(
        ModelConfig::default(),
        "svm".parse::<ModelConfig>().unwrap()
    );
}
