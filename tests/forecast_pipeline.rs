use cotton_forecast::application::forecasting::{ForecastEngine, TrainingSettings, trainer};
use cotton_forecast::domain::errors::ForecastError;
use cotton_forecast::domain::forecasting::{
    ModelKind, historical_rmse, predict_next, prepare_windows,
};

const SCENARIO: [f64; 12] = [
    10.0, 12.0, 11.0, 13.0, 15.0, 14.0, 16.0, 18.0, 17.0, 19.0, 20.0, 21.0,
];

fn small_networks() -> TrainingSettings {
    TrainingSettings {
        lstm_units: 8,
        mlp_layers: vec![16, 8],
        ..TrainingSettings::default()
    }
}

fn seasonal_series(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            130.0 + t * 0.15 + (t * 0.45).sin() * 8.0 + (t * 1.7).cos() * 2.0
        })
        .collect()
}

#[test]
fn test_scenario_yields_two_training_samples() {
    let (dataset, normalizer) = prepare_windows(&SCENARIO, 10).unwrap();

    assert_eq!(dataset.len(), 2);
    assert!(dataset.inputs.iter().all(|w| w.len() == 10));
    assert_eq!(normalizer.min(), 10.0);
    assert_eq!(normalizer.max(), 21.0);
    // Targets are the 11th and 12th prices, scaled
    assert!((normalizer.inverse(dataset.targets[0]) - 20.0).abs() < 1e-9);
    assert!((normalizer.inverse(dataset.targets[1]) - 21.0).abs() < 1e-9);
}

#[test]
fn test_scenario_linear_fit_is_bit_identical() {
    let run = || {
        let (dataset, normalizer) = prepare_windows(&SCENARIO, 10).unwrap();
        let model = trainer::fit(
            ModelKind::Linear,
            &dataset.inputs,
            &dataset.targets,
            &TrainingSettings::default(),
        )
        .unwrap();
        let rmse =
            historical_rmse(model.as_ref(), &normalizer, &dataset.inputs, &dataset.targets)
                .unwrap();
        let next = predict_next(model.as_ref(), &normalizer, &SCENARIO, 10).unwrap();
        (rmse, next)
    };

    let (rmse_a, next_a) = run();
    let (rmse_b, next_b) = run();

    assert_eq!(rmse_a.to_bits(), rmse_b.to_bits());
    assert_eq!(next_a.to_bits(), next_b.to_bits());
    // Two windows, eleven parameters: the fit interpolates
    assert!(rmse_a < 1e-9);
    assert!(next_a.is_finite());
}

#[test]
fn test_scenario_full_engine_runs() {
    let bundle = ForecastEngine::new(small_networks().with_seed(3))
        .initialize(&SCENARIO)
        .unwrap();

    assert_eq!(bundle.training_samples, 2);
    for forecast in &bundle.forecasts {
        assert!(forecast.next_price.is_finite(), "{}", forecast.kind);
        assert!(forecast.in_sample_rmse >= 0.0);
    }
}

#[test]
fn test_identical_prices_are_degenerate() {
    let flat = [15.0; 12];

    assert_eq!(
        prepare_windows(&flat, 10).unwrap_err(),
        ForecastError::DegenerateSeries { value: 15.0 }
    );
    assert!(matches!(
        ForecastEngine::new(TrainingSettings::default()).initialize(&flat),
        Err(ForecastError::DegenerateSeries { .. })
    ));
}

#[test]
fn test_series_no_longer_than_window_is_insufficient() {
    let err = ForecastEngine::new(TrainingSettings::default())
        .initialize(&SCENARIO[..10])
        .unwrap_err();
    assert_eq!(err, ForecastError::InsufficientData { len: 10, window: 10 });
}

#[test]
fn test_every_model_forecasts_a_finite_price() {
    let series = seasonal_series(80);
    let bundle = ForecastEngine::new(small_networks().with_seed(11))
        .initialize(&series)
        .unwrap();

    assert_eq!(bundle.training_samples, 70);
    for kind in ModelKind::ALL {
        let forecast = bundle.forecast(kind).unwrap();
        assert!(forecast.next_price.is_finite());
        assert!(forecast.in_sample_rmse.is_finite() && forecast.in_sample_rmse > 0.0);
        // Loose plausibility band around the observed range
        assert!(forecast.next_price > 0.0 && forecast.next_price < 400.0);
    }
}

#[test]
fn test_seeded_networks_are_reproducible() {
    let series = seasonal_series(40);
    let settings = small_networks().with_seed(2024);

    let a = ForecastEngine::new(settings.clone()).initialize(&series).unwrap();
    let b = ForecastEngine::new(settings).initialize(&series).unwrap();

    for kind in ModelKind::ALL {
        let (fa, fb) = (a.forecast(kind).unwrap(), b.forecast(kind).unwrap());
        assert_eq!(fa.next_price.to_bits(), fb.next_price.to_bits(), "{}", kind);
        assert_eq!(fa.in_sample_rmse.to_bits(), fb.in_sample_rmse.to_bits());
    }
}

#[test]
fn test_best_model_has_lowest_rmse() {
    let series = seasonal_series(60);
    let bundle = ForecastEngine::new(small_networks().with_seed(5))
        .initialize(&series)
        .unwrap();

    let best = bundle.best_model().unwrap();
    assert!(
        bundle
            .forecasts
            .iter()
            .all(|f| best.in_sample_rmse <= f.in_sample_rmse)
    );
}
