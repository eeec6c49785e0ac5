//! 지표 계산 및 모델 적합/예측 속성 테스트.

use chrono::{Duration, NaiveDate};
use equity_analytics::{enrich, ForecastModelManager};
use equity_core::{CanonicalRecord, MonthLocale};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn records_from(cases: &[(i64, Option<u32>, Option<u32>)]) -> Vec<CanonicalRecord> {
    let base = NaiveDate::from_ymd_opt(2022, 12, 1).unwrap();
    cases
        .iter()
        .map(|(offset, open_cents, close_cents)| {
            let mut record = CanonicalRecord::new(base + Duration::days(*offset));
            record.open = open_cents.map(|c| Decimal::new(c as i64, 2));
            record.close = close_cents.map(|c| Decimal::new(c as i64, 2));
            record
        })
        .collect()
}

fn record_cases() -> impl Strategy<Value = Vec<(i64, Option<u32>, Option<u32>)>> {
    prop::collection::vec(
        (
            0i64..90,
            prop::option::weighted(0.9, 0u32..200_000),
            prop::option::weighted(0.9, 1u32..200_000),
        ),
        1..40,
    )
}

proptest! {
    #[test]
    fn enriched_output_is_ordered_and_complete(cases in record_cases()) {
        let records = records_from(&cases);
        let enriched = enrich(&records, MonthLocale::Spanish);

        prop_assert_eq!(enriched.len(), records.len());
        prop_assert!(enriched.windows(2).all(|w| w[0].date() <= w[1].date()));
    }

    #[test]
    fn enrichment_is_deterministic(cases in record_cases()) {
        let records = records_from(&cases);
        let first = enrich(&records, MonthLocale::English);
        let second = enrich(&records, MonthLocale::English);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn first_records_have_zero_fill(cases in record_cases()) {
        let enriched = enrich(&records_from(&cases), MonthLocale::Spanish);

        prop_assert_eq!(enriched[0].daily_return, 0.0);
        prop_assert_eq!(enriched[0].cumulative_return, 0.0);
        for row in enriched.iter().take(4) {
            prop_assert_eq!(row.moving_average_5d, 0.0);
            prop_assert_eq!(row.volatility_5d, 0.0);
        }
    }

    #[test]
    fn cumulative_return_matches_product(cases in record_cases()) {
        let enriched = enrich(&records_from(&cases), MonthLocale::Spanish);

        let mut growth = 1.0;
        for row in &enriched {
            growth *= 1.0 + row.daily_return;
            let expected = growth - 1.0;
            prop_assert!((row.cumulative_return - expected).abs() <= 1e-9 * (1.0 + expected.abs()));
        }
    }
}

/// 균등 잡음 증분으로 만든 가격 시계열 (수준 300, 스텝당 ±5).
fn random_walk(increments: &[f64]) -> Vec<f64> {
    let mut level = 300.0;
    increments
        .iter()
        .map(|step| {
            level += step;
            level
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn noisy_walk_fits_and_forecasts_exact_length(
        increments in prop::collection::vec(-5.0f64..5.0, 50..1500),
        steps in 0usize..20,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = ForecastModelManager::new(dir.path().join("arima_model.json"));
        let series = random_walk(&increments);

        prop_assert!(manager.fit(&series));
        let forecast = manager.forecast(steps);
        prop_assert_eq!(forecast.len(), steps);
        prop_assert!(forecast.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn short_series_forecast_has_exact_length(steps in 0usize..20, n in 3usize..30) {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = ForecastModelManager::new(dir.path().join("arima_model.json"));
        let series: Vec<f64> = (0..n).map(|i| 50.0 + (i as f64 * 0.7).sin() * 3.0 + i as f64 * 0.2).collect();

        prop_assert!(manager.fit(&series));
        prop_assert_eq!(manager.forecast(steps).len(), steps);
    }
}
