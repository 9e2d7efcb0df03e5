//! Integration tests for deferral-interval scheduling.

use geo_courier_sampler::{
    AccuracyTier, DEFAULT_DEFERRAL_INTERVAL_MS, SamplerConfig, scheduled_sample_times,
};

#[test]
fn sampler_scheduler_tests_default_interval_is_ten_seconds() {
    let config = SamplerConfig::default();
    assert_eq!(config.deferral_interval_ms, DEFAULT_DEFERRAL_INTERVAL_MS);
    assert_eq!(config.accuracy, AccuracyTier::BestForNavigation);

    let times = scheduled_sample_times(config, 1_000, 3);
    assert_eq!(times, vec![1_000, 11_000, 21_000]);
}

#[test]
fn sampler_scheduler_tests_rejects_zero_interval() {
    assert!(SamplerConfig::new(AccuracyTier::High, 0).is_err());
}
