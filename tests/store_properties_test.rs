//! Property tests for the bounded reading store and aggregation

mod common;

use chrono::{Duration, Utc};
use common::create_test_store;
use proptest::prelude::*;
use sinmam_core::aggregation::{category_tally, filtered_readings, windowed_average};
use sinmam_core::{Metric, Reading, RiskThresholds};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn eviction_keeps_latest_in_order(
        capacity in 1usize..20,
        pulses in prop::collection::vec(30u16..=250, 0..60),
    ) {
        let store = create_test_store(capacity);
        let (returned, retained) = tokio_test::block_on(async {
            let mut returned = Vec::new();
            for pulse in &pulses {
                returned.push(store.append(*pulse, None).await.unwrap());
            }
            (returned, store.read_all().await)
        });

        prop_assert_eq!(retained.len(), pulses.len().min(capacity));
        let start = pulses.len().saturating_sub(capacity);
        prop_assert_eq!(&retained[..], &returned[start..]);
    }

    #[test]
    fn ids_increase_by_one(pulses in prop::collection::vec(30u16..=250, 1..80)) {
        let store = create_test_store(5);
        let ids = tokio_test::block_on(async {
            let mut ids = Vec::new();
            for pulse in &pulses {
                ids.push(store.append(*pulse, None).await.unwrap().id);
            }
            ids
        });

        prop_assert_eq!(ids[0], 1);
        for pair in ids.windows(2) {
            prop_assert_eq!(pair[1], pair[0] + 1);
        }
    }

    #[test]
    fn risky_flag_matches_thresholds(pulse in 30u16..=250) {
        let store = create_test_store(5);
        let reading = tokio_test::block_on(store.append(pulse, None)).unwrap();
        prop_assert_eq!(reading.is_risky, pulse > 100 || pulse < 60);
    }

    #[test]
    fn windowed_average_matches_manual_mean(
        samples in prop::collection::vec((30u16..=250, 0i64..60), 0..40),
        window in 1i64..60,
    ) {
        let now = Utc::now();
        let thresholds = RiskThresholds::default();
        let readings: Vec<Reading> = samples
            .iter()
            .enumerate()
            .map(|(i, (pulse, age))| {
                Reading::new(i as u64 + 1, *pulse, None, now - Duration::minutes(*age), &thresholds)
            })
            .collect();

        let inside: Vec<f64> = samples
            .iter()
            .filter(|(_, age)| *age <= window)
            .map(|(pulse, _)| f64::from(*pulse))
            .collect();
        let expected = if inside.is_empty() {
            None
        } else {
            Some((inside.iter().sum::<f64>() / inside.len() as f64).round() as u32)
        };

        prop_assert_eq!(windowed_average(&readings, now, window, Metric::Pulse), expected);
    }

    #[test]
    fn listing_is_bounded_and_descending(
        count in 0usize..40,
        limit in 1usize..150,
    ) {
        let now = Utc::now();
        let thresholds = RiskThresholds::default();
        let readings: Vec<Reading> = (0..count)
            .map(|i| Reading::new(i as u64 + 1, 75, None, now + Duration::seconds(i as i64), &thresholds))
            .collect();

        let listed = filtered_readings(&readings, limit, None);
        prop_assert_eq!(listed.len(), count.min(limit).min(100));
        for pair in listed.windows(2) {
            prop_assert!(pair[0].id > pair[1].id);
        }
    }

    #[test]
    fn tally_partitions_total(pulses in prop::collection::vec(30u16..=250, 0..60)) {
        let now = Utc::now();
        let thresholds = RiskThresholds::default();
        let readings: Vec<Reading> = pulses
            .iter()
            .enumerate()
            .map(|(i, p)| Reading::new(i as u64 + 1, *p, None, now, &thresholds))
            .collect();

        let tally = category_tally(&readings);
        prop_assert_eq!(tally.total, pulses.len());
        prop_assert_eq!(tally.risky + tally.normal, tally.total);
        prop_assert!(tally.risky_percentage <= 100);
    }
}
