use allreduce_bench::{
    expected_sum, run_threads, BenchConfig, BenchError, CombineMode, RemainderPolicy,
};

fn config(len: usize, remainder: RemainderPolicy) -> BenchConfig {
    BenchConfig {
        len,
        remainder,
        mode: CombineMode::AllReduce,
    }
}

#[test]
fn ten_elements_over_two_workers() {
    let outcomes = run_threads(2, &config(10, RemainderPolicy::Drop)).unwrap();

    assert_eq!(outcomes[0].local_sum, 15.0);
    assert_eq!(outcomes[1].local_sum, 40.0);
    for outcome in &outcomes {
        assert_eq!(outcome.local_len, 5);
        assert_eq!(outcome.total, Some(55.0));
        assert_eq!(outcome.average, Some(5.5));
    }

    let report = outcomes[0].report.as_ref().unwrap();
    assert_eq!(report.expected_sum, 55.0);
    assert_eq!(report.difference(), 0.0);
    assert_eq!(report.serial_sum, 55.0);
    assert!(outcomes[1].report.is_none());
}

#[test]
fn divisible_lengths_hit_the_closed_form() {
    for workers in [1, 2, 4, 5, 8] {
        let len = 40_000;
        let outcomes = run_threads(workers, &config(len, RemainderPolicy::Drop)).unwrap();
        let report = outcomes[0].report.as_ref().unwrap();
        assert_eq!(report.total_sum, expected_sum(len), "workers = {workers}");
        assert_eq!(report.average, report.total_sum / len as f64);
        assert_eq!(Some(report.average), outcomes[0].average);
        assert_eq!(report.dropped, 0);
    }
}

#[test]
fn every_worker_sees_the_same_total() {
    let outcomes = run_threads(7, &config(100_003, RemainderPolicy::Spread)).unwrap();
    let first = outcomes[0].total.unwrap();
    assert!(outcomes.iter().all(|o| o.total.unwrap().to_bits() == first.to_bits()));
    assert_eq!(first, expected_sum(100_003));
}

#[test]
fn drop_policy_loses_the_remainder() {
    let outcomes = run_threads(3, &config(10, RemainderPolicy::Drop)).unwrap();
    let lens: Vec<_> = outcomes.iter().map(|o| o.local_len).collect();
    assert_eq!(lens, vec![3, 3, 3]);

    let report = outcomes[0].report.as_ref().unwrap();
    assert_eq!(report.dropped, 1);
    assert_eq!(report.total_sum, 45.0);
    assert_eq!(report.difference(), 10.0);
    // Average still divides by the full length.
    assert_eq!(report.average, 4.5);
    // The serial baseline always covers the whole vector.
    assert_eq!(report.serial_sum, 55.0);
}

#[test]
fn spread_policy_sums_everything() {
    let outcomes = run_threads(3, &config(10, RemainderPolicy::Spread)).unwrap();
    let lens: Vec<_> = outcomes.iter().map(|o| o.local_len).collect();
    assert_eq!(lens, vec![4, 3, 3]);

    let report = outcomes[0].report.as_ref().unwrap();
    assert_eq!(report.dropped, 0);
    assert_eq!(report.total_sum, 55.0);
}

#[test]
fn single_worker_matches_serial_exactly() {
    let outcomes = run_threads(1, &config(250_000, RemainderPolicy::Drop)).unwrap();
    let report = outcomes[0].report.as_ref().unwrap();
    assert_eq!(report.total_sum, report.serial_sum);
    assert_eq!(report.workers, 1);
}

#[test]
fn reruns_are_identical() {
    let config = config(99_999, RemainderPolicy::Spread);
    let first = run_threads(4, &config).unwrap();
    let second = run_threads(4, &config).unwrap();
    let totals = |outcomes: &[allreduce_bench::RankOutcome]| {
        outcomes.iter().map(|o| o.total).collect::<Vec<_>>()
    };
    assert_eq!(totals(&first), totals(&second));
}

#[test]
fn reduce_mode_leaves_other_ranks_without_a_total() {
    let config = BenchConfig {
        mode: CombineMode::Reduce,
        ..config(1_000, RemainderPolicy::Spread)
    };
    let outcomes = run_threads(4, &config).unwrap();
    assert_eq!(outcomes[0].total, Some(500_500.0));
    assert!(outcomes[1..].iter().all(|o| o.total.is_none() && o.average.is_none()));
    assert!(outcomes[0].report.is_some());
}

#[test]
fn more_workers_than_elements() {
    let outcomes = run_threads(6, &config(4, RemainderPolicy::Spread)).unwrap();
    assert!(outcomes.iter().all(|o| o.total == Some(10.0)));
    assert_eq!(outcomes[5].local_len, 0);
}

#[test]
fn invalid_setups_are_errors() {
    assert!(matches!(
        run_threads(0, &config(10, RemainderPolicy::Drop)),
        Err(BenchError::NoWorkers)
    ));
    assert!(matches!(
        run_threads(2, &config(0, RemainderPolicy::Drop)),
        Err(BenchError::EmptyVector)
    ));
}
