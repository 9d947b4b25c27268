//! End-to-end pipeline behaviour, sequential against parallel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use rayon::ThreadPoolBuilder;
use sluice::core::config::EngineConfig;
use sluice::core::flags::Property;
use sluice::Pipeline;

fn pool(threads: usize) -> Arc<rayon::ThreadPool> {
    Arc::new(ThreadPoolBuilder::new().num_threads(threads).build().unwrap())
}

fn data(n: i64) -> Vec<i64> {
    (0..n).map(|i| (i * 48_271) % 2_147 - 1_000).collect()
}

fn multiset(v: Vec<i64>) -> HashMap<i64, usize> {
    let mut m = HashMap::new();
    for x in v {
        *m.entry(x).or_default() += 1;
    }
    m
}

#[test]
fn ordered_results_match_across_pool_sizes() {
    let build = |p: Pipeline<i64>| {
        p.map(|x| x * 2 + 1)
            .filter(|x| x % 3 != 0)
            .flat_map(|x| vec![x, -x])
            .skip(7)
            .limit(5_000)
            .to_vec()
            .unwrap()
    };
    let expected = build(Pipeline::from_vec(data(20_000)));
    for threads in [1, 2, 3, 8] {
        let got = build(Pipeline::from_vec(data(20_000)).on_pool(pool(threads)));
        assert_eq!(got, expected, "threads = {threads}");
    }
}

#[test]
fn sorted_distinct_parallel_matches_sequential() {
    let seq = Pipeline::from_vec(data(10_000)).distinct().sorted().to_vec().unwrap();
    let par = Pipeline::from_vec(data(10_000))
        .on_pool(pool(4))
        .distinct()
        .sorted()
        .to_vec()
        .unwrap();
    assert_eq!(seq, par);
    assert!(seq.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn ordered_distinct_keeps_first_occurrences() {
    let input = vec![3, 1, 3, 2, 1, 4, 2];
    let par = Pipeline::from_vec(input)
        .on_pool(pool(3))
        .distinct()
        .to_vec()
        .unwrap();
    assert_eq!(par, vec![3, 1, 2, 4]);
}

#[test]
fn unordered_results_are_the_same_multiset() {
    let expected = multiset(data(8_000).into_iter().map(|x| x * 5).collect());
    let got = Pipeline::from_vec(data(8_000))
        .on_pool(pool(4))
        .unordered()
        .map(|x| x * 5)
        .to_vec()
        .unwrap();
    assert_eq!(multiset(got), expected);

    let distinct = Pipeline::from_vec(data(8_000))
        .on_pool(pool(4))
        .unordered()
        .distinct()
        .count()
        .unwrap();
    let mut uniq = data(8_000);
    uniq.sort_unstable();
    uniq.dedup();
    assert_eq!(distinct, uniq.len() as u64);
}

#[test]
fn find_first_is_stable_across_pool_sizes() {
    for threads in [1, 2, 4, 8] {
        for _ in 0..20 {
            let found = Pipeline::from_vec(vec![5, 3, 8, 1, 9])
                .on_pool(pool(threads))
                .filter(|x| *x > 4)
                .find_first()
                .unwrap();
            assert_eq!(found, Some(5), "threads = {threads}");
        }
    }
}

#[test]
fn find_any_returns_a_match() {
    let found = Pipeline::from_vec((0..10_000).collect::<Vec<i32>>())
        .on_pool(pool(4))
        .find_any()
        .unwrap();
    assert!(found.is_some());
    let none = Pipeline::from_vec((0..10_000).collect::<Vec<i32>>())
        .on_pool(pool(4))
        .filter(|x| *x < 0)
        .find_any()
        .unwrap();
    assert_eq!(none, None);
}

#[test]
fn short_circuit_terminates_on_infinite_source() {
    let cfg = EngineConfig {
        iter_batch_unit: 64,
        iter_max_batch: 4_096,
        ..EngineConfig::default()
    };
    let found = Pipeline::from_iterator(0u64..)
        .with_config(cfg.clone())
        .on_pool(pool(4))
        .filter(|x| x % 1_000 == 999)
        .find_first()
        .unwrap();
    assert_eq!(found, Some(999));

    let any = Pipeline::from_iterator(0u64..)
        .with_config(cfg.clone())
        .on_pool(pool(4))
        .any_match(|x| *x == 12_345)
        .unwrap();
    assert!(any);

    let first_ten = Pipeline::from_iterator(0u64..)
        .with_config(cfg)
        .on_pool(pool(4))
        .limit(10)
        .to_vec()
        .unwrap();
    assert_eq!(first_ten, (0..10).collect::<Vec<_>>());
}

#[test]
fn sequential_limit_stops_pulling_upstream() {
    let seen = Arc::new(AtomicU64::new(0));
    let s = seen.clone();
    let out = Pipeline::from_iterator(0u64..)
        .peek(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        })
        .limit(25)
        .to_vec()
        .unwrap();
    assert_eq!(out.len(), 25);
    assert_eq!(seen.load(Ordering::SeqCst), 25);
}

#[test]
fn parallel_find_first_skips_most_work() {
    let seen = Arc::new(AtomicU64::new(0));
    let s = seen.clone();
    let n = 1_000_000u64;
    let found = Pipeline::from_vec((0..n).collect::<Vec<_>>())
        .on_pool(pool(4))
        .peek(move |_| {
            s.fetch_add(1, Ordering::Relaxed);
        })
        .find_first()
        .unwrap();
    assert_eq!(found, Some(0));
    assert!(seen.load(Ordering::Relaxed) < n);
}

#[test]
fn parallel_any_match_visits_nothing_after_the_answer() {
    let found = Arc::new(AtomicBool::new(false));
    let after = Arc::new(AtomicU64::new(0));
    let (seen_found, late) = (found.clone(), after.clone());
    let mark = found.clone();
    let hit = Pipeline::from_vec((0..1_000_000i64).collect::<Vec<_>>())
        .on_pool(pool(1))
        .peek(move |_| {
            if seen_found.load(Ordering::Relaxed) {
                late.fetch_add(1, Ordering::Relaxed);
            }
        })
        .any_match(move |x| {
            let m = *x == 500_000;
            if m {
                mark.store(true, Ordering::Relaxed);
            }
            m
        })
        .unwrap();
    assert!(hit);
    assert!(found.load(Ordering::Relaxed));
    assert_eq!(after.load(Ordering::Relaxed), 0);
}

#[test]
fn parallel_find_first_visits_nothing_later_after_the_answer() {
    let target = 700_000i64;
    let found = Arc::new(AtomicBool::new(false));
    let late = Arc::new(AtomicU64::new(0));
    let (seen_found, late_count) = (found.clone(), late.clone());
    let mark = found.clone();
    let first = Pipeline::from_vec((0..1_000_000i64).collect::<Vec<_>>())
        .on_pool(pool(1))
        .peek(move |x| {
            if *x > target && seen_found.load(Ordering::Relaxed) {
                late_count.fetch_add(1, Ordering::Relaxed);
            }
        })
        .filter(move |x| {
            let m = *x == target;
            if m {
                mark.store(true, Ordering::Relaxed);
            }
            m
        })
        .find_first()
        .unwrap();
    assert_eq!(first, Some(target));
    assert_eq!(late.load(Ordering::Relaxed), 0);
}

#[test]
fn flags_only_strengthen_where_stages_say_so() {
    let p = Pipeline::from_vec(vec![2, 1, 3]);
    let source = p.flags();
    assert!(source.is_known(Property::Ordered) && source.is_known(Property::Sized));
    assert!(source.is_known_false(Property::Sorted));
    assert!(source.is_known_false(Property::Distinct));
    assert!(!source.is_known(Property::ShortCircuit));

    let p = p.map(|x| x + 1);
    assert!(p.flags().is_known_false(Property::Sorted));
    assert!(p.flags().is_known(Property::Sized));

    let p = p.sorted().distinct();
    let f = p.flags();
    assert!(f.is_known(Property::Sorted) && f.is_known(Property::Distinct));
    assert!(f.is_known_false(Property::Sized));

    let p = p.limit(2);
    assert!(p.flags().is_known(Property::ShortCircuit));
    assert!(p.flags().is_known(Property::Sorted));
    assert_eq!(p.to_vec().unwrap(), vec![2, 3]);
}

#[test]
fn reductions_agree() {
    let xs: Vec<i64> = data(50_000);
    let expected: i64 = xs.iter().sum();
    assert_eq!(Pipeline::from_vec(xs.clone()).sum().unwrap(), expected);
    assert_eq!(Pipeline::from_vec(xs.clone()).on_pool(pool(4)).sum().unwrap(), expected);
    assert_eq!(
        Pipeline::from_vec(xs.clone())
            .on_pool(pool(4))
            .fold(0i64, |acc, x| acc + x, |a, b| a + b)
            .unwrap(),
        expected
    );
    let strings = Pipeline::from_vec(xs.clone())
        .on_pool(pool(4))
        .limit(100)
        .map(|x| x.to_string())
        .collect_with(String::new, |s: &mut String, x| s.push_str(&x), |mut a, b| {
            a.push_str(&b);
            a
        })
        .unwrap();
    let expected_str: String = xs.iter().take(100).map(|x| x.to_string()).collect();
    assert_eq!(strings, expected_str);
    assert_eq!(
        Pipeline::from_vec(xs.clone()).on_pool(pool(4)).filter(|x| *x > 0).count().unwrap(),
        xs.iter().filter(|x| **x > 0).count() as u64
    );
}

#[test]
fn primitive_kinds_share_the_pipeline() {
    use sluice::pipeline::{BytePipeline, CharPipeline, DoublePipeline, IntPipeline};

    assert_eq!(BytePipeline::from_vec(vec![1, 2, 3]).sum().unwrap(), 6i8);
    assert_eq!(IntPipeline::from_vec(vec![4, 5]).max().unwrap(), Some(5));
    assert_eq!(
        CharPipeline::from_vec("sluice".chars().collect()).sorted().to_vec().unwrap(),
        vec!['c', 'e', 'i', 'l', 's', 'u']
    );
    assert_eq!(DoublePipeline::from_vec(vec![0.5, 0.25]).sum().unwrap(), 0.75);
}
