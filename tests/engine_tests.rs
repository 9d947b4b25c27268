//! Engine, configuration and stage graph bookkeeping.

use sluice::core::config::EngineConfig;
use sluice::core::error::Error;
use sluice::core::flags::{Characteristics, StreamFlags};
use sluice::pipeline::{LinkState, StageGraph, StageKind};
use sluice::{Engine, Pipeline};

#[test]
fn config_from_json_fills_defaults_and_validates() {
    let cfg = EngineConfig::from_json(r#"{"parallelism": 3, "leaf_target_factor": 2}"#).unwrap();
    assert_eq!(cfg.parallelism, 3);
    assert_eq!(cfg.leaf_target(3), 6);
    assert_eq!(cfg.iter_batch_unit, EngineConfig::default().iter_batch_unit);

    let err = EngineConfig::from_json(r#"{"iter_batch_unit": 10, "iter_max_batch": 5}"#).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(matches!(EngineConfig::from_json("not json"), Err(Error::Config(_))));
}

#[test]
fn engine_runs_pipelines_on_its_pool() {
    let engine = Engine::new(EngineConfig {
        parallelism: 2,
        thread_name_prefix: "sluice-test".into(),
        ..EngineConfig::default()
    })
    .unwrap();
    let names = engine
        .from_vec((0..64).collect::<Vec<u32>>())
        .map(|_| std::thread::current().name().unwrap_or("").to_string())
        .distinct()
        .to_vec()
        .unwrap();
    assert!(!names.is_empty());
    assert!(names.iter().all(|n| n.starts_with("sluice-test-")));

    let total = engine
        .from_iterator((1..=100i64).filter(|x| x % 2 == 0))
        .sum()
        .unwrap();
    assert_eq!(total, 2_550);
}

#[test]
fn stage_graph_rejects_reuse() {
    let mut g = StageGraph::new();
    let src = g.add_source(
        "vec",
        StreamFlags::from_characteristics(Characteristics::ORDERED),
    );
    let m = g
        .link(src, "map", StageKind::Intermediate, StreamFlags::NOT_SORTED, false)
        .unwrap();
    assert_eq!(g.get(src).unwrap().state, LinkState::Linked);

    let again = g.link(src, "filter", StageKind::Intermediate, StreamFlags::NOT_SIZED, false);
    assert!(matches!(again, Err(Error::StageConsumed { .. })));

    g.consume(m).unwrap();
    assert!(g.chain(m).iter().all(|r| r.state == LinkState::Consumed));
    assert!(matches!(g.consume(m), Err(Error::StageConsumed { .. })));
    assert!(matches!(
        g.link(m, "count", StageKind::Terminal, StreamFlags::EMPTY, false),
        Err(Error::StageConsumed { .. })
    ));
}

#[test]
fn pipeline_stage_chain_is_recorded() {
    let p = Pipeline::from_vec(vec![1, 2, 3])
        .map(|x| x * 2)
        .sorted()
        .limit(2);
    let stages = p.stages();
    let names: Vec<_> = stages.iter().map(|r| r.name).collect();
    assert_eq!(names.len(), 4);
    assert_eq!(names[0], "vec");
    assert!(stages[2].stateful && stages[3].stateful);
    assert!(stages.windows(2).all(|w| w[1].depth == w[0].depth + 1));
    assert!(stages[..3].iter().all(|r| r.state == LinkState::Linked));
    assert_eq!(stages[3].state, LinkState::Open);
}
