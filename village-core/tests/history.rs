//! Event history and snapshot replay.

#![cfg(feature = "instrument")]

use std::path::PathBuf;

use polars::prelude::*;
use village_core::instrument;
use village_core::{
    Engine, Gender, GraphStore, IdAllocator, MemoryGraph, PersonSeed, Profession, Seeder,
    SimConfig, Stores,
};

fn hamlet() -> MemoryGraph {
    let mut seeder = Seeder::new(MemoryGraph::new()).unwrap();
    let fed = seeder
        .family(Stores {
            primary: 30,
            ..Stores::default()
        })
        .unwrap();
    let hungry = seeder.family(Stores::default()).unwrap();

    let mum = seeder
        .person(fed, PersonSeed::new(Gender::Female, 7000).profession(Profession::Farmer))
        .unwrap();
    let dad = seeder
        .person(fed, PersonSeed::new(Gender::Male, 7200).profession(Profession::Fisher))
        .unwrap();
    seeder.partner(mum, dad).unwrap();

    seeder
        .person(hungry, PersonSeed::new(Gender::Male, 23000).health(10))
        .unwrap();
    seeder
        .person(hungry, PersonSeed::new(Gender::Female, 2000).health(70))
        .unwrap();
    seeder.finish()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("village-core-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn events_are_recorded_per_target() {
    let mut engine = Engine::new(hamlet(), SimConfig::default().with_seed(5)).unwrap();
    let (reports, ledger) = instrument::capture(|| {
        (0..10).map(|_| engine.step().unwrap()).collect::<Vec<_>>()
    });

    assert_eq!(ledger.rows("day"), 10);
    assert_eq!(ledger.rows("family_day"), 20);

    let deaths: usize = reports.iter().map(|r| r.deaths.len()).sum();
    let births: usize = reports.iter().map(|r| r.births.len()).sum();
    assert_eq!(ledger.rows("death"), deaths);
    assert_eq!(ledger.rows("birth"), births);
    assert_eq!(births, 1);

    // The elder starves on day one. The girl has no ration at her age, nor
    // does the newborn from day two on.
    assert_eq!(deaths, 1);
    assert_eq!(ledger.rows("policy_gap"), 19);
    assert_eq!(ledger.rows("emergency"), 1);
    let transitions = ledger.table("emergency").unwrap().strs("transition").unwrap();
    assert_eq!(transitions, ["opened".to_string()].as_slice());

    let days = ledger.table("day").unwrap().u64s("day").unwrap();
    assert_eq!(days, (1..=10).collect::<Vec<u64>>().as_slice());
}

#[test]
fn family_days_as_dataframe() {
    let mut engine = Engine::new(hamlet(), SimConfig::default().with_seed(5)).unwrap();
    let ((), ledger) = instrument::capture(|| engine.run(15).unwrap());
    let frames = ledger.to_dataframes().unwrap();
    let family_day = frames.get("family_day").unwrap();
    assert_eq!(family_day.height(), 30);

    let outcomes = family_day
        .clone()
        .lazy()
        .group_by([col("outcome")])
        .agg([col("day").count().alias("days")])
        .sort(["outcome"], Default::default())
        .collect()
        .unwrap();
    let labels: Vec<String> = outcomes
        .column("outcome")
        .unwrap()
        .str()
        .unwrap()
        .into_no_null_iter()
        .map(str::to_string)
        .collect();
    assert!(labels.iter().all(|l| ["deficit", "skipped", "surplus"].contains(&l.as_str())));
    assert!(labels.contains(&"surplus".to_string()));
    assert!(labels.contains(&"deficit".to_string()));
}

#[test]
fn snapshots_replay_the_day_before() {
    let dir = scratch_dir("snapshots");
    let config = SimConfig::default().with_seed(5).with_snapshot_dir(&dir);
    let mut engine = Engine::new(hamlet(), config).unwrap();
    engine.run(3).unwrap();

    // graph_3.json holds the state after day 2.
    let mut replay = Engine::new(
        MemoryGraph::from_snapshot(&dir.join("graph_3.json")).unwrap(),
        SimConfig::default(),
    )
    .unwrap();
    assert!(dir.join("graph_1.json").exists());
    assert!(!dir.join("graph_4.json").exists());

    let end = engine.into_store();
    let snap = MemoryGraph::from_snapshot(&dir.join("graph_3.json")).unwrap();
    assert_ne!(snap, end);
    assert!(snap.len() <= end.len());

    // Ids minted after a reload never collide with recorded ones.
    let mut ids = IdAllocator::resume(&snap).unwrap();
    let fresh = ids.person();
    assert!(!snap.contains(fresh.node()));

    replay.step().unwrap();
    assert!(replay.store().len() >= snap.len());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn ledger_writes_parquet() {
    let dir = scratch_dir("parquet");
    let mut engine = Engine::new(hamlet(), SimConfig::default()).unwrap();
    let ((), ledger) = instrument::capture(|| engine.run(5).unwrap());
    ledger.write_parquet(&dir).unwrap();
    assert!(dir.join("day.parquet").exists());
    assert!(dir.join("family_day.parquet").exists());

    let store = engine.store();
    store.export_snapshot(&dir.join("final.json")).unwrap();
    assert!(dir.join("final.json").exists());
    let _ = std::fs::remove_dir_all(&dir);
}
