//! Integration tests for world persistence
//!
//! A world written by the JSON file store and read back must keep every
//! agent, the memory order of each agent, the grid and the event log.

use std::sync::Arc;

use axiom_engine::core::config::EngineConfig;
use axiom_engine::core::types::AgentId;
use axiom_engine::notify::NullNotifier;
use axiom_engine::store::{load_or_bootstrap, JsonFileWorldStore, WorldStore};
use axiom_engine::world::events::Channel;
use axiom_engine::{EngineContext, SimulationClock, WorldService};
use chrono::{Duration, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn file_context(path: &std::path::Path) -> Arc<EngineContext> {
    let config = EngineConfig { seed: Some(5), ..EngineConfig::default() };
    Arc::new(EngineContext::new(
        config,
        Arc::new(JsonFileWorldStore::new(path)),
        Arc::new(NullNotifier),
        None,
    ))
}

#[tokio::test]
async fn test_world_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("world.json");

    let imported_id = {
        let ctx = file_context(&path);
        let service = WorldService::new(ctx.clone());
        let agent = service
            .import_character(r#"{"name": "Mirel", "description": "Keeper of lanterns"}"#, "tavern")
            .await
            .unwrap();
        service
            .post_message("player_1", "Player", Channel::Global, "anyone awake?")
            .await
            .unwrap();

        let mut clock = SimulationClock::new(ctx.clone());
        let t = Utc::now();
        for i in 0..5 {
            clock.tick(t + Duration::seconds(2 * i)).await.unwrap();
        }
        agent.id
    };
    assert!(path.exists());

    // A fresh context over the same file sees the same world
    let ctx = file_context(&path);
    let world = ctx.snapshot().await.unwrap();
    assert_eq!(world.tick, 5);
    assert_eq!(world.agents.len(), 3);

    let mut ids: Vec<&str> = world.agents.iter().map(|a| a.id.as_str()).collect();
    ids.sort();
    let mut expected = vec!["aurelius_001", "vulcan_002", imported_id.as_str()];
    expected.sort();
    assert_eq!(ids, expected);

    let mirel = world.agent(&imported_id).unwrap();
    let memories: Vec<&str> = mirel.memory.iter().collect();
    assert_eq!(memories, vec!["Imported from tavern", "Keeper of lanterns"]);

    assert!(world
        .events
        .recent(world.events.len())
        .any(|e| e.content() == "anyone awake?"));
}

#[tokio::test]
async fn test_saved_document_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileWorldStore::new(dir.path().join("world.json"));
    let config = EngineConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    let mut world = load_or_bootstrap(&store, &config, &mut rng, Utc::now()).await.unwrap();
    let aurelius = AgentId::new("aurelius_001");
    for i in 0..5 {
        world.agent_mut(&aurelius).unwrap().remember(format!("entry {}", i));
    }
    world.grid.get_mut(3, -2).unwrap().last_invasion = Some(Utc::now());
    store.save(&world).await.unwrap();

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.id, world.id);
    assert_eq!(loaded.agents.len(), world.agents.len());
    assert_eq!(loaded.grid.len(), world.grid.len());
    assert_eq!(loaded.pois.len(), world.pois.len());
    assert_eq!(loaded.events.len(), world.events.len());
    assert_eq!(
        loaded.grid.get(3, -2).unwrap().last_invasion,
        world.grid.get(3, -2).unwrap().last_invasion
    );

    let before: Vec<&str> = world.agent(&aurelius).unwrap().memory.iter().collect();
    let after: Vec<&str> = loaded.agent(&aurelius).unwrap().memory.iter().collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_reset_removes_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world.json");
    let ctx = file_context(&path);

    let service = WorldService::new(ctx.clone());
    service.import_character("{}", "test").await.unwrap();
    assert_eq!(ctx.snapshot().await.unwrap().agents.len(), 3);

    let world = service.reset_world().await.unwrap();
    assert_eq!(world.agents.len(), 2);
    assert_eq!(ctx.store.load().await.unwrap().unwrap().agents.len(), 2);
}
