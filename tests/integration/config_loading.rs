use modgraph_cli::config::{GraphInput, ModgraphConfig};
use modgraph_cli::core::{ModgraphError, user_friendly_error};
use modgraph_cli::slot::SlotStrategy;
use modgraph_cli::test_utils::{ConfigFixture, GraphFixture, artifact};
use tempfile::TempDir;

#[tokio::test]
async fn test_load_config_and_graph_from_disk() {
    let dir = TempDir::new().unwrap();
    let config_path = ConfigFixture::basic().write_to(dir.path()).unwrap();
    let graph_path = GraphFixture::basic().write_to(dir.path()).unwrap();

    let config = ModgraphConfig::load_from(&config_path).await.unwrap();
    assert_eq!(config.slot_strategy, SlotStrategy::VersionMajor);
    assert_eq!(config.modules.len(), 3);
    assert!(config.global_excludes().is_excluded(&artifact("junit:junit:4.13.2")));

    let input = GraphInput::load_from(&graph_path).await.unwrap();
    let graph = input.to_graph().unwrap();
    assert_eq!(input.roots().unwrap().len(), 2);
    assert_eq!(graph.node_count(), 8);
    assert!(graph.detect_cycles().is_none());
}

#[tokio::test]
async fn test_missing_name_surfaces_through_context() {
    let dir = TempDir::new().unwrap();
    let path = ConfigFixture::missing_name().write_to(dir.path()).unwrap();

    let error = ModgraphConfig::load_from(&path).await.unwrap_err();
    assert!(error.to_string().starts_with("Failed to load configuration from"));

    let context = user_friendly_error(error);
    assert!(matches!(
        context.error,
        ModgraphError::MissingModuleName {
            index: 0
        }
    ));
    assert!(context.suggestion.is_some());
}

#[tokio::test]
async fn test_missing_file_suggests_checking_path() {
    let dir = TempDir::new().unwrap();

    let error = ModgraphConfig::load_from(&dir.path().join("absent.toml")).await.unwrap_err();
    let context = user_friendly_error(error);
    assert!(context.suggestion.unwrap().contains("file exists"));
}

#[tokio::test]
async fn test_unknown_slot_strategy_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("modgraph.toml");
    tokio::fs::write(&path, "slot-strategy = \"weekly\"").await.unwrap();

    assert!(ModgraphConfig::load_from(&path).await.is_err());
}
