use fedora_indexer::config::{IndexerConfig, IndexerSpec, SourceConfig};
use fedora_indexer::indexing::{FileFormat, StoreProtocol};
use fedora_indexer::{Error, IndexerType};
use std::fs;

#[test]
fn test_load_full_configuration() {
    let dir = std::env::temp_dir().join("test_data_config_full");
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    let fields_dir = dir.join("fields");
    let path = dir.join("indexer.toml");
    fs::write(
        &path,
        format!(
            r#"
repository_url = "http://localhost:8080/rest/"

[credentials]
username = "fedoraAdmin"
password = "secret"

[source]
kind = "mqtt"
host = "broker"
port = 1884
topics = ["fedora", "fedora-audit"]

[[indexers]]
kind = "sparql"
endpoint = "http://localhost:3030/ds"
store_type = "jena"
auth_token = "token"
timeout_secs = 5

[[indexers]]
kind = "file"
directory = "{}"
format = "rdf"

[server]
port = 9000
"#,
            fields_dir.display().to_string().replace('\\', "/")
        ),
    )
    .unwrap();

    let config = IndexerConfig::load(&path).unwrap();

    let credentials = config.credentials().unwrap();
    assert_eq!(credentials.username, "fedoraAdmin");
    assert_eq!(config.server.address(), "127.0.0.1:9000");

    match &config.source {
        SourceConfig::Mqtt { connection, topics } => {
            assert_eq!(connection.host, "broker");
            assert_eq!(connection.port, 1884);
            assert_eq!(connection.client_id, "fedora_indexer");
            assert_eq!(topics, &["fedora".to_string(), "fedora-audit".to_string()]);
        }
        other => panic!("unexpected source {:?}", other),
    }

    assert!(matches!(
        config.indexers[0],
        IndexerSpec::Sparql { store_type: StoreProtocol::Jena, timeout_secs: 5, .. }
    ));
    assert!(matches!(config.indexers[1], IndexerSpec::File { format: FileFormat::Rdf, .. }));

    let indexers = config.build_indexers().unwrap();
    assert_eq!(indexers.len(), 2);
    assert_eq!(indexers[0].indexer_type(), IndexerType::Rdf);
    assert_eq!(indexers[1].indexer_type(), IndexerType::Rdf);
    assert!(fields_dir.is_dir());

    let _ = fs::remove_dir_all(&dir);
}

#[cfg(not(windows))]
#[test]
fn test_kafka_source_defaults() {
    let config = IndexerConfig::from_toml_str(
        r#"
repository_url = "http://localhost:8080/rest/"

[source]
kind = "kafka"
brokers = "kafka:9092"

[[indexers]]
kind = "sparql"
endpoint = "http://localhost:7878"
"#,
    )
    .unwrap();

    match &config.source {
        SourceConfig::Kafka { connection, topics } => {
            assert_eq!(connection.brokers, "kafka:9092");
            assert_eq!(connection.group_id, "fedora_indexer");
            assert_eq!(connection.auto_offset_reset, "latest");
            assert_eq!(topics, &["fedora".to_string()]);
        }
        other => panic!("unexpected source {:?}", other),
    }
}

#[test]
fn test_configuration_needs_indexers() {
    let err = IndexerConfig::from_toml_str(r#"repository_url = "http://localhost:8080/rest/""#).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_missing_file_is_a_config_error() {
    let err = IndexerConfig::load(std::path::Path::new("/nonexistent/indexer.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
