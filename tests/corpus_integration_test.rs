//! The bundled advising corpus loads and indexes cleanly

mod common;

use common::{OfflinePipeline, ScriptedModel};
use pounce::infrastructure::corpus;
use std::collections::HashSet;
use std::path::PathBuf;
use tempfile::TempDir;

fn bundled_corpus() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/chunks.yaml")
}

#[test]
fn test_bundled_corpus_has_unique_ids_with_text() {
    let chunks = corpus::load(bundled_corpus()).unwrap();
    assert_eq!(chunks.len(), 9);

    let ids: HashSet<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), chunks.len());
    assert!(chunks.iter().all(|c| !c.text.trim().is_empty() && c.source().is_some()));
}

#[tokio::test]
async fn test_bundled_corpus_answers_fafsa_deadline() {
    let chunks = corpus::load(bundled_corpus()).unwrap();
    let pipeline = OfflinePipeline::new();
    assert_eq!(pipeline.indexer().index(&chunks).await.unwrap().written, 9);

    let model = ScriptedModel::replying("By March 1.");
    let answer = pipeline
        .advisor(model, 3)
        .ask("When must the FAFSA be submitted?")
        .await
        .unwrap();

    assert_eq!(answer.sources.len(), 3);
    assert_eq!(answer.sources[0].id, "financial_aid_1");
    assert_eq!(answer.sources[0].topic.as_deref(), Some("Financial Aid"));
}

#[test]
fn test_directory_with_clashing_ids_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("a.yaml"),
        "- id: financial_aid_1\n  text: FAFSA must be submitted by March 1.\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("b.json"),
        r#"{"chunks": [{"id": "financial_aid_1", "text": "Duplicate entry."}]}"#,
    )
    .unwrap();

    let err = corpus::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("financial_aid_1"));
}
