// Integration tests for the JSON-file result store

use anyhow::Result;
use interview_trainer::classifier::{
    classify_confidence, classify_speed, VoiceMetrics,
};
use interview_trainer::store::{InterviewQuestion, InterviewResult, ResultStore, ANSWER_PLACEHOLDER};

fn metrics(pitch: f64, speed: f64, confidence_raw: f64) -> VoiceMetrics {
    VoiceMetrics {
        pitch,
        speed,
        speed_category: classify_speed(speed),
        confidence: classify_confidence(confidence_raw),
    }
}

fn sample_result(store: &ResultStore, category: &str, m: &VoiceMetrics) -> InterviewResult {
    let category_id = store.find_or_create_category(category);
    InterviewResult::new(
        m,
        Some(category_id),
        vec![InterviewQuestion::new("Q1"), InterviewQuestion::new("Q2")],
    )
}

#[test]
fn test_store_roundtrip_through_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("results.json");

    let m = metrics(0.5, 0.0005, 0.2);
    let result_id = {
        let store = ResultStore::open(&path)?;
        let result = sample_result(&store, "Coding", &m);
        let id = store.insert_result(result);
        store.attach_report(id, "Solid answer.");
        store.save()?;
        id
    };

    // Reopen and verify everything survived
    let store = ResultStore::open(&path)?;
    let results = store.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, result_id);
    assert_eq!(results[0].questions.len(), 2);
    assert_eq!(results[0].questions[0].answer, ANSWER_PLACEHOLDER);
    assert_eq!(results[0].report.as_ref().unwrap().text, "Solid answer.");

    let category = store.category_by_name("Coding").expect("category persisted");
    assert_eq!(results[0].category_id, Some(category.id));

    Ok(())
}

#[test]
fn test_find_or_create_category_is_idempotent() {
    let store = ResultStore::in_memory();

    let first = store.find_or_create_category("Coding");
    let second = store.find_or_create_category("Coding");
    assert_eq!(first, second);

    // Case-sensitive exact match: different case means a new category
    let lowercase = store.find_or_create_category("coding");
    assert_ne!(first, lowercase);
}

#[test]
fn test_report_is_never_replaced() {
    let store = ResultStore::in_memory();
    let m = metrics(0.5, 0.0005, 0.2);
    let id = store.insert_result(sample_result(&store, "Coding", &m));

    store.attach_report(id, "first");
    store.attach_report(id, "second");

    let result = store.result(id).unwrap();
    assert_eq!(result.report.as_ref().unwrap().text, "first");
}

#[test]
fn test_duplicate_probe_matches_within_epsilon() {
    let store = ResultStore::in_memory();
    let m = metrics(0.5, 0.0005, 0.2);
    store.insert_result(sample_result(&store, "Coding", &m));

    assert!(store.has_matching_result(&m, "Coding"));

    // A hair of float noise still counts as the same row
    let noisy = metrics(0.5 + 1e-12, 0.0005, 0.2);
    assert!(store.has_matching_result(&noisy, "Coding"));

    // Different metrics or different category do not match
    let other = metrics(0.6, 0.0005, 0.2);
    assert!(!store.has_matching_result(&other, "Coding"));
    assert!(!store.has_matching_result(&m, "Business"));
}

#[test]
fn test_results_are_newest_first() {
    let store = ResultStore::in_memory();

    let first = store.insert_result(sample_result(&store, "Coding", &metrics(0.1, 0.0005, 0.2)));
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = store.insert_result(sample_result(&store, "Coding", &metrics(0.2, 0.0005, 0.2)));

    let results = store.results();
    assert_eq!(results[0].id, second);
    assert_eq!(results[1].id, first);
}

#[test]
fn test_results_for_unknown_category_is_empty() {
    let store = ResultStore::in_memory();
    store.insert_result(sample_result(&store, "Coding", &metrics(0.5, 0.0005, 0.2)));

    assert!(store.results_for_category("Business").is_empty());
}

#[test]
fn test_open_rejects_malformed_store_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    std::fs::write(&path, "not json at all").unwrap();

    assert!(ResultStore::open(&path).is_err());
}

#[test]
fn test_in_memory_save_is_a_noop() {
    let store = ResultStore::in_memory();
    store.insert_result(sample_result(&store, "Coding", &metrics(0.5, 0.0005, 0.2)));
    assert!(store.save().is_ok());
}
