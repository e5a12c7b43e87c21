use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use serde_json::json;
use shelf_core::{DisplayFlags, InstallState};
use shelf_engine::{
    ClientSettings, FailureKind, FetchCoordinator, PresentationRequest, PresentationSink,
    ReqwestCatalogClient, Section,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    requests: Mutex<Vec<PresentationRequest>>,
}

impl TestSink {
    fn take(&self) -> Vec<PresentationRequest> {
        self.requests.lock().unwrap().drain(..).collect()
    }
}

impl PresentationSink for TestSink {
    fn present(&self, request: PresentationRequest) {
        self.requests.lock().unwrap().push(request);
    }
}

fn coordinator_for(server: &MockServer, installed: &[&str]) -> FetchCoordinator {
    let client = ReqwestCatalogClient::new(ClientSettings::with_base_url(format!(
        "{}/",
        server.uri()
    )))
    .expect("client");
    let installed: HashSet<String> = installed.iter().map(|id| id.to_string()).collect();
    FetchCoordinator::new(Arc::new(client), Arc::new(installed))
}

async fn mount_sections(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/v1/sections"))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_search(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/v1/snaps"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn notes_query_is_merged_and_presented_once() {
    shelf_logging::initialize_for_tests();
    let server = MockServer::start().await;
    mount_sections(&server, ResponseTemplate::new(200).set_body_json(json!(["featured"]))).await;
    mount_search(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!([{"id": "a1", "name": "Notes App", "installed": false}])),
    )
    .await;

    let sink = TestSink::default();
    coordinator_for(&server, &["a1"])
        .query("notes", &sink)
        .await
        .expect("query ok");

    let mut requests = sink.take();
    assert_eq!(requests.len(), 1);
    let request = requests.remove(0);
    assert_eq!(request.query(), "notes");
    assert_eq!(request.title(), "Search results for \"notes\"");
    assert_eq!(request.flags(), DisplayFlags::SEARCH);
    assert_eq!(
        request.sections().resolve().await.expect("sections"),
        vec![Section("featured".to_string())]
    );

    let results = request.into_results();
    let record = results.get("a1").expect("record");
    assert_eq!(record.name(), "Notes App");
    assert_eq!(record.install_state(), InstallState::Installed);
}

#[tokio::test]
async fn handoff_does_not_wait_for_sections() {
    let server = MockServer::start().await;
    mount_sections(
        &server,
        ResponseTemplate::new(200)
            .set_delay(Duration::from_millis(1500))
            .set_body_json(json!(["late"])),
    )
    .await;
    mount_search(&server, ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let sink = TestSink::default();
    let started = Instant::now();
    coordinator_for(&server, &[])
        .query("fast", &sink)
        .await
        .expect("query ok");
    assert!(started.elapsed() < Duration::from_millis(1000));

    let requests = sink.take();
    assert_eq!(requests.len(), 1);
    let sections = requests[0].sections().clone();
    let early = tokio::time::timeout(Duration::from_millis(50), sections.resolve()).await;
    assert!(early.is_err(), "sections should still be pending");

    assert_eq!(
        sections.resolve_or_empty().await,
        vec![Section("late".to_string())]
    );
}

#[tokio::test]
async fn sections_arriving_first_do_not_trigger_handoff() {
    let server = MockServer::start().await;
    mount_sections(&server, ResponseTemplate::new(200).set_body_json(json!(["featured"]))).await;
    mount_search(
        &server,
        ResponseTemplate::new(200)
            .set_delay(Duration::from_millis(300))
            .set_body_json(json!([{"id": "a1", "name": "A"}])),
    )
    .await;

    let sink = Arc::new(TestSink::default());
    let coordinator = coordinator_for(&server, &[]);
    let task = {
        let sink = Arc::clone(&sink);
        tokio::spawn(async move { coordinator.query("slow", sink.as_ref()).await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(sink.take().is_empty());

    task.await.expect("join").expect("query ok");
    assert_eq!(sink.take().len(), 1);
}

#[tokio::test]
async fn failed_search_produces_no_presentation() {
    shelf_logging::initialize_for_tests();
    let server = MockServer::start().await;
    mount_sections(&server, ResponseTemplate::new(200).set_body_json(json!(["featured"]))).await;
    mount_search(&server, ResponseTemplate::new(503)).await;

    let sink = TestSink::default();
    let err = coordinator_for(&server, &[])
        .query("down", &sink)
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn failed_sections_degrade_to_none() {
    let server = MockServer::start().await;
    mount_sections(&server, ResponseTemplate::new(500)).await;
    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_json(json!([{"id": "a1", "name": "A"}])),
    )
    .await;

    let sink = TestSink::default();
    coordinator_for(&server, &[])
        .query("a", &sink)
        .await
        .expect("query ok");

    let requests = sink.take();
    assert_eq!(requests[0].results().len(), 1);
    assert!(requests[0].sections().resolve().await.is_err());
    assert!(requests[0].sections().resolve_or_empty().await.is_empty());
}

#[tokio::test]
async fn records_without_usable_ids_are_dropped_before_merge() {
    let server = MockServer::start().await;
    mount_sections(&server, ResponseTemplate::new(200).set_body_json(json!([]))).await;
    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_json(json!([
            {"id": "b2", "name": "B"},
            {"name": "no id"},
            {"id": "a1", "name": "A"},
            {"id": "b2", "name": "B duplicate"}
        ])),
    )
    .await;

    let sink = TestSink::default();
    coordinator_for(&server, &["b2"])
        .query("b", &sink)
        .await
        .expect("query ok");

    let results = sink.take().remove(0).into_results();
    assert_eq!(results.ids(), vec!["b2", "a1"]);
    assert!(results.get("b2").unwrap().is_installed());
    assert_eq!(results.get("b2").unwrap().name(), "B");
}

#[tokio::test]
async fn malformed_record_does_not_fail_the_query() {
    shelf_logging::initialize_for_tests();
    let server = MockServer::start().await;
    mount_sections(&server, ResponseTemplate::new(200).set_body_json(json!(["featured"]))).await;
    mount_search(
        &server,
        ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a1", "name": "A", "installed": null},
            {"id": null, "name": "B"},
            {"id": 42, "name": "C"},
            {"id": "d4", "name": "D"}
        ])),
    )
    .await;

    let sink = TestSink::default();
    coordinator_for(&server, &["d4"])
        .query("mixed", &sink)
        .await
        .expect("query ok");

    let mut requests = sink.take();
    assert_eq!(requests.len(), 1);
    let results = requests.remove(0).into_results();
    assert_eq!(results.ids(), vec!["a1", "d4"]);
    assert!(!results.get("a1").unwrap().is_installed());
    assert!(results.get("d4").unwrap().is_installed());
}
