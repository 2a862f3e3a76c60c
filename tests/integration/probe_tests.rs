use meg::config::ProbeConfig;
use meg::input::{index_path, open_index};
use meg::output::ResponseSink;
use meg::probe::run_probe;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::tempdir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no delay between requests
fn create_test_config(concurrency: usize) -> ProbeConfig {
    ProbeConfig {
        concurrency,
        delay_ms: 0,
        ..Default::default()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn index_lines(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(index_path(dir))
        .expect("index file should exist")
        .lines()
        .map(str::to_string)
        .collect()
}

async fn probe(
    config: ProbeConfig,
    out: &Path,
    prefixes: &[String],
    suffixes: &[String],
) -> meg::ProbeSummary {
    let sink = ResponseSink::new(out, open_index(out).unwrap(), &config);
    run_probe(config, prefixes, suffixes, sink)
        .await
        .expect("probe should complete")
}

#[tokio::test]
async fn test_single_request_end_to_end() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let out = tempdir().unwrap();
    let prefixes = vec![mock_server.uri()];
    let suffixes = strings(&["/robots.txt"]);
    let summary = probe(create_test_config(1), out.path(), &prefixes, &suffixes).await;

    assert_eq!(summary.requests_sent, 1);
    assert_eq!(summary.saved, 1);

    let url = url::Url::parse(&format!("{}/robots.txt", mock_server.uri())).unwrap();
    let saved = out.path().join(meg::derive_path(&url));
    assert_eq!(
        std::fs::read_to_string(&saved).unwrap(),
        "User-agent: *\nDisallow: /"
    );

    let lines = index_lines(out.path());
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0], format!("{} {} (200 OK)", saved.display(), url));
}

#[tokio::test]
async fn test_cross_product_requests_every_pair() {
    let mock_server = MockServer::start().await;
    for p in ["/a/x", "/a/y", "/b/x", "/b/y"] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_body_string(p))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let out = tempdir().unwrap();
    let base = mock_server.uri();
    let prefixes = vec![format!("{}/a", base), format!("{}/b", base)];
    let suffixes = strings(&["/x", "/y"]);
    let summary = probe(create_test_config(4), out.path(), &prefixes, &suffixes).await;

    assert_eq!(summary.requests_sent, 4);
    assert_eq!(summary.responses_received, 4);
    assert_eq!(index_lines(out.path()).len(), 4);
}

#[tokio::test]
async fn test_savestatus_filters_responses() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/present"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
        .mount(&mock_server)
        .await;

    let out = tempdir().unwrap();
    let config = ProbeConfig {
        save_status: 404,
        ..create_test_config(2)
    };
    let prefixes = vec![mock_server.uri()];
    let suffixes = strings(&["/present", "/missing"]);
    let summary = probe(config, out.path(), &prefixes, &suffixes).await;

    assert_eq!(summary.responses_received, 2);
    assert_eq!(summary.saved, 1);
    assert_eq!(summary.filtered, 1);

    let lines = index_lines(out.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("/missing (404 Not Found)"));
}

#[tokio::test]
async fn test_method_and_headers_are_sent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/x"))
        .and(header("x-probe", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let out = tempdir().unwrap();
    let config = ProbeConfig {
        method: "HEAD".to_string(),
        headers: strings(&["X-Probe: 1"]),
        ..create_test_config(1)
    };
    let summary = probe(config, out.path(), &[mock_server.uri()], &strings(&["/x"])).await;

    assert_eq!(summary.saved, 1);
    assert!(index_lines(out.path())[0].ends_with("(200 OK)"));
}

#[tokio::test]
async fn test_same_host_requests_are_spaced() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let out = tempdir().unwrap();
    let config = ProbeConfig {
        delay_ms: 300,
        ..create_test_config(3)
    };
    let start = Instant::now();
    probe(
        config,
        out.path(),
        &[mock_server.uri()],
        &strings(&["/1", "/2", "/3"]),
    )
    .await;

    assert!(start.elapsed() >= Duration::from_millis(600));
}

#[tokio::test]
async fn test_malformed_prefix_does_not_stop_run() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let out = tempdir().unwrap();
    let prefixes = vec!["not a url".to_string(), mock_server.uri()];
    let summary = probe(create_test_config(2), out.path(), &prefixes, &strings(&["/x"])).await;

    assert_eq!(summary.requests_sent, 1);
    assert_eq!(index_lines(out.path()).len(), 1);
}

#[tokio::test]
async fn test_transport_failure_is_indexed_without_filter() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let out = tempdir().unwrap();
    let prefixes = vec![format!("http://127.0.0.1:{}", port)];
    let summary = probe(create_test_config(1), out.path(), &prefixes, &strings(&["/x"])).await;

    assert_eq!(summary.transport_failures, 1);
    assert_eq!(summary.saved, 1);
    let lines = index_lines(out.path());
    assert!(lines[0].ends_with(&format!("http://127.0.0.1:{}/x ()", port)));
}

#[tokio::test]
async fn test_index_is_appended_across_runs() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let out = tempdir().unwrap();
    let prefixes = vec![mock_server.uri()];
    probe(create_test_config(1), out.path(), &prefixes, &strings(&["/first"])).await;
    probe(create_test_config(1), out.path(), &prefixes, &strings(&["/second"])).await;

    let lines = index_lines(out.path());
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("/first"));
    assert!(lines[1].contains("/second"));
}
