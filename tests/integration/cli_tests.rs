use std::process::Command;
use tempfile::tempdir;

fn meg() -> Command {
    Command::new(env!("CARGO_BIN_EXE_meg"))
}

#[test]
fn test_missing_prefix_file_exits_with_error() {
    let dir = tempdir().unwrap();
    let status = meg()
        .current_dir(dir.path())
        .args(["/robots.txt", "no-such-prefixes", "out"])
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_fatal_error_reported_once() {
    let dir = tempdir().unwrap();
    let output = meg()
        .current_dir(dir.path())
        .args(["/robots.txt", "no-such-prefixes", "out"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("no-such-prefixes").count(), 1, "{}", stderr);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_output_dir_over_file_exits_with_error() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("prefixes"), "http://example.invalid\n").unwrap();
    std::fs::write(dir.path().join("out"), "not a directory").unwrap();

    let status = meg()
        .current_dir(dir.path())
        .args(["/x", "prefixes", "out"])
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_invalid_settings_exit_with_error() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("prefixes"), "http://example.invalid\n").unwrap();

    let status = meg()
        .current_dir(dir.path())
        .args(["-c", "0", "/x"])
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_only_malformed_pairs_exits_cleanly() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("prefixes"), "not a url\n").unwrap();

    let output = meg()
        .current_dir(dir.path())
        .args(["-d", "0", "/x"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("out").join("index")).unwrap(),
        ""
    );
}

#[test]
fn test_missing_default_suffix_file_sends_nothing() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("prefixes"), "http://example.invalid\n").unwrap();

    let status = meg().current_dir(dir.path()).status().unwrap();

    assert_eq!(status.code(), Some(0));
    assert!(dir.path().join("out").join("index").exists());
}

/// Writes `count` prefixes below `base` to `dir/prefixes`
fn write_prefixes(dir: &std::path::Path, base: &str, count: usize) {
    let prefixes: String = (0..count).map(|i| format!("{}/p{}\n", base, i)).collect();
    std::fs::write(dir.join("prefixes"), prefixes).unwrap();
}

async fn mock_server() -> wiremock::MockServer {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_verbose_prints_index_lines() {
    let server = mock_server().await;
    let dir = tempdir().unwrap();
    write_prefixes(dir.path(), &server.uri(), 3);

    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_meg"))
        .current_dir(dir.path())
        .args(["-v", "-d", "0", "/x", "prefixes", "out"])
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let index = std::fs::read_to_string(dir.path().join("out").join("index")).unwrap();
    assert_eq!(index.lines().count(), 3);
    assert_eq!(String::from_utf8(output.stdout).unwrap(), index);
}

#[tokio::test]
async fn test_stdout_empty_without_verbose() {
    let server = mock_server().await;
    let dir = tempdir().unwrap();
    write_prefixes(dir.path(), &server.uri(), 2);

    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_meg"))
        .current_dir(dir.path())
        .args(["-d", "0", "/x", "prefixes", "out"])
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    let index = std::fs::read_to_string(dir.path().join("out").join("index")).unwrap();
    assert_eq!(index.lines().count(), 2);
}

#[tokio::test]
async fn test_closed_stdout_keeps_index_complete() {
    let server = mock_server().await;
    let dir = tempdir().unwrap();
    write_prefixes(dir.path(), &server.uri(), 200);

    let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_meg"))
        .current_dir(dir.path())
        .args(["-v", "-q", "-d", "0", "/x", "prefixes", "out"])
        .stdout(std::process::Stdio::piped())
        .spawn()
        .unwrap();

    // Close the reading end right away, like `meg -v ... | head -n 0`
    drop(child.stdout.take());
    let status = child.wait().await.unwrap();

    assert_eq!(status.code(), Some(0));
    let index = std::fs::read_to_string(dir.path().join("out").join("index")).unwrap();
    assert_eq!(index.lines().count(), 200);
}
