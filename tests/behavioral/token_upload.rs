// ABOUTME: Behavioral tests for uploading local files and directories as tokens

use std::fs;

use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use topos::ToposError;

use super::fixtures::{client_for, path, resource_url};

#[tokio::test]
async fn test_upload_file_puts_content_with_filename() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("input.dat");
    fs::write(&file, "param=1\nparam=2\n").unwrap();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", path("pools/p1/nextToken").as_str())
        .match_header("content-disposition", "attachment; filename=\"input.dat\"")
        .match_body("param=1\nparam=2\n")
        .with_status(201)
        .with_body(resource_url(&server, "pools/p1/tokens/up-42"))
        .create_async()
        .await;

    let token = client_for(&server).push_file("p1", &file).await.unwrap();

    assert_eq!(token, "up-42");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_missing_file_never_calls_service() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let err = client_for(&server)
        .push_file("p1", &dir.path().join("missing.dat"))
        .await
        .unwrap_err();

    assert!(matches!(err, ToposError::FileNotFound(_)));
    assert_eq!(err.exit_code_value(), topos::error::EXIT_FILE_NOT_FOUND);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_file_without_location_is_protocol_violation() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("input.dat");
    fs::write(&file, "x").unwrap();

    let mut server = Server::new_async().await;
    let _mock = server
        .mock("PUT", path("pools/p1/nextToken").as_str())
        .with_status(200)
        .with_body("\n")
        .create_async()
        .await;

    let err = client_for(&server).push_file("p1", &file).await.unwrap_err();
    assert!(matches!(err, ToposError::ProtocolViolation(_)));
}

#[tokio::test]
async fn test_lines_from_file_posts_file_content() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("params.txt");
    fs::write(&file, "a 1\nb 2\n").unwrap();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", path("pools/p1/tokens/").as_str())
        .match_body("a 1\nb 2\n")
        .create_async()
        .await;

    client_for(&server)
        .push_lines_from_file("p1", &file)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_dir_sends_one_multipart_request() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("job-a.sh"), "echo a").unwrap();
    fs::write(dir.path().join("job-b.sh"), "echo b").unwrap();
    fs::create_dir(dir.path().join("skipped")).unwrap();
    fs::write(dir.path().join("skipped").join("job-c.sh"), "echo c").unwrap();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", path("pools/p1/tokens/").as_str())
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("filename=\"job-a.sh\"".to_string()),
            Matcher::Regex("filename=\"job-b.sh\"".to_string()),
            Matcher::Regex("echo a".to_string()),
            Matcher::Regex("echo b".to_string()),
        ]))
        .expect(1)
        .create_async()
        .await;

    client_for(&server)
        .push_directory("p1", dir.path())
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_dir_skips_nested_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("top.txt"), "top").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested").join("deep.txt"), "deep").unwrap();

    let mut server = Server::new_async().await;
    let with_nested = server
        .mock("POST", path("pools/p1/tokens/").as_str())
        .match_body(Matcher::Regex("deep.txt".to_string()))
        .expect(0)
        .create_async()
        .await;
    let without_nested = server
        .mock("POST", path("pools/p1/tokens/").as_str())
        .match_body(Matcher::Regex("top.txt".to_string()))
        .expect(1)
        .create_async()
        .await;

    client_for(&server)
        .push_directory("p1", dir.path())
        .await
        .unwrap();

    with_nested.assert_async().await;
    without_nested.assert_async().await;
}

#[tokio::test]
async fn test_upload_dir_requires_directory() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").unwrap();

    let server = Server::new_async().await;
    let client = client_for(&server);

    let not_dir = client.push_directory("p1", &file).await.unwrap_err();
    assert!(matches!(not_dir, ToposError::InvalidArgument(_)));

    let missing = client
        .push_directory("p1", &dir.path().join("absent"))
        .await
        .unwrap_err();
    assert!(matches!(missing, ToposError::InvalidArgument(_)));
}
