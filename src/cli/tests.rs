//! Unit tests for CLI commands

use crate::cli::{execute, parse_header_args, Cli, Commands};
use clap::Parser;
use std::io::Write;
use tempfile::NamedTempFile;

const MANIFEST: &str = r#"
controllers:
  - name: pets
    mappings:
      - paths: [/pets]
    handlers:
      - name: get
        mappings:
          - methods: [GET]
            paths: ["/{id}"]
        params:
          - kind: path_variable
            name: id
          - kind: query_param
            name: verbose
            value_type: json
      - name: create
        mappings:
          - methods: [POST]
            paths: ["/"]
        params:
          - kind: request_body
        body_required: true
"#;

fn manifest_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(MANIFEST.as_bytes()).unwrap();
    file
}

async fn run(args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    execute(&cli, &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_dispatch_command_parses() {
    let cli = Cli::try_parse_from([
        "reqrouter",
        "dispatch",
        "--manifest",
        "routes.yaml",
        "-X",
        "POST",
        "--target",
        "/pets",
        "-H",
        "content-type: application/json",
        "-H",
        "x-a:1",
        "--body",
        "{}",
    ])
    .unwrap();

    match cli.command {
        Commands::Dispatch {
            manifest,
            method,
            headers,
            production,
            ..
        } => {
            assert_eq!(manifest.to_string_lossy(), "routes.yaml");
            assert_eq!(method, "POST");
            assert_eq!(headers.len(), 2);
            assert!(!production);
        }
        Commands::Routes { .. } => panic!("Expected Dispatch command"),
    }
}

#[test]
fn test_dispatch_requires_target() {
    assert!(Cli::try_parse_from(["reqrouter", "dispatch", "--manifest", "m.yaml"]).is_err());
}

#[test]
fn test_parse_header_args() {
    let headers = parse_header_args(&["Accept: text/html".into(), "x-empty:".into()]).unwrap();
    assert_eq!(headers.get_first("accept"), Some("text/html"));
    assert_eq!(headers.get_first("x-empty"), Some(""));
    assert!(parse_header_args(&["no-colon".into()]).is_err());
    assert!(parse_header_args(&[":value".into()]).is_err());
}

#[tokio::test]
async fn test_routes_command_lists_table() {
    let file = manifest_file();
    let output = run(&["reqrouter", "routes", "--manifest", file.path().to_str().unwrap()]).await;
    assert!(output.contains("/pets/{id}"));
    assert!(output.contains("pets.get"));
    assert!(output.contains("pets.create [body]"));
    assert!(output.ends_with("2 route(s)\n"));
}

#[tokio::test]
async fn test_dispatch_command_echoes_arguments() {
    let file = manifest_file();
    let output = run(&[
        "reqrouter",
        "dispatch",
        "--manifest",
        file.path().to_str().unwrap(),
        "--target",
        "/pets/7?verbose=true",
    ])
    .await;
    assert!(output.starts_with("HTTP/1.1 200 OK\n"));
    assert!(output.contains("Content-Type: application/json"));
    assert!(output.contains("\"handler\": \"get\""));
    assert!(output.contains("\"7\""));
}

#[tokio::test]
async fn test_dispatch_command_unknown_method_on_known_path() {
    let file = manifest_file();
    let output = run(&[
        "reqrouter",
        "dispatch",
        "--manifest",
        file.path().to_str().unwrap(),
        "-X",
        "DELETE",
        "--target",
        "/pets/7",
    ])
    .await;
    assert!(output.starts_with("HTTP/1.1 405 Method Not Allowed\n"));
}

#[tokio::test]
async fn test_dispatch_command_missing_manifest_fails() {
    let cli = Cli::try_parse_from([
        "reqrouter",
        "routes",
        "--manifest",
        "/definitely/not/here.yaml",
    ])
    .unwrap();
    let mut out = Vec::new();
    let err = execute(&cli, &mut out).await.unwrap_err();
    assert!(format!("{err:#}").contains("Failed to read manifest"));
}
