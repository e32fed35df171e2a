//! End-to-end stdio framing: newline-delimited requests in, responses out.

use std::fs;
use std::path::Path;

use css_tutor_mcp_server::config::ServerConfig;
use css_tutor_mcp_server::context::ServerContext;
use css_tutor_mcp_server::server::McpServer;

fn test_server(dir: &Path) -> McpServer {
    let memory_path = dir.join("memory.json");
    fs::write(&memory_path, r#"{"user_id":"u1","known_concepts":{}}"#).unwrap();
    let config = ServerConfig {
        memory_path,
        upstream: None,
    };
    McpServer::new(ServerContext::new(&config).unwrap())
}

/// Feed `input` through the server and return one parsed value per output line.
async fn run_session(server: &mut McpServer, input: &str) -> Vec<serde_json::Value> {
    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn requests_before_initialize_are_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let mut server = test_server(tmp.path());

    let responses = run_session(
        &mut server,
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n",
    )
    .await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["error"]["code"], -32600);
    assert_eq!(responses[0]["error"]["message"], "Server not initialized");
}

#[tokio::test]
async fn full_session_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let mut server = test_server(tmp.path());

    let input = [
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"write_to_memory","arguments":{"concept":"grid","known":true}}}"#,
        r#"{"jsonrpc":"2.0","id":"three","method":"resources/read","params":{"uri":"memory://css_knowledge_memory/"}}"#,
    ]
    .join("\n")
        + "\n";

    let responses = run_session(&mut server, &input).await;

    assert_eq!(responses.len(), 3, "notification and blank line get no response");
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "css-tutor-mcp-server");

    assert_eq!(responses[1]["id"], 2);
    assert_eq!(
        responses[1]["result"]["content"][0]["text"],
        "Memory updated successfully for concept: grid"
    );

    assert_eq!(responses[2]["id"], "three");
    assert_eq!(
        responses[2]["result"]["contents"][0]["text"],
        r#"{"user_id":"u1","known_concepts":{"grid":true}}"#
    );
}

#[tokio::test]
async fn malformed_lines_get_parse_errors_and_session_continues() {
    let tmp = tempfile::tempdir().unwrap();
    let mut server = test_server(tmp.path());

    let input = [
        "this is not json",
        r#"{"jsonrpc":"1.0","id":1,"method":"initialize"}"#,
        r#"{"jsonrpc":"2.0","id":2,"method":"initialize"}"#,
        r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#,
    ]
    .join("\n")
        + "\n";

    let responses = run_session(&mut server, &input).await;

    assert_eq!(responses.len(), 4);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert_eq!(responses[1]["error"]["code"], -32600);
    assert_eq!(responses[2]["id"], 2);
    assert!(responses[2].get("result").is_some());
    assert_eq!(responses[3]["result"], serde_json::json!({}));
}

#[tokio::test]
async fn oversize_line_is_rejected_and_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let mut server = test_server(tmp.path());

    let input = format!(
        "{}\n{}\n{}\n",
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#,
        "a".repeat(1024 * 1024 + 10),
        r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
    );
    // Small buffer so the rest of the long line is drained over many reads.
    let reader = tokio::io::BufReader::with_capacity(4096, input.as_bytes());
    let mut output = Vec::new();
    server.serve(reader, &mut output).await.unwrap();

    let responses: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["error"]["code"], -32700);
    assert_eq!(responses[2]["id"], 2);
    assert_eq!(responses[2]["result"], serde_json::json!({}));
}

#[tokio::test]
async fn oversize_line_without_newline_ends_session() {
    let tmp = tempfile::tempdir().unwrap();
    let mut server = test_server(tmp.path());

    let input = format!(
        "{}\n{}",
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#,
        "b".repeat(1024 * 1024 + 1),
    );
    let responses = run_session(&mut server, &input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[1]["error"]["code"], -32700);
}
