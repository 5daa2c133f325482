//! Line-delimited JSON-RPC server
//!
//! Reads one JSON message per line, handles requests in order, and writes
//! one response line per request. Notifications get no response. The loop
//! ends when the reader reaches EOF.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::protocol::{
    CallToolParams, RpcRequest, RpcResponse, JSONRPC_VERSION, SUPPORTED_PROTOCOL_VERSIONS,
};
use crate::tools::{Tool, ToolRegistry};

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "dovetail-mcp-server";

pub struct McpServer {
    tools: ToolRegistry,
}

impl McpServer {
    pub fn new(tools: ToolRegistry) -> Self {
        Self { tools }
    }

    /// Serve requests from `reader` until EOF
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await.context("Failed to read request")? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(line).await {
                let mut payload =
                    serde_json::to_vec(&response).context("Failed to serialize response")?;
                payload.push(b'\n');
                writer
                    .write_all(&payload)
                    .await
                    .context("Failed to write response")?;
                writer.flush().await.context("Failed to flush response")?;
            }
        }

        info!("Input closed, shutting down");
        Ok(())
    }

    /// Handle one raw message line
    pub async fn handle_line(&self, line: &str) -> Option<RpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Received malformed JSON");
                return Some(RpcResponse::parse_error(format!("Parse error: {}", e)));
            }
        };

        let id = value.get("id").cloned().filter(|id| !id.is_null());
        let request: RpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(RpcResponse::invalid_request(
                    id,
                    format!("Invalid request: {}", e),
                ))
            }
        };

        self.handle_request(request).await
    }

    /// Handle a decoded request, returning `None` for notifications
    pub async fn handle_request(&self, request: RpcRequest) -> Option<RpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(RpcResponse::invalid_request(
                request.id,
                format!("Unsupported jsonrpc version '{}'", request.jsonrpc),
            ));
        }

        if request.is_notification() {
            debug!(method = %request.method, "Received notification");
            return None;
        }

        if request.method.is_empty() {
            return Some(RpcResponse::invalid_request(request.id, "Missing method"));
        }

        debug!(method = %request.method, "Handling request");
        let id = request.id;

        let response = match request.method.as_str() {
            "initialize" => RpcResponse::success(id, initialize_result(request.params.as_ref())),
            "ping" => RpcResponse::success(id, json!({})),
            "tools/list" => match serde_json::to_value(self.tools.definitions()) {
                Ok(tools) => RpcResponse::success(id, json!({ "tools": tools })),
                Err(e) => RpcResponse::internal_error(id, e.to_string()),
            },
            "tools/call" => self.call_tool(id, request.params).await,
            other => RpcResponse::method_not_found(id, other),
        };

        Some(response)
    }

    async fn call_tool(&self, id: Option<Value>, params: Option<Value>) -> RpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => return RpcResponse::invalid_params(id, format!("Invalid params: {}", e)),
            None => return RpcResponse::invalid_params(id, "Missing params"),
        };

        let Some(tool) = Tool::from_name(&params.name) else {
            return RpcResponse::invalid_params(id, format!("Unknown tool: {}", params.name));
        };

        let result = self.tools.call(tool, params.arguments).await;
        match serde_json::to_value(result) {
            Ok(value) => RpcResponse::success(id, value),
            Err(e) => RpcResponse::internal_error(id, e.to_string()),
        }
    }
}

/// `initialize` result, echoing the client's protocol version when supported
fn initialize_result(params: Option<&Value>) -> Value {
    let requested = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str);
    let version = requested
        .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);

    json!({
        "protocolVersion": version,
        "capabilities": {
            "tools": { "listChanged": false }
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dovetail_api::DovetailClient;
    use dovetail_core::{BackoffKind, DovetailConfig, RetryPolicy};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server_for(base_url: String) -> McpServer {
        let mut config = DovetailConfig::default()
            .with_token(Some("token".to_string()))
            .with_base_url(Some(base_url));
        config.retry = RetryPolicy {
            max_retries: 0,
            delay: BackoffKind::Constant,
            base_delay_ms: 1,
        };
        McpServer::new(ToolRegistry::new(DovetailClient::new(&config).unwrap()))
    }

    fn offline_server() -> McpServer {
        server_for("http://127.0.0.1:9/api/v1".to_string())
    }

    async fn run(server: &McpServer, input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_initialize_reports_server_info() {
        let responses = run(
            &offline_server(),
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"0"}}}"#,
        )
        .await;

        assert_eq!(responses.len(), 1);
        let result = &responses[0]["result"];
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_initialize_falls_back_to_latest_version() {
        let responses = run(
            &offline_server(),
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"1999-01-01"}}"#,
        )
        .await;

        assert_eq!(
            responses[0]["result"]["protocolVersion"],
            SUPPORTED_PROTOCOL_VERSIONS[0]
        );
    }

    #[tokio::test]
    async fn test_notifications_and_blank_lines_get_no_response() {
        let input = concat!(
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n   \n",
            r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#,
            "\n",
        );
        let responses = run(&offline_server(), input).await;

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], "p");
        assert_eq!(responses[0]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_tools_list() {
        let responses = run(
            &offline_server(),
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        )
        .await;

        let tools = responses[0]["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 7);
        assert!(tools.iter().all(|t| t["inputSchema"].is_object()));
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let responses = run(&offline_server(), "{not json\n").await;
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert!(responses[0]["id"].is_null());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let responses = run(
            &offline_server(),
            r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#,
        )
        .await;
        assert_eq!(responses[0]["error"]["code"], -32601);
        assert_eq!(responses[0]["id"], 3);
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let responses = run(
            &offline_server(),
            r#"{"jsonrpc":"1.0","id":4,"method":"ping"}"#,
        )
        .await;
        assert_eq!(responses[0]["error"]["code"], -32600);
        assert_eq!(responses[0]["id"], 4);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let responses = run(
            &offline_server(),
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"nope","arguments":{}}}"#,
        )
        .await;
        assert_eq!(responses[0]["error"]["code"], -32602);
        assert!(responses[0]["error"]["message"]
            .as_str()
            .unwrap()
            .contains("nope"));
    }

    #[tokio::test]
    async fn test_tools_call_without_params() {
        let responses = run(
            &offline_server(),
            r#"{"jsonrpc":"2.0","id":6,"method":"tools/call"}"#,
        )
        .await;
        assert_eq!(responses[0]["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_tools_call_round_trip() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/data/d1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "d1"}})))
            .mount(&mock)
            .await;

        let server = server_for(format!("{}/api/v1", mock.uri()));
        let responses = run(
            &server,
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"get_project_data","arguments":{"data_id":"d1"}}}"#,
        )
        .await;

        let result = &responses[0]["result"];
        assert!(result.get("isError").is_none());
        let text = result["content"][0]["text"].as_str().unwrap();
        let body: Value = serde_json::from_str(text).unwrap();
        assert_eq!(body, json!({"data": {"id": "d1"}}));
    }

    #[tokio::test]
    async fn test_tools_call_api_error_sets_is_error() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/insights/i1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock)
            .await;

        let server = server_for(format!("{}/api/v1", mock.uri()));
        let responses = run(
            &server,
            r#"{"jsonrpc":"2.0","id":8,"method":"tools/call","params":{"name":"get_project_insight","arguments":{"insight_id":"i1"}}}"#,
        )
        .await;

        let result = &responses[0]["result"];
        assert_eq!(result["isError"], true);
        assert_eq!(
            result["content"][0]["text"],
            "Dovetail API error: 500 Internal Server Error"
        );
    }

    #[tokio::test]
    async fn test_requests_answered_in_order() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#,
        );
        let responses = run(&offline_server(), input).await;

        let ids: Vec<_> = responses.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
    }
}
