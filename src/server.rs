//! Line-delimited JSON-RPC 2.0 server for MCP hosts.
//!
//! Each line on the input is one message; each reply is written as one line.
//! Requests are handled concurrently and answered as they complete.

use crate::error::code;
use crate::tools::Tools;
use crate::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// MCP revision announced during `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name announced during `initialize`.
pub const SERVER_NAME: &str = "taptools-server";

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct Response {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ProtocolError>,
}

impl Response {
    fn new(id: Value, outcome: Result<Value, ProtocolError>) -> Self {
        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(error) => (None, Some(error)),
        };
        Self {
            jsonrpc: "2.0",
            id,
            result,
            error,
        }
    }
}

/// Serves the tool catalogue over JSON-RPC.
#[derive(Debug, Clone)]
pub struct Server {
    tools: Tools,
}

impl Server {
    pub fn new(tools: Tools) -> Self {
        Self { tools }
    }

    /// Serves stdin/stdout until stdin closes.
    pub async fn serve_stdio(&self) -> io::Result<()> {
        self.serve(BufReader::new(io::stdin()), io::stdout()).await
    }

    /// Serves one connection until the reader reaches EOF.
    ///
    /// Each request runs on its own task, so a slow tool call does not hold
    /// up the messages behind it. Replies are written by this task alone, one
    /// line each, in completion order. After EOF, in-flight requests are
    /// still answered before returning.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading or writing fails.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(server = SERVER_NAME, "Serving MCP over stdio");

        let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
        let mut tx = Some(tx);
        let mut lines = reader.lines();

        loop {
            tokio::select! {
                line = lines.next_line(), if tx.is_some() => match line? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => {
                        if let Some(replies) = tx.clone() {
                            let server = self.clone();
                            tokio::spawn(async move {
                                if let Some(reply) = server.handle_line(&line).await {
                                    // Fails only once the writer has given up.
                                    let _ = replies.send(reply);
                                }
                            });
                        }
                    }
                    None => {
                        tracing::info!("Input closed, finishing in-flight requests");
                        tx = None;
                    }
                },
                reply = rx.recv() => match reply {
                    Some(reply) => write_line(&mut writer, &reply).await?,
                    None => break,
                },
            }
        }

        tracing::info!("Shutting down");
        Ok(())
    }

    /// Handles one raw message. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed JSON-RPC message");
                return Some(reply(
                    Value::Null,
                    Err(ProtocolError::new(
                        code::JSONRPC_PARSE_ERROR,
                        format!("Parse error: {}", e),
                    )),
                ));
            }
        };

        let request: Request = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                return Some(reply(
                    Value::Null,
                    Err(ProtocolError::new(
                        code::JSONRPC_INVALID_REQUEST,
                        format!("Invalid request: {}", e),
                    )),
                ));
            }
        };

        let Some(id) = request.id else {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        };
        if request.method.starts_with("notifications/") {
            return None;
        }

        let outcome = self.dispatch(&request.method, request.params).await;
        Some(reply(id, outcome))
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, ProtocolError> {
        tracing::debug!(method = method, "Handling request");

        match method {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            })),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": Tools::definitions() })),
            "tools/call" => {
                let params: CallParams = serde_json::from_value(params).map_err(|e| {
                    ProtocolError::new(
                        code::JSONRPC_INVALID_PARAMS,
                        format!("Invalid tools/call params: {}", e),
                    )
                })?;
                let text = self.tools.call(&params.name, params.arguments).await?;
                Ok(json!({ "content": [{ "type": "text", "text": text }] }))
            }
            other => Err(ProtocolError::new(
                code::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, reply: &Value) -> io::Result<()> {
    let mut encoded = serde_json::to_vec(reply).map_err(io::Error::other)?;
    encoded.push(b'\n');
    writer.write_all(&encoded).await?;
    writer.flush().await
}

fn reply(id: Value, outcome: Result<Value, ProtocolError>) -> Value {
    serde_json::to_value(Response::new(id, outcome)).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Client;

    fn server() -> Server {
        let client = Client::builder()
            .base_url("http://127.0.0.1:9")
            .unwrap()
            .api_key("test")
            .build()
            .unwrap();
        Server::new(Tools::new(client))
    }

    #[tokio::test]
    async fn test_initialize() {
        let reply = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();

        assert_eq!(reply["id"], 1);
        assert_eq!(reply["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(reply["result"]["serverInfo"]["name"], SERVER_NAME);
        assert!(reply["result"]["capabilities"]["tools"].is_object());
        assert!(reply.get("error").is_none());
    }

    #[tokio::test]
    async fn test_notifications_get_no_reply() {
        let server = server();
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","id":7,"method":"notifications/cancelled"}"#)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_ping() {
        let reply = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":"a","method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(reply["id"], "a");
        assert_eq!(reply["result"], json!({}));
    }

    #[tokio::test]
    async fn test_tools_list() {
        let reply = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await
            .unwrap();

        let tools = reply["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), Tools::definitions().len());
        assert!(tools.iter().all(|t| t["inputSchema"].is_object()));
    }

    #[tokio::test]
    async fn test_parse_error() {
        let reply = server().handle_line("{not json").await.unwrap();
        assert_eq!(reply["id"], Value::Null);
        assert_eq!(reply["error"]["code"], code::JSONRPC_PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_invalid_request() {
        let reply = server().handle_line(r#"{"id":3}"#).await.unwrap();
        assert_eq!(reply["error"]["code"], code::JSONRPC_INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let reply = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":4,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(reply["error"]["code"], code::METHOD_NOT_FOUND);
        assert_eq!(reply["error"]["message"], "Method not found: resources/list");
    }

    #[tokio::test]
    async fn test_tools_call_invalid_arguments() {
        let reply = server()
            .handle_line(
                r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"get_token_mcap","arguments":{}}}"#,
            )
            .await
            .unwrap();
        assert_eq!(reply["error"]["code"], code::INVALID_PARAMS);
        assert!(reply["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("[get_token_mcap] "));
    }

    #[tokio::test]
    async fn test_serve_writes_one_line_per_reply() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
            "\n",
        );
        let mut output = Vec::new();

        server().serve(input.as_bytes(), &mut output).await.unwrap();

        let mut ids: Vec<i64> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str::<Value>(l).unwrap()["id"].as_i64().unwrap())
            .collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }
}
