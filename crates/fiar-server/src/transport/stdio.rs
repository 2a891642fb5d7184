//! stdio transport for MCP JSON-RPC

use crate::FiarServer;
use crate::mcp::{
    InitializeParams, InitializeResult, PROTOCOL_VERSION, Request, RequestId, ResourcesCapability,
    Response, ServerCapabilities, ServerInfo, ToolsCapability,
};
use crate::tools::{handle_tool_call, list_tools};
use fiar_core::{FiarError, Result, error_codes};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

const GAMES_URI: &str = "fiar://games";
const SERVER_URI: &str = "fiar://server";

/// Run the MCP server on stdio
pub async fn run(server: FiarServer) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    info!("fiar MCP server starting on stdio");
    serve(&server, reader, writer).await
}

/// Serve newline-delimited JSON-RPC from `reader`, answering on `writer`,
/// until the reader reaches EOF
pub async fn serve<R, W>(server: &FiarServer, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let bytes_read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|e| FiarError::Io(format!("Failed to read stdin: {}", e)))?;

        if bytes_read == 0 {
            info!("Client disconnected (EOF)");
            break;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                warn!("Skipping line that is not valid UTF-8: {}", e);
                continue;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!("Received: {}", trimmed);

        let request: Request = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                continue;
            }
        };

        let Some(response) = handle_request(&request, server) else {
            debug!("Notification {} needs no response", request.method);
            continue;
        };

        let response_json = serde_json::to_string(&response)?;
        debug!("Sending: {}", response_json);

        writer
            .write_all(response_json.as_bytes())
            .await
            .map_err(|e| FiarError::Io(format!("Failed to write stdout: {}", e)))?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|e| FiarError::Io(format!("Failed to write newline: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| FiarError::Io(format!("Failed to flush stdout: {}", e)))?;
    }

    Ok(())
}

/// Dispatch one request. Notifications produce no response.
pub fn handle_request(request: &Request, server: &FiarServer) -> Option<Response> {
    let Some(id) = request.id.clone() else {
        if !request.method.starts_with("notifications/") {
            warn!("Ignoring {} sent without an id", request.method);
        }
        return None;
    };

    let response = match request.method.as_str() {
        "initialize" => handle_initialize(id, request, server),
        "ping" => Response::success(id, serde_json::json!({})),
        "tools/list" => handle_tools_list(id),
        "tools/call" => handle_tools_call(id, request, server),
        "resources/list" => handle_resources_list(id),
        "resources/read" => handle_resources_read(id, request, server),
        _ => Response::error(
            id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", request.method),
        ),
    };
    Some(response)
}

fn handle_initialize(id: RequestId, request: &Request, server: &FiarServer) -> Response {
    let params: InitializeParams = match serde_json::from_value(request.params.clone()) {
        Ok(p) => p,
        Err(e) => {
            return Response::error(
                id,
                error_codes::INVALID_PARAMS,
                format!("Invalid initialize params: {}", e),
            );
        }
    };
    info!(
        "Client {} v{} connected (protocol {})",
        params.client_info.name, params.client_info.version, params.protocol_version
    );

    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: ToolsCapability {
                list_changed: false,
            },
            resources: ResourcesCapability {
                subscribe: false,
                list_changed: false,
            },
        },
        server_info: ServerInfo {
            name: server.config().name.clone(),
            version: server.config().version.clone(),
        },
    };

    match serde_json::to_value(result) {
        Ok(value) => Response::success(id, value),
        Err(e) => Response::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
    }
}

fn handle_tools_list(id: RequestId) -> Response {
    let tools = list_tools();
    Response::success(id, serde_json::json!({ "tools": tools }))
}

fn handle_tools_call(id: RequestId, request: &Request, server: &FiarServer) -> Response {
    #[derive(serde::Deserialize)]
    struct ToolCallParams {
        name: String,
        #[serde(default)]
        arguments: serde_json::Value,
    }

    let params: ToolCallParams = match serde_json::from_value(request.params.clone()) {
        Ok(p) => p,
        Err(e) => {
            return Response::error(
                id,
                error_codes::INVALID_PARAMS,
                format!("Invalid tool call params: {}", e),
            );
        }
    };

    // Tools without arguments may omit them entirely
    let arguments = if params.arguments.is_null() {
        serde_json::json!({})
    } else {
        params.arguments
    };

    handle_tool_call(&params.name, arguments, id, server.registry())
}

fn handle_resources_list(id: RequestId) -> Response {
    let resources = vec![
        serde_json::json!({
            "uri": GAMES_URI,
            "name": "Games",
            "description": "Every game currently in the store",
            "mimeType": "application/json"
        }),
        serde_json::json!({
            "uri": SERVER_URI,
            "name": "Server Info",
            "description": "Server name and version",
            "mimeType": "application/json"
        }),
    ];

    Response::success(id, serde_json::json!({ "resources": resources }))
}

fn handle_resources_read(id: RequestId, request: &Request, server: &FiarServer) -> Response {
    #[derive(serde::Deserialize)]
    struct ReadParams {
        uri: String,
    }

    let params: ReadParams = match serde_json::from_value(request.params.clone()) {
        Ok(p) => p,
        Err(e) => {
            return Response::error(
                id,
                error_codes::INVALID_PARAMS,
                format!("Invalid read params: {}", e),
            );
        }
    };

    let content = match params.uri.as_str() {
        GAMES_URI => serde_json::to_value(server.registry().list_games()),
        SERVER_URI => Ok(serde_json::json!({
            "name": server.config().name,
            "version": server.config().version,
            "games": server.registry().count()
        })),
        _ => {
            return Response::error(
                id,
                error_codes::INVALID_PARAMS,
                format!("Unknown resource: {}", params.uri),
            );
        }
    };

    match content {
        Ok(content) => Response::success(
            id,
            serde_json::json!({
                "contents": [{
                    "uri": params.uri,
                    "mimeType": "application/json",
                    "text": content.to_string()
                }]
            }),
        ),
        Err(e) => Response::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
    }
}
