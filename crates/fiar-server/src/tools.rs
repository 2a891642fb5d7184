//! MCP tool handlers for four-in-a-row

use fiar_core::{
    Board, Cell, FiarError, GameId, InvalidRequest, Marker, Result, check_win, error_codes,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mcp::{RequestId, Response};
use crate::registry::GameRegistry;

/// Tool definition for MCP tools/list
#[derive(Debug, Clone, Serialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Get list of available tools
pub fn list_tools() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: "create_game".into(),
            description: "Create a new four-in-a-row game for two named players on a board of the given size. The starting player is chosen at random. Remember which name is player one and which is player two.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "playerOne": {
                        "type": "string",
                        "description": "Name of player one (marker 1)"
                    },
                    "playerTwo": {
                        "type": "string",
                        "description": "Name of player two (marker 2)"
                    },
                    "width": {
                        "type": "integer",
                        "description": "Number of columns. Example: 7",
                        "minimum": 1
                    },
                    "height": {
                        "type": "integer",
                        "description": "Number of rows. Example: 6",
                        "minimum": 1
                    }
                },
                "required": ["playerOne", "playerTwo", "width", "height"]
            }),
        },
        ToolDef {
            name: "get_game".into(),
            description: "Get the current state of a game. Example: {\"gameId\": \"3f1c...\"}".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "gameId": {
                        "type": "string",
                        "description": "The id returned by create_game"
                    }
                },
                "required": ["gameId"]
            }),
        },
        ToolDef {
            name: "make_move".into(),
            description: "Drop the player's marker into a column (0-based). Only the current player may move, and only while the game is in progress.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "gameId": {
                        "type": "string",
                        "description": "The id returned by create_game"
                    },
                    "player": {
                        "type": "string",
                        "description": "Name of the player making the move"
                    },
                    "column": {
                        "type": "integer",
                        "description": "Column index, 0 is the leftmost column"
                    }
                },
                "required": ["gameId", "player", "column"]
            }),
        },
        ToolDef {
            name: "check_win".into(),
            description: "Check whether a player has four in a row on the given board. Does not change any game.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "playerNumber": {
                        "type": "integer",
                        "description": "1 for player one, 2 for player two",
                        "enum": [1, 2]
                    },
                    "board": {
                        "type": "array",
                        "description": "Rows from top to bottom; each cell is 0 (empty), 1 or 2",
                        "items": {
                            "type": "array",
                            "items": { "type": "integer", "enum": [0, 1, 2] }
                        }
                    }
                },
                "required": ["playerNumber", "board"]
            }),
        },
        ToolDef {
            name: "list_games".into(),
            description: "List every game currently in the store".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDef {
            name: "reset_games".into(),
            description: "Delete every game in the store. This cannot be undone.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
    ]
}

/// Parameters for create_game
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameParams {
    #[serde(default)]
    pub player_one: Option<String>,
    #[serde(default)]
    pub player_two: Option<String>,
    pub width: i64,
    pub height: i64,
}

/// Parameters for get_game
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetGameParams {
    #[serde(default)]
    pub game_id: Option<String>,
}

/// Parameters for make_move
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeMoveParams {
    #[serde(default)]
    pub game_id: Option<String>,
    #[serde(default)]
    pub player: Option<String>,
    pub column: i64,
}

/// Parameters for check_win
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckWinParams {
    pub player_number: i64,
    pub board: Vec<Vec<i64>>,
}

/// Handle a tools/call request
pub fn handle_tool_call(
    name: &str,
    params: serde_json::Value,
    id: RequestId,
    registry: &GameRegistry,
) -> Response {
    debug!("Tool call {} with {}", name, params);

    let result = match name {
        "create_game" => handle_create_game(params, registry),
        "get_game" => handle_get_game(params, registry),
        "make_move" => handle_make_move(params, registry),
        "check_win" => handle_check_win(params),
        "list_games" => handle_list_games(registry),
        "reset_games" => handle_reset_games(registry),
        _ => Err(FiarError::Protocol(format!("Unknown tool: {}", name))),
    };

    match result {
        Ok(value) => Response::success(
            id,
            serde_json::json!({ "content": [{ "type": "text", "text": value.to_string() }] }),
        ),
        Err(e) => {
            debug!("Tool {} rejected: {}", name, e);
            let code = match &e {
                FiarError::InvalidRequest(_) => error_codes::INVALID_REQUEST,
                FiarError::Protocol(_) | FiarError::Serialization(_) => {
                    error_codes::INVALID_PARAMS
                }
                FiarError::Config(_) | FiarError::Io(_) => error_codes::INTERNAL_ERROR,
            };
            Response::error(id, code, e.to_string())
        }
    }
}

fn handle_create_game(
    params: serde_json::Value,
    registry: &GameRegistry,
) -> Result<serde_json::Value> {
    let p: CreateGameParams = serde_json::from_value(params)?;
    let game = registry.create_game(
        p.player_one.as_deref().unwrap_or_default(),
        p.player_two.as_deref().unwrap_or_default(),
        p.width,
        p.height,
    )?;
    Ok(serde_json::to_value(game)?)
}

fn handle_get_game(
    params: serde_json::Value,
    registry: &GameRegistry,
) -> Result<serde_json::Value> {
    let p: GetGameParams = serde_json::from_value(params)?;
    let game_id = parse_game_id(p.game_id.as_deref())?;
    let game = registry.get_game(&game_id)?;
    Ok(serde_json::to_value(game)?)
}

fn handle_make_move(
    params: serde_json::Value,
    registry: &GameRegistry,
) -> Result<serde_json::Value> {
    let p: MakeMoveParams = serde_json::from_value(params)?;
    let game_id = parse_game_id(p.game_id.as_deref())?;
    let game = registry.make_move(
        &game_id,
        p.player.as_deref().unwrap_or_default(),
        p.column,
    )?;
    Ok(serde_json::to_value(game)?)
}

fn handle_check_win(params: serde_json::Value) -> Result<serde_json::Value> {
    let p: CheckWinParams = serde_json::from_value(params)?;
    let marker = Marker::try_from(p.player_number)?;
    let board = parse_board(p.board)?;
    let status = check_win(marker, &board);
    Ok(serde_json::json!({ "status": status }))
}

fn handle_list_games(registry: &GameRegistry) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(registry.list_games())?)
}

fn handle_reset_games(registry: &GameRegistry) -> Result<serde_json::Value> {
    registry.reset();
    Ok(serde_json::json!({ "reset": true }))
}

/// Missing ids are a caller error; unparseable ids cannot name a stored game
fn parse_game_id(raw: Option<&str>) -> Result<GameId> {
    let raw = raw.filter(|s| !s.is_empty()).ok_or(InvalidRequest::MissingGameId)?;
    GameId::parse_str(raw).map_err(|_| InvalidRequest::GameNotFound(raw.to_string()).into())
}

fn parse_board(rows: Vec<Vec<i64>>) -> Result<Board> {
    let cells = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|value| {
                    u8::try_from(value)
                        .map_err(|_| {
                            InvalidRequest::MalformedBoard(format!(
                                "cell value {} is not 0, 1 or 2",
                                value
                            ))
                        })
                        .and_then(Cell::try_from)
                })
                .collect::<std::result::Result<Vec<Cell>, InvalidRequest>>()
        })
        .collect::<std::result::Result<Vec<Vec<Cell>>, InvalidRequest>>()?;
    Ok(Board::try_from(cells)?)
}
