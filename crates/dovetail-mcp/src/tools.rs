//! Tool registry
//!
//! Maps each MCP tool onto one Dovetail API endpoint. Tool input is
//! deserialized into the endpoint's parameter type, the call goes through
//! [`DovetailClient`], and the response body comes back as pretty-printed
//! JSON text. Failures are reported inside the tool result with `isError`
//! set so the agent host can see them.

use anyhow::{Context, Result};
use dovetail_api::{DataListParams, DovetailClient, InsightListParams, ProjectListParams};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::protocol::CallToolResult;

/// Tools exposed by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    GetProjectInsight,
    ListProjectInsights,
    GetDataContent,
    GetProjectData,
    ListProjectData,
    GetDovetailProjects,
    ListPersonalProjectInsights,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::GetProjectInsight,
        Tool::ListProjectInsights,
        Tool::GetDataContent,
        Tool::GetProjectData,
        Tool::ListProjectData,
        Tool::GetDovetailProjects,
        Tool::ListPersonalProjectInsights,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::GetProjectInsight => "get_project_insight",
            Tool::ListProjectInsights => "list_project_insights",
            Tool::GetDataContent => "get_data_content",
            Tool::GetProjectData => "get_project_data",
            Tool::ListProjectData => "list_project_data",
            Tool::GetDovetailProjects => "get_dovetail_projects",
            Tool::ListPersonalProjectInsights => "list_personal_project_insights",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    fn description(self) -> &'static str {
        match self {
            Tool::GetProjectInsight => "Get a specific insight by ID",
            Tool::ListProjectInsights => "List insights for a specific project",
            Tool::GetDataContent => "Get data content in markdown format",
            Tool::GetProjectData => "Get specific project data by ID",
            Tool::ListProjectData => "List data for a specific project",
            Tool::GetDovetailProjects => "Get all Dovetail projects",
            Tool::ListPersonalProjectInsights => "List insights for a specific user's projects",
        }
    }

    fn input_schema(self) -> Value {
        match self {
            Tool::GetProjectInsight => {
                id_schema("insight_id", "The ID of the insight to retrieve")
            }
            Tool::GetDataContent | Tool::GetProjectData => {
                id_schema("data_id", "The ID of the data to retrieve")
            }
            Tool::ListProjectInsights => list_schema(insight_filter_schema(), None),
            Tool::ListProjectData => list_schema(data_filter_schema(), None),
            Tool::GetDovetailProjects => list_schema(project_filter_schema(), None),
            Tool::ListPersonalProjectInsights => list_schema(
                insight_filter_schema(),
                Some(("user_id", "The ID of the user to list insights for")),
            ),
        }
    }

    pub fn definition(self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }
}

/// Entry of a `tools/list` response
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

fn id_schema(field: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            field: { "type": "string", "description": description }
        },
        "required": [field],
        "additionalProperties": false
    })
}

fn page_schema() -> Value {
    json!({
        "type": "object",
        "description": "Pagination parameters",
        "properties": {
            "start_cursor": { "type": "string", "description": "Cursor to start from" },
            "limit": {
                "type": "integer",
                "minimum": 0,
                "maximum": 100,
                "description": "Number of items per page (0-100)"
            }
        },
        "additionalProperties": false
    })
}

fn date_schema(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description,
        "pattern": r"^\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}:\d{2}(\.\d{6})?(Z|[+-]\d{4})?)?$"
    })
}

fn created_at_schema() -> Value {
    json!({
        "type": "object",
        "description": "Date filter parameters",
        "properties": {
            "gt": date_schema("Greater than date"),
            "gte": date_schema("Greater than or equal to date"),
            "lt": date_schema("Less than date"),
            "lte": date_schema("Less than or equal to date")
        },
        "additionalProperties": false
    })
}

fn project_id_schema() -> Value {
    json!({
        "description": "Project ID or array of project IDs",
        "anyOf": [
            { "type": "string", "description": "Single project ID" },
            {
                "type": "array",
                "items": { "type": "string" },
                "description": "Array of project IDs"
            }
        ]
    })
}

fn title_schema() -> Value {
    json!({
        "type": "object",
        "description": "Title filter parameters",
        "properties": {
            "contains": { "type": "string", "description": "Substring match" },
            "equal_to": { "type": "string", "description": "Exact match" }
        },
        "additionalProperties": false
    })
}

fn sort_schema() -> Value {
    json!({
        "description": "Sort parameters in format 'property:direction' or array of such strings",
        "anyOf": [
            { "type": "string" },
            { "type": "array", "items": { "type": "string" } }
        ]
    })
}

fn filter_schema(properties: Map<String, Value>) -> Value {
    json!({
        "type": "object",
        "description": "Filter parameters",
        "properties": properties,
        "additionalProperties": false
    })
}

fn insight_filter_schema() -> Value {
    let mut properties = Map::new();
    properties.insert("created_at".into(), created_at_schema());
    properties.insert("project_id".into(), project_id_schema());
    properties.insert(
        "published".into(),
        json!({ "type": "boolean", "description": "Filter by published status" }),
    );
    properties.insert("title".into(), title_schema());
    filter_schema(properties)
}

fn data_filter_schema() -> Value {
    let mut properties = Map::new();
    properties.insert("created_at".into(), created_at_schema());
    properties.insert("project_id".into(), project_id_schema());
    properties.insert("title".into(), title_schema());
    filter_schema(properties)
}

fn project_filter_schema() -> Value {
    let mut properties = Map::new();
    properties.insert("title".into(), title_schema());
    filter_schema(properties)
}

fn list_schema(filter: Value, path_param: Option<(&str, &str)>) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    if let Some((field, description)) = path_param {
        properties.insert(
            field.to_string(),
            json!({ "type": "string", "description": description }),
        );
        required.push(Value::from(field));
    }
    properties.insert("page".into(), page_schema());
    properties.insert("filter".into(), filter);
    properties.insert("sort".into(), sort_schema());

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct InsightIdArgs {
    insight_id: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DataIdArgs {
    data_id: String,
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).context("Invalid arguments")
}

/// Split `user_id` off the arguments, leaving the list parameters
fn split_user_id(arguments: Value) -> Result<(String, InsightListParams)> {
    let mut map = match arguments {
        Value::Object(map) => map,
        other => anyhow::bail!("Invalid arguments: expected an object, got {}", other),
    };

    let user_id = match map.remove("user_id") {
        Some(Value::String(id)) => id,
        Some(other) => anyhow::bail!("Invalid arguments: user_id must be a string, got {}", other),
        None => anyhow::bail!("Invalid arguments: missing field `user_id`"),
    };

    Ok((user_id, parse_args(Value::Object(map))?))
}

/// Executes tool calls against the Dovetail API
pub struct ToolRegistry {
    client: DovetailClient,
}

impl ToolRegistry {
    pub fn new(client: DovetailClient) -> Self {
        Self { client }
    }

    /// Definitions for `tools/list`
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        Tool::ALL.into_iter().map(Tool::definition).collect()
    }

    /// Run `tool` and wrap the outcome as a tool result
    pub async fn call(&self, tool: Tool, arguments: Option<Value>) -> CallToolResult {
        let arguments = arguments.unwrap_or_else(|| Value::Object(Map::new()));
        debug!(tool = tool.name(), "Calling tool");

        match self.dispatch(tool, arguments).await {
            Ok(body) => {
                let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
                CallToolResult::text(text)
            }
            Err(e) => {
                warn!(tool = tool.name(), error = %format!("{:#}", e), "Tool call failed");
                CallToolResult::error(format!("{:#}", e))
            }
        }
    }

    async fn dispatch(&self, tool: Tool, arguments: Value) -> Result<Value> {
        let body = match tool {
            Tool::GetProjectInsight => {
                let args: InsightIdArgs = parse_args(arguments)?;
                self.client.get_insight(&args.insight_id).await?
            }
            Tool::ListProjectInsights => {
                let params: InsightListParams = parse_args(arguments)?;
                self.client.list_insights(&params).await?
            }
            Tool::GetDataContent => {
                let args: DataIdArgs = parse_args(arguments)?;
                self.client.get_data_content(&args.data_id).await?
            }
            Tool::GetProjectData => {
                let args: DataIdArgs = parse_args(arguments)?;
                self.client.get_data(&args.data_id).await?
            }
            Tool::ListProjectData => {
                let params: DataListParams = parse_args(arguments)?;
                self.client.list_data(&params).await?
            }
            Tool::GetDovetailProjects => {
                let params: ProjectListParams = parse_args(arguments)?;
                self.client.list_projects(&params).await?
            }
            Tool::ListPersonalProjectInsights => {
                let (user_id, params) = split_user_id(arguments)?;
                self.client.list_user_insights(&user_id, &params).await?
            }
        };
        Ok(body)
    }
}
