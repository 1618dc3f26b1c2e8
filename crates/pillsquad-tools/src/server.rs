//! MCP server exposing the tool box and prompt catalogue over stdio

use crate::prompts::{self, PROMPTS};
use crate::toolbox::{format_extract_report, ToolBox};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, GetPromptRequestParam, GetPromptResult,
    Implementation, JsonObject, ListPromptsResult, ListToolsResult, PaginatedRequestParam,
    Prompt, PromptArgument, PromptMessage, PromptMessageRole, ServerCapabilities, ServerInfo,
    Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

const INSTRUCTIONS: &str = "건강기능식품 판매 페이지를 분석하는 도구 모음입니다. \
식약처 인증 제품 조회, 판매자 분류, 이미지 분석, 웹페이지 텍스트/이미지 추출을 제공합니다.";

#[derive(Clone)]
pub struct PillSquadServer {
    toolbox: Arc<ToolBox>,
}

impl PillSquadServer {
    pub fn new(toolbox: Arc<ToolBox>) -> Self {
        Self { toolbox }
    }

    /// Run one tool by name
    pub async fn dispatch(
        &self,
        name: &str,
        args: &JsonObject,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = name, "tool call");
        let tb = &self.toolbox;

        let text = match name {
            "predict_company_label" => {
                tb.predict_company_label(
                    &optional(args, "company"),
                    &optional(args, "ceo"),
                    &optional(args, "address"),
                )
                .await
            }
            "analyze_image" => tb.analyze_image(&required(args, "image_path")?).await,
            "check_certified_product" => {
                tb.check_certified_product(&required(args, "product_name")?)
            }
            "download_image" => {
                let url = required(args, "url")?;
                let save_path = optional(args, "save_path");
                let save_path = (!save_path.is_empty()).then_some(save_path.as_str());
                match tb.download_image(&url, save_path).await {
                    Ok(path) => path.display().to_string(),
                    Err(e) => return Ok(tool_error(name, e)),
                }
            }
            "crawl_image_urls_selenium" => {
                match tb.crawl_image_urls(&required(args, "page_url")?).await {
                    Ok(urls) => urls.join("\n"),
                    Err(e) => return Ok(tool_error(name, e)),
                }
            }
            "extract_text_with_bs4" => {
                let page_url = required(args, "page_url")?;
                match tb.extract_text(&page_url).await {
                    Ok(result) => format_extract_report(&result),
                    Err(e) => {
                        warn!(tool = name, "page fetch failed: {}", e);
                        format!("❌ 웹페이지 요청 실패: {e}")
                    }
                }
            }
            "analyze_images_from_url" => {
                match tb.analyze_images_from_url(&required(args, "page_url")?).await {
                    Ok(report) => report,
                    Err(e) => return Ok(tool_error(name, e)),
                }
            }
            other => {
                return Err(ErrorData::invalid_params(
                    format!("unknown tool: {other}"),
                    None,
                ))
            }
        };

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Render a catalogue prompt with the supplied arguments
    pub fn render_prompt(
        &self,
        name: &str,
        args: Option<&JsonObject>,
    ) -> Result<GetPromptResult, ErrorData> {
        let prompt = prompts::find(name).ok_or_else(|| {
            ErrorData::invalid_params(format!("unknown prompt: {name}"), None)
        })?;

        let values: HashMap<String, String> = args
            .map(|a| {
                a.iter()
                    .map(|(k, v)| (k.clone(), value_text(v)))
                    .collect()
            })
            .unwrap_or_default();

        Ok(GetPromptResult {
            description: Some(prompt.description.to_string()),
            messages: vec![PromptMessage::new_text(
                PromptMessageRole::User,
                prompt.render(&values),
            )],
        })
    }
}

impl ServerHandler for PillSquadServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(tool_definitions()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let args = request.arguments.unwrap_or_default();
        self.dispatch(&request.name, &args).await
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        Ok(ListPromptsResult::with_all_items(prompt_definitions()))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        self.render_prompt(&request.name, request.arguments.as_ref())
    }
}

/// Tool descriptors with their JSON input schemas
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        Tool::new(
            "predict_company_label",
            "회사명, 대표자명, 주소를 기반으로 외국계 기업 여부를 예측합니다.",
            schema(
                &[
                    ("company", "회사명"),
                    ("ceo", "대표자명"),
                    ("address", "주소"),
                ],
                &[],
            ),
        ),
        Tool::new(
            "analyze_image",
            "이미지 파일을 외부 API로 전송하여 분석 결과를 반환합니다.",
            schema(&[("image_path", "분석할 이미지 파일 경로")], &["image_path"]),
        ),
        Tool::new(
            "check_certified_product",
            "제품명이 식약처 인증 제품인지 확인합니다.",
            schema(&[("product_name", "확인할 제품명")], &["product_name"]),
        ),
        Tool::new(
            "download_image",
            "이미지 URL의 이미지를 image/ 폴더에 저장하고 저장된 파일 경로를 반환합니다.",
            schema(
                &[("url", "이미지 URL"), ("save_path", "저장 파일명(옵션)")],
                &["url"],
            ),
        ),
        Tool::new(
            "crawl_image_urls_selenium",
            "브라우저로 웹페이지를 열어 이미지 URL 목록을 한 줄에 하나씩 반환합니다.",
            schema(&[("page_url", "웹페이지 URL")], &["page_url"]),
        ),
        Tool::new(
            "extract_text_with_bs4",
            "웹페이지에서 주요 텍스트만 추출하고, 텍스트 내에 식약처 인증 제품명이 포함되어 있는지 검사합니다.",
            schema(&[("page_url", "크롤링할 웹페이지 URL")], &["page_url"]),
        ),
        Tool::new(
            "analyze_images_from_url",
            "웹페이지의 이미지를 모두 다운로드하여 각 이미지를 분석합니다.",
            schema(&[("page_url", "웹페이지 URL")], &["page_url"]),
        ),
    ]
}

fn prompt_definitions() -> Vec<Prompt> {
    PROMPTS
        .iter()
        .map(|p| {
            let arguments = p
                .arguments
                .iter()
                .filter_map(|name| {
                    serde_json::from_value::<PromptArgument>(json!({
                        "name": name,
                        "required": false,
                    }))
                    .ok()
                })
                .collect();
            Prompt::new(p.name, Some(p.description), Some(arguments))
        })
        .collect()
}

fn schema(properties: &[(&str, &str)], required: &[&str]) -> Arc<JsonObject> {
    let props: JsonObject = properties
        .iter()
        .map(|(name, description)| {
            (
                name.to_string(),
                json!({ "type": "string", "description": description }),
            )
        })
        .collect();

    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(props));
    schema.insert("required".to_string(), json!(required));
    Arc::new(schema)
}

fn required(args: &JsonObject, key: &str) -> Result<String, ErrorData> {
    match args.get(key) {
        Some(Value::Null) | None => Err(ErrorData::invalid_params(
            format!("missing argument: {key}"),
            None,
        )),
        Some(v) => Ok(value_text(v)),
    }
}

fn optional(args: &JsonObject, key: &str) -> String {
    args.get(key).map(value_text).unwrap_or_default()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn tool_error(tool: &str, e: pillsquad_core::Error) -> CallToolResult {
    warn!(tool, "tool failed: {}", e);
    CallToolResult::error(vec![Content::text(e.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names() {
        let names: Vec<String> = tool_definitions()
            .iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(
            names,
            [
                "predict_company_label",
                "analyze_image",
                "check_certified_product",
                "download_image",
                "crawl_image_urls_selenium",
                "extract_text_with_bs4",
                "analyze_images_from_url",
            ]
        );
    }

    #[test]
    fn test_schema_shape() {
        let s = schema(&[("url", "이미지 URL"), ("save_path", "저장 파일명")], &["url"]);
        assert_eq!(s["type"], "object");
        assert_eq!(s["properties"]["url"]["type"], "string");
        assert_eq!(s["required"], json!(["url"]));
    }

    #[test]
    fn test_prompt_definitions_cover_catalogue() {
        let prompts = prompt_definitions();
        assert_eq!(prompts.len(), PROMPTS.len());
        assert_eq!(prompts[1].arguments.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn test_argument_text() {
        let mut args = JsonObject::new();
        args.insert("a".to_string(), json!("텍스트"));
        args.insert("b".to_string(), json!(42));
        args.insert("c".to_string(), Value::Null);

        assert_eq!(required(&args, "a").unwrap(), "텍스트");
        assert_eq!(required(&args, "b").unwrap(), "42");
        assert!(required(&args, "c").is_err());
        assert!(required(&args, "d").is_err());
        assert_eq!(optional(&args, "d"), "");
    }
}
