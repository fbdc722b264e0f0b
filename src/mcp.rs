use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::chapters::{self, ErrorPolicy, SplitOptions, DEFAULT_PREFIX};
use crate::pdf::PdfDocument;
use crate::table::RangeTable;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CheckChaptersRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Chapter ranges, 1-based and inclusive (e.g., '3-20,21-76,907-end')")]
    pub ranges: String,
    #[schemars(description = "Directory the chapter files would be written to (default: '.')")]
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[schemars(description = "File name prefix; files are named <prefix>_<n>.pdf (default: 'chapter')")]
    pub prefix: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SplitChaptersRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Chapter ranges, 1-based and inclusive (e.g., '3-20,21-76,907-end')")]
    pub ranges: String,
    #[schemars(description = "Directory to write the chapter files to")]
    pub output_dir: String,
    #[schemars(description = "File name prefix; files are named <prefix>_<n>.pdf (default: 'chapter')")]
    pub prefix: Option<String>,
    #[schemars(description = "Keep processing remaining ranges after a failure (default: false)")]
    #[serde(default)]
    pub keep_going: bool,
    #[schemars(description = "Replace chapter files that already exist (default: false)")]
    #[serde(default)]
    pub force: bool,
}

fn default_output_dir() -> String {
    ".".to_string()
}

#[derive(Debug, Clone)]
pub struct ChapterServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl ChapterServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for ChapterServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl ChapterServer {
    #[tool(description = "Get the number of pages in a PDF")]
    fn pdf_page_count(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match PdfDocument::open(&path) {
            Ok(doc) => {
                let result = PageCountResult {
                    page_count: doc.page_count(),
                    path,
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Validate chapter page ranges against a PDF and list the files a split would write, without writing anything")]
    fn pdf_check_chapters(&self, Parameters(req): Parameters<CheckChaptersRequest>) -> String {
        let table = match RangeTable::from_inline(&req.ranges) {
            Ok(t) => t,
            Err(e) => return format!("Error: {}", e),
        };
        let doc = match PdfDocument::open(&req.path) {
            Ok(d) => d,
            Err(e) => return format!("Error: {}", e),
        };

        let options = SplitOptions {
            output_dir: PathBuf::from(req.output_dir),
            prefix: req.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            ..Default::default()
        };
        let plans = chapters::plan(&doc, &table.chapters, &options);
        serde_json::to_string_pretty(&plans).unwrap_or_else(|e| format!("Error: {}", e))
    }

    #[tool(description = "Split a PDF into one file per chapter page range. Returns a per-range report with the written files and any failures.")]
    fn pdf_split_chapters(&self, Parameters(req): Parameters<SplitChaptersRequest>) -> String {
        let table = match RangeTable::from_inline(&req.ranges) {
            Ok(t) => t,
            Err(e) => return format!("Error: {}", e),
        };
        let doc = match PdfDocument::open(&req.path) {
            Ok(d) => d,
            Err(e) => return format!("Error: {}", e),
        };

        let options = SplitOptions {
            output_dir: PathBuf::from(req.output_dir),
            prefix: req.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            policy: if req.keep_going {
                ErrorPolicy::Continue
            } else {
                ErrorPolicy::FailFast
            },
            overwrite: req.force,
            jobs: 1,
        };

        match chapters::split(&doc, &table.chapters, &options) {
            Ok(report) => {
                serde_json::to_string_pretty(&report).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageCountResult {
    pub path: String,
    pub page_count: u32,
}

impl ServerHandler for ChapterServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Split PDFs into chapters. Use pdf_page_count to learn how many pages a PDF has, \
                 pdf_check_chapters to validate 1-based inclusive page ranges, and \
                 pdf_split_chapters to write one PDF per range (named <prefix>_<n>.pdf)."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = ChapterServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
