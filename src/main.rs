//! Host shim: runs one tool call read from stdin and prints the result.
//!
//! `knowledge-query definitions` prints the registered function signatures.

use std::env;
use std::io::Read;
use std::sync::Arc;

use anyhow::Context;

use knowledge_query::core::logging;
use knowledge_query::tools::{self, KnowledgeTool, ToolCall};
use knowledge_query::{AppPaths, ConfigService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths);

    if env::args().nth(1).as_deref() == Some("definitions") {
        println!("{}", serde_json::to_string_pretty(&tools::definitions())?);
        return Ok(());
    }

    let config = ConfigService::new(paths.clone())
        .load_config()
        .context("Failed to load config")?;

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read tool call from stdin")?;
    let call: ToolCall = serde_json::from_str(&input).context("Malformed tool call")?;

    let knowledge = KnowledgeTool::open(&paths, &config)
        .await
        .context("Failed to open knowledge base")?;

    let output = tools::execute_tool(&knowledge, &call.name, &call.arguments)
        .await
        .with_context(|| format!("Tool {} failed", call.name))?;
    print!("{}", output);

    Ok(())
}
