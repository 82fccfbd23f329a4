use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, ServerHandler,
};
use serde::Serialize;

use crate::error;
use crate::executor::{CommandResult, OutputSink};
use crate::tools::{files, process, system, Environment, ExecutableCommand, ListFilesQuery};

/// MCP server exposing the file, process and system tools over stdio
#[derive(Clone)]
pub struct HostToolsServer {
    sink: Arc<dyn OutputSink>,
    env: Arc<dyn Environment>,
    tool_router: ToolRouter<Self>,
}

impl HostToolsServer {
    pub fn new(sink: Arc<dyn OutputSink>, env: Arc<dyn Environment>) -> Self {
        Self {
            sink,
            env,
            tool_router: Self::tool_router(),
        }
    }
}

/// Render a tool result as JSON text, or as an `Error:` line
fn to_text<T: Serialize>(result: error::Result<T>) -> String {
    match result.map(|value| serde_json::to_string_pretty(&value)) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => format!("Error: {}", e),
        Err(e) => format!("Error: {}", e),
    }
}

const SERVER_INSTRUCTIONS: &str = r#"A host tools MCP server that lists directories, runs commands and reports the computer name.

- list_files: non-recursive listing of a directory as JSON records {name, size, lastModified, directory, file, hidden}
- execute_command: runs a command without a shell and returns {exitCode, output}, output being the combined stdout/stderr lines
- hostname: the value of COMPUTERNAME, empty when the host does not set it

Commands run to completion; there is no timeout."#;

#[rmcp::tool_router]
impl HostToolsServer {
    #[tool(description = "List the entries of a directory (not recursive).

Example: {\"directory\": \"/var/log\"}")]
    fn list_files(&self, Parameters(req): Parameters<ListFilesQuery>) -> String {
        to_text(files::list_files(req))
    }

    #[tool(description = "Run an external command and wait for it to exit. Arguments are passed as separate tokens, never through a shell. stdout and stderr are merged into one list of lines.

Example: {\"command\": \"git\", \"workingDirectory\": \"/repo\", \"arguments\": [\"status\", \"--short\"]}")]
    fn execute_command(&self, Parameters(req): Parameters<ExecutableCommand>) -> String {
        let result = process::execute(req, self.sink.as_ref()).unwrap_or_else(|e| {
            tracing::error!("error executing command: {}", e);
            CommandResult::failure(e.to_string())
        });
        to_text(Ok(result))
    }

    #[tool(description = "Report the host's computer name (COMPUTERNAME). Empty when the variable is not set.")]
    fn hostname(&self) -> String {
        system::hostname(self.env.as_ref()).unwrap_or_default()
    }
}

#[rmcp::tool_handler]
impl ServerHandler for HostToolsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::executor::TracingSink;
    use crate::tools::FileInfo;

    struct NoEnvironment;

    impl Environment for NoEnvironment {
        fn var(&self, _key: &str) -> Option<String> {
            None
        }
    }

    fn server() -> HostToolsServer {
        HostToolsServer::new(Arc::new(TracingSink), Arc::new(NoEnvironment))
    }

    #[test]
    fn test_execute_command_tool() {
        let req = ExecutableCommand {
            command: Some("echo".to_string()),
            arguments: Some(vec!["from".to_string(), "mcp".to_string()]),
            ..Default::default()
        };
        let text = server().execute_command(Parameters(req));
        let result: CommandResult = serde_json::from_str(&text).unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, vec!["from mcp"]);
    }

    #[test]
    fn test_execute_command_tool_failure() {
        let req = ExecutableCommand {
            command: Some("nonexistentcommand12345".to_string()),
            arguments: Some(vec![]),
            ..Default::default()
        };
        let text = server().execute_command(Parameters(req));
        let result: CommandResult = serde_json::from_str(&text).unwrap();
        assert_eq!(result.exit_code, -1);
        assert_eq!(result.output[0], "Error");
    }

    #[test]
    fn test_execute_command_tool_rejects_missing_arguments() {
        let req = ExecutableCommand {
            command: Some("echo".to_string()),
            ..Default::default()
        };
        let text = server().execute_command(Parameters(req));
        let result: CommandResult = serde_json::from_str(&text).unwrap();
        assert_eq!(result.exit_code, -1);
        assert!(result.output[1].contains("arguments"));
    }

    #[test]
    fn test_list_files_tool() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("one.txt"), "1").unwrap();
        let req = ListFilesQuery {
            directory: Some(temp_dir.path().to_string_lossy().to_string()),
        };
        let text = server().list_files(Parameters(req));
        let files: Vec<FileInfo> = serde_json::from_str(&text).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "one.txt");
    }

    #[test]
    fn test_list_files_tool_error() {
        let text = server().list_files(Parameters(ListFilesQuery::default()));
        assert!(text.starts_with("Error:"));
    }

    #[test]
    fn test_hostname_tool_absent() {
        assert_eq!(server().hostname(), "");
    }

    #[test]
    fn test_tool_handler_lists_all_tools() {
        let server = server();
        assert!(server.get_info().capabilities.tools.is_some());
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["execute_command", "hostname", "list_files"]);
    }

    #[test]
    fn test_to_text_error() {
        let text = to_text::<()>(Err(Error::invalid("nope")));
        assert_eq!(text, "Error: invalid argument: nope");
    }
}
