use rmcp::schemars;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::executor::{self, CommandResult, CommandSpec, OutputSink};
use crate::request::{optional_path, require, Validatable};

/// Request parameters for running an external command
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableCommand {
    /// The executable to invoke, e.g. "mvn"
    #[serde(default)]
    pub command: Option<String>,
    /// Directory to run the command in; inherits the server's when empty
    #[serde(default)]
    pub working_directory: Option<String>,
    /// Path of the executable file to launch, e.g. "/usr/local/bin/mvn"
    #[serde(default)]
    pub command_path: Option<String>,
    /// Arguments passed to the command as separate tokens
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
}

impl Validatable for ExecutableCommand {
    type Valid = CommandSpec;

    fn validate(self) -> Result<CommandSpec> {
        let command = require("command", self.command)?;
        let arguments = self
            .arguments
            .ok_or_else(|| Error::invalid("`arguments` is required"))?;

        let mut spec = CommandSpec::new(command).args(arguments);
        spec.command_path = optional_path(self.command_path);
        if let Some(dir) = optional_path(self.working_directory) {
            spec = spec.current_dir(dir);
        }
        Ok(spec)
    }
}

/// Validate a request and run it to completion
pub fn execute(req: ExecutableCommand, sink: &dyn OutputSink) -> Result<CommandResult> {
    let spec = req.validate()?;
    executor::execute(&spec, sink)
}
