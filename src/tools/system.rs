/// Environment variable holding the computer name. Only Windows sets it.
pub const COMPUTER_NAME_VAR: &str = "COMPUTERNAME";

/// Read access to the process environment
pub trait Environment: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real environment of the server process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// The host's computer name, `None` when the variable is not set
pub fn hostname(env: &dyn Environment) -> Option<String> {
    let name = env.var(COMPUTER_NAME_VAR);
    if name.is_none() {
        tracing::warn!("{COMPUTER_NAME_VAR} is not set on this host; no computer name to report");
    }
    name
}
