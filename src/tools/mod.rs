pub mod files;
pub mod process;
pub mod system;

pub use files::{FileInfo, ListFilesQuery};
pub use process::ExecutableCommand;
pub use system::{Environment, ProcessEnvironment};
