//! CLI 命令实现

pub mod prompts;
pub mod serve;

pub use prompts::prompts_command;
pub use serve::serve_command;
pub use test::test_command;
