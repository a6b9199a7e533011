//! Template interpreters and the version dispatch in front of them.

pub mod hooks;
pub mod loader;
pub mod opcodes;
