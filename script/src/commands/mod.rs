//! Subcommands of the `passport-disclose` binary.

pub mod calldata;
pub mod inputs;
pub mod verify;

pub use calldata::CalldataCommand;
pub use inputs::InputsCommand;
pub use verify::VerifyCommand;
