pub mod builtins;
pub mod control_flow;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod parser;

pub use builtins::Registry;
pub use control_flow::Exec;
pub use environment::Environment;
pub use error::OmniError;
pub use evaluator::{parse_program, run_source, Interpreter};
pub use parser::Parser;
