pub mod types;
pub mod eval;
pub mod session;

pub use types::*;
pub use eval::{ConstantTable, EvalError, Evaluator, NamedStore};
pub use session::{Config, OutputMode, Session, SessionError};
