//! Rule evaluation: values, the per-run cache and the re-entrant engine.
pub mod context;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod logic;
pub mod reducer;
pub mod value;

pub use context::{Ctx, Handle, Members};
pub use engine::{Request, Simulation};
pub use error::EngineError;
pub use ledger::{CacheKey, EvalState, KeyId, Ledger, LedgerStats};
pub use reducer::Reducer;
pub use value::{Value, ValueType};
