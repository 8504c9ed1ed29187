//! TypeScript intermediate representation and its emission.
//!
//! - `types`: the resolved type tree (TsType, TsPrimitive, TsParam)
//! - `emit`: type tree and model to code strings (via the `Emit` trait)
//! - `utils`: quoting and naming helpers shared by the emitter

mod emit;
mod types;
pub mod utils;

pub use emit::{Emit, emit_model};
pub use types::{TsParam, TsPrimitive, TsType};
