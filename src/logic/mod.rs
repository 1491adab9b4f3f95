//! Logic Module - Classification & Decision Engines
//!
//! - `store/` - flow record persistence (SQLite)
//! - `threat/` - label rules and the batch classifier
//! - `scorer/` - semantic scorers (zero-shot endpoint, offline heuristic)
//! - `environment/` - replayable decision episodes
//! - `policy/` - observation -> action mappings (ONNX, table)
//! - `pipeline/` - orchestration and reporting

// Core modules
pub mod store;
pub mod threat;
pub mod scorer;
pub mod environment;
pub mod policy;
pub mod pipeline;

// Delegated stages
pub mod index;
pub mod collector;

#[cfg(test)]
pub(crate) mod testing;
