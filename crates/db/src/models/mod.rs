//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` upsert/create DTO keyed on the mirrored identifier

pub mod audit;
pub mod dubbing;
pub mod identity;
pub mod presentation;
pub mod stats;
