//! Source rewrites run by the DO-CO rule pack.
//!
//! - `fence`: tracks fenced code so rewrites skip it.
//! - `notes`: `<$>[kind]` note blocks.
//! - `highlight`: `<^>` inline highlights.

/// Fenced code tracking.
pub mod fence;
/// `<^>` inline highlights.
pub mod highlight;
/// `<$>[kind]` note blocks.
pub mod notes;
