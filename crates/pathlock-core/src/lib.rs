//! pathlock-core: rule model shared by the pathlock crates
//!
//! - Path rules (`kind:mode:path`) and their validation
//! - Mode to landlock access-right translation per ABI version
//! - Existence-filtered presets of common paths
//! - The lock failure policy and the error type

pub mod access;
pub mod error;
pub mod path;
pub mod preset;
pub mod safety;

pub use access::{Abi, AccessFs};
pub use error::{LockStage, PathlockError, Result};
pub use path::{is_proper_mode, is_proper_path, is_proper_type, Kind, Path};
pub use preset::{is_anchorable, Preset, PresetRegistry};
pub use safety::Safety;
