use pathlock_core::{Path, Preset};

/// One entry handed to a locker: a single path or a whole preset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allow {
    Path(Path),
    Preset(Preset),
}

impl From<Path> for Allow {
    fn from(path: Path) -> Self {
        Allow::Path(path)
    }
}

impl From<&Path> for Allow {
    fn from(path: &Path) -> Self {
        Allow::Path(path.clone())
    }
}

impl From<Preset> for Allow {
    fn from(preset: Preset) -> Self {
        Allow::Preset(preset)
    }
}
