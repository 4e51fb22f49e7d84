use std::fmt;

/// Steps of an export run, in the only order they can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExportStage {
    Start,
    VisibilityForced,
    DirectoryReset,
    PagesDownloaded,
    AssetsCopied,
    IndexCreated,
    VisibilityRestored,
    Done,
}

impl ExportStage {
    pub const SEQUENCE: [ExportStage; 8] = [
        ExportStage::Start,
        ExportStage::VisibilityForced,
        ExportStage::DirectoryReset,
        ExportStage::PagesDownloaded,
        ExportStage::AssetsCopied,
        ExportStage::IndexCreated,
        ExportStage::VisibilityRestored,
        ExportStage::Done,
    ];

    /// Stages that only occur when the schedule had to be forced public.
    pub fn is_visibility_step(self) -> bool {
        matches!(
            self,
            ExportStage::VisibilityForced | ExportStage::VisibilityRestored
        )
    }

    /// The stage following `self` for a run that does or does not force visibility.
    pub fn next(self, forces_visibility: bool) -> Option<ExportStage> {
        let position = Self::SEQUENCE.iter().position(|stage| *stage == self)?;
        Self::SEQUENCE[position + 1..]
            .iter()
            .copied()
            .find(|stage| forces_visibility || !stage.is_visibility_step())
    }
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportStage::Start => "start",
            ExportStage::VisibilityForced => "visibility-forced",
            ExportStage::DirectoryReset => "directory-reset",
            ExportStage::PagesDownloaded => "pages-downloaded",
            ExportStage::AssetsCopied => "assets-copied",
            ExportStage::IndexCreated => "index-created",
            ExportStage::VisibilityRestored => "visibility-restored",
            ExportStage::Done => "done",
        };
        f.write_str(name)
    }
}
