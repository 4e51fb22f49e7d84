//! Program core: pure planning and rewrite rules for static program exports.
mod conference;
mod plan;
mod rewrite;
mod stage;
mod strip;

pub use conference::{
    ConferenceSnapshot, Day, EntityId, Event, EventParticipation, EventRole, EventState, Person,
    RoleState,
};
pub use plan::{plan_paths, renderer_path, PathSpec, WHOLE_PROGRAM_PAGES};
pub use rewrite::{
    export_base_path, AssetPathSet, ElementKind, ReferenceRewriter, PROGRAM_STYLESHEET,
};
pub use stage::ExportStage;
pub use strip::{has_extension, has_numeric_query, PathStripper};
