use crate::common::NavigationResult;

use super::layout::FloorLayout;

/// Port the navigation domain uses to obtain floor layouts.
/// Adapters provide filesystem or scene-backed sources.
pub trait FloorLayoutSource: Send + Sync {
    fn load_layout(&self, name: &str) -> NavigationResult<FloorLayout>;
    fn list_layouts(&self) -> NavigationResult<Vec<String>>;
}
