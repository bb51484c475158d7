use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::common::{NavigationError, NavigationResult};
use crate::domains::navigation::layout::FloorLayout;
use crate::domains::navigation::ports::FloorLayoutSource;

const LAYOUT_DIR: &str = "layouts";

/// Reads floor layouts stored as JSON files under `<base>/layouts/`.
pub struct FilesystemLayoutSource {
    base: PathBuf,
}

impl FilesystemLayoutSource {
    /// Precedence when `base` is `None`: `FLOOR_NAV_DATA_DIR` ->
    /// `./resources/floor_nav` -> `/usr/share/floor-nav`.
    pub fn new(base: Option<PathBuf>) -> Self {
        let base = base.unwrap_or_else(|| {
            if let Ok(v) = env::var("FLOOR_NAV_DATA_DIR") {
                PathBuf::from(v)
            } else {
                let cwd_default = Path::new("resources/floor_nav");
                if cwd_default.exists() { cwd_default.to_path_buf() } else { PathBuf::from("/usr/share/floor-nav") }
            }
        });
        Self { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Writes `layout` as pretty JSON, creating the layout folder if needed.
    pub fn save_layout(&self, name: &str, layout: &FloorLayout) -> NavigationResult<()> {
        let dir = self.base.join(LAYOUT_DIR);
        fs::create_dir_all(&dir).map_err(|e| NavigationError::InfrastructureError(format!("{}", e)))?;
        let json = serde_json::to_string_pretty(layout)?;
        fs::write(dir.join(name), json).map_err(|e| NavigationError::InfrastructureError(format!("{}", e)))?;
        Ok(())
    }
}

impl FloorLayoutSource for FilesystemLayoutSource {
    fn load_layout(&self, name: &str) -> NavigationResult<FloorLayout> {
        let path = self.base.join(LAYOUT_DIR).join(name);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => NavigationError::LayoutNotFound { name: name.to_string() },
            _ => NavigationError::InfrastructureError(format!("{}: {}", path.display(), e)),
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Names of the `.json` files in the layout folder, sorted.
    fn list_layouts(&self) -> NavigationResult<Vec<String>> {
        let dir = self.base.join(LAYOUT_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir).map_err(|e| NavigationError::InfrastructureError(format!("{}", e)))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| NavigationError::InfrastructureError(format!("{}", e)))?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
