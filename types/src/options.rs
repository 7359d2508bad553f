//! General addon options
//!
//! Stored separately from the overlay document through `confy`, since they
//! describe the addon rather than the user's grids.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralOptions {
    /// Restore the document's last selected layout on launch
    pub remember_layout: bool,
    /// Minimum delay between two writes of the overlay document
    pub save_delay_ms: u64,
    /// Upper bound of draw instances emitted per frame
    pub instance_capacity: usize,
    /// Use the filtered (smoother) icon sampling in the render sink
    pub better_filtering: bool,
    /// Overrides the default document location
    pub document_path: Option<PathBuf>,
}

impl Default for GeneralOptions {
    fn default() -> Self {
        Self {
            remember_layout: false,
            save_delay_ms: 1000,
            instance_capacity: 1024,
            better_filtering: false,
            document_path: None,
        }
    }
}
