use serde::{Deserialize, Serialize};

use crate::data::Label;

/// Optional annotations attached to a saved network.
/// All fields are `Option` so snapshots without metadata load cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    pub description: Option<String>,
    /// Human-readable glyph names for the output layer, e.g. `["A", "B", "C"]`.
    pub output_labels: Option<Vec<String>>,
}

impl ModelMetadata {
    pub fn label_name(&self, label: Label) -> Option<&str> {
        let names = self.output_labels.as_ref()?;
        names.get(label.index()?).map(String::as_str)
    }
}
