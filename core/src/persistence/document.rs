//! Conversion between the persisted document and the live models
//!
//! Loading never fails as a whole: each dangling reference degrades only the
//! entity holding it and is recorded in the [`LoadReport`].

use clarity_types::OverlayDocument;

use crate::catalog::BuffCatalog;
use crate::grids::{Grid, GridModel, LoadReport};
use crate::layouts::{Layout, LayoutSet};
use crate::styles::StyleSet;

/// Everything the editing surface can change
#[derive(Debug, Clone, Default)]
pub struct Models {
    pub grids: GridModel,
    pub styles: StyleSet,
    pub layouts: LayoutSet,
}

impl Models {
    /// Resolve a document against the catalog. The document's current
    /// layout is selected only when `restore_layout` is set.
    pub fn from_document(doc: &OverlayDocument, catalog: &BuffCatalog, restore_layout: bool) -> (Self, LoadReport) {
        let mut report = LoadReport::default();

        // Styles first: items resolve their style names against them
        let mut styles = StyleSet::from_configs(&doc.styles);

        let mut grids = GridModel::from_grids(
            doc.buff_grids
                .iter()
                .map(|g| Grid::from_config(g, catalog, &styles, &mut report))
                .collect(),
        );

        // Legacy `buff_sets` entries follow the current `layouts`
        let mut layouts = LayoutSet::from_layouts(
            doc.layouts
                .iter()
                .chain(&doc.buff_sets)
                .map(|l| Layout::from_config(l, &grids, &mut report))
                .collect(),
        );

        if restore_layout
            && let Some(name) = &doc.current_layout
            && layouts.find(name).and_then(|index| layouts.select(Some(index)).ok()).is_none()
        {
            tracing::warn!(layout = %name, "Remembered layout no longer exists");
        }

        // Names resolved above bind to the first match, later repeats are renamed
        for repeated in [styles.dedupe_names(), grids.dedupe_names(), layouts.dedupe_names()] {
            for name in repeated {
                tracing::warn!(%name, "Duplicate name in saved document, renaming");
                report.duplicate_names.push(name);
            }
        }

        tracing::info!(
            grids = grids.len(),
            styles = styles.len(),
            layouts = layouts.len(),
            degraded = !report.is_clean(),
            "Loaded overlay document"
        );

        (
            Self {
                grids,
                styles,
                layouts,
            },
            report,
        )
    }

    pub fn to_document(&self, catalog: &BuffCatalog) -> OverlayDocument {
        OverlayDocument {
            buff_grids: self
                .grids
                .grids()
                .iter()
                .map(|g| g.to_config(catalog, &self.styles))
                .collect(),
            styles: self.styles.to_configs(),
            layouts: self
                .layouts
                .layouts()
                .iter()
                .map(|l| l.to_config(&self.grids))
                .collect(),
            current_layout: self.layouts.current().map(|l| l.name.clone()),
            buff_sets: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BuffHandle, CatalogBuilder};

    const DOC: &str = r#"{
        "buff_grids": [
            { "name": "Boons", "items": [
                { "pos": [0, 0], "buff_id": 740, "style": "Stacks" },
                { "pos": [1, 0], "buff_id": 424242 }
            ] },
            { "name": "Conditions", "attached": true, "central_weight": 0.25, "items": [] }
        ],
        "styles": [
            { "name": "Stacks", "thresholds": [ { "min": 1, "max": 24 }, { "min": 25, "tint": [1, 0, 0, 1] } ] },
            { "name": "Default", "thresholds": [ { "min": 0, "max": 0, "tint": [1, 1, 1, 0.2] } ] }
        ],
        "buff_sets": [
            { "name": "Raid", "grids": [1, 0], "combat_only": true },
            { "name": "Open World", "grids": ["Boons", "Gone"] }
        ],
        "current_layout": "Open World"
    }"#;

    fn catalog() -> BuffCatalog {
        let mut b = CatalogBuilder::new();
        b.category(&["Boons"]);
        b.buff(740, "Might", 25);
        b.build()
    }

    #[test]
    fn test_load_resolves_and_degrades() {
        let doc: OverlayDocument = serde_json::from_str(DOC).unwrap();
        let (models, report) = Models::from_document(&doc, &catalog(), true);

        // user "Default" hoisted to 0, "Stacks" follows
        assert_eq!(models.styles.styles()[0].name(), "Default");
        assert!(models.styles.styles()[0].is_built_in());
        assert_eq!(models.grids.item(0, 0).unwrap().style, 1);

        assert_eq!(models.grids.item(0, 1).unwrap().buff, BuffHandle::UNKNOWN);
        assert_eq!(report.unknown_buffs, vec![424242]);
        assert_eq!(report.missing_grids, vec!["Gone".to_string()]);

        assert_eq!(models.layouts.len(), 2);
        assert_eq!(models.layouts.current().map(|l| l.name.as_str()), Some("Open World"));
        assert!(models.layouts.layouts()[0].combat_only);
    }

    #[test]
    fn test_sets_merge_after_layouts() {
        let json = r#"{
            "buff_grids": [ { "name": "Boons", "items": [] } ],
            "layouts": [ { "name": "Raid", "grids": ["Boons"] } ],
            "buff_sets": [ { "name": "Fractal", "grids": [0] }, { "name": "Raid", "grids": [] } ],
            "current_layout": "Fractal"
        }"#;
        let doc: OverlayDocument = serde_json::from_str(json).unwrap();
        let (models, report) = Models::from_document(&doc, &catalog(), true);

        let names: Vec<&str> = models.layouts.layouts().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Raid", "Fractal", "Raid (2)"]);
        assert_eq!(report.duplicate_names, vec!["Raid".to_string()]);
        assert_eq!(models.layouts.current_index(), Some(1));
        assert!(models.layouts.layouts()[1].grids.contains(&0));
    }

    #[test]
    fn test_restore_disabled_leaves_no_selection() {
        let doc: OverlayDocument = serde_json::from_str(DOC).unwrap();
        let (models, _) = Models::from_document(&doc, &catalog(), false);
        assert!(models.layouts.current().is_none());
    }

    #[test]
    fn test_save_writes_names() {
        let doc: OverlayDocument = serde_json::from_str(DOC).unwrap();
        let catalog = catalog();
        let (models, _) = Models::from_document(&doc, &catalog, true);

        let saved = models.to_document(&catalog);

        assert_eq!(saved.styles[0].name, "Default");
        assert_eq!(saved.buff_grids[0].items[0].style, "Stacks");
        assert_eq!(saved.buff_grids[0].items[1].buff_id, crate::catalog::INVALID_ID);
        assert_eq!(
            saved.layouts[0].grids,
            vec![
                clarity_types::GridRef::Name("Boons".into()),
                clarity_types::GridRef::Name("Conditions".into())
            ]
        );
        assert_eq!(saved.current_layout.as_deref(), Some("Open World"));

        let json = serde_json::to_string(&saved).unwrap();
        assert!(json.contains("\"layouts\""));
        assert!(!json.contains("buff_sets"));
    }
}
