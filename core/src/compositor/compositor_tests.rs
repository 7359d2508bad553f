//! Frame composition scenarios

use std::collections::BTreeSet;

use glam::{IVec2, Vec2};

use clarity_types::Appearance;

use super::*;
use crate::catalog::CatalogBuilder;
use crate::styles::{Style, Threshold};

const SCREEN: Vec2 = Vec2::new(1920.0, 1080.0);

fn catalog() -> BuffCatalog {
    let mut b = CatalogBuilder::new();
    b.category(&["Boons"]);
    b.buff(740, "Might", 25);
    b.buff(725, "Fury", 1);
    b.buff(1187, "Quickness", 5);
    b.buff(30328, "Alacrity", 99);
    b.build()
}

fn frame<'a>(active: ActiveGrids<'a>) -> FrameInput<'a> {
    FrameInput {
        screen: SCREEN,
        mouse: MouseState::at(SCREEN * 0.5),
        time_secs: 0.0,
        active,
        edit: EditTarget::None,
        test_mouse_mode: false,
        fake_count: 1,
        creating_item: None,
    }
}

fn item(catalog: &BuffCatalog, id: u32, x: i32) -> Item {
    Item {
        pos: IVec2::new(x, 0),
        buff: catalog.resolve(id).unwrap(),
        ..Item::default()
    }
}

fn single_grid(items: Vec<Item>) -> GridModel {
    GridModel::from_grids(vec![Grid {
        items,
        ..Grid::default()
    }])
}

fn compose(catalog: &BuffCatalog, styles: &StyleSet, grids: &GridModel, live: &LiveStacks, frame: &FrameInput<'_>) -> InstanceBatch {
    let mut batch = InstanceBatch::default();
    InstanceCompositor::new(catalog, styles, grids, live).compose(frame, &mut batch);
    batch
}

#[test]
fn test_overflow_truncates_at_capacity() {
    let catalog = catalog();
    let styles = StyleSet::new();
    let items = (0..1030).map(|x| item(&catalog, 740, x)).collect();
    let grids = single_grid(items);
    let live: LiveStacks = [(740, 3)].into_iter().collect();

    let batch = compose(&catalog, &styles, &grids, &live, &frame(ActiveGrids::All));

    assert_eq!(batch.len(), 1024);
    assert_eq!(batch.dropped(), 6);
}

#[test]
fn test_zero_count_hidden_unless_edited() {
    let catalog = catalog();
    let styles = StyleSet::new();
    let grids = single_grid(vec![item(&catalog, 740, 0), item(&catalog, 725, 1)]);
    let live: LiveStacks = [(725, 1)].into_iter().collect();

    let batch = compose(&catalog, &styles, &grids, &live, &frame(ActiveGrids::All));
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.instances()[0].uv, catalog.get(catalog.resolve(725).unwrap()).icon);

    let mut editing = frame(ActiveGrids::Edit(0));
    editing.edit = EditTarget::Item { grid: 0, item: 0 };
    editing.fake_count = 0;
    let batch = compose(&catalog, &styles, &grids, &live, &editing);
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.instances()[0].tint[3], 0.0);
}

#[test]
fn test_visible_zero_count_style_is_drawn() {
    let catalog = catalog();
    let mut styles = StyleSet::new();
    let missing = Appearance {
        tint: [1.0, 0.0, 0.0, 0.5],
        ..Appearance::default()
    };
    let warn = styles.add(Style::new("Missing", vec![Threshold::new(0, 0, missing)]));
    let grids = single_grid(vec![Item {
        style: warn,
        ..item(&catalog, 1187, 0)
    }]);

    let batch = compose(&catalog, &styles, &grids, &LiveStacks::new(), &frame(ActiveGrids::All));

    assert_eq!(batch.len(), 1);
    assert_eq!(batch.instances()[0].tint, missing.tint);
}

#[test]
fn test_number_overlay_clamping() {
    let catalog = catalog();
    let styles = StyleSet::new();
    let grids = single_grid(vec![
        item(&catalog, 740, 0),
        item(&catalog, 725, 1),
        item(&catalog, 1187, 2),
        item(&catalog, 30328, 3),
    ]);
    let live: LiveStacks = [(740, 30), (725, 4), (1187, 1), (30328, 40)].into_iter().collect();

    let batch = compose(&catalog, &styles, &grids, &live, &frame(ActiveGrids::All));
    let instances = batch.instances();

    assert_eq!(instances.len(), 4);
    assert!(instances[0].shows_number());
    assert_eq!(Some(instances[0].number_uv), number_uv(25));
    assert!(!instances[1].shows_number());
    assert!(!instances[2].shows_number());
    assert_eq!(Some(instances[3].number_uv), number_uv(MAX_NUMBER));
}

#[test]
fn test_positions_are_normalized() {
    let catalog = catalog();
    let styles = StyleSet::new();
    let grids = single_grid(vec![item(&catalog, 725, 1)]);
    let live: LiveStacks = [(725, 1)].into_iter().collect();

    let batch = compose(&catalog, &styles, &grids, &live, &frame(ActiveGrids::All));
    let [x, y, w, h] = batch.instances()[0].pos_dims;

    assert_eq!(x, 1024.0 / 1920.0);
    assert_eq!(y, 0.5);
    assert_eq!(w, 64.0 / 1920.0);
    assert_eq!(h, 64.0 / 1080.0);
}

#[test]
fn test_attached_grids_skip_when_mouse_off_screen() {
    let catalog = catalog();
    let styles = StyleSet::new();
    let grids = GridModel::from_grids(vec![
        Grid {
            attached: true,
            items: vec![item(&catalog, 725, 0)],
            ..Grid::default()
        },
        Grid {
            items: vec![item(&catalog, 725, 0)],
            ..Grid::default()
        },
    ]);
    let live: LiveStacks = [(725, 1)].into_iter().collect();

    let mut off = frame(ActiveGrids::All);
    off.mouse = MouseState::at(Vec2::new(-5.0, 300.0));
    assert_eq!(compose(&catalog, &styles, &grids, &live, &off).len(), 1);

    off.mouse = MouseState::at(Vec2::new(5.0, 300.0));
    assert_eq!(compose(&catalog, &styles, &grids, &live, &off).len(), 2);
}

#[test]
fn test_layout_membership_selects_grids() {
    let catalog = catalog();
    let styles = StyleSet::new();
    let grids = GridModel::from_grids(
        (0..3)
            .map(|_| Grid {
                items: vec![item(&catalog, 725, 0)],
                ..Grid::default()
            })
            .collect(),
    );
    let live: LiveStacks = [(725, 1)].into_iter().collect();
    let members: BTreeSet<usize> = [0, 2, 7].into_iter().collect();

    let batch = compose(&catalog, &styles, &grids, &live, &frame(ActiveGrids::Layout(&members)));
    assert_eq!(batch.len(), 2);
    assert!(compose(&catalog, &styles, &grids, &live, &frame(ActiveGrids::None)).is_empty());
}

#[test]
fn test_creating_item_drawn_at_center() {
    let catalog = catalog();
    let styles = StyleSet::new();
    let grids = single_grid(vec![]);
    let creating = item(&catalog, 740, 5);

    let mut editing = frame(ActiveGrids::Edit(0));
    editing.edit = EditTarget::CreatingItem(0);
    editing.fake_count = 3;
    editing.creating_item = Some(&creating);

    let batch = compose(&catalog, &styles, &grids, &LiveStacks::new(), &editing);

    assert_eq!(batch.len(), 1);
    let instance = batch.instances()[0];
    assert_eq!(&instance.pos_dims[..2], &[0.5, 0.5]);
    assert_eq!(Some(instance.number_uv), number_uv(3));
}

#[test]
fn test_probe_lists_matches_dimming_inactive() {
    let catalog = catalog();
    let styles = StyleSet::new();
    let grids = GridModel::new();
    let live: LiveStacks = [(725, 1)].into_iter().collect();

    let batch = compose(&catalog, &styles, &grids, &live, &frame(ActiveGrids::Probe("boons")));
    assert_eq!(batch.len(), 4);

    let fury = catalog.get(catalog.resolve(725).unwrap()).icon;
    for instance in batch.instances() {
        if instance.uv == fury {
            assert_eq!(instance.tint[3], 1.0);
        } else {
            assert_eq!(instance.tint[3], 0.35);
        }
    }

    assert!(compose(&catalog, &styles, &grids, &live, &frame(ActiveGrids::Probe("xyz"))).is_empty());
}

#[test]
fn test_glow_pulse_applied_at_draw_time() {
    let catalog = catalog();
    let mut styles = StyleSet::new();
    let glowing = Appearance {
        glow: [0.0, 1.0, 0.0, 1.0],
        glow_size: 10.0,
        glow_pulse: [0.5, 1.0],
        ..Appearance::plain()
    };
    let id = styles.add(Style::new("Glow", vec![Threshold::new(1, i32::MAX, glowing)]));
    let grids = single_grid(vec![Item {
        style: id,
        ..item(&catalog, 725, 0)
    }]);
    let live: LiveStacks = [(725, 1)].into_iter().collect();

    let mut f = frame(ActiveGrids::All);
    f.time_secs = 0.25;
    let peak = compose(&catalog, &styles, &grids, &live, &f).instances()[0];
    f.time_secs = 0.75;
    let trough = compose(&catalog, &styles, &grids, &live, &f).instances()[0];

    assert!((peak.glow_size - 10.0).abs() < 1e-4);
    assert!((trough.glow_size - 5.0).abs() < 1e-4);
    assert_eq!(peak.glow_color, [0.0, 1.0, 0.0, 1.0]);
}

#[test]
fn test_style_preview_fills_surface() {
    let catalog = catalog();
    let styles = StyleSet::new();
    let might = catalog.resolve(740).unwrap();
    let mut batch = InstanceBatch::with_capacity(1);

    compose_style_preview(&catalog, &styles, might, 0, 7, 0.0, &mut batch);

    let instance = batch.instances()[0];
    assert_eq!(instance.pos_dims, [0.0, 0.0, 1.0, 1.0]);
    assert_eq!(Some(instance.number_uv), number_uv(7));

    batch.clear();
    compose_style_preview(&catalog, &styles, might, 0, -1, 0.0, &mut batch);
    assert!(batch.is_empty());
}
