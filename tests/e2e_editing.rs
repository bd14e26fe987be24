//! End-to-end tests for edit operations, undo/redo, and chain placement.

mod common;

use pretty_assertions::assert_eq;
use tubercle_rs::{
    Calibration, ChainPlacement, EditKind, Edge, EdgeKey, Editor, EditorConfig, Error, Point, PointId,
};

use common::hex_patch;

fn sorted_edges(editor: &Editor) -> Vec<Edge> {
    let mut edges = editor.state().edges().to_vec();
    edges.sort_by_key(|e| e.key());
    edges
}

fn snapshot(editor: &Editor) -> (Vec<Point>, Vec<Edge>) {
    (editor.state().points().to_vec(), sorted_edges(editor))
}

fn lattice_editor() -> Editor {
    let mut editor = Editor::default();
    let (points, pairs) = hex_patch(20.0, 5.0, editor.state().calibration());
    editor.load(points, &pairs);
    editor
}

// ============================================================================
// 1. Overlapping circles: edge distance clamps to zero
// ============================================================================

#[test]
fn test_overlap_clamped() {
    let mut editor = Editor::new(EditorConfig { um_per_pixel: 0.5, ..EditorConfig::default() });
    let a = editor.add_point(0.0, 0.0, Some(6.0));
    let b = editor.add_point(10.0, 0.0, Some(6.0));
    editor.connect(a, b).unwrap();

    let edge = editor.state().get_edge(a, b).unwrap();
    assert_eq!(edge.center_distance_um, 5.0);
    assert_eq!(edge.edge_distance_um, 0.0);
}

// ============================================================================
// 2. Deleting a point removes exactly its incident edges
// ============================================================================

#[test]
fn test_delete_point_removes_only_incident_edges() {
    let mut editor = lattice_editor();
    let center = PointId(10);
    let before = sorted_edges(&editor);
    let incident = editor.state().incident_edges(center).len();
    assert_eq!(incident, 6);

    assert!(editor.delete_point(center));
    let after = sorted_edges(&editor);

    assert_eq!(after.len(), before.len() - incident);
    assert!(after.iter().all(|e| !e.key().contains(center)));
    assert!(after.iter().all(|e| before.contains(e)));
}

// ============================================================================
// 3. Batch delete is one undo unit
// ============================================================================

#[test]
fn test_batch_delete_single_undo() {
    let mut editor = lattice_editor();
    let before = snapshot(&editor);
    let undo_depth = editor.history().undo_len();

    assert!(editor.batch_delete(
        &[PointId(10), PointId(1)],
        &[(PointId(5), PointId(6)), (PointId(10), PointId(11))],
    ));
    assert_eq!(editor.history().undo_len(), undo_depth + 1);
    assert_eq!(editor.state().points().len(), 17);

    assert_eq!(editor.undo(), Some(EditKind::BatchDelete));
    assert_eq!(snapshot(&editor), before);

    assert_eq!(editor.redo(), Some(EditKind::BatchDelete));
    assert_eq!(editor.state().points().len(), 17);
}

// ============================================================================
// 4. Undo/redo of every single-step edit
// ============================================================================

#[test]
fn test_undo_redo_each_edit_kind() {
    let mut editor = Editor::default();
    let a = editor.add_point(0.0, 0.0, Some(5.0));
    let b = editor.add_point(40.0, 0.0, Some(5.0));
    let c = editor.add_point(20.0, 30.0, Some(5.0));
    editor.connect(a, b).unwrap();
    editor.connect(b, c).unwrap();

    let edits: Vec<Box<dyn Fn(&mut Editor) -> bool>> = vec![
        Box::new(move |e: &mut Editor| e.move_point(a, 5.0, 5.0)),
        Box::new(move |e: &mut Editor| e.resize_point(b, 9.0)),
        Box::new(move |e: &mut Editor| e.delete_point(b)),
        Box::new(move |e: &mut Editor| e.delete_edge(c, b)),
        Box::new(move |e: &mut Editor| e.connect(a, c).unwrap().is_some()),
        Box::new(|e: &mut Editor| {
            e.add_point(100.0, 100.0, None);
            true
        }),
    ];

    for edit in edits {
        let before = snapshot(&editor);
        assert!(edit(&mut editor));
        let after = snapshot(&editor);
        assert!(before != after);

        editor.undo().unwrap();
        assert_eq!(snapshot(&editor), before);
        editor.redo().unwrap();
        assert_eq!(snapshot(&editor), after);
        editor.undo().unwrap();
    }
}

// ============================================================================
// 5. Moving to the same position twice is idempotent
// ============================================================================

#[test]
fn test_move_idempotent() {
    let mut editor = lattice_editor();
    editor.move_point(PointId(10), 3.0, 4.0);
    let once = snapshot(&editor);
    editor.move_point(PointId(10), 3.0, 4.0);
    assert_eq!(snapshot(&editor), once);
}

// ============================================================================
// 6. Edge snapshots follow resize and calibration
// ============================================================================

#[test]
fn test_edges_track_resize_and_calibration() {
    let mut editor = Editor::default();
    let a = editor.add_point(0.0, 0.0, Some(5.0));
    let b = editor.add_point(30.0, 0.0, Some(5.0));
    editor.connect(a, b).unwrap();

    editor.resize_point(b, 10.0);
    let gap = editor.state().get_edge(a, b).unwrap().edge_distance_um;
    assert!((gap - 15.0 * 0.14).abs() < 1e-12);

    editor.set_calibration(Calibration::new(1.0));
    assert_eq!(editor.state().get_edge(a, b).unwrap().edge_distance_um, 15.0);
    assert_eq!(editor.state().get_point(b).unwrap().diameter_um, 20.0);
}

// ============================================================================
// 7. Connect rejections
// ============================================================================

#[test]
fn test_connect_rejections() {
    let mut editor = Editor::default();
    let a = editor.add_point(0.0, 0.0, None);
    let b = editor.add_point(50.0, 0.0, None);

    assert!(matches!(editor.connect(a, a), Err(Error::SelfLoop(_))));
    assert_eq!(editor.connect(a, b).unwrap(), Some(EdgeKey::new(a, b)));
    assert!(matches!(editor.connect(b, a), Err(Error::DuplicateEdge(_))));
    assert_eq!(editor.connect(a, PointId(404)).unwrap(), None);
    assert_eq!(editor.history().undo_len(), 3);
}

// ============================================================================
// 8. Chain placement
// ============================================================================

#[test]
fn test_chain_three_clicks() {
    let mut editor = Editor::default();
    let p1 = editor.add_chain_point(0.0, 0.0);
    let p2 = editor.add_chain_point(100.0, 0.0);
    let p3 = editor.add_chain_point(200.0, 0.0);

    let (p1, p2, p3) = match (p1, p2, p3) {
        (
            ChainPlacement::Created { id: p1, edge: None },
            ChainPlacement::Created { id: p2, edge: Some(_) },
            ChainPlacement::Created { id: p3, edge: Some(_) },
        ) => (p1, p2, p3),
        other => panic!("unexpected placements: {other:?}"),
    };

    assert_eq!(editor.state().points().len(), 3);
    let pairs: Vec<(PointId, PointId)> = editor.state().edges().iter().map(|e| (e.id1, e.id2)).collect();
    assert_eq!(pairs, vec![(p1, p2), (p2, p3)]);

    let chain = editor.chain();
    assert_eq!(chain.parents().len(), 2);
    assert_eq!(chain.parent_of(p2), Some(p1));
    assert_eq!(chain.parent_of(p3), Some(p2));
    assert_eq!(chain.parent_of(p1), None);
    assert_eq!(chain.current(), Some(p3));
}

#[test]
fn test_chain_click_selects_existing() {
    let mut editor = Editor::default();
    editor.add_chain_point(0.0, 0.0);
    editor.add_chain_point(100.0, 0.0);

    // within 1.5 × radius (10 px) of the first point
    assert_eq!(editor.add_chain_point(12.0, 0.0), ChainPlacement::Selected(PointId(1)));
    assert_eq!(editor.chain().parent_of(PointId(1)), None);

    let placed = editor.add_chain_point(0.0, 100.0);
    assert_eq!(placed, ChainPlacement::Created { id: PointId(3), edge: Some(EdgeKey::new(PointId(1), PointId(3))) });
    assert_eq!(editor.chain().parent_of(PointId(3)), Some(PointId(1)));
}

#[test]
fn test_chain_undo_restores_cursor() {
    let mut editor = Editor::default();
    editor.add_chain_point(0.0, 0.0);
    editor.add_chain_point(100.0, 0.0);
    editor.add_chain_point(200.0, 0.0);

    assert_eq!(editor.undo(), Some(EditKind::AddChainPoint));
    assert_eq!(editor.state().points().len(), 2);
    assert_eq!(editor.state().edges().len(), 1);
    assert_eq!(editor.chain().current(), Some(PointId(2)));
    assert_eq!(editor.chain().parent_of(PointId(3)), None);

    assert_eq!(editor.redo(), Some(EditKind::AddChainPoint));
    assert_eq!(editor.state().edges().len(), 2);
    assert_eq!(editor.chain().current(), Some(PointId(3)));
    assert_eq!(editor.chain().parent_of(PointId(3)), Some(PointId(2)));
}

#[test]
fn test_chain_navigation() {
    let mut editor = Editor::default();
    editor.add_chain_point(0.0, 0.0);
    editor.add_chain_point(100.0, 0.0);
    editor.add_chain_point(200.0, 0.0);

    assert_eq!(editor.chain_to_parent().unwrap(), PointId(2));
    assert_eq!(editor.chain_cycle_neighbors().unwrap(), PointId(1));
    assert_eq!(editor.chain_cycle_neighbors().unwrap(), PointId(3));
    assert_eq!(editor.chain_to_cycled().unwrap(), PointId(3));
    assert_eq!(editor.chain_to_parent().unwrap(), PointId(2));
    assert_eq!(editor.chain_to_parent().unwrap(), PointId(1));
    assert!(matches!(editor.chain_to_parent(), Err(Error::AtRoot(_))));
}

#[test]
fn test_deleting_current_clears_cursor() {
    let mut editor = Editor::default();
    editor.add_chain_point(0.0, 0.0);
    editor.add_chain_point(100.0, 0.0);
    editor.delete_point(PointId(2));

    assert_eq!(editor.chain().current(), None);
    assert!(matches!(editor.chain_cycle_neighbors(), Err(Error::NoCurrent)));

    // next chain click starts a new root
    let placed = editor.add_chain_point(300.0, 0.0);
    assert_eq!(placed, ChainPlacement::Created { id: PointId(3), edge: None });
}

#[test]
fn test_deleting_chain_points_prunes_parents() {
    let mut editor = Editor::default();
    editor.add_chain_point(0.0, 0.0);
    editor.add_chain_point(100.0, 0.0);
    editor.add_chain_point(200.0, 0.0);
    assert_eq!(editor.chain().parents().len(), 2);

    editor.batch_delete(&[PointId(2), PointId(3)], &[]);
    assert!(editor.chain().parents().is_empty());

    // restored points come back as roots
    assert_eq!(editor.undo(), Some(EditKind::BatchDelete));
    assert_eq!(editor.state().points().len(), 3);
    assert_eq!(editor.chain().parent_of(PointId(3)), None);
}

// ============================================================================
// 9. Duplicating a set yields an independent state
// ============================================================================

#[test]
fn test_cloned_sets_are_independent() {
    let original = lattice_editor();
    let mut copy = original.clone();
    copy.delete_point(PointId(10));

    assert_eq!(original.state().points().len(), 19);
    assert_eq!(copy.state().points().len(), 18);
    assert_eq!(original.metrics().n_interior_nodes, 7);
    assert_eq!(copy.metrics().n_interior_nodes, 6);
    assert_eq!(copy.state().edges().len(), 24);
}
