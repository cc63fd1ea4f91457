use std::rc::Rc;

use kurbo::{Point, Rect};
use silhouette_core::strategy::{SIMPLE_RADIUS_FACTOR, SPACE};
use silhouette_core::{
    Direction, Exclusion, Glyph, LayoutDirection, MonospaceMeasurer, Node, PathShape,
    SilhouettePath, SilhouetteTracer, TextContent,
};

fn tracer() -> SilhouetteTracer {
    SilhouetteTracer::new(Rc::new(MonospaceMeasurer::new(10.0)))
}

fn visible_bounds(path: &SilhouettePath) -> Vec<Rect> {
    path.visible_shapes()
        .into_iter()
        .filter_map(PathShape::bounds)
        .collect()
}

/// Profile card: avatar and name on the left, a checkbox list on the right.
fn profile_card() -> Node {
    Node::container(
        Rect::new(0.0, 0.0, 200.0, 120.0),
        vec![
            Node::generic(Rect::new(8.0, 8.0, 48.0, 48.0)).with_id("avatar"),
            Node::text(
                Rect::new(8.0, 56.0, 96.0, 112.0),
                TextContent::new("Ada\nLovelace", 20.0),
            )
            .with_id("name"),
            Node::container(
                Rect::new(100.0, 0.0, 200.0, 120.0),
                vec![
                    Node::checkbox(
                        Rect::new(0.0, 0.0, 100.0, 40.0),
                        Some(Glyph {
                            width: 32.0,
                            height: 32.0,
                        }),
                        TextContent::new("Email", 20.0),
                    ),
                    Node::radio_button(
                        Rect::new(0.0, 40.0, 100.0, 80.0),
                        Some(Glyph {
                            width: 32.0,
                            height: 32.0,
                        }),
                        TextContent::new("Post", 20.0),
                    ),
                    Node::button(Rect::new(0.0, 80.0, 100.0, 120.0)),
                ],
            )
            .with_id("settings"),
        ],
    )
}

#[test]
fn bounds_match_root_size_when_everything_is_visible() {
    let trees = [
        profile_card(),
        Node::generic(Rect::new(0.0, 0.0, 64.0, 32.0)),
        Node::container(
            Rect::new(0.0, 0.0, 300.0, 50.0),
            vec![Node::text(
                Rect::new(10.0, 10.0, 40.0, 30.0),
                TextContent::new("wider than its box", 20.0),
            )],
        ),
        Node::container(Rect::new(0.0, 0.0, 80.0, 80.0), vec![])
            .with_direction(LayoutDirection::RightToLeft),
    ];

    for tree in &trees {
        let silhouette = tracer().trace(tree);
        assert_eq!(silhouette.width(), tree.width());
        assert_eq!(silhouette.height(), tree.height());
    }
}

#[test]
fn excluded_subtree_contributes_no_geometry() {
    let tree = profile_card();
    let full = tracer().trace(&tree);
    let excluded = tracer()
        .with_exclusion(Exclusion::ids(["settings"]))
        .trace(&tree);

    let settings_area = Rect::new(100.0, 0.0, 200.0, 120.0);
    assert!(visible_bounds(&full.path)
        .iter()
        .any(|b| b.intersect(settings_area).area() > 0.0));
    assert!(visible_bounds(&excluded.path)
        .iter()
        .all(|b| b.intersect(settings_area).area() == 0.0));

    // The excluded node still reserves its box.
    assert_eq!(excluded.bounds, full.bounds);
}

#[test]
fn predicate_exclusion_applies_to_every_node() {
    let tree = profile_card();
    let silhouette = tracer()
        .with_exclusion(Exclusion::predicate(|node| node.id.is_none() && !node.is_container()))
        .trace(&tree);

    let bounds = visible_bounds(&silhouette.path);
    // avatar rounded rect + two name lines
    assert_eq!(bounds.len(), 3);
    assert!(bounds.iter().all(|b| b.x1 <= 96.0));
}

#[test]
fn generic_leaf_is_one_inset_rounded_rect() {
    let (w, h) = (120.0, 48.0);
    let silhouette = tracer().trace(&Node::generic(Rect::new(0.0, 0.0, w, h)));

    let visible = silhouette.path.visible_shapes();
    assert_eq!(visible.len(), 1);
    match visible[0] {
        PathShape::RoundedRect { rect, radius, .. } => {
            assert_eq!(*rect, Rect::new(SPACE, SPACE, w - SPACE, h - SPACE));
            assert!((radius - SIMPLE_RADIUS_FACTOR * h).abs() < 1e-9);
        }
        other => panic!("unexpected shape {other:?}"),
    }
}

#[test]
fn custom_child_is_mirrored_in_rtl_root() {
    let mut own = SilhouettePath::new();
    own.add_rect(Rect::new(0.0, 0.0, 40.0, 40.0), Direction::Clockwise);
    let own = Rc::new(own);

    let build = |direction: LayoutDirection| {
        Node::container(
            Rect::new(0.0, 0.0, 100.0, 40.0),
            vec![Node::generic(Rect::new(10.0, 0.0, 50.0, 40.0))
                .with_custom(own.clone())
                .with_direction(direction)],
        )
        .with_direction(direction)
    };

    let rtl = tracer().trace(&build(LayoutDirection::RightToLeft));
    assert_eq!(
        visible_bounds(&rtl.path),
        vec![Rect::new(50.0, 0.0, 90.0, 40.0)]
    );

    let ltr = tracer().trace(&build(LayoutDirection::LeftToRight));
    assert_eq!(
        visible_bounds(&ltr.path),
        vec![Rect::new(10.0, 0.0, 50.0, 40.0)]
    );
}

#[test]
fn text_lines_obey_max_lines_and_height() {
    let text = TextContent::new("one\ntwo\nsix", 20.0).with_max_lines(2);
    let capped = tracer().trace(&Node::text(Rect::new(0.0, 0.0, 100.0, 60.0), text.clone()));
    assert_eq!(capped.path.visible_shapes().len(), 2);

    let uncapped = text.clone().with_max_lines(usize::MAX);
    let short = tracer().trace(&Node::text(Rect::new(0.0, 0.0, 100.0, 29.0), uncapped.clone()));
    assert_eq!(short.path.visible_shapes().len(), 1);

    let tiny = tracer().trace(&Node::text(Rect::new(0.0, 0.0, 100.0, 19.0), uncapped));
    assert!(tiny.path.visible_shapes().is_empty());
}

#[test]
fn tracing_twice_is_idempotent() {
    let tree = profile_card();
    let tracer = tracer().with_exclusion(Exclusion::ids(["avatar"]));
    let first = tracer.trace(&tree);
    let second = tracer.trace(&tree);
    assert_eq!(first, second);
    assert_eq!(first.path.to_bez_path(), second.path.to_bez_path());
}

#[test]
fn delegate_receives_absolute_offsets() {
    let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
    let record = seen.clone();
    let delegate = move |_: &Node, _: &mut SilhouettePath, _: &Exclusion, offset: Point| {
        record.borrow_mut().push(offset);
        false
    };

    let tree = profile_card();
    tracer().with_delegate(Rc::new(delegate)).trace(&tree);

    assert_eq!(
        *seen.borrow(),
        vec![
            Point::new(8.0, 8.0),
            Point::new(8.0, 56.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 40.0),
            Point::new(100.0, 80.0),
        ]
    );
}
