mod common;

use common::engine;
use dom::{Document, Node};
use engine::{InputEvent, hit_test};

#[test]
fn hover_retargeting_warrants_relayout_only_with_conditional_styles() {
    let mut engine = engine(800.0, 600.0);
    engine
        .load_stylesheet(
            ".card { height: 20px }\n.card:hover { background-color: yellow }",
        )
        .expect("stylesheet");
    engine.set_document(Document::new(
        Node::new("body").with_child(Node::new("div").with_class("card")),
    ));
    engine.compute_layout();

    assert!(
        engine.apply_input(InputEvent::MouseMove { x: 5.0, y: 5.0 }),
        "entering a node with a hover rule warrants a pass"
    );
    {
        let doc = engine.document().expect("doc");
        let card = doc.root().children()[0].clone();
        assert!(card.flags.hovered);
    }

    engine.compute_layout();
    assert!(
        engine.apply_input(InputEvent::MouseMove { x: 5.0, y: 500.0 }),
        "leaving it warrants one too"
    );
    let doc = engine.document().expect("doc");
    assert!(!doc.root().children()[0].flags.hovered);

    assert!(
        !engine.apply_input(InputEvent::MouseMove { x: 5.0, y: 500.0 }),
        "no retarget, no relayout"
    );
}

#[test]
fn hover_without_hover_rules_never_warrants_relayout() {
    let mut engine = engine(800.0, 600.0);
    engine
        .load_stylesheet(".card { height: 20px }")
        .expect("stylesheet");
    engine.set_document(Document::new(
        Node::new("body").with_child(Node::new("div").with_class("card")),
    ));
    engine.compute_layout();
    assert!(!engine.apply_input(InputEvent::MouseMove { x: 5.0, y: 5.0 }));
}

#[test]
fn hit_testing_prefers_the_highest_z() {
    let mut engine = engine(800.0, 600.0);
    engine
        .load_stylesheet(
            ".low { position: absolute; left: 0px; top: 0px; width: 50px; height: 50px; z-index: 1 }\n\
             .high { position: absolute; left: 10px; top: 10px; width: 50px; height: 50px; z-index: 5 }",
        )
        .expect("stylesheet");
    engine.set_document(Document::new(
        Node::new("body")
            .with_child(Node::new("div").with_class("high"))
            .with_child(Node::new("div").with_class("low")),
    ));
    engine.compute_layout();

    let doc = engine.document().expect("doc");
    let hit = hit_test(doc, engine.layouter(), 20.0, 20.0).expect("hit");
    assert!(doc.find(&hit).expect("node").has_class("high"));

    let hit = hit_test(doc, engine.layouter(), 5.0, 5.0).expect("hit");
    assert!(
        doc.find(&hit).expect("node").has_class("low"),
        "outside the high box, the low one wins"
    );
}

#[test]
fn cropped_nodes_only_hit_inside_their_crop() {
    let mut engine = engine(800.0, 600.0);
    engine
        .load_stylesheet(
            ".scroller { width: 100px; height: 50px; overflow: hidden }\n\
             .content { width: 200px; height: 120px }",
        )
        .expect("stylesheet");
    engine.set_document(Document::new(
        Node::new("body").with_child(
            Node::new("div")
                .with_class("scroller")
                .with_child(Node::new("div").with_class("content")),
        ),
    ));
    engine.compute_layout();

    let doc = engine.document().expect("doc");
    let inside = hit_test(doc, engine.layouter(), 60.0, 30.0).expect("hit");
    assert!(doc.find(&inside).expect("node").has_class("content"));

    // (150, 80) lies within the content's own 200x120 box but past the crop.
    let outside = hit_test(doc, engine.layouter(), 150.0, 80.0);
    assert!(outside.is_none() || !doc.find(&outside.unwrap()).expect("node").has_class("content"));
}

#[test]
fn scrolling_clamps_to_the_content_extent() {
    let mut engine = engine(800.0, 600.0);
    engine
        .load_stylesheet(
            ".scroller { width: 100px; height: 50px; overflow: auto }\n\
             .content { width: 200px; height: 120px }",
        )
        .expect("stylesheet");
    engine.set_document(Document::new(
        Node::new("body").with_child(
            Node::new("div")
                .with_class("scroller")
                .with_child(Node::new("div").with_class("content")),
        ),
    ));
    engine.compute_layout();

    let scroll = |engine: &mut engine::Engine<common::RecordingBackend>, dy: f32| {
        engine.apply_input(InputEvent::Scroll { x: 10.0, y: 10.0, delta_x: 0.0, delta_y: dy })
    };

    assert!(scroll(&mut engine, 30.0), "scrolling moved the offset");
    assert!(scroll(&mut engine, 100.0), "clamped to the 70px extent, still a change");
    assert!(!scroll(&mut engine, 10.0), "already at the end");
    assert!(scroll(&mut engine, -200.0), "back to the top");
    assert!(!scroll(&mut engine, -5.0), "pinned at zero");

    let doc = engine.document().expect("doc");
    let scroller = doc.root().children()[0].clone();
    assert_eq!(scroller.scroll_y, 0.0);
}

#[test]
fn clicking_toggles_checkboxes_and_moves_focus() {
    let mut engine = engine(800.0, 600.0);
    engine
        .load_stylesheet("input { height: 20px }\n.note { height: 20px }")
        .expect("stylesheet");
    engine.set_document(Document::new(
        Node::new("body")
            .with_child(Node::new("input").with_attr("type", "checkbox"))
            .with_child(Node::new("div").with_class("note").with_attr("contenteditable", "true")),
    ));
    engine.compute_layout();

    assert!(
        engine.apply_input(InputEvent::MouseDown { x: 5.0, y: 5.0 }),
        "checkbox toggles always warrant a pass"
    );
    {
        let doc = engine.document().expect("doc");
        let checkbox = &doc.root().children()[0];
        assert!(checkbox.flags.checked);
        assert!(checkbox.flags.focused);
    }

    engine.apply_input(InputEvent::MouseDown { x: 5.0, y: 25.0 });
    let doc = engine.document().expect("doc");
    assert!(!doc.root().children()[0].flags.focused, "focus moved away");
    assert!(doc.root().children()[1].flags.focused);
}

#[test]
fn key_events_edit_the_focused_editable_node() {
    let mut engine = engine(800.0, 600.0);
    engine
        .load_stylesheet(".note { height: 20px }")
        .expect("stylesheet");
    engine.set_document(Document::new(
        Node::new("body").with_child(
            Node::new("div").with_class("note").with_attr("contenteditable", "true"),
        ),
    ));
    engine.compute_layout();

    assert!(
        !engine.apply_input(InputEvent::Key { text: "hi".to_string() }),
        "nothing focused yet"
    );
    engine.apply_input(InputEvent::MouseDown { x: 5.0, y: 5.0 });
    assert!(engine.apply_input(InputEvent::Key { text: "hi".to_string() }));
    assert!(engine.apply_input(InputEvent::Key { text: "\u{8}".to_string() }));

    let doc = engine.document().expect("doc");
    assert_eq!(doc.root().children()[0].text(), "h");
}
