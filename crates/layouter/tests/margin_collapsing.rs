use css::RuleDb;
use dom::{Document, Node, NodeId};
use layouter::Layouter;

fn layout(doc: &Document, css: &str) -> Layouter {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rules = RuleDb::new();
    rules.load_sheet_source(css);
    let mut layouter = Layouter::default();
    layouter.set_viewport(800.0, 600.0);
    layouter.layout(doc, &rules);
    layouter
}

fn child_id(doc: &Document, index: usize) -> NodeId {
    doc.root().children()[index].id().clone()
}

#[test]
fn sibling_margins_collapse_to_the_difference() {
    let doc = Document::new(
        Node::new("div")
            .with_child(Node::new("p").with_class("a"))
            .with_child(Node::new("p").with_class("b")),
    );
    let layouter = layout(
        &doc,
        ".a { margin-bottom: 10px; height: 20px }\n.b { margin-top: 20px; height: 20px }",
    );

    let a = layouter.state().get(&child_id(&doc, 0)).expect("a");
    let b = layouter.state().get(&child_id(&doc, 1)).expect("b");
    assert_eq!(a.y + a.height, 20.0);
    assert_eq!(b.y, 30.0, "gap is max(20 - 10, 0) = 10");
}

#[test]
fn fully_absorbed_top_margin_leaves_no_gap() {
    let doc = Document::new(
        Node::new("div")
            .with_child(Node::new("p").with_class("a"))
            .with_child(Node::new("p").with_class("b")),
    );
    let layouter = layout(
        &doc,
        ".a { margin-bottom: 30px; height: 20px }\n.b { margin-top: 10px; height: 20px }",
    );
    let b = layouter.state().get(&child_id(&doc, 1)).expect("b");
    assert_eq!(b.y, 20.0, "smaller top margin collapses away entirely");
}

#[test]
fn negative_margins_add_instead_of_collapsing() {
    let doc = Document::new(
        Node::new("div")
            .with_child(Node::new("p").with_class("a"))
            .with_child(Node::new("p").with_class("b")),
    );
    let layouter = layout(
        &doc,
        ".a { margin-bottom: 10px; height: 20px }\n.b { margin-top: -15px; height: 20px }",
    );
    let b = layouter.state().get(&child_id(&doc, 1)).expect("b");
    assert_eq!(b.y, 15.0, "gap is -15 + 10 = -5, pulling b upward");
}

#[test]
fn first_child_top_margin_hoists_onto_parent() {
    let doc = Document::new(
        Node::new("div").with_child(
            Node::new("section").with_child(Node::new("p").with_class("a")),
        ),
    );
    let layouter = layout(&doc, ".a { margin-top: 10px; height: 20px }");

    let section_id = child_id(&doc, 0);
    let p_id = doc.root().children()[0].children()[0].id().clone();
    let section = layouter.state().get(&section_id).expect("section");
    let p = layouter.state().get(&p_id).expect("p");

    assert_eq!(section.margin.top, 10.0, "hoisted from the first child");
    assert_eq!(p.margin.top, 0.0, "zeroed after the hoist");
    assert_eq!(p.y, section.y, "first child sits flush with the content top");
}

#[test]
fn hoist_keeps_the_larger_of_the_two_margins() {
    let doc = Document::new(
        Node::new("div").with_child(
            Node::new("section")
                .with_class("wrap")
                .with_child(Node::new("p").with_class("a")),
        ),
    );
    let layouter = layout(
        &doc,
        ".wrap { margin-top: 25px }\n.a { margin-top: 10px; height: 20px }",
    );
    // Hoisting chains upward: the section's own margin moved to the root,
    // then the paragraph's margin moved onto the section.
    let root = layouter.state().get(doc.root().id()).expect("root");
    let section = layouter.state().get(&child_id(&doc, 0)).expect("section");
    assert_eq!(root.margin.top, 25.0);
    assert_eq!(section.margin.top, 10.0);
}
