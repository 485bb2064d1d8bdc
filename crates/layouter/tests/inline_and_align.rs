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

fn ids_with_class(doc: &Document, class: &str) -> Vec<NodeId> {
    doc.iter()
        .filter(|node| node.has_class(class))
        .map(|node| node.id().clone())
        .collect()
}

fn container_with_spans(count: usize) -> Document {
    let mut container = Node::new("div").with_class("line");
    for _ in 0..count {
        container.append_child(Node::new("span").with_class("word"));
    }
    Document::new(Node::new("body").with_child(container))
}

#[test]
fn inline_siblings_share_a_line_until_it_overflows() {
    let doc = container_with_spans(3);
    let layouter = layout(
        &doc,
        ".line { width: 100px }\n\
         .word { display: inline; width: 40px; height: 10px }",
    );
    let words = ids_with_class(&doc, "word");
    let a = layouter.state().get(&words[0]).expect("a");
    let b = layouter.state().get(&words[1]).expect("b");
    let c = layouter.state().get(&words[2]).expect("c");
    assert_eq!((a.x, a.y), (0.0, 0.0));
    assert_eq!((b.x, b.y), (40.0, 0.0), "continues on the same line");
    assert_eq!((c.x, c.y), (0.0, 10.0), "wraps to a new line at the line start");
}

#[test]
fn shorter_inline_boxes_drop_to_the_shared_baseline() {
    let doc = Document::new(
        Node::new("body").with_child(
            Node::new("div")
                .with_class("line")
                .with_child(Node::new("span").with_class("tall"))
                .with_child(Node::new("span").with_class("short")),
        ),
    );
    let layouter = layout(
        &doc,
        ".line { width: 300px }\n\
         .tall { display: inline; width: 40px; height: 30px }\n\
         .short { display: inline; width: 40px; height: 10px }",
    );
    let tall = layouter
        .state()
        .get(&ids_with_class(&doc, "tall")[0])
        .expect("tall");
    let short = layouter
        .state()
        .get(&ids_with_class(&doc, "short")[0])
        .expect("short");
    assert_eq!(tall.y, 0.0);
    assert_eq!(short.y, 20.0, "bottom-aligned against the tallest box");
    assert_eq!(short.x, 40.0);
}

#[test]
fn text_align_right_shifts_each_line_by_its_unused_space() {
    let doc = Document::new(
        Node::new("body").with_child(
            Node::new("div")
                .with_class("aligned")
                .with_child(Node::new("p").with_class("row"))
                .with_child(Node::new("p").with_class("row")),
        ),
    );
    let layouter = layout(
        &doc,
        ".aligned { width: 200px; text-align: right }\n\
         .row { width: 50px; height: 10px }",
    );
    for id in ids_with_class(&doc, "row") {
        let row = layouter.state().get(&id).expect("row");
        assert_eq!(row.x + row.width, 200.0, "flush with the content right edge");
    }
}

#[test]
fn text_align_center_halves_the_shift() {
    let doc = Document::new(
        Node::new("body").with_child(
            Node::new("div")
                .with_class("aligned")
                .with_child(Node::new("p").with_class("row")),
        ),
    );
    let layouter = layout(
        &doc,
        ".aligned { width: 200px; text-align: center }\n.row { width: 50px; height: 10px }",
    );
    let row = layouter
        .state()
        .get(&ids_with_class(&doc, "row")[0])
        .expect("row");
    assert_eq!(row.x, 75.0);
}

#[test]
fn text_align_keeps_bottom_aligned_line_members_together() {
    let doc = Document::new(
        Node::new("body").with_child(
            Node::new("div")
                .with_class("aligned")
                .with_child(Node::new("span").with_class("tall"))
                .with_child(Node::new("span").with_class("short")),
        ),
    );
    let layouter = layout(
        &doc,
        ".aligned { width: 200px; text-align: center }\n\
         .tall { display: inline; width: 40px; height: 30px }\n\
         .short { display: inline; width: 40px; height: 10px }",
    );
    let tall = layouter
        .state()
        .get(&ids_with_class(&doc, "tall")[0])
        .expect("tall");
    let short = layouter
        .state()
        .get(&ids_with_class(&doc, "short")[0])
        .expect("short");
    // One visual line: the pair shifts as a unit by half the unused 120px.
    assert_eq!(tall.x, 60.0);
    assert_eq!(short.x, 100.0, "line members stay adjacent");
    assert_eq!(short.y, 20.0, "baseline drop is untouched by the shift");
}

#[test]
fn text_align_skips_absolutely_positioned_children() {
    let doc = Document::new(
        Node::new("body").with_child(
            Node::new("div")
                .with_class("aligned")
                .with_child(Node::new("p").with_class("pinned")),
        ),
    );
    let layouter = layout(
        &doc,
        ".aligned { width: 200px; height: 50px; text-align: right }\n\
         .pinned { position: absolute; left: 5px; top: 0px; width: 50px; height: 10px }",
    );
    let pinned = layouter
        .state()
        .get(&ids_with_class(&doc, "pinned")[0])
        .expect("pinned");
    assert_eq!(pinned.x, 5.0, "absolute children keep their inset position");
}

#[test]
fn leaf_text_measures_through_the_font_service() {
    let doc = Document::new(
        Node::new("body").with_child(Node::new("span").with_class("text").with_text("hello")),
    );
    let layouter = layout(&doc, ".text { display: inline; font-size: 20px }");
    let text = layouter
        .state()
        .get(&ids_with_class(&doc, "text")[0])
        .expect("text");
    // Charcell metrics: 5 chars at half the 20px font size.
    assert_eq!(text.width, 50.0);
    assert_eq!(text.height, 24.0, "line height is 1.2 times the font size");
    assert_eq!(text.texture_keys.len(), 1);
    assert!(text.texture_keys[0].starts_with("text:"));
}
