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

fn row_with_cells(count: usize) -> Document {
    let mut row = Node::new("div").with_class("row");
    for _ in 0..count {
        row.append_child(Node::new("span").with_class("cell"));
    }
    Document::new(Node::new("body").with_child(row))
}

fn cell_ids(doc: &Document) -> Vec<NodeId> {
    doc.iter()
        .filter(|node| node.has_class("cell"))
        .map(|node| node.id().clone())
        .collect()
}

#[test]
fn space_between_pins_edges_and_centers_the_middle() {
    let doc = row_with_cells(3);
    let layouter = layout(
        &doc,
        ".row { display: flex; width: 300px; height: 60px; justify-content: space-between }\n\
         .cell { width: 50px; height: 40px }",
    );
    let row = layouter.state().get(&doc.root().children()[0].id().clone()).expect("row");
    let cells = cell_ids(&doc);
    let first = layouter.state().get(&cells[0]).expect("first");
    let middle = layouter.state().get(&cells[1]).expect("middle");
    let last = layouter.state().get(&cells[2]).expect("last");

    assert_eq!(first.x, row.content_x());
    assert_eq!(last.x + last.width, row.content_x() + row.content_width());
    let left_gap = middle.x - (first.x + first.width);
    let right_gap = last.x - (middle.x + middle.width);
    assert_eq!(left_gap, right_gap);
    assert_eq!(left_gap, 75.0);
}

#[test]
fn space_between_respects_container_padding() {
    let doc = row_with_cells(2);
    let layouter = layout(
        &doc,
        ".row { display: flex; width: 300px; height: 60px; padding: 10px; \
                justify-content: space-between }\n\
         .cell { width: 50px; height: 40px }",
    );
    let cells = cell_ids(&doc);
    let first = layouter.state().get(&cells[0]).expect("first");
    let last = layouter.state().get(&cells[1]).expect("last");
    assert_eq!(first.x, 10.0);
    assert_eq!(last.x + last.width, 290.0);
}

#[test]
fn single_item_lines_guard_the_spacing_formulas() {
    let doc = row_with_cells(1);
    let layouter = layout(
        &doc,
        ".row { display: flex; width: 300px; height: 60px; justify-content: space-between }\n\
         .cell { width: 50px; height: 40px }",
    );
    let cells = cell_ids(&doc);
    let only = layouter.state().get(&cells[0]).expect("only");
    assert_eq!(only.x, 0.0, "a lone item sits at the line start");

    let layouter = layout(
        &doc,
        ".row { display: flex; width: 300px; height: 60px; justify-content: space-around }\n\
         .cell { width: 50px; height: 40px }",
    );
    let only = layouter.state().get(&cells[0]).expect("only");
    assert_eq!(only.x, 125.0, "space-around centers a lone item");
}

#[test]
fn column_direction_distributes_vertically() {
    let doc = row_with_cells(3);
    let layouter = layout(
        &doc,
        ".row { display: flex; flex-direction: column; width: 100px; height: 300px; \
                justify-content: space-evenly }\n\
         .cell { width: 50px; height: 50px }",
    );
    let cells = cell_ids(&doc);
    let ys: Vec<f32> = cells
        .iter()
        .map(|id| layouter.state().get(id).expect("cell").y)
        .collect();
    assert_eq!(ys, vec![37.5, 125.0, 212.5]);
}

#[test]
fn wrap_packs_greedily_into_lines() {
    let doc = row_with_cells(3);
    let layouter = layout(
        &doc,
        ".row { display: flex; flex-wrap: wrap; width: 100px; height: 60px }\n\
         .cell { width: 40px; height: 20px }",
    );
    let cells = cell_ids(&doc);
    let a = layouter.state().get(&cells[0]).expect("a");
    let b = layouter.state().get(&cells[1]).expect("b");
    let c = layouter.state().get(&cells[2]).expect("c");
    assert_eq!((a.x, a.y), (0.0, 0.0));
    assert_eq!((b.x, b.y), (40.0, 0.0));
    assert_eq!((c.x, c.y), (0.0, 20.0), "third cell starts the second line");
}

#[test]
fn row_reverse_swaps_visual_order() {
    let doc = row_with_cells(2);
    let layouter = layout(
        &doc,
        ".row { display: flex; flex-direction: row-reverse; width: 300px; height: 60px }\n\
         .cell { width: 50px; height: 40px }",
    );
    let cells = cell_ids(&doc);
    let first = layouter.state().get(&cells[0]).expect("first");
    let second = layouter.state().get(&cells[1]).expect("second");
    assert_eq!(second.x, 0.0, "document-last child is laid out first");
    assert_eq!(first.x, 50.0);
}

#[test]
fn overfull_line_shrinks_by_weight_but_not_below_minimums() {
    let mut row = Node::new("div").with_class("row");
    for text in ["aaa", "bbb", "ccc"] {
        row.append_child(Node::new("span").with_class("cell").with_text(text));
    }
    let doc = Document::new(Node::new("body").with_child(row));
    let layouter = layout(
        &doc,
        ".row { display: flex; width: 100px; height: 60px }\n\
         .cell { width: 60px; height: 20px }\n\
         .cell:first-child { min-width: 40px }",
    );
    let cells = cell_ids(&doc);
    let widths: Vec<f32> = cells
        .iter()
        .map(|id| layouter.state().get(id).expect("cell").width)
        .collect();
    assert_eq!(widths[0], 40.0, "frozen at its minimum");
    assert_eq!(widths[1], 30.0, "freed space splits across the rest");
    assert_eq!(widths[2], 30.0);
    let total: f32 = widths.iter().sum();
    assert_eq!(total, 100.0, "the line now fits the container exactly");
}

#[test]
fn unstyled_text_never_shrinks_past_its_longest_word() {
    let mut row = Node::new("div").with_class("row");
    row.append_child(Node::new("span").with_class("cell").with_text("aaaaaaaaaa"));
    row.append_child(Node::new("span").with_class("cell").with_text("a b c d e f g h i j"));
    let doc = Document::new(Node::new("body").with_child(row));
    let layouter = layout(
        &doc,
        ".row { display: flex; width: 100px; height: 60px }\n\
         .cell { width: 60px; height: 20px }",
    );
    let cells = cell_ids(&doc);
    let unbreakable = layouter.state().get(&cells[0]).expect("unbreakable");
    let wrappable = layouter.state().get(&cells[1]).expect("wrappable");
    // Charcell metrics: the ten-letter word measures 80px and holds that
    // floor, while the single-letter words let their cell take the rest.
    assert_eq!(unbreakable.width, 80.0);
    assert_eq!(wrappable.width, 20.0);
}

#[test]
fn align_items_center_and_stretch() {
    let doc = row_with_cells(2);
    let layouter = layout(
        &doc,
        ".row { display: flex; width: 300px; height: 100px; align-items: center }\n\
         .cell { width: 50px; height: 40px }",
    );
    let cells = cell_ids(&doc);
    let first = layouter.state().get(&cells[0]).expect("first");
    assert_eq!(first.y, 30.0, "(100 - 40) / 2 below the content top");

    let layouter = layout(
        &doc,
        ".row { display: flex; width: 300px; height: 100px; align-items: stretch }\n\
         .cell { width: 50px }",
    );
    let first = layouter.state().get(&cells[0]).expect("first");
    assert_eq!(first.height, 100.0, "auto cross size stretches to the line");
}

#[test]
fn moved_flex_items_carry_their_subtrees() {
    let cell = Node::new("span")
        .with_class("cell")
        .with_child(Node::new("b").with_class("inner"));
    let row = Node::new("div")
        .with_class("row")
        .with_child(cell.clone())
        .with_child(cell);
    let doc = Document::new(Node::new("body").with_child(row));
    let layouter = layout(
        &doc,
        ".row { display: flex; width: 300px; height: 60px; justify-content: flex-end }\n\
         .cell { width: 50px; height: 40px }\n\
         .inner { width: 10px; height: 10px }",
    );
    let cells = cell_ids(&doc);
    for cell_id in &cells {
        let cell = layouter.state().get(cell_id).expect("cell");
        let inner_id = doc
            .find(cell_id)
            .expect("cell node")
            .children()[0]
            .id()
            .clone();
        let inner = layouter.state().get(&inner_id).expect("inner");
        assert_eq!(inner.x, cell.content_x(), "descendants moved with their parent");
        assert_eq!(inner.y, cell.content_y());
    }
}
