//! The layout engine session: document and stylesheet ownership, full layout
//! passes, input handling, and paint-record export to the rendering backend.

mod backend;
mod input;
mod paint;

pub use backend::{Bitmap, FontService, RenderBackend};
pub use input::{InputEvent, hit_test};
pub use paint::{PaintRecord, build_records};

use anyhow::{Context, ensure};
use backend::MeasureAdapter;
use css::RuleDb;
use dom::{Document, NodeId};
use layouter::{FontSpec, Layouter};
use std::collections::HashSet;
use std::rc::Rc;

/// One engine session. Single-threaded and synchronous: every triggering
/// event runs a full pass to completion before the backend sees anything.
pub struct Engine<B: RenderBackend> {
    backend: B,
    fonts: Rc<dyn FontService>,
    doc: Option<Document>,
    rules: RuleDb,
    layouter: Layouter,
    hovered: Option<NodeId>,
    focused: Option<NodeId>,
    /// Whether the active hover/focus target pulled in conditional styles;
    /// leaving such a target must also trigger a pass, even though its cache
    /// entry disappeared the moment the rule started matching.
    hover_active: bool,
    focus_active: bool,
    uploaded: HashSet<String>,
}

impl<B: RenderBackend> Engine<B> {
    pub fn new(backend: B, fonts: impl FontService + 'static) -> Self {
        let fonts: Rc<dyn FontService> = Rc::new(fonts);
        let layouter = Layouter::new(Box::new(MeasureAdapter(Rc::clone(&fonts))));
        Self {
            backend,
            fonts,
            doc: None,
            rules: RuleDb::new(),
            layouter,
            hovered: None,
            focused: None,
            hover_active: false,
            focus_active: false,
            uploaded: HashSet::new(),
        }
    }

    /// Install the document produced by the markup parser. Interaction state
    /// from the previous document is dropped; stale layout entries are pruned
    /// on the next pass.
    pub fn set_document(&mut self, doc: Document) {
        log::info!("document installed, {} nodes", doc.iter().count());
        self.hovered = None;
        self.focused = None;
        self.hover_active = false;
        self.focus_active = false;
        self.doc = Some(doc);
    }

    pub fn document(&self) -> Option<&Document> {
        self.doc.as_ref()
    }

    /// Append a stylesheet. Later sheets win the cascade tie-break.
    pub fn load_stylesheet(&mut self, source: &str) -> anyhow::Result<()> {
        let before = self.rules.len();
        self.rules.load_sheet_source(source);
        ensure!(
            self.rules.len() > before || source.trim().is_empty(),
            "stylesheet produced no rules"
        );
        log::info!("loaded stylesheet with {} rules", self.rules.len() - before);
        Ok(())
    }

    /// Load a stylesheet from disk.
    pub fn load_stylesheet_file(&mut self, path: &std::path::Path) -> anyhow::Result<()> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("reading stylesheet {}", path.display()))?;
        self.load_stylesheet(&source)
    }

    /// Replace every loaded stylesheet; conditional-style caches rebuild on
    /// the next pass.
    pub fn reset_stylesheets(&mut self) {
        self.rules.clear();
    }

    pub fn layouter(&self) -> &Layouter {
        &self.layouter
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Run a full pass: cascade, box model, walk, plugins, pruning, texture
    /// reconciliation. Returns the paint records handed to the backend,
    /// ordered back to front.
    pub fn compute_layout(&mut self) -> Vec<PaintRecord> {
        let Some(doc) = self.doc.as_ref() else {
            return Vec::new();
        };
        let (width, height) = self.backend.viewport();
        self.layouter.set_viewport(width, height);
        self.layouter.layout(doc, &self.rules);

        let backend = &mut self.backend;
        let uploaded = &mut self.uploaded;
        self.layouter.prune(doc, |key| {
            if uploaded.remove(key) {
                backend.evict_texture(key);
            }
        });

        // Shape and upload any text bitmaps this pass introduced.
        for node in doc.iter() {
            let Some(entry) = self.layouter.state().get(node.id()) else {
                continue;
            };
            if entry.hidden || entry.texture_keys.is_empty() {
                continue;
            }
            let Some(style) = self.layouter.style_of(node.id()) else {
                continue;
            };
            let font = FontSpec::from_style(style, entry.em);
            for key in &entry.texture_keys {
                if self.uploaded.insert(key.clone()) {
                    let bitmap = self.fonts.render(&font, node.text().trim());
                    self.backend.upload_texture(key, bitmap);
                }
            }
        }

        let records = build_records(doc, &self.layouter);
        self.backend.present(&records);
        records
    }

    /// Feed one input event. Returns whether the mutation can change layout,
    /// so the caller knows to run [`Engine::compute_layout`] again.
    pub fn apply_input(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::MouseMove { x, y } => self.retarget_hover(x, y),
            InputEvent::MouseDown { x, y } => self.click(x, y),
            InputEvent::MouseUp { .. } => false,
            InputEvent::Scroll { x, y, delta_x, delta_y } => self.scroll(x, y, delta_x, delta_y),
            InputEvent::Key { text } => self.key(&text),
        }
    }

    fn retarget_hover(&mut self, x: f32, y: f32) -> bool {
        let Some(doc) = self.doc.as_ref() else {
            return false;
        };
        let target = input::hit_test(doc, &self.layouter, x, y);
        if target == self.hovered {
            return false;
        }

        // Checked before the flags change: the conditional caches were
        // resolved against the current flag state. A target that warranted a
        // pass on entry no longer has a cache entry (its rules now match), so
        // leaving it relies on the sticky flag instead.
        let enter_warrants = chain_has_conditional(&self.layouter, target.as_ref(), ":hover");
        let warrants = enter_warrants || self.hover_active;
        self.hover_active = enter_warrants;

        let previous = self.hovered.take();
        if let Some(doc) = self.doc.as_mut() {
            set_chain_flag(doc, previous.as_ref(), |flags, value| flags.hovered = value, false);
            set_chain_flag(doc, target.as_ref(), |flags, value| flags.hovered = value, true);
        }
        self.hovered = target;
        warrants
    }

    fn click(&mut self, x: f32, y: f32) -> bool {
        let Some(doc) = self.doc.as_ref() else {
            return false;
        };
        let target = input::hit_test(doc, &self.layouter, x, y);

        let mut toggled_checkbox = false;
        let focus_target = target.as_ref().and_then(|id| {
            let node = doc.find(id)?;
            if input::is_checkbox(node) {
                toggled_checkbox = true;
            }
            input::is_focusable(node).then(|| id.clone())
        });

        let focus_changed = focus_target != self.focused;
        let gain_warrants =
            chain_has_conditional(&self.layouter, focus_target.as_ref(), ":focus");
        let warrants = toggled_checkbox || (focus_changed && (gain_warrants || self.focus_active));
        if focus_changed {
            self.focus_active = gain_warrants;
        }

        let previous = self.focused.take();
        if let Some(doc) = self.doc.as_mut() {
            if focus_changed {
                set_chain_flag(doc, previous.as_ref(), |flags, value| flags.focused = value, false);
                set_chain_flag(
                    doc,
                    focus_target.as_ref(),
                    |flags, value| flags.focused = value,
                    true,
                );
            }
            if toggled_checkbox
                && let Some(id) = target.as_ref()
                && let Some(node) = doc.find_mut(id)
            {
                node.flags.checked = !node.flags.checked;
            }
        }
        self.focused = focus_target;
        warrants
    }

    fn scroll(&mut self, x: f32, y: f32, delta_x: f32, delta_y: f32) -> bool {
        let Some(doc) = self.doc.as_ref() else {
            return false;
        };
        let Some(target) = input::hit_test(doc, &self.layouter, x, y)
            .and_then(|hit| input::scroll_target(doc, &self.layouter, &hit, delta_x, delta_y))
        else {
            return false;
        };
        let Some(entry) = self.layouter.state().get(&target) else {
            return false;
        };
        let (extent_x, extent_y) = (entry.scroll_width, entry.scroll_height);
        let Some(node) = self.doc.as_mut().and_then(|doc| doc.find_mut(&target)) else {
            return false;
        };
        let new_x = input::clamp_scroll(node.scroll_x, delta_x, extent_x);
        let new_y = input::clamp_scroll(node.scroll_y, delta_y, extent_y);
        let changed = new_x != node.scroll_x || new_y != node.scroll_y;
        node.scroll_x = new_x;
        node.scroll_y = new_y;
        changed
    }

    fn key(&mut self, text: &str) -> bool {
        let Some(target) = self.focused.clone() else {
            return false;
        };
        let Some(node) = self.doc.as_mut().and_then(|doc| doc.find_mut(&target)) else {
            return false;
        };
        if !node.flags.editable && node.tag() != "input" && node.tag() != "textarea" {
            return false;
        }
        let mut content = node.text().to_string();
        let mut changed = false;
        for character in text.chars() {
            if character == '\u{8}' {
                changed |= content.pop().is_some();
            } else {
                content.push(character);
                changed = true;
            }
        }
        if changed {
            node.set_text(content);
        }
        changed
    }
}

/// Whether any node from `id` up to the root carries a cached conditional
/// style for the given interaction flag.
fn chain_has_conditional(layouter: &Layouter, id: Option<&NodeId>, flag: &str) -> bool {
    let Some(id) = id else {
        return false;
    };
    std::iter::once(id.clone())
        .chain(id.ancestors())
        .any(|candidate| layouter.has_conditional(&candidate, flag))
}

/// Set an interaction flag on a node and all of its ancestors, so ancestor
/// selectors like `div:hover span` observe the pointer too.
fn set_chain_flag(
    doc: &mut Document,
    id: Option<&NodeId>,
    mut set: impl FnMut(&mut dom::NodeFlags, bool),
    value: bool,
) {
    let Some(id) = id else {
        return;
    };
    for candidate in std::iter::once(id.clone()).chain(id.ancestors()) {
        if let Some(node) = doc.find_mut(&candidate) {
            set(&mut node.flags, value);
        }
    }
}
