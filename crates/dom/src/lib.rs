//! Document model for the layout engine.
//!
//! Nodes carry the markup-facing data (tag, attributes, classes, inline
//! style, text) plus the transient interaction flags and scroll offsets that
//! input handling toggles between layout passes. Identity is a path-derived
//! string id; see [`id::NodeId`].

mod document;
mod id;
mod node;

pub use document::Document;
pub use id::{NodeId, ROOT_ID};
pub use node::{Descendants, Node, NodeFlags, SyntheticKind};
