// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Tag forest construction.
//!
//! ```text
//! [Tag; n] (one type, one pass)
//!     │
//!     ├─→ roots:    parent_id == None
//!     └─→ children: parent_id → [Tag]
//!           │
//!           ▼
//!     attach children under each root, recursively
//! ```
//!
//! Tags whose parent is not part of the input are unreachable from any root
//! and are left out. Sibling order follows input order.

use std::collections::HashMap;

use serde::Serialize;

use crate::tag::{Tag, TagId};

/// One tag with its direct children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagNode {
    #[serde(flatten)]
    pub tag: Tag,
    pub children: Vec<TagNode>,
}

impl TagNode {
    fn leaf(tag: Tag) -> Self {
        Self {
            tag,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, itself included
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TagNode::size).sum::<usize>()
    }
}

/// Build the forest for a flat list of tags of a single type.
pub fn build_forest(tags: Vec<Tag>) -> Vec<TagNode> {
    let mut roots = Vec::new();
    let mut children: HashMap<TagId, Vec<Tag>> = HashMap::new();

    for tag in tags {
        match tag.parent_id {
            None => roots.push(tag),
            Some(parent) => children.entry(parent).or_default().push(tag),
        }
    }

    roots
        .into_iter()
        .map(|root| attach(root, &mut children))
        .collect()
}

// Each child list is taken out of the map once, so no tag is attached twice.
fn attach(tag: Tag, children: &mut HashMap<TagId, Vec<Tag>>) -> TagNode {
    let mut node = TagNode::leaf(tag);
    let Some(id) = node.tag.id else {
        return node;
    };
    if let Some(direct) = children.remove(&id) {
        node.children = direct
            .into_iter()
            .map(|child| attach(child, children))
            .collect();
    }
    node
}
