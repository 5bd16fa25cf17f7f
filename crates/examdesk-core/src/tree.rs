//! Traversal, search, and filtering over a unit forest.
//!
//! Every function here is pure: it walks the forest depth-first in pre-order,
//! visiting children in the order they were given, and either borrows from the
//! input or builds a fresh value. Nothing is cached between calls.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{UnitTreeNode, UnitType};

/// A node together with its nesting depth (roots are depth 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlatUnitNode<'a> {
    #[serde(flatten)]
    pub node: &'a UnitTreeNode,
    pub depth: usize,
}

/// Options for [`filter_unit_tree_nodes`]. Unset fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitFilter {
    /// Exact grade match.
    pub grade: Option<u32>,
    /// Exact type match.
    pub unit_type: Option<UnitType>,
    /// Case-insensitive substring of the node name.
    pub search_term: Option<String>,
}

impl UnitFilter {
    pub fn grade(mut self, grade: u32) -> Self {
        self.grade = Some(grade);
        self
    }

    pub fn unit_type(mut self, unit_type: UnitType) -> Self {
        self.unit_type = Some(unit_type);
        self
    }

    pub fn search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    fn compile(&self) -> CompiledFilter {
        CompiledFilter {
            grade: self.grade,
            unit_type: self.unit_type,
            needle: self.search_term.as_ref().map(|t| t.to_lowercase()),
        }
    }
}

/// A [`UnitFilter`] with the search term lowercased once up front.
struct CompiledFilter {
    grade: Option<u32>,
    unit_type: Option<UnitType>,
    needle: Option<String>,
}

impl CompiledFilter {
    fn matches(&self, node: &UnitTreeNode) -> bool {
        if let Some(grade) = self.grade {
            if node.grade != Some(grade) {
                return false;
            }
        }
        if let Some(unit_type) = self.unit_type {
            if node.unit_type != unit_type {
                return false;
            }
        }
        if let Some(needle) = &self.needle {
            if !node.name.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Find the first node whose id equals `id`, searching in pre-order.
pub fn find_unit_in_tree<'a>(forest: &'a [UnitTreeNode], id: &str) -> Option<&'a UnitTreeNode> {
    for node in forest {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_unit_in_tree(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Linearize the forest in pre-order, annotating each node with its depth.
pub fn flatten_unit_tree(forest: &[UnitTreeNode]) -> Vec<FlatUnitNode<'_>> {
    fn walk<'a>(nodes: &'a [UnitTreeNode], depth: usize, out: &mut Vec<FlatUnitNode<'a>>) {
        for node in nodes {
            out.push(FlatUnitNode { node, depth });
            walk(&node.children, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    walk(forest, 0, &mut out);
    out
}

/// Keep only nodes named exactly `subject`, applying the same rule at every
/// level of the tree.
///
/// A descendant survives only if its own name also equals `subject`, so in a
/// typical curriculum tree this prunes every unit below the subject root. Use
/// [`subject_subtrees`] to keep a subject's whole subtree.
pub fn filter_units_by_subject(forest: &[UnitTreeNode], subject: &str) -> Vec<UnitTreeNode> {
    forest
        .iter()
        .filter(|node| node.name == subject)
        .map(|node| UnitTreeNode {
            id: node.id.clone(),
            name: node.name.clone(),
            unit_type: node.unit_type,
            grade: node.grade,
            children: filter_units_by_subject(&node.children, subject),
            questions: node.questions.clone(),
        })
        .collect()
}

/// Root nodes named `subject`, with their descendants kept unchanged.
pub fn subject_subtrees(forest: &[UnitTreeNode], subject: &str) -> Vec<UnitTreeNode> {
    forest
        .iter()
        .filter(|node| node.name == subject)
        .cloned()
        .collect()
}

/// Collect every selectable unit whose id appears in `ids`, in pre-order.
///
/// Non-unit nodes are never returned even when their id is requested, but
/// their children are still searched.
pub fn extract_selected_units<'a, S: AsRef<str>>(
    forest: &'a [UnitTreeNode],
    ids: &[S],
) -> Vec<&'a UnitTreeNode> {
    fn walk<'a>(
        nodes: &'a [UnitTreeNode],
        wanted: &HashSet<&str>,
        out: &mut Vec<&'a UnitTreeNode>,
    ) {
        for node in nodes {
            if node.unit_type.is_selectable() && wanted.contains(node.id.as_str()) {
                out.push(node);
            }
            walk(&node.children, wanted, out);
        }
    }

    let wanted: HashSet<&str> = ids.iter().map(|s| s.as_ref()).collect();
    let mut out = Vec::new();
    walk(forest, &wanted, &mut out);
    out
}

/// Flat pre-order list of every node matching all conditions in `filter`.
///
/// Each node is judged on its own fields; a parent's match has no effect on
/// whether its children are included.
pub fn filter_unit_tree_nodes<'a>(
    forest: &'a [UnitTreeNode],
    filter: &UnitFilter,
) -> Vec<&'a UnitTreeNode> {
    fn walk<'a>(
        nodes: &'a [UnitTreeNode],
        filter: &CompiledFilter,
        out: &mut Vec<&'a UnitTreeNode>,
    ) {
        for node in nodes {
            if filter.matches(node) {
                out.push(node);
            }
            walk(&node.children, filter, out);
        }
    }

    let compiled = filter.compile();
    let mut out = Vec::new();
    walk(forest, &compiled, &mut out);
    out
}
