//! Core data model types for the curriculum unit tree.
//!
//! A forest of [`UnitTreeNode`]s describes subjects, the grades inside them,
//! and the units and sub-units an exam can cover. Trees arrive read-only from
//! the unit service and are never mutated in place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One node in the hierarchical curriculum catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitTreeNode {
    /// Unique identifier, stable across requests.
    pub id: String,
    /// Display label (subject name at the root, unit name deeper down).
    pub name: String,
    /// Structural role of this node.
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    /// Grade level this node is scoped to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<u32>,
    /// Ordered children. Order is display order.
    #[serde(default)]
    pub children: Vec<UnitTreeNode>,
    /// Question payload attached when the tree is fetched with questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<serde_json::Value>,
}

impl UnitTreeNode {
    /// Create a childless node.
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit_type: UnitType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_type,
            grade: None,
            children: Vec::new(),
            questions: Vec::new(),
        }
    }

    /// Builder-style grade setter.
    pub fn with_grade(mut self, grade: u32) -> Self {
        self.grade = Some(grade);
        self
    }

    /// Builder-style children setter.
    pub fn with_children(mut self, children: Vec<UnitTreeNode>) -> Self {
        self.children = children;
        self
    }

    /// True when the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes below this one (not counting itself).
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}

/// Total number of nodes in a forest, roots included.
pub fn count_nodes(forest: &[UnitTreeNode]) -> usize {
    forest.iter().map(|n| 1 + n.descendant_count()).sum()
}

/// Structural role of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitType {
    Subject,
    Grade,
    Category,
    Unit,
}

impl UnitType {
    /// Only curriculum units can be picked when authoring an exam.
    pub fn is_selectable(self) -> bool {
        match self {
            UnitType::Unit => true,
            UnitType::Subject | UnitType::Grade | UnitType::Category => false,
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitType::Subject => write!(f, "SUBJECT"),
            UnitType::Grade => write!(f, "GRADE"),
            UnitType::Category => write!(f, "CATEGORY"),
            UnitType::Unit => write!(f, "UNIT"),
        }
    }
}

impl FromStr for UnitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SUBJECT" => Ok(UnitType::Subject),
            "GRADE" => Ok(UnitType::Grade),
            "CATEGORY" => Ok(UnitType::Category),
            "UNIT" => Ok(UnitType::Unit),
            other => Err(format!("unknown unit type: {other}")),
        }
    }
}

/// Kind of exam question, used for submission and labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionKind {
    Objective,
    Subjective,
}
