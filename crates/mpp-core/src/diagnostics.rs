//! Diagnostic tree accumulating human-readable failure context.
//!
//! Rejections are the normal outcome of most proposal attempts in a
//! stochastic search, so they are described through this structure rather
//! than through errors. Every operation is infallible and allocation stays
//! proportional to the messages actually recorded.

use crate::errors::MppError;
use crate::MarkId;

/// A node in the diagnostic tree.
///
/// Nodes carry a description, optionally the mark the description refers to,
/// and child nodes for per-iteration or per-component detail. Append
/// operations return `&mut Self` (or the new child) so call sites can chain
/// fluently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorNode {
    description: String,
    mark: Option<MarkId>,
    children: Vec<ErrorNode>,
}

impl ErrorNode {
    /// Creates a root node with the given description.
    pub fn root(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            mark: None,
            children: Vec::new(),
        }
    }

    /// Appends a plain message as a child node.
    pub fn push(&mut self, message: impl Into<String>) -> &mut Self {
        self.children.push(ErrorNode::root(message));
        self
    }

    /// Appends a message tied to a specific mark.
    pub fn push_for_mark(&mut self, message: impl Into<String>, mark: MarkId) -> &mut Self {
        self.children.push(ErrorNode {
            description: message.into(),
            mark: Some(mark),
            children: Vec::new(),
        });
        self
    }

    /// Appends an underlying error as a child node.
    pub fn push_cause(&mut self, cause: &MppError) -> &mut Self {
        self.children.push(ErrorNode::root(cause.to_string()));
        self
    }

    /// Creates and returns a child node labelled with an iteration index.
    pub fn child_for_iteration(&mut self, index: usize) -> &mut ErrorNode {
        self.push_child(ErrorNode::root(format!("iteration {index}")))
    }

    /// Creates and returns a child node labelled with a named property.
    pub fn child_for_property(&mut self, name: &str) -> &mut ErrorNode {
        self.push_child(ErrorNode::root(format!("property '{name}'")))
    }

    fn push_child(&mut self, child: ErrorNode) -> &mut ErrorNode {
        let index = self.children.len();
        self.children.push(child);
        &mut self.children[index]
    }

    /// Returns the node's own description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the mark this node refers to, if any.
    pub fn mark(&self) -> Option<MarkId> {
        self.mark
    }

    /// Returns the child nodes.
    pub fn children(&self) -> &[ErrorNode] {
        &self.children
    }

    /// Whether the node carries no recorded detail beyond its description.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Flattens the tree into an indented multi-line description for logging.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out, 0);
        out
    }

    fn flatten_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&self.description);
        if let Some(mark) = self.mark {
            out.push_str(&format!(" [mark {}]", mark.as_raw()));
        }
        out.push('\n');
        for child in &self.children {
            child.flatten_into(out, depth + 1);
        }
    }
}
