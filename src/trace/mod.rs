//! Trace graph construction and classification.
//!
//! [`reconcile`] merges loaded requirements and scanned tests into a
//! [`Graph`]; [`classify`] labels every node of that graph. Classification
//! only ever sees a complete graph.

mod classify;
mod graph;
mod reconcile;

pub use classify::{classify, ClassifiedGraph, ClassifiedNode, DuplicatePolicy, NodeStatus};
pub use graph::{DesignLink, Graph, Node, TraceLink, UnresolvedReference};
pub use reconcile::reconcile;
