use std::fmt;

use indexmap::{IndexMap, IndexSet};
use jsontree::ast::{Array, False, Null, Number, Object, Root, Str, True};
use jsontree::visitor::{walk_array, walk_object, walk_root, Visitor};
use jsontree::NodeKind;
use serde::Serialize;

/// Node counts by kind (in order of first appearance), how deeply containers nest, and how many
/// object keys repeat an earlier key of the same object.
#[derive(Debug, Default, Serialize)]
pub struct Stats {
    pub nodes: IndexMap<&'static str, usize>,
    pub max_depth: usize,
    pub duplicate_keys: usize,
    #[serde(skip)]
    depth: usize,
}

impl Stats {
    pub fn of(root: &Root) -> Self {
        let mut stats = Stats::default();
        root.accept(&mut stats);
        stats
    }

    fn count(&mut self, kind: NodeKind) {
        *self.nodes.entry(kind.describe()).or_default() += 1;
    }

    fn nested(&mut self, walk: impl FnOnce(&mut Self)) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        walk(self);
        self.depth -= 1;
    }
}

impl Visitor for Stats {
    fn visit_root(&mut self, node: &Root) {
        self.count(NodeKind::Root);
        walk_root(self, node);
    }

    fn visit_object(&mut self, node: &Object) {
        self.count(NodeKind::Object);

        // Compare decoded keys so `"\u0061"` and `"a"` count as the same key.
        let mut seen = IndexSet::new();
        for (key, _) in &node.values {
            let key = key.unescaped().unwrap_or_else(|_| key.value.clone());
            if !seen.insert(key) {
                self.duplicate_keys += 1;
            }
        }

        self.nested(|this| walk_object(this, node));
    }

    fn visit_array(&mut self, node: &Array) {
        self.count(NodeKind::Array);
        self.nested(|this| walk_array(this, node));
    }

    fn visit_string(&mut self, _node: &Str) {
        self.count(NodeKind::String);
    }

    fn visit_number(&mut self, _node: &Number) {
        self.count(NodeKind::Number);
    }

    fn visit_true(&mut self, _node: &True) {
        self.count(NodeKind::True);
    }

    fn visit_false(&mut self, _node: &False) {
        self.count(NodeKind::False);
    }

    fn visit_null(&mut self, _node: &Null) {
        self.count(NodeKind::Null);
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (kind, count) in &self.nodes {
            writeln!(f, "{kind}: {count}")?;
        }
        writeln!(f, "max depth: {}", self.max_depth)?;
        write!(f, "duplicate keys: {}", self.duplicate_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::Stats;

    #[test]
    fn counts_nodes_depth_and_duplicates() {
        let root = jsontree::parse(r#"{"a": [1, 2, {"b": null}], "a": true}"#).unwrap();
        let stats = Stats::of(&root);

        let nodes: Vec<_> = stats.nodes.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(
            nodes,
            vec![
                ("root", 1),
                ("object", 2),
                ("string", 3),
                ("array", 1),
                ("number", 2),
                ("null", 1),
                ("true", 1)
            ]
        );
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.duplicate_keys, 1);
    }

    #[test]
    fn serializes_without_internal_state() {
        let stats = Stats::of(&jsontree::parse("[]").unwrap());
        assert_eq!(
            serde_json::to_string(&stats).unwrap(),
            r#"{"nodes":{"root":1,"array":1},"max_depth":1,"duplicate_keys":0}"#
        );
    }
}
