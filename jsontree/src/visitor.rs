//! The traversal contract every tree consumer implements.
//!
//! Each `visit_*` method defaults to walking the node's children in source order, so a visitor
//! only overrides what it cares about. An overriding method can call the matching `walk_*`
//! function to keep descending.

use crate::ast::{Array, False, Node, Null, Number, Object, Root, Str, True};

pub trait Visitor {
    fn visit_root(&mut self, node: &Root) {
        walk_root(self, node);
    }

    fn visit_object(&mut self, node: &Object) {
        walk_object(self, node);
    }

    fn visit_array(&mut self, node: &Array) {
        walk_array(self, node);
    }

    fn visit_string(&mut self, _node: &Str) {}

    fn visit_number(&mut self, _node: &Number) {}

    fn visit_true(&mut self, _node: &True) {}

    fn visit_false(&mut self, _node: &False) {}

    fn visit_null(&mut self, _node: &Null) {}
}

pub fn walk_root<V: Visitor + ?Sized>(visitor: &mut V, node: &Root) {
    node.value.accept(visitor);
}

/// Visits each member's key, then its value.
pub fn walk_object<V: Visitor + ?Sized>(visitor: &mut V, node: &Object) {
    for (key, value) in &node.values {
        visitor.visit_string(key);
        value.accept(visitor);
    }
}

pub fn walk_array<V: Visitor + ?Sized>(visitor: &mut V, node: &Array) {
    visit_all(visitor, &node.values);
}

/// Visit every node in `nodes` in order.
pub fn visit_all<'a, V, I>(visitor: &mut V, nodes: I)
where
    V: Visitor + ?Sized,
    I: IntoIterator<Item = &'a Node>,
{
    for node in nodes {
        node.accept(visitor);
    }
}

#[cfg(test)]
mod tests {
    use super::{walk_array, Visitor};
    use crate::ast::{Array, Number, Str};
    use crate::parse;

    #[derive(Default)]
    struct Leaves(Vec<String>);

    impl Visitor for Leaves {
        fn visit_string(&mut self, node: &Str) {
            self.0.push(node.value.clone());
        }

        fn visit_number(&mut self, node: &Number) {
            self.0.push(node.value.clone());
        }
    }

    #[test]
    fn default_walk_is_in_source_order() {
        let root = parse(r#"{"a": [1, "b"], "c": {"d": 2.0}}"#).unwrap();
        let mut leaves = Leaves::default();
        root.accept(&mut leaves);
        assert_eq!(
            leaves.0,
            vec![r#""a""#, "1", r#""b""#, r#""c""#, r#""d""#, "2.0"]
        );
    }

    #[derive(Default)]
    struct ArrayDepth {
        depth: usize,
        deepest: usize,
    }

    impl Visitor for ArrayDepth {
        fn visit_array(&mut self, node: &Array) {
            self.depth += 1;
            self.deepest = self.deepest.max(self.depth);
            walk_array(self, node);
            self.depth -= 1;
        }
    }

    #[test]
    fn overriding_and_walking_keeps_descending() {
        let root = parse("[[], [[1]], {\"k\": [[[]]]}]").unwrap();
        let mut depth = ArrayDepth::default();
        root.accept(&mut depth);
        assert_eq!(depth.deepest, 4);
    }
}
