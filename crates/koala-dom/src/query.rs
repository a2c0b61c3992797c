//! Document-order tree walks and the `getElement*` family of lookups.
//!
//! [§ 4.2.6 Mixin ParentNode](https://dom.spec.whatwg.org/#interface-parentnode)
//! [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)

use crate::{DomTree, NodeId};

/// Pre-order iterator over the descendants of a node (the node itself excluded).
///
/// [§ 4.2.6 Tree order](https://dom.spec.whatwg.org/#concept-tree-order)
/// "In tree order is preorder, depth-first traversal of a tree."
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

impl DomTree {
    /// Iterate over every descendant of `id` in tree order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Descendant elements of `id`, in tree order.
    pub fn descendant_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(id)
            .filter(|&d| self.as_element(d).is_some())
    }

    /// [§ 4.2.4 getElementById()](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
    ///
    /// "The getElementById(elementId) method steps are to return the first
    /// element, in tree order, within this's descendants, whose ID is elementId;
    /// otherwise, if there is no such element, null."
    #[must_use]
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        if element_id.is_empty() {
            return None;
        }
        self.descendant_elements(NodeId::ROOT)
            .find(|&id| self.as_element(id).and_then(|e| e.id()) == Some(element_id))
    }

    /// [§ 4.4 getElementsByTagName()](https://dom.spec.whatwg.org/#concept-getelementsbytagname)
    ///
    /// "If qualifiedName is U+002A (*), return a HTMLCollection rooted at root,
    /// whose filter matches only descendant elements."
    ///
    /// Tag names compare ASCII case-insensitively.
    #[must_use]
    pub fn get_elements_by_tag_name(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        let all = tag == "*";
        self.descendant_elements(scope)
            .filter(|&id| {
                all || self
                    .as_element(id)
                    .is_some_and(|e| e.tag_name.eq_ignore_ascii_case(tag))
            })
            .collect()
    }

    /// [§ 4.4 getElementsByClassName()](https://dom.spec.whatwg.org/#concept-getelementsbyclassname)
    ///
    /// "Let classes be the result of running the ordered set parser on classNames.
    /// If classes is the empty set, return an empty HTMLCollection."
    #[must_use]
    pub fn get_elements_by_class_name(&self, scope: NodeId, class_names: &str) -> Vec<NodeId> {
        let wanted: Vec<&str> = class_names.split_ascii_whitespace().collect();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.descendant_elements(scope)
            .filter(|&id| {
                self.as_element(id)
                    .is_some_and(|e| wanted.iter().all(|c| e.has_class(c)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{DomTree, ElementData, NodeId};

    #[test]
    fn test_descendants_are_in_tree_order() {
        let mut tree = DomTree::new();
        let a = tree.create_element(ElementData::new("a"));
        let b = tree.create_element(ElementData::new("b"));
        let c = tree.create_element(ElementData::new("c"));
        let d = tree.create_element(ElementData::new("d"));
        tree.append_child(NodeId::ROOT, a);
        tree.append_child(a, b);
        tree.append_child(b, c);
        tree.append_child(a, d);

        let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
        assert_eq!(order, vec![a, b, c, d]);
    }
}
