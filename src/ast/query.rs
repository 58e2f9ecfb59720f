use super::{Ast, NodeId};

/// Query API for common tree lookups
pub struct AstQuery;

impl AstQuery {
    /// Direct children with the given tag, in document order
    pub fn find_children<'a>(
        ast: &'a Ast,
        id: NodeId,
        tag: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        ast.children(id)
            .iter()
            .copied()
            .filter(move |&child| ast.tag(child) == tag)
    }

    pub fn first_child(ast: &Ast, id: NodeId, tag: &str) -> Option<NodeId> {
        Self::find_children(ast, id, tag).next()
    }

    /// Resolve a slash separated path of tags, e.g. `Else/Source`.
    ///
    /// A final `*` segment selects every child of the nodes matched so far.
    pub fn find_path(ast: &Ast, id: NodeId, path: &str) -> Vec<NodeId> {
        let mut current = vec![id];
        for segment in path.split('/') {
            current = current
                .into_iter()
                .flat_map(|node| {
                    ast.children(node)
                        .iter()
                        .copied()
                        .filter(|&child| segment == "*" || ast.tag(child) == segment)
                        .collect::<Vec<_>>()
                })
                .collect();
        }
        current
    }

    /// Walk parent links upward, nearest first
    pub fn ancestors(ast: &Ast, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(ast.parent(id), move |&node| ast.parent(node))
    }

    /// Nearest ancestor with the given tag
    pub fn enclosing(ast: &Ast, id: NodeId, tag: &str) -> Option<NodeId> {
        Self::ancestors(ast, id).find(|&node| ast.tag(node) == tag)
    }

    pub fn grandparent(ast: &Ast, id: NodeId) -> Option<NodeId> {
        ast.parent(id).and_then(|parent| ast.parent(parent))
    }

    /// Count every node reachable from `id`, itself included
    pub fn subtree_size(ast: &Ast, id: NodeId) -> usize {
        1 + ast
            .children(id)
            .iter()
            .map(|&child| Self::subtree_size(ast, child))
            .sum::<usize>()
    }
}
