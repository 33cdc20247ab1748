//! Reply trees built from a flat list of comments
//!
//! All live comments of one post are loaded in a single query and grouped by
//! parent id. Trees are then projected from that arena with an explicit depth
//! bound. Replies whose parent is not in the arena (deleted parent) are not
//! reachable from any root and so stay out of the thread listing.

use std::collections::HashMap;

use super::models::{Comment, CommentResponse};

pub const DEFAULT_MAX_REPLY_DEPTH: usize = 32;

pub struct CommentArena {
    comments: Vec<Comment>,
    by_id: HashMap<i64, usize>,
    children: HashMap<i64, Vec<usize>>,
    roots: Vec<usize>,
}

impl CommentArena {
    pub fn new(comments: Vec<Comment>) -> Self {
        let mut by_id = HashMap::with_capacity(comments.len());
        let mut children: HashMap<i64, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();

        for (idx, comment) in comments.iter().enumerate() {
            by_id.insert(comment.id, idx);
            match comment.parent_id {
                Some(parent) => children.entry(parent).or_default().push(idx),
                None => roots.push(idx),
            }
        }

        let key = |idx: &usize| (comments[*idx].created_at.clone(), comments[*idx].id);

        // Replies oldest first, roots newest first
        for list in children.values_mut() {
            list.sort_by_key(key);
        }
        roots.sort_by_key(key);
        roots.reverse();

        Self {
            comments,
            by_id,
            children,
            roots,
        }
    }

    /// Root comments with their reply trees
    pub fn forest(&self, max_depth: usize) -> Vec<CommentResponse> {
        self.roots
            .iter()
            .map(|&idx| self.project(idx, 0, max_depth))
            .collect()
    }

    /// The comment `id` with its reply tree, if it is in the arena
    pub fn subtree(&self, id: i64, max_depth: usize) -> Option<CommentResponse> {
        self.by_id
            .get(&id)
            .map(|&idx| self.project(idx, 0, max_depth))
    }

    /// Direct replies of `id`, each with its own tree
    pub fn replies_of(&self, id: i64, max_depth: usize) -> Vec<CommentResponse> {
        self.children
            .get(&id)
            .map(|kids| {
                kids.iter()
                    .map(|&idx| self.project(idx, 0, max_depth))
                    .collect()
            })
            .unwrap_or_default()
    }

    // Recursion is bounded by max_depth
    fn project(&self, idx: usize, depth: usize, max_depth: usize) -> CommentResponse {
        let comment = &self.comments[idx];
        let mut response = CommentResponse::from(comment);

        let Some(kids) = self.children.get(&comment.id) else {
            return response;
        };

        if depth >= max_depth {
            response.replies_truncated = true;
            return response;
        }

        response.replies = kids
            .iter()
            .map(|&child| self.project(child, depth + 1, max_depth))
            .collect();
        response
    }
}
