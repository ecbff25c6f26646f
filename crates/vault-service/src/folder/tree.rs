//! In-memory view of the folder hierarchy.
//!
//! Built from one fetch of the folder table, then walked with explicit
//! worklists so deep hierarchies never grow the call stack. The store does
//! not forbid cycles in `parent_id`, so every walk keeps a visited set and
//! a depth bound.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_entity::Folder;

/// Parent and child links for every folder, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct FolderTree {
    parents: HashMap<Uuid, Option<Uuid>>,
    children: HashMap<Uuid, Vec<Uuid>>,
}

impl FolderTree {
    /// Index a flat list of folders.
    pub fn new(folders: &[Folder]) -> Self {
        let mut tree = Self::default();
        for folder in folders {
            tree.parents.insert(folder.id, folder.parent_id);
            if let Some(parent) = folder.parent_id {
                tree.children.entry(parent).or_default().push(folder.id);
            }
        }
        tree
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.parents.contains_key(&id)
    }

    /// The folder and every folder below it, parents before children.
    ///
    /// Returns an empty list for an unknown folder. Fails when the subtree
    /// is deeper than `max_depth` levels below `root`.
    pub fn subtree(&self, root: Uuid, max_depth: usize) -> AppResult<Vec<Uuid>> {
        if !self.contains(root) {
            return Ok(Vec::new());
        }
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut worklist = vec![(root, 0usize)];
        let mut cursor = 0;
        visited.insert(root);

        // Breadth-first: the worklist doubles as the output order.
        while cursor < worklist.len() {
            let (id, depth) = worklist[cursor];
            cursor += 1;
            order.push(id);
            for &child in self.children.get(&id).into_iter().flatten() {
                if !visited.insert(child) {
                    continue;
                }
                if depth + 1 > max_depth {
                    return Err(AppError::validation(format!(
                        "Folder '{root}' is nested deeper than {max_depth} levels"
                    )));
                }
                worklist.push((child, depth + 1));
            }
        }
        Ok(order)
    }

    /// Whether `ancestor` is `folder` itself or lies on its parent chain.
    pub fn is_self_or_ancestor(&self, ancestor: Uuid, folder: Uuid, max_depth: usize) -> AppResult<bool> {
        let mut current = Some(folder);
        let mut seen = HashSet::new();
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            if !seen.insert(id) {
                return Err(AppError::conflict(format!(
                    "Folder '{folder}' has a cyclic parent chain"
                )));
            }
            if seen.len() > max_depth + 1 {
                return Err(AppError::validation(format!(
                    "Folder '{folder}' is nested deeper than {max_depth} levels"
                )));
            }
            current = self.parents.get(&id).copied().flatten();
        }
        Ok(false)
    }
}
