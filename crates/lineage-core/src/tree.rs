//! Rooted, depth-bounded family trees.
//!
//! [`FamilyTree::build`] walks the genealogy graph outward from a root person
//! in one [`Direction`]. Each node carries its spouses as same-generation
//! companions (their own relatives are not followed) and, as child nodes, the
//! next generation: children when descending, parents when ascending.
//!
//! Marriages between already-related branches make the graph cyclic, so the
//! walk keeps a visited set and places each person at most once. A person
//! reached a second time is skipped. The lineage is placed breadth-first
//! before any spouse is attached, so a relative married into another branch
//! still appears under their own parent.
//!
//! The built tree is an immutable snapshot covering every reachable
//! generation. [`FamilyTree::flatten`] cuts it to a number of layers; changing
//! the number of layers never needs another walk, but any change to the
//! underlying data does.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::{PersonId, graph::GenealogyGraph, person::Person};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
  /// Children, grandchildren, ...
  #[default]
  Descendants,
  /// Parents, grandparents, ...
  Ancestors,
}

/// One person placed in the lineage, with their spouses.
#[derive(Debug, Clone)]
pub struct TreeNode {
  pub person:   Person,
  /// Generation distance from the root (the root is 0).
  pub depth:    usize,
  pub spouses:  Vec<Person>,
  /// Indices into the tree's node list, in display order.
  pub children: Vec<usize>,
}

/// How a flattened item is attached to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
  Root,
  /// A lineal relative of the root (descendant or ancestor).
  Lineage,
  /// A spouse of the item directly before it at the same depth.
  Spouse,
}

/// One row of a flattened tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeItem {
  pub person:    Person,
  pub depth:     usize,
  pub placement: Placement,
}

#[derive(Debug, Clone)]
pub struct FamilyTree {
  direction: Direction,
  /// Arena of nodes; the root is always at index 0.
  nodes:     Vec<TreeNode>,
}

impl FamilyTree {
  /// Walk `graph` from `root` and build the full (unbounded) tree.
  pub async fn build<G: GenealogyGraph>(
    graph: &G,
    root: Person,
    direction: Direction,
  ) -> Result<Self, G::Error> {
    let root_id = root.id();
    let mut visited: HashSet<PersonId> = HashSet::from([root_id]);
    let mut nodes = vec![TreeNode { person: root, depth: 0, spouses: vec![], children: vec![] }];

    // Lineage first, one generation at a time, so every relative sits at
    // their shortest distance from the root.
    let mut queue = VecDeque::from([0usize]);
    while let Some(index) = queue.pop_front() {
      let id = nodes[index].person.id();
      let depth = nodes[index].depth + 1;

      let mut next = match direction {
        Direction::Descendants => graph.children_of(id).await?,
        Direction::Ancestors => graph.parents_of(id).await?,
      };
      next.sort_by(Person::cmp_by_birth);
      next.retain(|p| visited.insert(p.id()));

      let first = nodes.len();
      nodes.extend(next.into_iter().map(|person| TreeNode {
        person,
        depth,
        spouses: vec![],
        children: vec![],
      }));
      let children: Vec<usize> = (first..nodes.len()).collect();
      queue.extend(children.iter().copied());
      nodes[index].children = children;
    }

    // Spouses only take people the lineage did not place.
    for index in 0..nodes.len() {
      let mut spouses = graph.spouses_of(nodes[index].person.id()).await?;
      spouses.sort_by(Person::cmp_by_birth);
      spouses.retain(|p| visited.insert(p.id()));
      nodes[index].spouses = spouses;
    }

    debug!(
      root_id = %root_id,
      %direction,
      placed = visited.len(),
      "built family tree"
    );
    Ok(Self { direction, nodes })
  }

  pub fn direction(&self) -> Direction { self.direction }

  pub fn root(&self) -> &Person { &self.nodes[0].person }

  pub fn nodes(&self) -> &[TreeNode] { &self.nodes }

  /// Number of layers in the unbounded tree. A lone root has height 1.
  pub fn height(&self) -> usize {
    self.nodes.iter().map(|n| n.depth).max().unwrap_or(0) + 1
  }

  /// Whether `id` was placed anywhere in the tree, as a node or a spouse.
  pub fn contains(&self, id: PersonId) -> bool {
    self
      .nodes
      .iter()
      .any(|n| n.person.id() == id || n.spouses.iter().any(|s| s.id() == id))
  }

  /// Depth-first listing of every node with depth below `height`. Each node
  /// is followed by its spouses (same depth) and then its subtree.
  pub fn flatten(&self, height: usize) -> Vec<TreeItem> {
    let mut items = Vec::new();
    if height == 0 {
      return items;
    }

    let mut stack = vec![0usize];
    while let Some(index) = stack.pop() {
      let node = &self.nodes[index];
      let placement = if index == 0 { Placement::Root } else { Placement::Lineage };
      items.push(TreeItem { person: node.person.clone(), depth: node.depth, placement });
      items.extend(node.spouses.iter().map(|s| TreeItem {
        person:    s.clone(),
        depth:     node.depth,
        placement: Placement::Spouse,
      }));
      if node.depth + 1 < height {
        stack.extend(node.children.iter().rev().copied());
      }
    }
    items
  }
}
