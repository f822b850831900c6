//! A tree-view session: one displayed tree and its chosen number of layers.
//!
//! ```text
//! Empty ──show──▶ Built(root, height) ──set_height──▶ Built(root, h')
//!                     │  ▲                                  (re-flatten)
//!                     │  └── show(new root) / refresh ──── (re-walk)
//!                     └──clear──▶ Empty
//! ```

use std::ops::RangeInclusive;

use crate::{
  PersonId,
  graph::GenealogyGraph,
  person::Person,
  tree::{Direction, FamilyTree, TreeItem},
};

#[derive(Debug, Clone, Default)]
pub struct TreeView {
  built: Option<Built>,
}

#[derive(Debug, Clone)]
struct Built {
  tree:   FamilyTree,
  height: usize,
  items:  Vec<TreeItem>,
}

impl Built {
  fn new(tree: FamilyTree, height: Option<usize>) -> Self {
    let height = height.unwrap_or_else(|| tree.height());
    let items = tree.flatten(height);
    Self { tree, height, items }
  }
}

impl TreeView {
  pub fn new() -> Self { Self::default() }

  pub fn is_empty(&self) -> bool { self.built.is_none() }

  /// Walk the graph from `root` and display `height` layers (all of them when
  /// `None`).
  pub async fn show<G: GenealogyGraph>(
    &mut self,
    graph: &G,
    root: Person,
    direction: Direction,
    height: Option<usize>,
  ) -> Result<&[TreeItem], G::Error> {
    let tree = FamilyTree::build(graph, root, direction).await?;
    Ok(self.built.insert(Built::new(tree, height)).items.as_slice())
  }

  /// Change the number of displayed layers without walking the graph again.
  /// Does nothing on an empty view.
  pub fn set_height(&mut self, height: usize) -> &[TreeItem] {
    match &mut self.built {
      Some(built) => {
        built.height = height;
        built.items = built.tree.flatten(height);
        built.items.as_slice()
      }
      None => &[],
    }
  }

  /// Re-walk the graph from the current root after the data changed, keeping
  /// the direction and height. The view empties if the root no longer exists;
  /// on error it keeps showing the previous tree.
  pub async fn refresh<G: GenealogyGraph>(&mut self, graph: &G) -> Result<&[TreeItem], G::Error> {
    let Some(built) = &self.built else { return Ok(&[]) };
    let (root_id, direction, height) =
      (built.tree.root().id(), built.tree.direction(), built.height);

    match graph.person(root_id).await? {
      Some(root) => {
        let tree = FamilyTree::build(graph, root, direction).await?;
        Ok(self.built.insert(Built::new(tree, Some(height))).items.as_slice())
      }
      None => {
        self.built = None;
        Ok(&[])
      }
    }
  }

  pub fn clear(&mut self) { self.built = None; }

  pub fn items(&self) -> &[TreeItem] {
    self.built.as_ref().map(|b| b.items.as_slice()).unwrap_or_default()
  }

  pub fn tree(&self) -> Option<&FamilyTree> { self.built.as_ref().map(|b| &b.tree) }

  pub fn root_id(&self) -> Option<PersonId> { self.tree().map(|t| t.root().id()) }

  pub fn height(&self) -> Option<usize> { self.built.as_ref().map(|b| b.height) }

  /// Layer counts a user can choose from: 1 up to the full tree height.
  pub fn layer_choices(&self) -> Option<RangeInclusive<usize>> {
    self.tree().map(|t| 1..=t.height())
  }
}
