use glam::DVec2;

use crate::error::Error;
use crate::geometry::Rect;

use super::body::{Body, BodyDesc};

/// A handle to a node in the scene tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Returns the array index of this handle.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct Node {
    name: String,
    position: DVec2,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    body: Option<Body>,
}

/// The scene tree: an arena of nodes, each either a traversal-only group or
/// a node carrying a [`Body`].
///
/// Parent links are non-owning back-references used only for accumulating
/// positions into world space; children are owned by their parent. Every
/// structural change bumps a revision counter so the physics engine can
/// detect that its body registry went stale.
#[derive(Debug)]
pub struct World {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    root: NodeId,
    revision: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty world with a root group at the origin.
    pub fn new() -> Self {
        let root = Node {
            name: String::from("world"),
            position: DVec2::ZERO,
            parent: None,
            children: Vec::new(),
            body: None,
        };
        Self {
            nodes: vec![Some(root)],
            free: Vec::new(),
            root: NodeId(0),
            revision: 0,
        }
    }

    /// Returns the root group.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Current structural revision. Bumped by every add or remove.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn node(&self, id: NodeId) -> Result<&Node, Error> {
        self.nodes
            .get(id.index())
            .and_then(|slot| slot.as_ref())
            .ok_or(Error::NoSuchNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, Error> {
        self.nodes
            .get_mut(id.index())
            .and_then(|slot| slot.as_mut())
            .ok_or(Error::NoSuchNode(id))
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let parent = node.parent;
        let id = if let Some(index) = self.free.pop() {
            self.nodes[index] = Some(node);
            NodeId(index as u32)
        } else {
            self.nodes.push(Some(node));
            NodeId((self.nodes.len() - 1) as u32)
        };
        if let Some(parent) = parent {
            if let Some(Some(parent_node)) = self.nodes.get_mut(parent.index()) {
                parent_node.children.push(id);
            }
        }
        self.revision += 1;
        id
    }

    /// Creates a traversal-only group under the given parent.
    pub fn create_group(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        position: DVec2,
    ) -> Result<NodeId, Error> {
        self.node(parent)?;
        Ok(self.insert(Node {
            name: name.into(),
            position,
            parent: Some(parent),
            children: Vec::new(),
            body: None,
        }))
    }

    /// Creates a body node under the given parent.
    pub fn create_body(&mut self, parent: NodeId, desc: BodyDesc) -> Result<NodeId, Error> {
        self.node(parent)?;
        let (body, position, name) = desc.into_body();
        Ok(self.insert(Node {
            name,
            position,
            parent: Some(parent),
            children: Vec::new(),
            body: Some(body),
        }))
    }

    /// Removes a node and its whole subtree. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> Result<(), Error> {
        if id == self.root {
            return Err(Error::NoSuchNode(id));
        }
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            if let Ok(parent_node) = self.node_mut(parent) {
                parent_node.children.retain(|&child| child != id);
            }
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes[current.index()].take() {
                stack.extend(node.children);
                self.free.push(current.index());
            }
        }
        self.revision += 1;
        Ok(())
    }

    /// Returns the node's name.
    pub fn name(&self, id: NodeId) -> Result<&str, Error> {
        Ok(self.node(id)?.name.as_str())
    }

    /// Returns the node's parent, or `None` for the root.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, Error> {
        Ok(self.node(id)?.parent)
    }

    /// Returns the node's local position.
    pub fn position(&self, id: NodeId) -> Result<DVec2, Error> {
        Ok(self.node(id)?.position)
    }

    /// Sets the node's local position.
    pub fn set_position(&mut self, id: NodeId, position: DVec2) -> Result<(), Error> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    /// Borrows the body attached to a node.
    pub fn body(&self, id: NodeId) -> Result<&Body, Error> {
        self.node(id)?.body.as_ref().ok_or(Error::NotABody(id))
    }

    /// Mutably borrows the body attached to a node.
    pub fn body_mut(&mut self, id: NodeId) -> Result<&mut Body, Error> {
        self.node_mut(id)?.body.as_mut().ok_or(Error::NotABody(id))
    }

    /// Maps a local point into world space by accumulating ancestor
    /// positions, stopping before `stop` when given (so `stop`'s own
    /// position is excluded).
    pub fn map_to_global(
        &self,
        id: NodeId,
        point: DVec2,
        stop: Option<NodeId>,
    ) -> Result<DVec2, Error> {
        let mut mapped = point;
        let mut current = Some(id);
        while let Some(node_id) = current {
            if Some(node_id) == stop {
                break;
            }
            let node = self.node(node_id)?;
            mapped += node.position;
            current = node.parent;
        }
        Ok(mapped)
    }

    /// Maps a local rectangle into world space.
    pub fn map_rect_to_global(
        &self,
        id: NodeId,
        rect: Rect,
        stop: Option<NodeId>,
    ) -> Result<Rect, Error> {
        Ok(Rect::new(
            self.map_to_global(id, rect.position, stop)?,
            rect.size,
        ))
    }

    /// Collects every body node in deterministic pre-order.
    pub fn collect_bodies(&self) -> Vec<NodeId> {
        let mut bodies = Vec::new();
        self.collect_into(self.root, &mut bodies);
        bodies
    }

    fn collect_into(&self, id: NodeId, bodies: &mut Vec<NodeId>) {
        if let Some(Some(node)) = self.nodes.get(id.index()) {
            if node.body.is_some() {
                bodies.push(id);
            }
            for &child in &node.children {
                self.collect_into(child, bodies);
            }
        }
    }

    /// Number of live body nodes.
    pub fn num_bodies(&self) -> usize {
        self.nodes
            .iter()
            .flatten()
            .filter(|node| node.body.is_some())
            .count()
    }
}
