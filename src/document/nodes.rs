//! Shader node graphs.
//!
//! A deliberately small model of a node-based material: a principled shader
//! node, image texture nodes, and links between named sockets. Socket names
//! are validated on every link so a typo or a missing node surfaces as a
//! named error instead of a generic failure deep inside an operation.

use crate::error::{BakerError, Result};

/// Index of a node within its graph. Nodes are never removed, so indices
/// stay stable for the life of the graph.
pub type NodeId = usize;

/// Name given to the shader node present in every new graph.
pub const PRINCIPLED_NODE: &str = "Principled BSDF";

/// Socket names on the principled shader node.
pub mod socket {
    pub const BASE_COLOR: &str = "Base Color";
    pub const EMISSION: &str = "Emission";
    pub const ALPHA: &str = "Alpha";
    pub const BSDF: &str = "BSDF";
    pub const COLOR: &str = "Color";
    pub const VECTOR: &str = "Vector";
}

/// What a shader node computes.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Principled surface shader. Only the inputs the baker touches are
    /// modeled; `base_color` is the unlinked default value.
    Principled { base_color: [f32; 4] },
    /// Samples a named document image.
    ImageTexture { image: Option<String> },
}

/// A node in a material's shader graph.
#[derive(Debug, Clone)]
pub struct ShaderNode {
    pub name: String,
    pub kind: NodeKind,
}

impl ShaderNode {
    /// Input socket names for this node kind.
    pub fn inputs(&self) -> &'static [&'static str] {
        match self.kind {
            NodeKind::Principled { .. } => {
                &[socket::BASE_COLOR, socket::EMISSION, socket::ALPHA]
            }
            NodeKind::ImageTexture { .. } => &[socket::VECTOR],
        }
    }

    /// Output socket names for this node kind.
    pub fn outputs(&self) -> &'static [&'static str] {
        match self.kind {
            NodeKind::Principled { .. } => &[socket::BSDF],
            NodeKind::ImageTexture { .. } => &[socket::COLOR, socket::ALPHA],
        }
    }
}

/// A connection from one node's output socket to another node's input socket.
#[derive(Debug, Clone)]
pub struct NodeLink {
    pub from_node: NodeId,
    pub from_socket: String,
    pub to_node: NodeId,
    pub to_socket: String,
}

/// Shader node graph: nodes, links, and an active-node marker.
///
/// The active node is the bake target selection convention: the bake engine
/// writes into whichever image texture node is marked active.
#[derive(Debug, Clone)]
pub struct NodeGraph {
    nodes: Vec<ShaderNode>,
    links: Vec<NodeLink>,
    active: Option<NodeId>,
}

impl NodeGraph {
    /// Create a graph holding a single principled shader node with the
    /// default base color.
    pub fn new() -> Self {
        Self {
            nodes: vec![ShaderNode {
                name: PRINCIPLED_NODE.to_string(),
                kind: NodeKind::Principled {
                    base_color: [0.8, 0.8, 0.8, 1.0],
                },
            }],
            links: Vec::new(),
            active: None,
        }
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> &[ShaderNode] {
        &self.nodes
    }

    /// Links in creation order.
    pub fn links(&self) -> &[NodeLink] {
        &self.links
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> Option<&ShaderNode> {
        self.nodes.get(id)
    }

    /// Mutable node by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut ShaderNode> {
        self.nodes.get_mut(id)
    }

    /// Find a node by name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name)
    }

    /// Add an image texture node sampling the named document image.
    ///
    /// The node name is uniqued, so repeated calls yield `Image Texture`,
    /// `Image Texture (1)`, and so on.
    pub fn add_image_texture(&mut self, image: Option<String>) -> NodeId {
        let name = self.ensure_unique_node_name("Image Texture");
        self.nodes.push(ShaderNode {
            name,
            kind: NodeKind::ImageTexture { image },
        });
        self.nodes.len() - 1
    }

    fn ensure_unique_node_name(&self, desired: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired.to_string();

        while self.nodes.iter().any(|n| n.name == test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired, counter);
        }

        test_name
    }

    /// Connect an output socket to an input socket.
    ///
    /// Both sockets are validated against the node kinds. An input socket
    /// accepts a single link; linking into an occupied input replaces the
    /// previous link, which keeps repeated rewiring convergent.
    pub fn link(
        &mut self,
        from_node: NodeId,
        from_socket: &str,
        to_node: NodeId,
        to_socket: &str,
    ) -> Result<()> {
        let from = self
            .node(from_node)
            .ok_or(BakerError::InvalidNodeId(from_node))?;
        if !from.outputs().contains(&from_socket) {
            return Err(BakerError::SocketNotFound {
                node: from.name.clone(),
                socket: from_socket.to_string(),
            });
        }

        let to = self
            .node(to_node)
            .ok_or(BakerError::InvalidNodeId(to_node))?;
        if !to.inputs().contains(&to_socket) {
            return Err(BakerError::SocketNotFound {
                node: to.name.clone(),
                socket: to_socket.to_string(),
            });
        }

        self.links
            .retain(|l| !(l.to_node == to_node && l.to_socket == to_socket));
        self.links.push(NodeLink {
            from_node,
            from_socket: from_socket.to_string(),
            to_node,
            to_socket: to_socket.to_string(),
        });
        Ok(())
    }

    /// The link feeding the given input socket, if any.
    pub fn link_into(&self, to_node: NodeId, to_socket: &str) -> Option<&NodeLink> {
        self.links
            .iter()
            .find(|l| l.to_node == to_node && l.to_socket == to_socket)
    }

    /// Find an image texture node already aimed at the named image.
    pub fn image_texture_for(&self, image: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| {
            matches!(&n.kind, NodeKind::ImageTexture { image: Some(i) } if i == image)
        })
    }

    /// Mark a node as active (the bake target selection convention).
    pub fn set_active(&mut self, id: NodeId) {
        if id < self.nodes.len() {
            self.active = Some(id);
        }
    }

    /// The active node, if any.
    pub fn active(&self) -> Option<NodeId> {
        self.active
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_graph_has_principled_node() {
        let graph = NodeGraph::new();
        assert!(graph.find_node(PRINCIPLED_NODE).is_some());
        assert_eq!(graph.nodes().len(), 1);
    }

    #[test]
    fn test_link_validates_sockets() {
        let mut graph = NodeGraph::new();
        let shader = graph.find_node(PRINCIPLED_NODE).unwrap();
        let tex = graph.add_image_texture(None);

        assert!(graph.link(tex, socket::COLOR, shader, socket::BASE_COLOR).is_ok());

        let err = graph
            .link(tex, "Colour", shader, socket::BASE_COLOR)
            .unwrap_err();
        assert!(matches!(err, BakerError::SocketNotFound { .. }));

        let err = graph
            .link(tex, socket::COLOR, shader, "Specular")
            .unwrap_err();
        assert!(matches!(err, BakerError::SocketNotFound { .. }));
    }

    #[test]
    fn test_link_replaces_existing_input_link() {
        let mut graph = NodeGraph::new();
        let shader = graph.find_node(PRINCIPLED_NODE).unwrap();
        let a = graph.add_image_texture(None);
        let b = graph.add_image_texture(None);

        graph.link(a, socket::COLOR, shader, socket::BASE_COLOR).unwrap();
        graph.link(b, socket::COLOR, shader, socket::BASE_COLOR).unwrap();

        assert_eq!(graph.links().len(), 1);
        assert_eq!(graph.link_into(shader, socket::BASE_COLOR).unwrap().from_node, b);
    }

    #[test]
    fn test_image_texture_names_are_uniqued() {
        let mut graph = NodeGraph::new();
        let a = graph.add_image_texture(None);
        let b = graph.add_image_texture(None);
        assert_eq!(graph.node(a).unwrap().name, "Image Texture");
        assert_eq!(graph.node(b).unwrap().name, "Image Texture (1)");
    }

    #[test]
    fn test_image_texture_for_finds_target() {
        let mut graph = NodeGraph::new();
        let tex = graph.add_image_texture(Some("bake".to_string()));
        graph.add_image_texture(None);
        assert_eq!(graph.image_texture_for("bake"), Some(tex));
        assert_eq!(graph.image_texture_for("other"), None);
    }
}
