//! Materials and their shader graphs.

use crate::document::nodes::{socket, NodeGraph, NodeId, NodeKind, PRINCIPLED_NODE};
use crate::error::{BakerError, Result};

/// A named material owning a shader node graph.
///
/// Every new material starts with a principled shader node, matching the
/// host convention the baker relies on when it rewires graphs.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    graph: NodeGraph,
}

impl Material {
    /// Create a material with a fresh default graph.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            graph: NodeGraph::new(),
        }
    }

    /// Create a material whose base color is driven by the named document
    /// image through an image texture node.
    pub fn with_base_color_image(name: &str, image: &str) -> Self {
        let mut material = Self::new(name);
        let shader = material
            .graph
            .find_node(PRINCIPLED_NODE)
            .expect("new graphs always contain a principled node");
        let texture = material.graph.add_image_texture(Some(image.to_string()));
        material
            .graph
            .link(texture, socket::COLOR, shader, socket::BASE_COLOR)
            .expect("principled base color accepts a color link");
        material
    }

    /// The material's shader graph.
    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    /// Mutable access to the shader graph.
    pub fn graph_mut(&mut self) -> &mut NodeGraph {
        &mut self.graph
    }

    /// Look up a node by name, reporting the material in the error.
    pub fn node(&self, name: &str) -> Result<NodeId> {
        self.graph
            .find_node(name)
            .ok_or_else(|| BakerError::NodeNotFound {
                material: self.name.clone(),
                node: name.to_string(),
            })
    }

    /// The principled shader node.
    pub fn shader(&self) -> Result<NodeId> {
        self.node(PRINCIPLED_NODE)
    }

    /// Set the principled shader's unlinked base color.
    pub fn set_base_color(&mut self, color: [f32; 4]) {
        if let Some(id) = self.graph.find_node(PRINCIPLED_NODE) {
            if let Some(node) = self.graph.node_mut(id) {
                if let NodeKind::Principled { base_color } = &mut node.kind {
                    *base_color = color;
                }
            }
        }
    }

    /// The image texture node linked into the shader's base color input,
    /// if the material has one.
    pub fn base_color_texture(&self) -> Option<NodeId> {
        let shader = self.graph.find_node(PRINCIPLED_NODE)?;
        let link = self.graph.link_into(shader, socket::BASE_COLOR)?;
        match self.graph.node(link.from_node)?.kind {
            NodeKind::ImageTexture { .. } => Some(link.from_node),
            _ => None,
        }
    }
}
