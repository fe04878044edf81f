mod build;

use std::sync::Arc;

use eframe::egui::Vec2;
use thiserror::Error;

use crate::cookies::Cookie;
use crate::util::truncate_chars;

pub use build::build_graph;

pub const DOMAIN_RADIUS: f32 = 25.0;
pub const COOKIE_RADIUS: f32 = 15.0;
const COOKIE_LABEL_CHARS: usize = 15;

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Domain { count: usize },
    Cookie { cookie: Arc<Cookie> },
}

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Set while the node is dragged; force integration is skipped and the
    /// node is held here.
    pub pinned: Option<Vec2>,
}

impl GraphNode {
    pub fn domain(domain: &str, count: usize) -> Self {
        Self::new(
            format!("domain:{domain}"),
            domain.to_owned(),
            NodeKind::Domain { count },
        )
    }

    pub fn cookie(index: usize, cookie: Arc<Cookie>) -> Self {
        Self::new(
            format!("cookie:{index}"),
            cookie.name.clone(),
            NodeKind::Cookie { cookie },
        )
    }

    fn new(id: String, name: String, kind: NodeKind) -> Self {
        Self {
            id,
            name,
            kind,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            pinned: None,
        }
    }

    pub fn is_domain(&self) -> bool {
        matches!(self.kind, NodeKind::Domain { .. })
    }

    pub fn radius(&self) -> f32 {
        if self.is_domain() {
            DOMAIN_RADIUS
        } else {
            COOKIE_RADIUS
        }
    }

    /// Stable across rebuilds even though cookie identities are positional:
    /// a cookie keeps its key while its domain, path and name stay the same.
    pub fn layout_key(&self) -> String {
        match &self.kind {
            NodeKind::Domain { .. } => self.id.clone(),
            NodeKind::Cookie { cookie } => {
                format!("cookie:{}|{}|{}", cookie.domain, cookie.path, cookie.name)
            }
        }
    }

    /// Layout key of the domain node this node hangs off.
    pub fn parent_layout_key(&self) -> Option<String> {
        match &self.kind {
            NodeKind::Domain { .. } => None,
            NodeKind::Cookie { cookie } => Some(format!("domain:{}", cookie.domain)),
        }
    }

    /// Domains show their cookie count; long cookie names are shortened.
    pub fn display_label(&self) -> String {
        match &self.kind {
            NodeKind::Domain { count } => format!("{} ({count})", self.name),
            NodeKind::Cookie { .. } => truncate_chars(&self.name, COOKIE_LABEL_CHARS),
        }
    }

    pub fn cookie_record(&self) -> Option<&Cookie> {
        match &self.kind {
            NodeKind::Cookie { cookie } => Some(cookie),
            NodeKind::Domain { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
}

#[derive(Clone, Debug, Default)]
pub struct CookieGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl CookieGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stats(&self) -> GraphStats {
        let total_domains = self.nodes.iter().filter(|node| node.is_domain()).count();
        GraphStats {
            total_cookies: self.nodes.len() - total_domains,
            total_domains,
            connections: self.links.len(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub total_cookies: usize,
    pub total_domains: usize,
    pub connections: usize,
}

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("invalid graph: link {source_id} -> {target_id} references missing node {missing}")]
    InvalidGraph {
        source_id: String,
        target_id: String,
        missing: String,
    },

    #[error("invalid graph: duplicate node identity {0}")]
    DuplicateNode(String),
}
