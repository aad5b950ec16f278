//! A fully decoded GBX file

use serde::Serialize;

use crate::header::Header;
use crate::node::{Node, NodeArena, NodeId, Sample};
use crate::reference_table::ReferenceTable;

/// Result of decoding one GBX file
#[derive(Debug, Clone, Serialize)]
pub struct Gbx {
    pub header: Header,
    pub reference_table: Option<ReferenceTable>,
    /// Root node of the body
    pub body: NodeId,
    pub nodes: NodeArena,
}

impl Gbx {
    /// Root node of the body
    pub fn body(&self) -> &Node {
        &self.nodes[self.body]
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Samples of the ghost this file carries that have a position
    ///
    /// For a replay this is its first ghost; for a map, the validation ghost held by
    /// its challenge parameters; for a ghost file, the ghost itself.
    pub fn ghost_samples(&self) -> Vec<&Sample> {
        let Some(ghost) = self.ghost() else {
            return Vec::new();
        };
        let Some(record) = ghost.node_ref("recordData").and_then(|id| self.node(id)) else {
            return Vec::new();
        };
        record
            .samples()
            .iter()
            .filter(|s| s.transform.is_some())
            .collect()
    }

    fn ghost(&self) -> Option<&Node> {
        let body = self.body();
        if body.get("recordData").is_some() {
            return Some(body);
        }
        if let Some(&first) = body.node_list("ghosts").first() {
            return self.node(first);
        }
        let parameters = self.node(body.node_ref("challengeParameters")?)?;
        self.node(parameters.node_ref("raceValidateGhost")?)
    }
}
