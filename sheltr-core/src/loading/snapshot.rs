//! Raw street network snapshots as delivered by the map-data collaborator

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use geo::{Coord, LineString, Point};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;
use crate::{Error, NodeId};

/// Materialized street network for one area of interest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNetwork {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
    pub source: NodeId,
    pub target: NodeId,
    /// Length in metres; computed from the geometry when absent
    #[serde(default)]
    pub length_m: Option<f64>,
    /// Polyline as `[lon, lat]` pairs oriented source -> target; a straight
    /// line between the endpoints when absent
    #[serde(default)]
    pub geometry: Option<Vec<[f64; 2]>>,
    /// One stored segment usable in both directions
    #[serde(default)]
    pub bidirectional: bool,
    #[serde(default)]
    pub bridge: bool,
    #[serde(default)]
    pub tunnel: bool,
}

impl RawNode {
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl RawEdge {
    pub fn is_structure(&self) -> bool {
        self.bridge || self.tunnel
    }

    /// Explicit geometry, if the snapshot carries one
    pub fn line_string(&self) -> Option<LineString<f64>> {
        self.geometry.as_ref().map(|coords| {
            coords
                .iter()
                .map(|[x, y]| Coord { x: *x, y: *y })
                .collect()
        })
    }
}

impl RawNetwork {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() || self.edges.is_empty()
    }

    /// Reads a snapshot serialized as JSON
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to open snapshot '{}': {}", path.display(), e),
            )
        })?;
        let network = Self::from_json_reader(BufReader::new(file))?;
        log::info!(
            "Read snapshot {} with {} nodes and {} edges",
            path.display(),
            network.nodes.len(),
            network.edges.len()
        );
        Ok(network)
    }

    /// Bounding box of all nodes
    pub fn bounds(&self) -> Option<BoundingBox> {
        let first = self.nodes.first()?;
        let mut bbox = BoundingBox {
            north: first.lat,
            south: first.lat,
            east: first.lon,
            west: first.lon,
        };
        for node in &self.nodes[1..] {
            bbox.north = bbox.north.max(node.lat);
            bbox.south = bbox.south.min(node.lat);
            bbox.east = bbox.east.max(node.lon);
            bbox.west = bbox.west.min(node.lon);
        }
        Some(bbox)
    }

    /// Part of the network inside `bbox`: the edges whose endpoints both lie
    /// in the box, in their original order, and the nodes they use.
    ///
    /// Nodes left without any edge are dropped so they cannot become snap
    /// targets that no route can leave.
    #[must_use]
    pub fn crop(&self, bbox: &BoundingBox) -> Self {
        let inside: HashSet<NodeId> = self
            .nodes
            .iter()
            .filter(|node| bbox.contains(&node.point()))
            .map(|node| node.id)
            .collect();
        let edges: Vec<RawEdge> = self
            .edges
            .iter()
            .filter(|edge| inside.contains(&edge.source) && inside.contains(&edge.target))
            .cloned()
            .collect();

        let connected: HashSet<NodeId> = edges
            .iter()
            .flat_map(|edge| [edge.source, edge.target])
            .collect();
        let nodes = self
            .nodes
            .iter()
            .filter(|node| connected.contains(&node.id))
            .copied()
            .collect();

        Self { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "nodes": [
            {"id": 1, "lat": 18.450, "lon": 73.850},
            {"id": 2, "lat": 18.451, "lon": 73.851},
            {"id": 3, "lat": 18.600, "lon": 73.900}
        ],
        "edges": [
            {"source": 1, "target": 2, "length_m": 150.0, "bidirectional": true},
            {"source": 2, "target": 3, "geometry": [[73.851, 18.451], [73.9, 18.6]], "bridge": true}
        ]
    }"#;

    #[test]
    fn reads_json_with_defaults() {
        let network = RawNetwork::from_json_reader(SNAPSHOT.as_bytes()).unwrap();
        assert_eq!(network.nodes.len(), 3);
        assert_eq!(network.edges[0].length_m, Some(150.0));
        assert!(network.edges[0].geometry.is_none());
        assert!(!network.edges[0].is_structure());
        assert!(network.edges[1].is_structure());
        assert_eq!(network.edges[1].line_string().unwrap().0.len(), 2);
    }

    #[test]
    fn crop_drops_outside_nodes_and_dangling_edges() {
        let network = RawNetwork::from_json_reader(SNAPSHOT.as_bytes()).unwrap();
        let bbox = BoundingBox::new(18.5, 18.4, 73.86, 73.84).unwrap();

        let cropped = network.crop(&bbox);
        assert_eq!(cropped.nodes.len(), 2);
        assert_eq!(cropped.edges.len(), 1);
        assert_eq!(cropped.edges[0].target, 2);
    }

    #[test]
    fn crop_drops_nodes_left_without_edges() {
        let mut network = RawNetwork::from_json_reader(SNAPSHOT.as_bytes()).unwrap();
        // Node 4 sits inside the box but is only linked to node 3 outside it
        network.nodes.push(RawNode {
            id: 4,
            lat: 18.452,
            lon: 73.852,
        });
        network.edges.push(RawEdge {
            source: 4,
            target: 3,
            length_m: Some(20_000.0),
            geometry: None,
            bidirectional: true,
            bridge: false,
            tunnel: false,
        });
        let bbox = BoundingBox::new(18.5, 18.4, 73.86, 73.84).unwrap();

        let cropped = network.crop(&bbox);
        let ids: Vec<NodeId> = cropped.nodes.iter().map(|node| node.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(cropped.edges.len(), 1);

        let lonely = BoundingBox::new(18.4525, 18.4515, 73.8525, 73.8515).unwrap();
        let cropped = network.crop(&lonely);
        assert!(cropped.nodes.is_empty() && cropped.edges.is_empty());
    }

    #[test]
    fn bounds_cover_all_nodes() {
        let network = RawNetwork::from_json_reader(SNAPSHOT.as_bytes()).unwrap();
        let bounds = network.bounds().unwrap();
        assert_eq!(bounds.north, 18.6);
        assert_eq!(bounds.west, 73.85);
        assert!(RawNetwork::default().bounds().is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            RawNetwork::from_json_reader("{\"nodes\": 3}".as_bytes()),
            Err(Error::JsonError(_))
        ));
    }
}
