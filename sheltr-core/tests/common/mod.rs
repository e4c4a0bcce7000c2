#![allow(dead_code)]

use geo::LineString;
use sheltr_core::loading::{RawEdge, RawNode};
use sheltr_core::scoring::ScoreEdge;
use sheltr_core::{Error, NodeId, RawNetwork};

pub fn node(id: NodeId, lat: f64, lon: f64) -> RawNode {
    RawNode { id, lat, lon }
}

pub fn edge(source: NodeId, target: NodeId, length_m: f64) -> RawEdge {
    RawEdge {
        source,
        target,
        length_m: Some(length_m),
        geometry: None,
        bidirectional: false,
        bridge: false,
        tunnel: false,
    }
}

pub fn two_way(source: NodeId, target: NodeId, length_m: f64) -> RawEdge {
    RawEdge {
        bidirectional: true,
        ..edge(source, target, length_m)
    }
}

/// Full hazard east of the prime meridian, none elsewhere
pub struct EastIsDangerous;

impl ScoreEdge for EastIsDangerous {
    fn score(&self, geometry: &LineString<f64>, _length_m: f64) -> Result<f64, Error> {
        if geometry.0.len() < 2 {
            return Err(Error::InvalidGeometry("too short".to_string()));
        }
        Ok(if geometry.coords().any(|c| c.x > 0.0) {
            1.0
        } else {
            0.0
        })
    }
}

/// A=1 (south), B=2 (west), C=3 (east), D=4 (north).
/// A -> B -> D is 10 m of safe street, A -> C -> D is 8 m through the
/// hazard.
pub fn diamond() -> RawNetwork {
    RawNetwork {
        nodes: vec![
            node(1, 0.0, 0.0),
            node(2, 0.001, -0.001),
            node(3, 0.001, 0.001),
            node(4, 0.002, 0.0),
        ],
        edges: vec![
            edge(1, 2, 5.0),
            edge(2, 4, 5.0),
            edge(1, 3, 4.0),
            edge(3, 4, 4.0),
        ],
    }
}

/// `size` x `size` grid of two-way streets, ids row-major from 1,
/// spacing ~111 m
pub fn grid(size: i64) -> RawNetwork {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let id = |row: i64, col: i64| row * size + col + 1;

    for row in 0..size {
        for col in 0..size {
            nodes.push(node(id(row, col), row as f64 * 0.001, col as f64 * 0.001));
            if col + 1 < size {
                edges.push(two_way(id(row, col), id(row, col + 1), 111.0));
            }
            if row + 1 < size {
                edges.push(two_way(id(row, col), id(row + 1, col), 111.0));
            }
        }
    }

    RawNetwork { nodes, edges }
}
