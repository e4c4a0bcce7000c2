use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::HashMap;
use sheltr_core::geometry::{BboxKey, BoundingBox};
use sheltr_core::scoring::RiskScorer;
use sheltr_core::{Error, NetworkConfig, RawNetwork, RiskGraph, build_risk_graph};

/// Risk graphs per area of interest, built lazily from one snapshot.
///
/// Graphs are immutable once built. A build runs outside the lock and the
/// finished graph is published by inserting its `Arc`, so readers never
/// observe a graph under construction.
pub struct GraphStore {
    snapshot: RawNetwork,
    config: NetworkConfig,
    scorer: RiskScorer,
    max_cached: usize,
    graphs: RwLock<HashMap<BboxKey, Arc<RiskGraph>>>,
}

impl GraphStore {
    pub fn new(snapshot: RawNetwork, config: NetworkConfig, max_cached: usize) -> Result<Self, Error> {
        let scorer = config.scorer.build()?;
        Ok(Self {
            snapshot,
            config,
            scorer,
            max_cached: max_cached.max(1),
            graphs: RwLock::new(HashMap::new()),
        })
    }

    /// Area covered by the whole snapshot
    pub fn snapshot_bounds(&self) -> Result<BoundingBox, Error> {
        self.snapshot.bounds().ok_or(Error::EmptyNetwork)
    }

    pub fn cached(&self) -> usize {
        self.graphs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Graph for the snapshot cropped to `bbox`, built on first use
    pub fn graph_for(&self, bbox: &BoundingBox) -> Result<Arc<RiskGraph>, Error> {
        let key = bbox.rounded_key();
        if let Some(graph) = self
            .graphs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(graph));
        }

        tracing::info!(?bbox, "Building risk graph for new area of interest");
        let graph = Arc::new(build_risk_graph(
            &self.snapshot.crop(bbox),
            &self.scorer,
            &self.config,
        )?);

        let mut graphs = self.graphs.write().unwrap_or_else(PoisonError::into_inner);
        if graphs.len() >= self.max_cached && !graphs.contains_key(&key) {
            tracing::warn!(cached = graphs.len(), "Graph cache full, dropping all cached graphs");
            graphs.clear();
        }
        // A concurrent request may have published the same area first
        Ok(Arc::clone(graphs.entry(key).or_insert(graph)))
    }
}
