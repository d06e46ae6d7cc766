use std::sync::Arc;

use log::info;

use crate::{
    config::EngineConfig,
    error::ConfigError,
    graph::node::{Node, NodeBuffers, NodeProperties, PrepareInfo},
    time::SampleRange,
    transport::BlockState,
};

/*
Graph Player
============

Drives a tree of nodes block by block:

  1. latch per-block state (playhead, mute states) so every node sees the same
  2. process inputs depth-first, then the node that reads them

     [source] ──→ [effect A] ──→ [effect B] ──→ output()
        1st          2nd            3rd

Inputs are owned by the nodes that read them, so a depth-first walk is a
valid topological order.
*/

fn prepare_node(node: &mut dyn Node, info: &PrepareInfo) {
    node.visit_inputs(&mut |input| prepare_node(input, info));
    node.prepare(info);
}

fn process_node(node: &mut dyn Node, range: SampleRange) {
    node.visit_inputs(&mut |input| process_node(input, range));
    node.process(range);
}

pub struct GraphPlayer {
    root: Box<dyn Node>,
    config: EngineConfig,
    block_states: Vec<Arc<dyn BlockState>>,
    reference_position: i64,
}

impl GraphPlayer {
    /// Validate `config` and prepare every node under `root`
    pub fn new<N: Node + 'static>(root: N, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut root: Box<dyn Node> = Box::new(root);
        let info = PrepareInfo {
            sample_rate: config.sample_rate,
            block_size: config.block_size,
        };
        prepare_node(root.as_mut(), &info);

        let props = root.properties();
        info!(
            "graph prepared: {} Hz, {} frames, {} channels, {} samples latency",
            config.sample_rate, config.block_size, props.num_channels, props.latency_samples
        );

        Ok(Self {
            root,
            config,
            block_states: Vec::new(),
            reference_position: 0,
        })
    }

    /// Latch `state` at the start of every block
    pub fn with_block_state(mut self, state: Arc<dyn BlockState>) -> Self {
        self.block_states.push(state);
        self
    }

    pub fn add_block_state(&mut self, state: Arc<dyn BlockState>) {
        self.block_states.push(state);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn properties(&self) -> NodeProperties {
        self.root.properties()
    }

    /// Reference sample at which the next `process_next` block starts
    pub fn reference_position(&self) -> i64 {
        self.reference_position
    }

    /// Process an explicit range of reference samples
    pub fn process(&mut self, range: SampleRange) -> &NodeBuffers {
        assert!(
            range.len() <= self.config.block_size,
            "block of {} frames exceeds the prepared block size {}",
            range.len(),
            self.config.block_size
        );

        for state in &self.block_states {
            state.begin_block(range);
        }
        process_node(self.root.as_mut(), range);

        self.reference_position = range.end;
        self.root.output()
    }

    /// Process the next `num_frames` reference samples
    pub fn process_next(&mut self, num_frames: usize) -> &NodeBuffers {
        let range = SampleRange::with_length(self.reference_position, num_frames);
        self.process(range)
    }

    pub fn output(&self) -> &NodeBuffers {
        self.root.output()
    }
}
