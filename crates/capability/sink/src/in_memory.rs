//! 写入端内存实现
//!
//! 仅用于本地测试和占位。

use crate::error::SinkError;
use crate::traits::{PointSink, SinkConnector, WriteAck};
use async_trait::async_trait;
use domain::Batch;
use std::sync::{Arc, RwLock};

/// 内存写入端：记录收到的批次。
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    batches: Arc<RwLock<Vec<Batch>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已写入批次的副本（用于测试）。
    pub fn batches(&self) -> Vec<Batch> {
        self.batches.read().map(|b| b.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PointSink for InMemorySink {
    async fn write(&self, batch: &Batch) -> Result<WriteAck, SinkError> {
        let mut batches = self
            .batches
            .write()
            .map_err(|_| SinkError::Other("lock failed".to_string()))?;
        batches.push(batch.clone());
        Ok(WriteAck {
            points: batch.len(),
            status: None,
        })
    }
}

/// 每次连接返回共享同一记录的内存写入端，并统计连接次数。
#[derive(Debug, Clone, Default)]
pub struct InMemoryConnector {
    sink: InMemorySink,
    connections: Arc<RwLock<usize>>,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<Batch> {
        self.sink.batches()
    }

    pub fn connections(&self) -> usize {
        self.connections.read().map(|c| *c).unwrap_or(0)
    }
}

#[async_trait]
impl SinkConnector for InMemoryConnector {
    async fn connect(&self) -> Result<Box<dyn PointSink>, SinkError> {
        let mut connections = self
            .connections
            .write()
            .map_err(|_| SinkError::Other("lock failed".to_string()))?;
        *connections += 1;
        Ok(Box::new(self.sink.clone()))
    }
}
