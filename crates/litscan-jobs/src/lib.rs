//! Background task lifecycle for the pipeline's two processes: the
//! Consumer Worker (runs jobs) and the Producer Scheduler (dispatches
//! them).

pub mod consumer;
pub mod producer;

pub use consumer::{ConsumerConfig, ConsumerEvent, ConsumerHandle, ConsumerWorker};
pub use producer::{ProducerConfig, ProducerEvent, ProducerHandle, ProducerScheduler};
