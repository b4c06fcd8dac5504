pub mod mirror_ops;
pub mod queue_ops;
