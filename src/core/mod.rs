//! Core runtime components: collectors, the metric model, the collection
//! executor and the publishers it hands results to.

pub mod collectors;
pub mod executor;
pub mod metric;
pub mod publisher;
