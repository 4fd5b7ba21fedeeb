//! Service layer for the scan pipeline
//!
//! Construction order mirrors the data flow: the recorder owns the
//! detached write path, the resolver orchestrates the public scan, the
//! link service owns creation. Every service receives its dependencies
//! at construction; nothing reaches for global state.

pub mod link_service;
pub mod recorder;
pub mod resolver;
pub mod ua_classifier;

pub use link_service::{CreateLinkRequest, LinkService};
pub use recorder::{ScanRecorder, WorkerPoolRecorder};
pub use resolver::Resolver;
pub use ua_classifier::{classify, DeviceClass, UaProfile};
