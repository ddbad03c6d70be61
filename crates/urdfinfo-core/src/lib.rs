//! urdfinfo Core - URDF document model, loader, and text reports
//!
//! This crate provides the pieces behind the `urdfinfo` diagnostic tool:
//! - A small generic XML element tree built on quick-xml
//! - The URDF document model (links, joints, raw attribute bags) and its loader
//! - Chain, limits, segments and summary text reports

pub mod error;
pub mod report;
pub mod urdf;
pub mod xml;

pub use error::LoadError;
pub use report::{render_chain, render_limits, render_segments, render_summary, ReportKind};
pub use urdf::{load, AttributeBag, Document, Joint, Link, Source};
pub use xml::Element;
