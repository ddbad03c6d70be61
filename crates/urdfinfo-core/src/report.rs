//! Plain-text reports over a loaded [`Document`]
//!
//! Every renderer is a pure function returning one string per output line.
//! Absent optional fields are skipped (or marked), never treated as errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::urdf::{Document, Joint, Link};

/// Line emitted by the limits report for a joint without a `<limit>` element
pub const NO_LIMITS: &str = "no limits";

/// The reports that can be rendered from a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Joint connectivity: type, origin, parent and child
    Chain,
    /// Joint motion limits
    Limits,
    /// Link names
    Segments,
    /// One `Link:`/`Joint:` line per entity
    Summary,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Chain,
        ReportKind::Limits,
        ReportKind::Segments,
        ReportKind::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Chain => "chain",
            ReportKind::Limits => "limits",
            ReportKind::Segments => "segments",
            ReportKind::Summary => "summary",
        }
    }

    /// Render this report for `document`
    pub fn render(&self, document: &Document) -> Vec<String> {
        match self {
            ReportKind::Chain => render_chain(&document.joints),
            ReportKind::Limits => render_limits(&document.joints),
            ReportKind::Segments => render_segments(&document.links),
            ReportKind::Summary => render_summary(document),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown report kind: {}", s))
    }
}

/// Chain report: name and type for every joint, then origin, parent and
/// child when present
pub fn render_chain(joints: &[Joint]) -> Vec<String> {
    let mut lines = Vec::with_capacity(joints.len() * 5);
    for joint in joints {
        lines.push(joint.name.clone());
        lines.push(format!("  type: {}", joint.joint_type));
        if let Some(origin) = &joint.origin {
            lines.push(format!("  origin: {}", origin));
        }
        if let Some(parent) = &joint.parent {
            lines.push(format!("  parent: {}", parent));
        }
        if let Some(child) = &joint.child {
            lines.push(format!("  child: {}", child));
        }
    }
    lines
}

/// Limits report: joint name followed by its limit attributes or [`NO_LIMITS`]
pub fn render_limits(joints: &[Joint]) -> Vec<String> {
    joints
        .iter()
        .flat_map(|joint| {
            let limits = match &joint.limits {
                Some(limits) => limits.to_string(),
                None => NO_LIMITS.to_string(),
            };
            [joint.name.clone(), limits]
        })
        .collect()
}

/// Segments report: link names, one per line
pub fn render_segments(links: &[Link]) -> Vec<String> {
    links.iter().map(|link| link.name.clone()).collect()
}

/// Summary listing of every link, then every joint
pub fn render_summary(document: &Document) -> Vec<String> {
    let links = document.links.iter().map(|l| format!("Link: {}", l.name));
    let joints = document.joints.iter().map(|j| format!("Joint: {}", j.name));
    links.chain(joints).collect()
}
