//! URDF document model and loader
//!
//! Reads the `link` and `joint` elements directly under the document root
//! into typed records. Everything else (materials, gazebo blocks, nested
//! elements) is ignored. Values stay as the strings found in the file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::LoadError;
use crate::xml::Element;

/// Raw attribute set lifted verbatim from one XML element
///
/// Keys are kept sorted so every rendering of a bag is deterministic.
/// The [`Display`](fmt::Display) form is a JSON object, e.g.
/// `{"lower": "-1.0", "upper": "1.0"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeBag(BTreeMap<String, String>);

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for AttributeBag {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for AttributeBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", quote(key), quote(value))?;
        }
        f.write_str("}")
    }
}

/// JSON string literal for `s`
fn quote(s: &str) -> String {
    // Serializing a &str cannot fail
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

/// A rigid body segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
}

impl Link {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn from_element(element: &Element) -> Result<Self, LoadError> {
        let name = element
            .attribute("name")
            .ok_or_else(|| LoadError::missing_attribute("link", None, "name"))?;
        debug!(name, "Found link");
        Ok(Self::new(name))
    }
}

/// A connection between two links
///
/// `parent` and `child` are link names as written in the file; nothing
/// checks that a link with that name exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joint {
    pub name: String,
    #[serde(rename = "type")]
    pub joint_type: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub child: Option<String>,
    #[serde(default)]
    pub origin: Option<AttributeBag>,
    #[serde(default)]
    pub axis: Option<AttributeBag>,
    #[serde(default)]
    pub limits: Option<AttributeBag>,
    #[serde(default)]
    pub dynamics: Option<AttributeBag>,
}

impl Joint {
    pub fn new(name: impl Into<String>, joint_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            joint_type: joint_type.into(),
            parent: None,
            child: None,
            origin: None,
            axis: None,
            limits: None,
            dynamics: None,
        }
    }

    fn from_element(element: &Element) -> Result<Self, LoadError> {
        let name = element
            .attribute("name")
            .ok_or_else(|| LoadError::missing_attribute("joint", None, "name"))?;
        let joint_type = element
            .attribute("type")
            .ok_or_else(|| LoadError::missing_attribute("joint", Some(name), "type"))?;
        debug!(name, joint_type, "Found joint");

        let mut joint = Self::new(name, joint_type);

        // A repeated child tag overwrites the earlier one
        for child in element.children() {
            match child.tag.as_str() {
                "parent" => joint.parent = Some(link_reference(child, name)?),
                "child" => joint.child = Some(link_reference(child, name)?),
                "origin" => joint.origin = Some(child.attribute_map().into()),
                "axis" => joint.axis = Some(child.attribute_map().into()),
                "limit" => joint.limits = Some(child.attribute_map().into()),
                "dynamics" => joint.dynamics = Some(child.attribute_map().into()),
                _ => {}
            }
        }

        Ok(joint)
    }
}

fn link_reference(element: &Element, joint_name: &str) -> Result<String, LoadError> {
    element
        .attribute("link")
        .map(str::to_string)
        .ok_or_else(|| LoadError::missing_attribute(element.tag.as_str(), Some(joint_name), "link"))
}

/// Where to read a document from
#[derive(Debug, Clone)]
pub enum Source {
    /// Path to a file on disk
    Path(PathBuf),
    /// XML text already in memory
    Xml(String),
    /// An already-parsed XML tree
    Tree(Element),
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Element> for Source {
    fn from(element: Element) -> Self {
        Self::Tree(element)
    }
}

/// Load a document from any [`Source`]
pub fn load(source: impl Into<Source>) -> Result<Document, LoadError> {
    match source.into() {
        Source::Path(path) => Document::from_file(&path),
        Source::Xml(xml) => Document::from_xml(&xml),
        Source::Tree(root) => Document::from_element(&root),
    }
}

/// Parse result: links and joints in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub links: Vec<Link>,
    pub joints: Vec<Joint>,
}

impl Document {
    /// Build a document from the direct children of `root`
    pub fn from_element(root: &Element) -> Result<Self, LoadError> {
        let mut document = Self::default();

        for child in root.children() {
            match child.tag.as_str() {
                "link" => document.links.push(Link::from_element(child)?),
                "joint" => document.joints.push(Joint::from_element(child)?),
                _ => {}
            }
        }

        Ok(document)
    }

    /// Parse a document from XML text
    pub fn from_xml(xml: &str) -> Result<Self, LoadError> {
        Self::from_element(&Element::parse(xml)?)
    }

    /// Parse a document from a file
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path)?;
        let content = std::str::from_utf8(&bytes)
            .map_err(|e| LoadError::malformed(format!("document is not valid UTF-8: {}", e)))?;
        let document = Self::from_xml(content)?;
        info!(
            path = %path.display(),
            links = document.links.len(),
            joints = document.joints.len(),
            "Loaded URDF"
        );
        Ok(document)
    }

    /// First link with the given name
    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.name == name)
    }

    /// First joint with the given name
    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.joints.iter().find(|j| j.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.joints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ARM: &str = r#"<?xml version="1.0"?>
<robot name="arm">
  <link name="base_link"/>
  <link name="arm_link"/>
  <joint name="j1" type="revolute">
    <parent link="base_link"/>
    <child link="arm_link"/>
    <limit lower="-1.0" upper="1.0"/>
  </joint>
</robot>"#;

    fn bag(pairs: &[(&str, &str)]) -> AttributeBag {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_load_simple_arm() {
        let doc = Document::from_xml(ARM).unwrap();
        assert_eq!(doc.links, vec![Link::new("base_link"), Link::new("arm_link")]);
        assert_eq!(doc.joints.len(), 1);

        let j1 = &doc.joints[0];
        assert_eq!(j1.name, "j1");
        assert_eq!(j1.joint_type, "revolute");
        assert_eq!(j1.parent.as_deref(), Some("base_link"));
        assert_eq!(j1.child.as_deref(), Some("arm_link"));
        assert_eq!(j1.limits, Some(bag(&[("lower", "-1.0"), ("upper", "1.0")])));
        assert_eq!(j1.origin, None);
        assert_eq!(j1.axis, None);
        assert_eq!(j1.dynamics, None);
    }

    #[test]
    fn test_document_order_preserved() {
        let xml = r#"<robot>
  <joint name="b" type="fixed"/>
  <link name="z"/>
  <joint name="a" type="fixed"/>
  <link name="y"/>
  <link name="x"/>
</robot>"#;
        let doc = Document::from_xml(xml).unwrap();
        let links: Vec<_> = doc.links.iter().map(|l| l.name.as_str()).collect();
        let joints: Vec<_> = doc.joints.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(links, vec!["z", "y", "x"]);
        assert_eq!(joints, vec!["b", "a"]);
    }

    #[test]
    fn test_last_origin_wins() {
        let xml = r#"<robot>
  <joint name="j" type="fixed">
    <origin xyz="0 0 0" rpy="0 0 0"/>
    <origin xyz="1 2 3"/>
  </joint>
</robot>"#;
        let doc = Document::from_xml(xml).unwrap();
        assert_eq!(doc.joints[0].origin, Some(bag(&[("xyz", "1 2 3")])));
    }

    #[test]
    fn test_last_parent_wins() {
        let xml = r#"<robot>
  <joint name="j" type="fixed">
    <parent link="first"/>
    <parent link="second"/>
  </joint>
</robot>"#;
        let doc = Document::from_xml(xml).unwrap();
        assert_eq!(doc.joints[0].parent.as_deref(), Some("second"));
    }

    #[test]
    fn test_all_attribute_bags() {
        let xml = r#"<robot>
  <joint name="wrist" type="continuous">
    <origin xyz="0 0 0.1" rpy="0 0 1.57"/>
    <axis xyz="0 0 1"/>
    <limit effort="30" velocity="1.0"/>
    <dynamics damping="0.7" friction="0.0"/>
    <calibration rising="0.0"/>
  </joint>
</robot>"#;
        let joint = &Document::from_xml(xml).unwrap().joints[0];
        assert_eq!(joint.origin.as_ref().unwrap().get("rpy"), Some("0 0 1.57"));
        assert_eq!(joint.axis, Some(bag(&[("xyz", "0 0 1")])));
        assert_eq!(joint.limits.as_ref().unwrap().len(), 2);
        assert_eq!(joint.dynamics.as_ref().unwrap().get("damping"), Some("0.7"));
    }

    #[test]
    fn test_unknown_tags_ignored() {
        let xml = r#"<robot>
  <material name="blue"><color rgba="0 0 1 1"/></material>
  <link name="a"><visual><link name="nested"/></visual></link>
  <gazebo reference="a"/>
  <joint name="j" type="fixed"/>
</robot>"#;
        let doc = Document::from_xml(xml).unwrap();
        assert_eq!(doc.links.len(), 1);
        assert_eq!(doc.joints.len(), 1);
        assert!(doc.link("nested").is_none());
    }

    #[test]
    fn test_permissive_values_pass_through() {
        let xml = r#"<robot>
  <joint name="j" type="wobbly">
    <parent link="does_not_exist"/>
    <limit lower="abc"/>
  </joint>
</robot>"#;
        let doc = Document::from_xml(xml).unwrap();
        let joint = doc.joint("j").unwrap();
        assert_eq!(joint.joint_type, "wobbly");
        assert_eq!(joint.parent.as_deref(), Some("does_not_exist"));
        assert_eq!(joint.limits.as_ref().unwrap().get("lower"), Some("abc"));
    }

    #[test]
    fn test_link_without_name_fails() {
        let err = Document::from_xml(r#"<robot><link name="a"/><link/></robot>"#).unwrap_err();
        match err {
            LoadError::MissingRequiredAttribute { tag, owner, attribute } => {
                assert_eq!(tag, "link");
                assert_eq!(owner, None);
                assert_eq!(attribute, "name");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_joint_without_type_fails() {
        let err = Document::from_xml(r#"<robot><joint name="j"/></robot>"#).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingRequiredAttribute { ref owner, attribute: "type", .. }
                if owner.as_deref() == Some("j")
        ));
    }

    #[test]
    fn test_joint_without_name_fails() {
        let err = Document::from_xml(r#"<robot><joint type="fixed"/></robot>"#).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingRequiredAttribute { attribute: "name", .. }
        ));
    }

    #[test]
    fn test_child_without_link_fails() {
        let xml = r#"<robot><joint name="j" type="fixed"><child/></joint></robot>"#;
        let err = Document::from_xml(xml).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required attribute 'link' on <child> (in 'j')"
        );
    }

    #[test]
    fn test_malformed_xml_fails() {
        let err = Document::from_xml("<robot><link name=\"a\"></robot>").unwrap_err();
        assert!(matches!(err, LoadError::MalformedDocument(_)));
    }

    #[test]
    fn test_load_from_tree() {
        let root = Element::new("robot")
            .with_child(Element::new("link").with_attribute("name", "base"))
            .with_child(
                Element::new("joint")
                    .with_attribute("name", "j")
                    .with_attribute("type", "prismatic")
                    .with_child(Element::new("axis").with_attribute("xyz", "1 0 0")),
            );
        let doc = load(root).unwrap();
        assert_eq!(doc.links[0].name, "base");
        assert_eq!(doc.joints[0].axis, Some(bag(&[("xyz", "1 0 0")])));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ARM.as_bytes()).unwrap();

        let doc = load(file.path()).unwrap();
        assert_eq!(doc.links.len(), 2);
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_non_utf8_file_is_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<robot><link name=\"caf\xE9\"/></robot>").unwrap();

        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedDocument(_)));
        assert!(err.is_document_error());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load(dir.path().join("nope.urdf")).unwrap_err();
        assert!(matches!(err, LoadError::IoError(_)));
    }

    #[test]
    fn test_empty_root() {
        let doc = load(Source::Xml("<robot/>".to_string())).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_attribute_bag_display_parses_back() {
        let original = bag(&[("upper", "1.0"), ("lower", "-1.0"), ("note", "say \"hi\"")]);
        let text = original.to_string();
        assert_eq!(
            text,
            r#"{"lower": "-1.0", "note": "say \"hi\"", "upper": "1.0"}"#
        );
        let parsed: AttributeBag = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, original);
    }
}
