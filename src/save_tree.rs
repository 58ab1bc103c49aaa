//! Hierarchical save-game node
//!
//! Mirrors the shape of the host's save format: a named node holding ordered
//! `key = value` string fields and ordered named child nodes, where both
//! field keys and child names may repeat. A host adapter converts its own
//! save object to and from this type around a correction pass.

use glam::DVec3;

use crate::error::FormatError;

/// A named node in a save tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveNode {
    pub name: String,
    values: Vec<(String, String)>,
    nodes: Vec<SaveNode>,
}

impl SaveNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Builder form of `add_value`
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_value(key, value);
        self
    }

    /// Builder form of `add_node`
    pub fn with_node(mut self, node: SaveNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// First value stored under `key`
    pub fn get_value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrite the first value stored under `key`
    ///
    /// When the key is absent the value is appended only if
    /// `create_if_missing` is set. Returns whether a value was written.
    pub fn set_value(
        &mut self,
        key: &str,
        value: impl Into<String>,
        create_if_missing: bool,
    ) -> bool {
        if let Some((_, v)) = self.values.iter_mut().find(|(k, _)| k == key) {
            *v = value.into();
            return true;
        }
        if create_if_missing {
            self.values.push((key.to_owned(), value.into()));
            return true;
        }
        false
    }

    /// Append a value, even if the key already exists
    pub fn add_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.push((key.into(), value.into()));
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Append a child node and return it for further filling
    pub fn add_node(&mut self, node: SaveNode) -> &mut SaveNode {
        self.nodes.push(node);
        let last = self.nodes.len() - 1;
        &mut self.nodes[last]
    }

    /// First child named `name`
    pub fn get_node(&self, name: &str) -> Option<&SaveNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn get_node_mut(&mut self, name: &str) -> Option<&mut SaveNode> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    /// All children named `name`, in order
    pub fn get_nodes<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SaveNode> {
        self.nodes.iter().filter(move |n| n.name == name)
    }

    pub fn get_nodes_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut SaveNode> {
        self.nodes.iter_mut().filter(move |n| n.name == name)
    }
}

/// Parse a `pos` field: three comma-separated numbers, each trimmed
pub fn parse_position(text: &str) -> Result<DVec3, FormatError> {
    let invalid = || FormatError::InvalidPosition(text.to_owned());

    let mut coords = [0.0f64; 3];
    let mut parts = text.split(',');
    for coord in &mut coords {
        let part = parts.next().ok_or_else(invalid)?;
        *coord = part.trim().parse().map_err(|_| invalid())?;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(DVec3::from_array(coords))
}

/// Format a position the way the host writes `pos` fields
pub fn format_position(pos: DVec3) -> String {
    format!("{} , {} , {}", pos.x, pos.y, pos.z)
}

/// Parse a `flightID` field
pub fn parse_flight_id(text: &str) -> Result<u32, FormatError> {
    text.trim()
        .parse()
        .map_err(|_| FormatError::InvalidFlightId(text.to_owned()))
}
