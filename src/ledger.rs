//! Anchor position ledger
//!
//! Remembers the first position seen for every anchor part and restores it in
//! save trees where the simulation has drifted it. Entries iterate in
//! ascending id order, so the persisted file is stable between saves.
//!
//! On-disk shape: `{"anchors":{"<id>":{"x":..,"y":..,"z":..},...}}`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glam::DVec3;

use crate::consts::DEFAULT_ANCHOR_MARKER;
use crate::error::{FormatError, LedgerError, Result, SchemaError};
use crate::json::{self, JsonValue, Map};
use crate::save_tree::{SaveNode, format_position, parse_flight_id, parse_position};

/// Counts from one correction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectionReport {
    /// Anchor parts found in the tree
    pub candidates: usize,
    /// Anchor parts whose `pos` was rewritten
    pub corrected: usize,
    /// Anchor parts skipped for an unreadable `flightID` or `pos`
    pub malformed: usize,
}

/// Counts from one ledger load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// Original anchor positions keyed by flight id
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
    marker: String,
    anchors: BTreeMap<u32, DVec3>,
}

impl Ledger {
    /// Empty ledger persisted at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            marker: DEFAULT_ANCHOR_MARKER.to_string(),
            anchors: BTreeMap::new(),
        }
    }

    /// Override the part type-name substring that identifies anchors
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<DVec3> {
        self.anchors.get(&id).copied()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.anchors.contains_key(&id)
    }

    /// Entries in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (u32, DVec3)> + '_ {
        self.anchors.iter().map(|(&id, &pos)| (id, pos))
    }

    /// Remember `position` for `id` unless it is already known
    ///
    /// Returns whether the entry was new. Non-finite positions are refused:
    /// they never compare equal and have no JSON form.
    pub fn register(&mut self, id: u32, position: DVec3) -> bool {
        if !position.is_finite() {
            log::warn!("Ignoring non-finite position for anchor ID {}: {}", id, position);
            return false;
        }
        if self.anchors.contains_key(&id) {
            return false;
        }
        self.anchors.insert(id, position);
        log::debug!("Anchor registered ID {}: {}", id, position);
        true
    }

    /// Restore remembered positions in `tree`
    ///
    /// Walks `FLIGHTSTATE` → `VESSEL` → `PART`. Anchor parts with a ledger
    /// entry and a `pos` that differs in any coordinate get their `pos`
    /// rewritten. Parts with an unreadable `flightID` or `pos` are logged
    /// and skipped.
    pub fn correct(&self, tree: &mut SaveNode) -> CorrectionReport {
        let mut report = CorrectionReport::default();
        let Some(flight_state) = tree.get_node_mut("FLIGHTSTATE") else {
            log::debug!("Save has no FLIGHTSTATE, nothing to correct");
            return report;
        };

        for vessel in flight_state.get_nodes_mut("VESSEL") {
            for part in vessel.get_nodes_mut("PART") {
                let is_anchor = part
                    .get_value("part")
                    .is_some_and(|name| name.contains(self.marker.as_str()));
                if !is_anchor {
                    continue;
                }
                report.candidates += 1;

                match self.correct_part(part) {
                    Ok(true) => report.corrected += 1,
                    Ok(false) => {}
                    Err(e) => {
                        log::warn!("Skipping anchor part: {}", e);
                        report.malformed += 1;
                    }
                }
            }
        }

        log::info!(
            "Save hook processed {} anchors. Restored {} anchors.",
            report.candidates,
            report.corrected
        );
        report
    }

    /// Returns whether `pos` was rewritten
    fn correct_part(&self, part: &mut SaveNode) -> Result<bool, FormatError> {
        let raw_id = part.get_value("flightID").unwrap_or_default();
        let id = parse_flight_id(raw_id)?;
        let Some(original) = self.get(id) else {
            return Ok(false);
        };

        let raw_pos = part.get_value("pos").unwrap_or_default();
        let current = parse_position(raw_pos)?;
        if current == original {
            return Ok(false);
        }

        log::info!("Restoring ID {} from {} to {}", id, current, original);
        part.set_value("pos", format_position(original), true);
        Ok(true)
    }

    /// The ledger as a JSON document
    pub fn to_json(&self) -> JsonValue {
        let anchors: Map = self
            .anchors
            .iter()
            .map(|(id, pos)| {
                let coords: Map = [
                    ("x", JsonValue::from(pos.x)),
                    ("y", JsonValue::from(pos.y)),
                    ("z", JsonValue::from(pos.z)),
                ]
                .into_iter()
                .collect();
                (id.to_string(), JsonValue::Object(coords))
            })
            .collect();

        let mut root = Map::new();
        root.insert("anchors", JsonValue::Object(anchors));
        JsonValue::Object(root)
    }

    /// Merge entries from a decoded ledger document
    ///
    /// Entries from the document replace in-memory entries with the same id.
    /// Bad entries are logged and skipped; a document of the wrong shape
    /// loads nothing.
    pub fn merge_json(&mut self, doc: &JsonValue) -> LoadReport {
        let mut report = LoadReport::default();

        let anchors = match decode_anchors(doc) {
            Ok(anchors) => anchors,
            Err(e) => {
                log::warn!("Ignoring ledger document: {}", e);
                return report;
            }
        };

        for (key, value) in anchors.iter() {
            match decode_entry(key, value) {
                Ok((id, pos)) => {
                    self.anchors.insert(id, pos);
                    report.loaded += 1;
                }
                Err(e) => {
                    log::warn!("Skipping ledger entry: {}", e);
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Write the ledger to its file, creating parent directories
    ///
    /// The text goes to a temporary sibling first and is renamed over the
    /// old file.
    pub fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| LedgerError::io(dir, e))?;
        }

        let text = json::serialize(&self.to_json());
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, text).map_err(|e| LedgerError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| LedgerError::io(&self.path, e))?;

        log::info!("Saved {} anchors to {}", self.len(), self.path.display());
        Ok(())
    }

    /// Read the ledger file into memory
    ///
    /// A missing or blank file is an empty ledger, not an error.
    pub fn load(&mut self) -> Result<LoadReport> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No ledger at {}, starting fresh", self.path.display());
                return Ok(LoadReport::default());
            }
            Err(e) => return Err(LedgerError::io(&self.path, e)),
        };

        // Editors on some platforms prepend a byte order mark
        let text = text.strip_prefix('\u{feff}').unwrap_or(text.as_str());
        if text.trim().is_empty() {
            log::info!("Ledger {} is empty", self.path.display());
            return Ok(LoadReport::default());
        }

        let doc = json::parse(text)?;
        let report = self.merge_json(&doc);
        log::info!(
            "Anchors loaded from file: {} loaded, {} skipped",
            report.loaded,
            report.skipped
        );
        Ok(report)
    }
}

fn decode_anchors(doc: &JsonValue) -> Result<&Map, SchemaError> {
    let root = doc.as_object().ok_or(SchemaError::NotAnObject)?;
    let anchors = root.get("anchors").ok_or(SchemaError::MissingAnchors)?;
    anchors.as_object().ok_or(SchemaError::AnchorsNotAnObject)
}

fn decode_entry(key: &str, value: &JsonValue) -> Result<(u32, DVec3), SchemaError> {
    let id: u32 = key
        .parse()
        .map_err(|_| SchemaError::InvalidId(key.to_owned()))?;
    let coord = |axis: &str| {
        value
            .get(axis)
            .and_then(JsonValue::as_f64)
            .ok_or(SchemaError::InvalidEntry(id))
    };
    let pos = DVec3::new(coord("x")?, coord("y")?, coord("z")?);
    if !pos.is_finite() {
        return Err(SchemaError::InvalidEntry(id));
    }
    Ok((id, pos))
}
