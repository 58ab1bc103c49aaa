//! Host lifecycle hooks
//!
//! A host adapter subscribes to the game's events and forwards them here:
//! part coupling → `on_part_attached`, vessel modification →
//! `on_vessel_modified`, game save → `on_before_save`. Subscribing and
//! unsubscribing stay on the adapter side.

use glam::DVec3;

use crate::error::Result;
use crate::ledger::{CorrectionReport, Ledger, LoadReport};
use crate::save_tree::SaveNode;
use crate::settings::Settings;

/// What the adapter reads off a live host part
#[derive(Debug, Clone, PartialEq)]
pub struct PartInfo {
    /// Part type name
    pub name: String,
    pub flight_id: u32,
    /// World-space position
    pub position: DVec3,
}

impl PartInfo {
    pub fn new(name: impl Into<String>, flight_id: u32, position: DVec3) -> Self {
        Self {
            name: name.into(),
            flight_id,
            position,
        }
    }
}

/// Events the host delivers to the add-on
pub trait AnchorEvents {
    /// Two parts were coupled; `part` is the newly attached one
    fn on_part_attached(&mut self, part: &PartInfo);

    /// A vessel changed; `parts` is every part it now holds
    fn on_vessel_modified(&mut self, parts: &[PartInfo]) {
        for part in parts {
            self.on_part_attached(part);
        }
    }

    /// The game is about to serialize `tree`
    fn on_before_save(&mut self, tree: &mut SaveNode) -> CorrectionReport;
}

/// The add-on: a ledger plus the marker filter and save sequence
#[derive(Debug)]
pub struct AnchorFixer {
    ledger: Ledger,
    persist_on_save: bool,
    /// Set while the file on disk could not be read; saving would overwrite it
    load_failed: bool,
}

impl AnchorFixer {
    /// Wrap an existing ledger
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            persist_on_save: true,
            load_failed: false,
        }
    }

    /// Build the ledger from `settings` and load it from disk
    ///
    /// A ledger that fails to load is logged and the session starts empty.
    /// The unreadable file is left alone: save hooks stop writing it until a
    /// later `load` succeeds.
    pub fn start(settings: &Settings) -> Self {
        let ledger =
            Ledger::new(settings.ledger_path()).with_marker(settings.anchor_marker.as_str());
        let mut fixer = Self {
            ledger,
            persist_on_save: settings.persist_on_save,
            load_failed: false,
        };
        if let Err(e) = fixer.load() {
            log::error!("Could not load anchor ledger: {}", e);
        }
        log::info!("Anchor fixer is active and monitoring anchors");
        fixer
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn load(&mut self) -> Result<LoadReport> {
        let result = self.ledger.load();
        self.load_failed = result.is_err();
        result
    }

    pub fn persist(&self) -> Result<()> {
        self.ledger.persist()
    }

    fn is_anchor(&self, part: &PartInfo) -> bool {
        part.name.contains(self.ledger.marker())
    }
}

impl AnchorEvents for AnchorFixer {
    fn on_part_attached(&mut self, part: &PartInfo) {
        log::trace!("Scanning part: {}, ID: {}", part.name, part.flight_id);
        if self.is_anchor(part) {
            log::debug!(
                "Anchor detected: {}, ID: {}, pos: {}",
                part.name,
                part.flight_id,
                part.position
            );
            self.ledger.register(part.flight_id, part.position);
        }
    }

    fn on_before_save(&mut self, tree: &mut SaveNode) -> CorrectionReport {
        log::info!("Intercepting save event, validating anchors");
        let report = self.ledger.correct(tree);
        if !self.persist_on_save {
            return report;
        }
        if self.load_failed {
            log::warn!(
                "Not saving anchor ledger: {} could not be loaded and would be overwritten",
                self.ledger.path().display()
            );
        } else if let Err(e) = self.ledger.persist() {
            log::error!("Could not save anchor ledger: {}", e);
        }
        report
    }
}
