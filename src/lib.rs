//! Anchor Fixer - keeps ground anchors where they were placed
//!
//! Core modules:
//! - `json`: Minimal JSON engine (value tree, parser, serializer)
//! - `ledger`: Original anchor positions, correction pass, persistence
//! - `save_tree`: Save-game node model and `pos`/`flightID` field codecs
//! - `hooks`: Host event interface and the add-on that implements it
//! - `settings`: Paths and anchor marker configuration

pub mod error;
pub mod hooks;
pub mod json;
pub mod ledger;
pub mod save_tree;
pub mod settings;

pub use error::{FormatError, LedgerError, ParseError, ParseErrorKind, SchemaError};
pub use hooks::{AnchorEvents, AnchorFixer, PartInfo};
pub use json::{JsonValue, Map, Number};
pub use ledger::{CorrectionReport, Ledger, LoadReport};
pub use save_tree::SaveNode;
pub use settings::Settings;

/// Add-on configuration constants
pub mod consts {
    /// Directory name under `GameData`
    pub const DEFAULT_COMPONENT_NAME: &str = "AnchorFixer";
    /// Ledger file inside `PluginData`
    pub const DEFAULT_LEDGER_FILE: &str = "anchors.json";
    /// Part type-name substring identifying ground anchors
    pub const DEFAULT_ANCHOR_MARKER: &str = "groundAnchor";
}
