//
// config.rs
//
// Scanner and suggestion settings
//

use serde::Deserialize;

/// Settings recognized by the server, as sent by the client under
/// `initializationOptions.settings` or `workspace/didChangeConfiguration`.
///
/// Keys are camelCase; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScannerConfig {
    /// Maximum directory recursion depth below the workspace root
    pub scanner_depth: usize,
    /// Glob patterns of paths to skip; `**/name` also skips the subtree
    pub scanner_exclude: Vec<String>,
    /// Follow `@import` edges out of the scanned files
    pub scan_imported_files: bool,
    /// Maximum number of import hops to follow
    pub scan_imported_files_depth: usize,
    /// Fail the scan on I/O errors and report them to the user
    pub show_errors: bool,
    pub suggest_variables: bool,
    pub suggest_mixins: bool,
    /// Prefix for suggestions from documents the current one does not
    /// import; `None` hides it
    pub implicitly_label: Option<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            scanner_depth: 30,
            scanner_exclude: vec![
                "**/.git".to_string(),
                "**/node_modules".to_string(),
                "**/bower_components".to_string(),
            ],
            scan_imported_files: true,
            scan_imported_files_depth: 50,
            show_errors: false,
            suggest_variables: true,
            suggest_mixins: true,
            implicitly_label: Some("(implicitly)".to_string()),
        }
    }
}

impl ScannerConfig {
    /// Parse settings sent by the client. Accepts either the settings object
    /// itself or one wrapped in a `less` section. Malformed settings fall
    /// back to the defaults.
    pub fn from_settings(settings: &serde_json::Value) -> Self {
        let section = settings.get("less").unwrap_or(settings);
        if section.is_null() {
            return Self::default();
        }

        match Self::deserialize(section) {
            Ok(config) => {
                log::info!("Scanner configuration loaded from LSP settings:");
                log::info!("  scanner_depth: {}", config.scanner_depth);
                log::info!("  scanner_exclude: {:?}", config.scanner_exclude);
                log::info!("  scan_imported_files: {}", config.scan_imported_files);
                log::info!(
                    "  scan_imported_files_depth: {}",
                    config.scan_imported_files_depth
                );
                log::info!("  show_errors: {}", config.show_errors);
                config
            }
            Err(err) => {
                log::warn!("Ignoring malformed settings: {}", err);
                Self::default()
            }
        }
    }
}
