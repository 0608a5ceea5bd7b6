//! Deterministic fixture workspace generator for benchmarks and tests.
//!
//! Generates synthetic LESS workspaces with controlled characteristics:
//! file count, variables and mixins per file, `@import` chains and nested
//! rulesets.
//!
//! All output is deterministic, so benchmarks are reproducible.

use std::fmt::Write;
use std::path::Path;
use tempfile::TempDir;

/// Configuration for generating a fixture workspace.
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    pub file_count: usize,
    pub variables_per_file: usize,
    pub mixins_per_file: usize,
    /// `file_0` imports `file_1`, ..., up to this many links
    pub import_chain_depth: usize,
    pub rulesets_per_file: usize,
}

/// Colors cycled through deterministically for variable values.
const COLORS: &[&str] = &[
    "#000", "#fff", "#f00", "#0f0", "#00f", "#333", "#ccc", "#abc",
];

impl FixtureConfig {
    /// Small workspace: 10 files, 5 variables and 2 mixins each.
    pub fn small() -> Self {
        Self {
            file_count: 10,
            variables_per_file: 5,
            mixins_per_file: 2,
            import_chain_depth: 3,
            rulesets_per_file: 3,
        }
    }

    /// Medium workspace: 50 files, 20 variables and 5 mixins each.
    pub fn medium() -> Self {
        Self {
            file_count: 50,
            variables_per_file: 20,
            mixins_per_file: 5,
            import_chain_depth: 10,
            rulesets_per_file: 10,
        }
    }

    /// Large workspace: 200 files, 50 variables and 10 mixins each.
    pub fn large() -> Self {
        Self {
            file_count: 200,
            variables_per_file: 50,
            mixins_per_file: 10,
            import_chain_depth: 15,
            rulesets_per_file: 20,
        }
    }
}

/// Generate the content of a single stylesheet deterministically.
fn generate_less_file_content(index: usize, config: &FixtureConfig) -> String {
    let mut content = String::new();

    if index < config.import_chain_depth && index + 1 < config.file_count {
        writeln!(content, "@import \"file_{}\";", index + 1).unwrap();
        content.push('\n');
    }

    for var_i in 0..config.variables_per_file {
        let color = COLORS[(index + var_i) % COLORS.len()];
        writeln!(content, "@var-{}-{}: {};", index, var_i, color).unwrap();
    }
    content.push('\n');

    for mixin_i in 0..config.mixins_per_file {
        writeln!(
            content,
            ".mixin-{}-{}(@width: {}px; @color) {{",
            index,
            mixin_i,
            mixin_i + 1
        )
        .unwrap();
        writeln!(content, "  @local: @width * 2;").unwrap();
        writeln!(content, "  width: @local;").unwrap();
        writeln!(content, "  color: @color;").unwrap();
        writeln!(content, "}}").unwrap();
        content.push('\n');
    }

    for rule_i in 0..config.rulesets_per_file {
        writeln!(content, ".block-{}-{} {{", index, rule_i).unwrap();
        writeln!(content, "  @inner: {};", rule_i).unwrap();
        writeln!(content, "  .element {{ margin: @inner; }}").unwrap();
        if config.mixins_per_file > 0 {
            writeln!(content, "  .mixin-{}-0(10px; red);", index).unwrap();
        }
        writeln!(content, "}}").unwrap();
    }

    content
}

/// Create a temporary fixture workspace from the given configuration.
///
/// Returns a `TempDir` whose path contains the generated `.less` files.
/// The directory is cleaned up when the `TempDir` is dropped.
pub fn create_fixture_workspace(config: &FixtureConfig) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory for fixture workspace");
    write_fixture_workspace(temp_dir.path(), config);
    temp_dir
}

/// Write fixture files into an existing directory.
pub fn write_fixture_workspace(dir: &Path, config: &FixtureConfig) {
    for i in 0..config.file_count {
        let content = generate_less_file_content(i, config);
        let filename = format!("file_{}.less", i);
        let filepath = dir.join(&filename);
        std::fs::write(&filepath, &content)
            .unwrap_or_else(|e| panic!("Failed to write fixture file {}: {}", filename, e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::symbols_from_text;

    #[test]
    fn test_small_preset_values() {
        let config = FixtureConfig::small();
        assert_eq!(config.file_count, 10);
        assert_eq!(config.variables_per_file, 5);
        assert_eq!(config.import_chain_depth, 3);
    }

    #[test]
    fn test_file_count_matches_config() {
        let config = FixtureConfig::small();
        let workspace = create_fixture_workspace(&config);
        let less_files = std::fs::read_dir(workspace.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|ext| ext == "less").unwrap_or(false))
            .count();
        assert_eq!(less_files, config.file_count);
    }

    #[test]
    fn test_generated_symbols() {
        let config = FixtureConfig::small();
        let symbols = symbols_from_text(&generate_less_file_content(0, &config), None);

        assert_eq!(symbols.variables.len(), config.variables_per_file);
        assert_eq!(symbols.mixins.len(), config.mixins_per_file);
        assert_eq!(symbols.mixins[0].parameters.len(), 2);
        assert_eq!(symbols.imports.len(), 1);
        assert_eq!(symbols.imports[0].filepath, "file_1.less");
    }

    #[test]
    fn test_import_chain_stops_at_depth() {
        let config = FixtureConfig::small();
        let last_linked = generate_less_file_content(config.import_chain_depth, &config);
        assert!(!last_linked.contains("@import"));
    }

    #[test]
    fn test_deterministic_output() {
        let config = FixtureConfig::small();
        for i in 0..config.file_count {
            assert_eq!(
                generate_less_file_content(i, &config),
                generate_less_file_content(i, &config)
            );
        }
    }
}
