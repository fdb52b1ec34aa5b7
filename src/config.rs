//! Code generation options
//!
//! Every option has a default matching the native graphics-library setup the
//! generator was written for, so an options file only lists what it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::codegen::CodegenResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenOptions {
    /// Method name lowered to the program's `int main()`
    pub entry_point: String,
    /// Native method lowered to `printf("%s\n", arg)`
    pub print_primitive: String,
    /// Attribute selecting the inline value representation
    pub marker_attribute: String,
    /// Directives emitted verbatim at the top of the output
    pub headers: Vec<String>,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            entry_point: "Main".to_string(),
            print_primitive: "Print".to_string(),
            marker_attribute: "C".to_string(),
            headers: [
                "#include <stdio.h>",
                "#include \"raylib.h\"",
                "#include \"raymath.h\"",
                "#define RLIGHTS_IMPLEMENTATION",
                "#include \"rlights.h\"",
                "#include <stdlib.h>",
            ]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        }
    }
}

impl CodegenOptions {
    /// Load options from a JSON file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> CodegenResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Name of the type that defines the marker attribute itself
    /// (`CAttribute` for `[C]`). It is metadata and never lowered.
    pub fn marker_definition(&self) -> String {
        format!("{}Attribute", self.marker_attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = CodegenOptions::default();
        assert_eq!(options.entry_point, "Main");
        assert_eq!(options.marker_definition(), "CAttribute");
        assert_eq!(options.headers.first().map(String::as_str), Some("#include <stdio.h>"));
        assert_eq!(options.headers.len(), 6);
    }

    #[test]
    fn test_partial_options_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "marker_attribute": "Inline", "headers": [] }}"#).unwrap();

        let options = CodegenOptions::from_file(file.path()).unwrap();
        assert_eq!(options.marker_attribute, "Inline");
        assert_eq!(options.marker_definition(), "InlineAttribute");
        assert!(options.headers.is_empty());
        assert_eq!(options.print_primitive, "Print");
    }

    #[test]
    fn test_missing_options_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = CodegenOptions::from_file(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(crate::codegen::CodegenError::Io(_))));
    }
}
