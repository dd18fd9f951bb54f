//! Parsing functionality for module files
//!
//! Manifests and model sources are parsed into tree-sitter syntax trees; the
//! literal evaluator, the manifest strategy chain and the model definition
//! parser all work on those trees.

pub mod literal;
pub mod manifest;
pub mod python;
pub mod source;

pub use python::SyntaxError;
pub use literal::{parse_literal, Value};
pub use manifest::{
    find_manifest, is_module_dir, Extraction, LiteralStrategy, ManifestData, ManifestParser,
    ManifestStrategy, RegexStrategy, INIT_FILE, LEGACY_MANIFEST_FILE, MANIFEST_FILE,
};
pub use source::{parse_models, ModelDefinition};
