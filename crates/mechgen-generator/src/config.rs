//! Generator configuration.

use mechgen_codegen::TemplateSet;
use mechgen_template::Strictness;
use mechgen_types::model::UnitCatalog;
use mechgen_types::{GenError, GenResult};

/// Everything `generate` needs besides the model tree.
pub struct GeneratorConfig {
    /// One template per output kind; starts from the built-in set.
    pub templates: TemplateSet,
    /// Caller-supplied physical-unit table.
    pub units: UnitCatalog,
    /// Unresolved-placeholder policy; lenient by default.
    pub strictness: Strictness,
}

impl GeneratorConfig {
    /// Built-in templates, default unit catalog, lenient strictness.
    pub fn default_config() -> GenResult<Self> {
        Ok(Self {
            templates: TemplateSet::default_set().map_err(GenError::from)?,
            units: UnitCatalog::default_catalog(),
            strictness: Strictness::Lenient,
        })
    }
}
