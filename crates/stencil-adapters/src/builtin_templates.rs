//! Bundled plugin skeleton.
//!
//! The skeleton's files live under `templates/plugin/` in this crate and are
//! compiled into the binary with `include_bytes!`, so `stencil new` works
//! without any template directory on disk.
//!
//! The table below maps each payload file to its position in the template
//! source. Positions may contain tokens (`cmd/{{ PluginName }}/main.go.tmpl`);
//! on-disk names cannot, which is why the table exists at all.

use tracing::{debug, instrument};

use stencil_core::{
    application::ports::TemplateLoader,
    domain::{FileMode, OutputLayout, RelativePath, TemplateEntry, TemplateSource},
    error::StencilResult,
};

/// Name reported for the bundled source.
pub const PLUGIN_SKELETON: &str = "plugin";

macro_rules! payload {
    ($file:literal) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/plugin/", $file))
    };
}

/// (source path, payload, mode)
const SKELETON: &[(&str, &[u8], FileMode)] = &[
    (".github/workflows/{{ PluginName }}.yml.tmpl", payload!("ci/workflow.yml.tmpl"), FileMode::REGULAR),
    (".gitignore", payload!("gitignore"), FileMode::REGULAR),
    ("LICENSE.tmpl", payload!("LICENSE.tmpl"), FileMode::REGULAR),
    ("Makefile", payload!("Makefile"), FileMode::REGULAR),
    ("README.md.tmpl", payload!("README.md.tmpl"), FileMode::REGULAR),
    ("SECURITY.md.tmpl", payload!("SECURITY.md.tmpl"), FileMode::REGULAR),
    ("cmd/{{ PluginName }}/build.go.tmpl", payload!("cmd/build.go.tmpl"), FileMode::REGULAR),
    ("cmd/{{ PluginName }}/main.go.tmpl", payload!("cmd/main.go.tmpl"), FileMode::REGULAR),
    ("cmd/{{ PluginName }}/version.go.tmpl", payload!("cmd/version.go.tmpl"), FileMode::REGULAR),
    ("examples/porter.yaml.tmpl", payload!("ci/porter.yaml.tmpl"), FileMode::REGULAR),
    ("go.mod.tmpl", payload!("go.mod.tmpl"), FileMode::REGULAR),
    ("pkg/{{ PluginName }}/{{ PluginName }}.go.tmpl", payload!("pkg/plugin.go.tmpl"), FileMode::REGULAR),
    ("pkg/{{ PluginName }}/schema/schema.json", payload!("pkg/schema.json"), FileMode::REGULAR),
    ("pkg/{{ PluginName }}/template/security.txt.tmpl", payload!("pkg/security.txt.tmpl"), FileMode::REGULAR),
    ("pkg/{{ PluginName }}/version.go.tmpl", payload!("pkg/version.go.tmpl"), FileMode::REGULAR),
    ("scripts/install.sh.tmpl", payload!("scripts/install.sh.tmpl"), FileMode::EXECUTABLE),
];

/// Loader for the skeleton compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

impl BuiltinTemplates {
    pub fn new() -> Self {
        Self
    }

    /// The Porter-style plugin skeleton.
    #[instrument]
    pub fn plugin_skeleton() -> StencilResult<TemplateSource> {
        let mut builder = TemplateSource::builder(PLUGIN_SKELETON).layout(OutputLayout::default());
        for &(path, content, mode) in SKELETON {
            builder.push(TemplateEntry::new(RelativePath::try_new(path)?, content).with_mode(mode));
        }
        let source = builder.build()?;
        debug!(entries = source.len(), "bundled skeleton assembled");
        Ok(source)
    }
}

impl TemplateLoader for BuiltinTemplates {
    fn load(&self) -> StencilResult<TemplateSource> {
        Self::plugin_skeleton()
    }
}
