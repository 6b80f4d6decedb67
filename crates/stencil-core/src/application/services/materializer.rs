//! Tree materializer - renders a template source into a destination root.
//!
//! Per entry, in source-path order:
//! 1. Strip the marker and elide staging directories from the source path
//! 2. Render the path, refusing paths that leave the root
//! 3. Render the content
//! 4. Refuse destinations reached through a symlink under the root
//! 5. Apply the conflict policy
//! 6. Create parents, write bytes, apply mode
//!
//! The first failure stops the walk. Files already written stay on disk and
//! are listed in the failure's partial manifest.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateRenderer},
    },
    domain::{
        DomainError, DomainValidator, GenerationManifest, ParameterSet, RelativePath,
        RenderedFile, TemplateEntry, TemplateSource, WriteOutcome, WrittenFile,
    },
    error::{GenerationFailure, StencilError, StencilResult},
};

/// What to do when a destination file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Stop with `FileExists` before touching the file.
    #[default]
    Fail,
    /// Replace the file's content and mode.
    Overwrite,
    /// Leave the file as it is and record it as skipped.
    Skip,
}

impl ConflictPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Overwrite => "overwrite",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = StencilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "overwrite" => Ok(Self::Overwrite),
            "skip" => Ok(Self::Skip),
            other => Err(StencilError::Configuration {
                message: format!("unknown conflict policy '{other}' (expected fail, overwrite or skip)"),
            }),
        }
    }
}

/// Caller-visible knobs for one materialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeOptions {
    pub conflict: ConflictPolicy,
}

impl MaterializeOptions {
    pub fn new(conflict: ConflictPolicy) -> Self {
        Self { conflict }
    }
}

/// Walks a [`TemplateSource`] and writes the rendered tree.
pub struct Materializer {
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
}

impl Materializer {
    pub fn new(renderer: Box<dyn TemplateRenderer>, filesystem: Box<dyn Filesystem>) -> Self {
        Self {
            renderer,
            filesystem,
        }
    }

    /// Render and write every entry under `root`.
    #[instrument(
        skip_all,
        fields(
            source = source.name(),
            root = %root.display(),
            conflict = %options.conflict
        )
    )]
    pub fn materialize(
        &self,
        source: &TemplateSource,
        params: &ParameterSet,
        root: &Path,
        options: &MaterializeOptions,
    ) -> Result<GenerationManifest, GenerationFailure> {
        let mut manifest = GenerationManifest::new(root);
        let mut seen = HashSet::with_capacity(source.len());

        for entry in source.entries() {
            let result = self
                .render_entry(source, entry, params, &mut seen)
                .and_then(|file| self.write_entry(root, file, options));

            match result {
                Ok(written) => {
                    debug!(
                        path = %written.path,
                        bytes = written.bytes,
                        outcome = ?written.outcome,
                        "entry materialized"
                    );
                    manifest.record(written);
                }
                Err(error) => {
                    warn!(entry = %entry.path, %error, "materialization stopped");
                    return Err(GenerationFailure::new(Some(entry.path.clone()), error, manifest));
                }
            }
        }

        info!(
            files = manifest.written().count(),
            skipped = manifest.skipped().count(),
            bytes = manifest.total_bytes(),
            "materialization complete"
        );
        Ok(manifest)
    }

    /// Render every entry in memory without touching the filesystem.
    #[instrument(skip_all, fields(source = source.name()))]
    pub fn plan(
        &self,
        source: &TemplateSource,
        params: &ParameterSet,
    ) -> Result<Vec<RenderedFile>, GenerationFailure> {
        let mut seen = HashSet::with_capacity(source.len());
        let mut planned = Vec::with_capacity(source.len());

        for entry in source.entries() {
            match self.render_entry(source, entry, params, &mut seen) {
                Ok(file) => planned.push(file),
                Err(error) => {
                    return Err(GenerationFailure::new(
                        Some(entry.path.clone()),
                        error,
                        GenerationManifest::new(PathBuf::new()),
                    ));
                }
            }
        }

        Ok(planned)
    }

    fn render_entry(
        &self,
        source: &TemplateSource,
        entry: &TemplateEntry,
        params: &ParameterSet,
        seen: &mut HashSet<RelativePath>,
    ) -> StencilResult<RenderedFile> {
        let template = DomainValidator::output_template(source.layout(), &entry.path)?;
        let rendered_path = self.renderer.render_path(&template, params)?;
        let path = DomainValidator::validate_output_path(rendered_path)?;

        if !seen.insert(path.clone()) {
            return Err(DomainError::DuplicatePath {
                path: path.to_string(),
            }
            .into());
        }

        let content = self.renderer.render_content(entry, params)?;

        Ok(RenderedFile {
            path,
            source: entry.path.clone(),
            content,
            mode: entry.mode,
        })
    }

    fn write_entry(
        &self,
        root: &Path,
        file: RenderedFile,
        options: &MaterializeOptions,
    ) -> StencilResult<WrittenFile> {
        let dest = root.join(file.path.as_path());
        self.ensure_no_symlink(root, &file.path)?;

        let outcome = match (self.filesystem.exists(&dest), options.conflict) {
            (false, _) => WriteOutcome::Created,
            (true, ConflictPolicy::Overwrite) => WriteOutcome::Overwritten,
            (true, ConflictPolicy::Skip) => {
                warn!(path = %dest.display(), "file exists, skipping");
                return Ok(WrittenFile {
                    bytes: 0,
                    path: file.path,
                    source: file.source,
                    mode: file.mode,
                    outcome: WriteOutcome::Skipped,
                });
            }
            (true, ConflictPolicy::Fail) => {
                return Err(ApplicationError::FileExists { path: dest }.into());
            }
        };

        if let Some(parent) = dest.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem.write_file(&dest, &file.content)?;
        self.filesystem.set_mode(&dest, file.mode)?;

        Ok(WrittenFile {
            bytes: file.size(),
            path: file.path,
            source: file.source,
            mode: file.mode,
            outcome,
        })
    }

    /// Every existing component between `root` and the destination must be
    /// a plain directory or file, otherwise the write could land outside.
    fn ensure_no_symlink(&self, root: &Path, path: &RelativePath) -> StencilResult<()> {
        let mut current = root.to_path_buf();
        for segment in path.segments() {
            current.push(segment);
            if self.filesystem.is_symlink(&current) {
                warn!(path = %current.display(), "symlink under destination root");
                return Err(DomainError::PathEscape {
                    path: path.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;
    use crate::application::ports::MockFilesystem;
    use crate::domain::{FileMode, RawParameters, render_str};
    use crate::error::ErrorCategory;

    /// Renderer backed directly by the domain grammar.
    pub(crate) struct GrammarRenderer;

    impl TemplateRenderer for GrammarRenderer {
        fn render_path(&self, path: &RelativePath, params: &ParameterSet) -> StencilResult<RelativePath> {
            let rendered = render_str(path.as_str(), params, path.as_str())?;
            Ok(RelativePath::try_new(rendered)?)
        }

        fn render_content(&self, entry: &TemplateEntry, params: &ParameterSet) -> StencilResult<Vec<u8>> {
            if !entry.parameterized {
                return Ok(entry.content.as_bytes().to_vec());
            }
            let text = std::str::from_utf8(entry.content.as_bytes()).map_err(|e| DomainError::MalformedTemplate {
                path: entry.path.to_string(),
                reason: e.to_string(),
            })?;
            Ok(render_str(text, params, entry.path.as_str())?.into_bytes())
        }
    }

    /// Filesystem recording writes in memory.
    #[derive(Default)]
    pub(crate) struct RecordingFs {
        pub files: Mutex<BTreeMap<PathBuf, (Vec<u8>, FileMode)>>,
    }

    impl Filesystem for std::sync::Arc<RecordingFs> {
        fn create_dir_all(&self, _path: &Path) -> StencilResult<()> {
            Ok(())
        }

        fn write_file(&self, path: &Path, content: &[u8]) -> StencilResult<()> {
            let mut files = self.files.lock().map_err(|_| ApplicationError::LockPoisoned)?;
            files.insert(path.to_path_buf(), (content.to_vec(), FileMode::REGULAR));
            Ok(())
        }

        fn set_mode(&self, path: &Path, mode: FileMode) -> StencilResult<()> {
            let mut files = self.files.lock().map_err(|_| ApplicationError::LockPoisoned)?;
            if let Some(entry) = files.get_mut(path) {
                entry.1 = mode;
            }
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.lock().map(|f| f.contains_key(path)).unwrap_or(false)
        }

        fn is_symlink(&self, _path: &Path) -> bool {
            false
        }
    }

    pub(crate) fn params() -> ParameterSet {
        ParameterSet::validate(
            &RawParameters::new()
                .with("PluginName", "helm3")
                .with("ModulePath", "get.porter.sh/mixin/helm3"),
        )
        .unwrap()
    }

    fn source(entries: Vec<TemplateEntry>) -> TemplateSource {
        let mut builder = TemplateSource::builder("test");
        for e in entries {
            builder.push(e);
        }
        builder.build().unwrap()
    }

    fn recording() -> (std::sync::Arc<RecordingFs>, Materializer) {
        let fs = std::sync::Arc::new(RecordingFs::default());
        let m = Materializer::new(Box::new(GrammarRenderer), Box::new(fs.clone()));
        (fs, m)
    }

    #[test]
    fn writes_rendered_tree_in_path_order() {
        let (fs, m) = recording();
        let src = source(vec![
            TemplateEntry::new(RelativePath::new("pkg/{{ PluginName }}/version.go.tmpl"), "package {{ PluginName }}"),
            TemplateEntry::new(RelativePath::new("go.mod.tmpl"), "module {{ ModulePath }}"),
            TemplateEntry::new(RelativePath::new("build/run.sh"), "#!/bin/sh").executable(),
        ]);

        let manifest = m
            .materialize(&src, &params(), Path::new("/out"), &MaterializeOptions::default())
            .unwrap();

        let paths: Vec<_> = manifest.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["build/run.sh", "go.mod", "pkg/helm3/version.go"]);

        let files = fs.files.lock().unwrap();
        assert_eq!(files[Path::new("/out/go.mod")].0, b"module get.porter.sh/mixin/helm3");
        assert_eq!(files[Path::new("/out/pkg/helm3/version.go")].0, b"package helm3");
        assert_eq!(files[Path::new("/out/build/run.sh")].1, FileMode::EXECUTABLE);
    }

    #[test]
    fn path_escape_writes_nothing_for_the_entry() {
        let (fs, m) = recording();
        let src = source(vec![
            TemplateEntry::new(RelativePath::new("a.txt"), "ok"),
            TemplateEntry::new(RelativePath::new("b/../../evil.txt"), "nope"),
        ]);

        let failure = m
            .materialize(&src, &params(), Path::new("/out"), &MaterializeOptions::default())
            .unwrap_err();

        assert_eq!(failure.category(), ErrorCategory::PathEscape);
        assert_eq!(failure.entry.as_ref().map(|p| p.as_str()), Some("b/../../evil.txt"));
        assert_eq!(failure.partial.len(), 1);
        let files = fs.files.lock().unwrap();
        assert_eq!(files.len(), 1);
        assert!(!files.keys().any(|p| p.to_string_lossy().contains("evil")));
    }

    #[test]
    fn fail_policy_refuses_existing_file() {
        let (fs, m) = recording();
        fs.files
            .lock()
            .unwrap()
            .insert(PathBuf::from("/out/go.mod"), (b"old".to_vec(), FileMode::REGULAR));
        let src = source(vec![TemplateEntry::new(RelativePath::new("go.mod.tmpl"), "module {{ ModulePath }}")]);

        let failure = m
            .materialize(&src, &params(), Path::new("/out"), &MaterializeOptions::new(ConflictPolicy::Fail))
            .unwrap_err();

        assert_eq!(failure.category(), ErrorCategory::Conflict);
        assert_eq!(fs.files.lock().unwrap()[Path::new("/out/go.mod")].0, b"old");
    }

    #[test]
    fn overwrite_policy_replaces_existing_file() {
        let (fs, m) = recording();
        fs.files
            .lock()
            .unwrap()
            .insert(PathBuf::from("/out/go.mod"), (b"old".to_vec(), FileMode::REGULAR));
        let src = source(vec![TemplateEntry::new(RelativePath::new("go.mod.tmpl"), "module {{ ModulePath }}")]);

        let manifest = m
            .materialize(&src, &params(), Path::new("/out"), &MaterializeOptions::new(ConflictPolicy::Overwrite))
            .unwrap();

        assert_eq!(manifest.files()[0].outcome, WriteOutcome::Overwritten);
        assert_eq!(
            fs.files.lock().unwrap()[Path::new("/out/go.mod")].0,
            b"module get.porter.sh/mixin/helm3"
        );
    }

    #[test]
    fn skip_policy_keeps_existing_file() {
        let (fs, m) = recording();
        fs.files
            .lock()
            .unwrap()
            .insert(PathBuf::from("/out/go.mod"), (b"old".to_vec(), FileMode::REGULAR));
        let src = source(vec![
            TemplateEntry::new(RelativePath::new("go.mod.tmpl"), "module {{ ModulePath }}"),
            TemplateEntry::new(RelativePath::new("main.go"), "package main"),
        ]);

        let manifest = m
            .materialize(&src, &params(), Path::new("/out"), &MaterializeOptions::new(ConflictPolicy::Skip))
            .unwrap();

        assert_eq!(manifest.skipped().count(), 1);
        assert_eq!(manifest.written().count(), 1);
        assert_eq!(fs.files.lock().unwrap()[Path::new("/out/go.mod")].0, b"old");
    }

    #[test]
    fn colliding_output_paths_are_rejected() {
        let (_fs, m) = recording();
        let src = source(vec![
            TemplateEntry::new(RelativePath::new("go.mod"), "a"),
            TemplateEntry::new(RelativePath::new("go.mod.tmpl"), "b"),
        ]);

        let failure = m
            .materialize(&src, &params(), Path::new("/out"), &MaterializeOptions::default())
            .unwrap_err();

        assert!(matches!(
            failure.error,
            StencilError::Domain(DomainError::DuplicatePath { .. })
        ));
        assert_eq!(failure.partial.len(), 1);
    }

    #[test]
    fn write_error_stops_the_walk_with_partial_manifest() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| false);
        fs.expect_is_symlink().returning(|_| false);
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_set_mode().returning(|_, _| Ok(()));
        fs.expect_write_file()
            .withf(|path, _| path.ends_with("a.txt"))
            .times(1)
            .returning(|_, _| Ok(()));
        fs.expect_write_file()
            .withf(|path, _| path.ends_with("b.txt"))
            .times(1)
            .returning(|path, _| {
                Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "disk full".into(),
                }
                .into())
            });

        let m = Materializer::new(Box::new(GrammarRenderer), Box::new(fs));
        let src = source(vec![
            TemplateEntry::new(RelativePath::new("a.txt"), "a"),
            TemplateEntry::new(RelativePath::new("b.txt"), "b"),
            TemplateEntry::new(RelativePath::new("c.txt"), "c"),
        ]);

        let failure = m
            .materialize(&src, &params(), Path::new("/out"), &MaterializeOptions::default())
            .unwrap_err();

        assert_eq!(failure.category(), ErrorCategory::Write);
        assert_eq!(failure.entry.as_ref().map(|p| p.as_str()), Some("b.txt"));
        let written: Vec<_> = failure.partial.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(written, vec!["a.txt"]);
    }

    #[test]
    fn symlinked_directory_under_root_is_a_path_escape() {
        let mut fs = MockFilesystem::new();
        fs.expect_is_symlink()
            .returning(|path| path == Path::new("/out/pkg"));
        fs.expect_exists().returning(|_| false);
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_set_mode().returning(|_, _| Ok(()));
        fs.expect_write_file()
            .withf(|path, _| path == Path::new("/out/go.mod"))
            .times(1)
            .returning(|_, _| Ok(()));

        let m = Materializer::new(Box::new(GrammarRenderer), Box::new(fs));
        let src = source(vec![
            TemplateEntry::new(RelativePath::new("go.mod"), "module x"),
            TemplateEntry::new(RelativePath::new("pkg/{{ PluginName }}/version.go.tmpl"), "package x"),
        ]);

        let failure = m
            .materialize(&src, &params(), Path::new("/out"), &MaterializeOptions::default())
            .unwrap_err();

        assert_eq!(failure.category(), ErrorCategory::PathEscape);
        assert_eq!(
            failure.entry.as_ref().map(|p| p.as_str()),
            Some("pkg/{{ PluginName }}/version.go.tmpl")
        );
        assert_eq!(failure.partial.len(), 1);
    }

    #[test]
    fn render_error_names_entry_and_token() {
        let (_fs, m) = recording();
        let src = source(vec![TemplateEntry::new(RelativePath::new("SECURITY.md.tmpl"), "{{ AuthorEmail }}")]);

        let failure = m
            .materialize(&src, &params(), Path::new("/out"), &MaterializeOptions::default())
            .unwrap_err();

        assert_eq!(
            failure.error,
            StencilError::Domain(DomainError::UnresolvedToken {
                token: "AuthorEmail".into(),
                path: "SECURITY.md.tmpl".into(),
            })
        );
    }

    #[test]
    fn plan_renders_without_writing() {
        let mut fs = MockFilesystem::new();
        fs.expect_write_file().never();
        fs.expect_create_dir_all().never();
        let m = Materializer::new(Box::new(GrammarRenderer), Box::new(fs));
        let src = source(vec![TemplateEntry::new(
            RelativePath::new("cmd/{{ PluginName }}/main.go.tmpl"),
            "package main // {{ PluginNameCap }}",
        )]);

        let planned = m.plan(&src, &params()).unwrap();

        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].path.as_str(), "cmd/helm3/main.go");
        assert_eq!(planned[0].content, b"package main // Helm3");
    }

    #[test]
    fn conflict_policy_parses() {
        assert_eq!("Overwrite".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::Overwrite);
        assert_eq!("skip".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::Skip);
        assert!("merge".parse::<ConflictPolicy>().is_err());
        assert_eq!(ConflictPolicy::default(), ConflictPolicy::Fail);
    }
}
