use crate::error::{Error, Result};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File names recognized as a model registry manifest, probed in order.
pub const MANIFEST_NAMES: [&str; 3] = [
    "model_registry.yaml",
    "model_registry.yml",
    "model_registry.json",
];

/// One model as declared by the host application: its class name and the
/// ordered list of its field names.
///
/// Field order is declaration order in the source model and is preserved
/// verbatim into generated output. Every derived presentation string (class
/// names, file stems, route segments) comes from [`ModelSpec::name`] directly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelSpec {
    /// Model class name, e.g. `BlogPost`
    pub name: String,
    /// Field names in declaration order
    pub fields: Vec<String>,
}

impl ModelSpec {
    /// Serializer class name generated for this model, e.g. `BlogPostSerializer`.
    pub fn serializer_class(&self) -> String {
        format!("{}Serializer", self.name)
    }

    /// Viewset class name generated for this model, e.g. `BlogPostViewSet`.
    pub fn viewset_class(&self) -> String {
        format!("{}ViewSet", self.name)
    }

    /// File stem used for this model's sharded artifacts, e.g. `blogpost`.
    pub fn module_stem(&self) -> String {
        self.name.to_lowercase()
    }
}

/// All models owned by one application namespace, in manifest order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppModels {
    /// Application name, e.g. `shop`
    pub name: String,
    /// Models in manifest order
    pub models: Vec<ModelSpec>,
}

/// The model index: per application namespace, its models and their fields.
///
/// This is the first pipeline stage's output and every later stage's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIndex {
    /// Applications in selection order
    pub apps: Vec<AppModels>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    apps: Vec<AppModels>,
}

impl ModelIndex {
    /// Looks up an application by name.
    pub fn app(&self, name: &str) -> Option<&AppModels> {
        self.apps.iter().find(|a| a.name == name)
    }

    /// Narrows the index to the requested applications, in request order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NamespaceNotFound`] if any requested application is
    /// absent from the manifest.
    pub fn select(&self, requested: &[String]) -> Result<ModelIndex> {
        let mut apps = Vec::with_capacity(requested.len());
        for name in requested {
            let app = self
                .app(name)
                .ok_or_else(|| Error::NamespaceNotFound(name.clone()))?;
            apps.push(app.clone());
        }
        Ok(ModelIndex { apps })
    }
}

/// Locates the model registry manifest under the project root.
///
/// The project root itself is probed first for each recognized manifest name.
/// If nothing is found there, the directory tree is walked and the first
/// manifest encountered wins. Hidden directories and the usual non-source
/// directories (`__pycache__`, `venv`, `node_modules`) are skipped.
///
/// # Errors
///
/// Returns [`Error::RegistryNotFound`] if no manifest exists anywhere under
/// the root.
pub fn locate_manifest(root: &Path) -> Result<PathBuf> {
    debug!("Locating model registry under {}", root.display());

    for name in MANIFEST_NAMES {
        let candidate = root.join(name);
        if candidate.is_file() {
            info!("Found model registry: {}", candidate.display());
            return Ok(candidate);
        }
    }

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| {
            if e.path() == root {
                return true;
            }

            let file_name = e.file_name().to_string_lossy();
            let is_hidden = file_name.starts_with('.');
            let is_skipped = matches!(file_name.as_ref(), "__pycache__" | "venv" | "node_modules");

            !is_hidden && !is_skipped
        })
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() {
            let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
            if MANIFEST_NAMES.contains(&file_name) {
                info!("Found model registry: {}", path.display());
                return Ok(path.to_path_buf());
            }
        }
    }

    Err(Error::RegistryNotFound(root.to_path_buf()))
}

/// Loads and deserializes a model registry manifest.
///
/// The format is chosen by file extension: `.json` is parsed as JSON,
/// anything else as YAML.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, or [`Error::Registry`]
/// if its content does not deserialize.
pub fn load_manifest(path: &Path) -> Result<ModelIndex> {
    debug!("Loading model registry: {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    let is_json = path.extension().and_then(|s| s.to_str()) == Some("json");
    let manifest: Manifest = if is_json {
        serde_json::from_str(&content).map_err(|e| Error::Registry {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    } else {
        serde_yaml::from_str(&content).map_err(|e| Error::Registry {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };

    let model_count: usize = manifest.apps.iter().map(|a| a.models.len()).sum();
    debug!(
        "Loaded {} applications, {} models",
        manifest.apps.len(),
        model_count
    );

    Ok(ModelIndex {
        apps: manifest.apps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE_YAML: &str = "\
apps:
  - name: blog
    models:
      - name: BlogPost
        fields: [id, title, body]
      - name: Comment
        fields: [id, post, author, text]
  - name: shop
    models:
      - name: Order
        fields: [id, customer, total]
";

    #[test]
    fn test_locate_manifest_at_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("model_registry.yaml"), SAMPLE_YAML).unwrap();

        let found = locate_manifest(root).unwrap();
        assert_eq!(found, root.join("model_registry.yaml"));
    }

    #[test]
    fn test_locate_manifest_in_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("config/registry")).unwrap();
        fs::write(root.join("config/registry/model_registry.json"), "{}").unwrap();

        let found = locate_manifest(root).unwrap();
        assert_eq!(found, root.join("config/registry/model_registry.json"));
    }

    #[test]
    fn test_locate_manifest_skips_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join(".cache")).unwrap();
        fs::write(root.join(".cache/model_registry.yaml"), SAMPLE_YAML).unwrap();

        let result = locate_manifest(root);
        assert!(matches!(result, Err(Error::RegistryNotFound(_))));
    }

    #[test]
    fn test_locate_manifest_skips_pycache() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("__pycache__")).unwrap();
        fs::write(root.join("__pycache__/model_registry.yaml"), SAMPLE_YAML).unwrap();

        let result = locate_manifest(root);
        assert!(matches!(result, Err(Error::RegistryNotFound(_))));
    }

    #[test]
    fn test_locate_manifest_missing() {
        let temp_dir = TempDir::new().unwrap();

        let result = locate_manifest(temp_dir.path());
        assert!(matches!(result, Err(Error::RegistryNotFound(_))));
    }

    #[test]
    fn test_load_yaml_manifest_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model_registry.yaml");
        fs::write(&path, SAMPLE_YAML).unwrap();

        let index = load_manifest(&path).unwrap();

        assert_eq!(index.apps.len(), 2);
        assert_eq!(index.apps[0].name, "blog");
        assert_eq!(index.apps[0].models[0].name, "BlogPost");
        assert_eq!(
            index.apps[0].models[0].fields,
            vec!["id", "title", "body"]
        );
        assert_eq!(index.apps[0].models[1].name, "Comment");
        assert_eq!(index.apps[1].models[0].fields[1], "customer");
    }

    #[test]
    fn test_load_json_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model_registry.json");
        fs::write(
            &path,
            r#"{"apps": [{"name": "blog", "models": [{"name": "BlogPost", "fields": ["id", "title"]}]}]}"#,
        )
        .unwrap();

        let index = load_manifest(&path).unwrap();

        assert_eq!(index.apps.len(), 1);
        assert_eq!(index.apps[0].models[0].serializer_class(), "BlogPostSerializer");
    }

    #[test]
    fn test_load_manifest_reports_invalid_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model_registry.yaml");
        fs::write(&path, "apps: 42").unwrap();

        let result = load_manifest(&path);
        assert!(matches!(result, Err(Error::Registry { .. })));
    }

    #[test]
    fn test_select_keeps_request_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model_registry.yaml");
        fs::write(&path, SAMPLE_YAML).unwrap();

        let index = load_manifest(&path).unwrap();
        let selected = index
            .select(&["shop".to_string(), "blog".to_string()])
            .unwrap();

        assert_eq!(selected.apps[0].name, "shop");
        assert_eq!(selected.apps[1].name, "blog");
    }

    #[test]
    fn test_select_unknown_namespace() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model_registry.yaml");
        fs::write(&path, SAMPLE_YAML).unwrap();

        let index = load_manifest(&path).unwrap();
        let result = index.select(&["accounts".to_string()]);

        match result {
            Err(Error::NamespaceNotFound(name)) => assert_eq!(name, "accounts"),
            other => panic!("Expected NamespaceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_model_spec_derived_names() {
        let model = ModelSpec {
            name: "BlogPost".to_string(),
            fields: vec!["id".to_string()],
        };

        assert_eq!(model.serializer_class(), "BlogPostSerializer");
        assert_eq!(model.viewset_class(), "BlogPostViewSet");
        assert_eq!(model.module_stem(), "blogpost");
    }
}
