//! Serializer generation - the first generator stage.
//!
//! For every model in every selected application this stage renders a
//! `ModelSerializer` class block, places it according to the namespace's
//! layout mode, and records the artifact in a registry consumed by the
//! viewset stage.

use crate::error::{Error, Result};
use crate::layout::{self, AppContext, AppLayout, Mode};
use crate::registry::{AppModels, ModelIndex, ModelSpec};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Serializer artifacts recorded for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSerializers {
    /// Model class name
    pub model: String,
    /// Serializer class names generated for the model
    pub serializers: Vec<String>,
}

/// Serializer artifacts recorded for one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSerializers {
    /// Application name
    pub app: String,
    /// Per-model records in generation order
    pub models: Vec<ModelSerializers>,
}

impl AppSerializers {
    /// Looks up the serializers recorded for a model.
    pub fn for_model(&self, model: &str) -> Option<&ModelSerializers> {
        self.models.iter().find(|m| m.model == model)
    }
}

/// The serializer artifact registry: application → model → serializer names.
///
/// Output of [`SerializerGenerator::generate_all`] and input to the viewset
/// stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerRegistry {
    /// Per-application records in generation order
    pub apps: Vec<AppSerializers>,
}

impl SerializerRegistry {
    /// Looks up the records for an application.
    pub fn app(&self, name: &str) -> Option<&AppSerializers> {
        self.apps.iter().find(|a| a.app == name)
    }
}

/// Generates serializer files for every model in the index.
pub struct SerializerGenerator<'a> {
    project_root: PathBuf,
    index: &'a ModelIndex,
}

impl<'a> SerializerGenerator<'a> {
    /// Creates a generator writing into `project_root`.
    pub fn new(project_root: &Path, index: &'a ModelIndex) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            index,
        }
    }

    /// Renders the serializer class block for one model.
    ///
    /// The field-list literal preserves the model's field order verbatim; the
    /// first field seeds the literal and the rest are comma-joined after it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFields`] if the model declares no fields.
    pub fn render_serializer(app: &str, model: &ModelSpec) -> Result<String> {
        let (first, rest) = model.fields.split_first().ok_or_else(|| Error::NoFields {
            app: app.to_string(),
            model: model.name.clone(),
        })?;

        let mut block = String::new();
        block.push_str("\n\n");
        block.push_str(&format!(
            "class {}(serializers.ModelSerializer):\n",
            model.serializer_class()
        ));
        block.push_str("    class Meta:\n");
        block.push_str(&format!("        model = {}\n", model.name));
        block.push_str(&format!("        fields = ('{}'", first));
        for field in rest {
            block.push_str(&format!(", '{}'", field));
        }
        block.push_str(")\n");

        Ok(block)
    }

    /// Generates serializers for every application in the index.
    ///
    /// Applications are processed in selection order, models in manifest
    /// order. Each namespace gets a fresh [`AppContext`]; its layout mode is
    /// probed once up front and holds for the whole namespace. In sharded
    /// mode the `__init__.py` aggregator is written once, after the last
    /// model, from the completed records.
    ///
    /// # Returns
    ///
    /// The registry of generated serializer names, keyed by application and
    /// model.
    pub fn generate_all(&self) -> Result<SerializerRegistry> {
        let mut registry = SerializerRegistry { apps: Vec::new() };

        for app in &self.index.apps {
            info!("Generating serializers for application: {}", app.name);

            let app_layout = AppLayout::new(&self.project_root, &app.name);
            let mut ctx = AppContext::new(app_layout.serializer_mode());
            let mut records = AppSerializers {
                app: app.name.clone(),
                models: Vec::new(),
            };

            for model in &app.models {
                let block = Self::render_serializer(&app.name, model)?;
                Self::record(&mut records, model);

                match ctx.mode() {
                    Mode::Flat => {
                        let preamble = if ctx.take_preamble() {
                            Some(Self::flat_preamble(app))
                        } else {
                            None
                        };
                        layout::append_block(
                            &app_layout.flat_serializers(),
                            preamble.as_deref(),
                            &block,
                        )?;
                    }
                    Mode::Sharded => {
                        let content =
                            format!("{}{}", Self::sharded_preamble(&app.name, model), block);
                        layout::overwrite(
                            &app_layout.sharded_serializer(&model.module_stem()),
                            &content,
                        )?;
                    }
                }

                debug!("Placed serializer for {}.{}", app.name, model.name);
            }

            if ctx.mode() == Mode::Sharded && !records.models.is_empty() {
                Self::write_aggregator(&app_layout, &records)?;
            }

            registry.apps.push(records);
        }

        Ok(registry)
    }

    /// Records the model's serializer, once per serializer name.
    fn record(records: &mut AppSerializers, model: &ModelSpec) {
        let serializer = model.serializer_class();
        match records.models.iter_mut().find(|m| m.model == model.name) {
            Some(entry) => {
                if !entry.serializers.contains(&serializer) {
                    entry.serializers.push(serializer);
                }
            }
            None => records.models.push(ModelSerializers {
                model: model.name.clone(),
                serializers: vec![serializer],
            }),
        }
    }

    /// Shared import preamble for the flat aggregate file: the framework
    /// import plus one model import line per model in the application.
    fn flat_preamble(app: &AppModels) -> String {
        let mut preamble = String::from("from rest_framework import serializers\n");
        for model in &app.models {
            preamble.push_str(&format!("from {}.models import {}\n", app.name, model.name));
        }
        preamble
    }

    /// Import preamble for a per-model file: only the current model.
    fn sharded_preamble(app: &str, model: &ModelSpec) -> String {
        format!(
            "from rest_framework import serializers\nfrom {}.models import {}\n",
            app, model.name
        )
    }

    /// Rewrites the sharded `__init__.py` aggregator from the completed
    /// records, importing every per-model serializer symbol.
    fn write_aggregator(app_layout: &AppLayout, records: &AppSerializers) -> Result<()> {
        let mut init = String::new();
        for entry in &records.models {
            let stem = entry.model.to_lowercase();
            for serializer in &entry.serializers {
                init.push_str(&format!(
                    "from .{}_auto_serializer import {}\n",
                    stem, serializer
                ));
            }
        }
        layout::overwrite(&app_layout.serializer_dir().join("__init__.py"), &init)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn model(name: &str, fields: &[&str]) -> ModelSpec {
        ModelSpec {
            name: name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn index(app: &str, models: Vec<ModelSpec>) -> ModelIndex {
        ModelIndex {
            apps: vec![AppModels {
                name: app.to_string(),
                models,
            }],
        }
    }

    #[test]
    fn test_render_serializer_block() {
        let m = model("Order", &["id", "customer", "total"]);

        let block = SerializerGenerator::render_serializer("shop", &m).unwrap();

        assert_eq!(
            block,
            "\n\nclass OrderSerializer(serializers.ModelSerializer):\n    class Meta:\n        model = Order\n        fields = ('id', 'customer', 'total')\n"
        );
    }

    #[test]
    fn test_render_serializer_single_field() {
        let m = model("Tag", &["id"]);

        let block = SerializerGenerator::render_serializer("blog", &m).unwrap();

        assert!(block.contains("fields = ('id')\n"));
    }

    #[test]
    fn test_render_serializer_no_fields() {
        let m = model("Empty", &[]);

        let result = SerializerGenerator::render_serializer("blog", &m);

        match result {
            Err(Error::NoFields { app, model }) => {
                assert_eq!(app, "blog");
                assert_eq!(model, "Empty");
            }
            other => panic!("Expected NoFields, got {:?}", other),
        }
    }

    #[test]
    fn test_sharded_generation_creates_per_model_files() {
        let temp_dir = TempDir::new().unwrap();
        let idx = index(
            "shop",
            vec![
                model("Order", &["id", "customer"]),
                model("Item", &["id", "order", "sku"]),
            ],
        );

        let generator = SerializerGenerator::new(temp_dir.path(), &idx);
        let registry = generator.generate_all().unwrap();

        let order_file = temp_dir
            .path()
            .join("shop/auto_serializers/order_auto_serializer.py");
        let item_file = temp_dir
            .path()
            .join("shop/auto_serializers/item_auto_serializer.py");
        assert!(order_file.exists());
        assert!(item_file.exists());

        let order_content = fs::read_to_string(&order_file).unwrap();
        assert_eq!(
            order_content,
            "from rest_framework import serializers\nfrom shop.models import Order\n\n\nclass OrderSerializer(serializers.ModelSerializer):\n    class Meta:\n        model = Order\n        fields = ('id', 'customer')\n"
        );

        let init = fs::read_to_string(temp_dir.path().join("shop/auto_serializers/__init__.py"))
            .unwrap();
        assert_eq!(
            init,
            "from .order_auto_serializer import OrderSerializer\nfrom .item_auto_serializer import ItemSerializer\n"
        );

        let app = registry.app("shop").unwrap();
        assert_eq!(app.models.len(), 2);
        assert_eq!(
            app.for_model("Order").unwrap().serializers,
            vec!["OrderSerializer"]
        );
    }

    #[test]
    fn test_flat_generation_appends_with_single_preamble() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("shop")).unwrap();
        fs::write(temp_dir.path().join("shop/auto_serializers.py"), "").unwrap();

        let idx = index(
            "shop",
            vec![model("Order", &["id"]), model("Item", &["id", "sku"])],
        );

        let generator = SerializerGenerator::new(temp_dir.path(), &idx);
        generator.generate_all().unwrap();

        let content =
            fs::read_to_string(temp_dir.path().join("shop/auto_serializers.py")).unwrap();

        // Shared preamble once, then both class blocks.
        assert_eq!(
            content.matches("from rest_framework import serializers\n").count(),
            1
        );
        assert!(content.starts_with(
            "from rest_framework import serializers\nfrom shop.models import Order\nfrom shop.models import Item\n"
        ));
        assert_eq!(content.matches("class OrderSerializer").count(), 1);
        assert_eq!(content.matches("class ItemSerializer").count(), 1);

        // No sharded artifacts in flat mode.
        assert!(!temp_dir.path().join("shop/auto_serializers").exists());
    }

    #[test]
    fn test_flat_generation_second_run_doubles_blocks_not_preamble() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("shop")).unwrap();
        fs::write(temp_dir.path().join("shop/auto_serializers.py"), "").unwrap();

        let idx = index(
            "shop",
            vec![model("Order", &["id"]), model("Item", &["id"])],
        );

        SerializerGenerator::new(temp_dir.path(), &idx)
            .generate_all()
            .unwrap();
        SerializerGenerator::new(temp_dir.path(), &idx)
            .generate_all()
            .unwrap();

        let content =
            fs::read_to_string(temp_dir.path().join("shop/auto_serializers.py")).unwrap();

        assert_eq!(
            content.matches("from rest_framework import serializers\n").count(),
            1
        );
        assert_eq!(content.matches("class OrderSerializer").count(), 2);
        assert_eq!(content.matches("class ItemSerializer").count(), 2);
    }

    #[test]
    fn test_registry_deduplicates_per_model() {
        let temp_dir = TempDir::new().unwrap();
        let idx = index("shop", vec![model("Order", &["id"])]);

        let generator = SerializerGenerator::new(temp_dir.path(), &idx);
        let first = generator.generate_all().unwrap();
        let second = generator.generate_all().unwrap();

        assert_eq!(first, second);
        assert_eq!(
            second.app("shop").unwrap().for_model("Order").unwrap().serializers,
            vec!["OrderSerializer"]
        );
    }

    #[test]
    fn test_empty_application_produces_no_files() {
        let temp_dir = TempDir::new().unwrap();
        let idx = index("shop", vec![]);

        let registry = SerializerGenerator::new(temp_dir.path(), &idx)
            .generate_all()
            .unwrap();

        assert!(registry.app("shop").unwrap().models.is_empty());
        assert!(!temp_dir.path().join("shop").exists());
    }

    #[test]
    fn test_zero_field_model_aborts_before_writing() {
        let temp_dir = TempDir::new().unwrap();
        let idx = index("shop", vec![model("Empty", &[])]);

        let result = SerializerGenerator::new(temp_dir.path(), &idx).generate_all();

        assert!(matches!(result, Err(Error::NoFields { .. })));
        assert!(!temp_dir.path().join("shop").exists());
    }
}
