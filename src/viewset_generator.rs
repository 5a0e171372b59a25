//! Viewset generation - the second generator stage.
//!
//! Consumes the model index and the serializer registry. Every serializer
//! recorded by the first stage yields one `ModelViewSet` class block bound to
//! the model's default queryset. Placement mirrors the serializer stage:
//! a namespace whose flat serializer file exists gets a sibling aggregate
//! `auto_views.py`, all others get per-model files plus an aggregator.

use crate::error::Result;
use crate::layout::{self, AppContext, AppLayout, Mode};
use crate::registry::{AppModels, ModelIndex, ModelSpec};
use crate::serializer_generator::{AppSerializers, SerializerRegistry};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// One generated viewset, tied to the model it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewsetRecord {
    /// Model class name
    pub model: String,
    /// Viewset class name
    pub class_name: String,
}

impl ViewsetRecord {
    /// URL path segment registered for this viewset, e.g. `blogpost`.
    pub fn route_segment(&self) -> String {
        self.model.to_lowercase()
    }
}

/// Viewset artifacts recorded for one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewsets {
    /// Application name
    pub app: String,
    /// Records in generation order
    pub viewsets: Vec<ViewsetRecord>,
}

/// The viewset artifact registry: application → viewset records.
///
/// Output of [`ViewsetGenerator::generate_all`] and input to the URL stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewsetRegistry {
    /// Per-application records in generation order
    pub apps: Vec<AppViewsets>,
}

impl ViewsetRegistry {
    /// Looks up the records for an application.
    pub fn app(&self, name: &str) -> Option<&AppViewsets> {
        self.apps.iter().find(|a| a.app == name)
    }
}

/// Generates viewset files for every (model, serializer) pair.
pub struct ViewsetGenerator<'a> {
    project_root: PathBuf,
    index: &'a ModelIndex,
    serializers: &'a SerializerRegistry,
}

impl<'a> ViewsetGenerator<'a> {
    /// Creates a generator writing into `project_root`.
    pub fn new(
        project_root: &Path,
        index: &'a ModelIndex,
        serializers: &'a SerializerRegistry,
    ) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            index,
            serializers,
        }
    }

    /// Renders the viewset class block for one (model, serializer) pair.
    pub fn render_viewset(model: &ModelSpec, serializer: &str) -> String {
        let mut block = String::new();
        block.push_str("\n\n");
        block.push_str(&format!(
            "class {}(viewsets.ModelViewSet):\n",
            model.viewset_class()
        ));
        block.push_str(&format!("    queryset = {}.objects.all()\n", model.name));
        block.push_str(&format!("    serializer_class = {}\n", serializer));
        block
    }

    /// Generates viewsets for every application in the index.
    ///
    /// Per namespace the layout mode is probed once: flat when the flat
    /// serializer file exists, sharded otherwise. In sharded mode the
    /// `__init__.py` aggregator is written once after the last model, from
    /// the completed records.
    ///
    /// # Returns
    ///
    /// The registry of generated viewsets, keyed by application.
    pub fn generate_all(&self) -> Result<ViewsetRegistry> {
        let mut registry = ViewsetRegistry { apps: Vec::new() };

        for app in &self.index.apps {
            info!("Generating viewsets for application: {}", app.name);

            let app_layout = AppLayout::new(&self.project_root, &app.name);
            let mut ctx = AppContext::new(app_layout.view_mode());
            let mut records = AppViewsets {
                app: app.name.clone(),
                viewsets: Vec::new(),
            };

            let app_serializers = self.serializers.app(&app.name);

            for model in &app.models {
                let Some(model_serializers) =
                    app_serializers.and_then(|a| a.for_model(&model.name))
                else {
                    debug!("No serializer recorded for {}.{}", app.name, model.name);
                    continue;
                };

                for serializer in &model_serializers.serializers {
                    let block = Self::render_viewset(model, serializer);
                    Self::record(&mut records, model);

                    match ctx.mode() {
                        Mode::Flat => {
                            let preamble = if ctx.take_preamble() {
                                app_serializers.map(|a| Self::flat_preamble(app, a))
                            } else {
                                None
                            };
                            layout::append_block(
                                &app_layout.flat_views(),
                                preamble.as_deref(),
                                &block,
                            )?;
                        }
                        Mode::Sharded => {
                            let content = format!(
                                "{}{}",
                                Self::sharded_preamble(&app.name, model, serializer),
                                block
                            );
                            layout::overwrite(
                                &app_layout.sharded_view(&model.module_stem()),
                                &content,
                            )?;
                        }
                    }

                    debug!("Placed viewset for {}.{}", app.name, model.name);
                }
            }

            if ctx.mode() == Mode::Sharded && !records.viewsets.is_empty() {
                Self::write_aggregator(&app_layout, &records)?;
            }

            registry.apps.push(records);
        }

        Ok(registry)
    }

    /// Records the model's viewset, once per class name.
    fn record(records: &mut AppViewsets, model: &ModelSpec) {
        let class_name = model.viewset_class();
        if !records.viewsets.iter().any(|v| v.class_name == class_name) {
            records.viewsets.push(ViewsetRecord {
                model: model.name.clone(),
                class_name,
            });
        }
    }

    /// Shared import preamble for the flat aggregate file: the framework
    /// import, then per model its import line followed by one line per
    /// serializer recorded for it.
    fn flat_preamble(app: &AppModels, serializers: &AppSerializers) -> String {
        let mut preamble = String::from("from rest_framework import viewsets\n");
        for model in &app.models {
            preamble.push_str(&format!("from {}.models import {}\n", app.name, model.name));
            if let Some(entry) = serializers.for_model(&model.name) {
                for serializer in &entry.serializers {
                    preamble.push_str(&format!(
                        "from {}.auto_serializers import {}\n",
                        app.name, serializer
                    ));
                }
            }
        }
        preamble
    }

    /// Import preamble for a per-model file: the current model and its
    /// serializer only.
    fn sharded_preamble(app: &str, model: &ModelSpec, serializer: &str) -> String {
        format!(
            "from rest_framework import viewsets\nfrom {}.models import {}\nfrom {}.auto_serializers import {}\n",
            app, model.name, app, serializer
        )
    }

    /// Rewrites the sharded `__init__.py` aggregator from the completed
    /// records, importing every per-model viewset symbol.
    fn write_aggregator(app_layout: &AppLayout, records: &AppViewsets) -> Result<()> {
        let mut init = String::new();
        for record in &records.viewsets {
            init.push_str(&format!(
                "from .{}_auto_view import {}\n",
                record.model.to_lowercase(),
                record.class_name
            ));
        }
        layout::overwrite(&app_layout.views_dir().join("__init__.py"), &init)
    }
}
