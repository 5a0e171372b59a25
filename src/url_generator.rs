//! URL generation - the final generator stage.
//!
//! For every application with generated viewsets this stage renders a
//! `DefaultRouter` construction block registering one route per viewset, and
//! places it next to whichever views artifact the previous stage produced.
//! An application with no views artifact on disk gets no URL file at all;
//! that is the expected fallback, not an error.

use crate::error::Result;
use crate::layout::{self, AppLayout};
use crate::viewset_generator::{AppViewsets, ViewsetRegistry};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Generates URL configuration files from the viewset registry.
///
/// Path segments are accumulated across all applications into one list, in
/// registration order. Two applications exposing a model of the same name
/// legitimately produce the same segment twice; nothing is deduplicated.
pub struct UrlGenerator<'a> {
    project_root: PathBuf,
    viewsets: &'a ViewsetRegistry,
    segments: Vec<String>,
}

impl<'a> UrlGenerator<'a> {
    /// Creates a generator writing into `project_root`.
    pub fn new(project_root: &Path, viewsets: &'a ViewsetRegistry) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            viewsets,
            segments: Vec::new(),
        }
    }

    /// Renders the router block for one application and accumulates the path
    /// segments it registers.
    ///
    /// Each viewset contributes one registration line; the path segment is
    /// the lowercased model name.
    pub fn render_urls(&mut self, app: &AppViewsets) -> String {
        let mut stream = String::from("from django.conf.urls import url, include\n");
        stream.push_str(&format!("from {} import auto_views\n", app.app));
        stream.push_str("from rest_framework.routers import DefaultRouter\n");
        stream.push_str("\n\n");
        stream.push_str("router = DefaultRouter()\n");
        for record in &app.viewsets {
            let segment = record.route_segment();
            stream.push_str(&format!(
                "router.register(r'{}', auto_views.{})\n",
                segment, record.class_name
            ));
            self.segments.push(segment);
        }
        stream.push('\n');
        stream.push_str("urlpatterns = [url(r'^', include(router.urls)),]\n");
        stream
    }

    /// Generates URL files for every application in the registry.
    ///
    /// # Returns
    ///
    /// The accumulated list of registered path segments across all
    /// applications.
    pub fn generate_all(mut self) -> Result<Vec<String>> {
        for app in &self.viewsets.apps {
            info!("Generating URLs for application: {}", app.app);

            let app_layout = AppLayout::new(&self.project_root, &app.app);
            let stream = self.render_urls(app);
            self.place(&app_layout, &stream)?;
        }

        Ok(self.segments)
    }

    /// Places the rendered stream next to the application's views artifact.
    ///
    /// A flat `auto_views.py` gets a sibling `auto_urls.py` in append mode;
    /// a sharded `auto_views/` directory gets `auto_urls/auto_urls.py` plus
    /// an empty `__init__.py` package marker. With neither present the
    /// application is skipped.
    fn place(&self, app_layout: &AppLayout, stream: &str) -> Result<()> {
        if app_layout.flat_views().is_file() {
            layout::append_block(&app_layout.flat_urls(), None, stream)
        } else if app_layout.views_dir().is_dir() {
            layout::overwrite(&app_layout.urls_dir().join("__init__.py"), "")?;
            layout::overwrite(&app_layout.sharded_urls(), stream)
        } else {
            debug!(
                "No views artifact under {}, skipping URL generation",
                app_layout.app_dir().display()
            );
            Ok(())
        }
    }
}
