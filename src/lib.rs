//! DRF Scaffold - Django REST Framework boilerplate from a model registry.
//!
//! This library generates the repetitive source files a Django REST Framework
//! project needs for each data model: serializers, viewsets and URL
//! configuration. It consumes a model registry manifest - a structured dump
//! of the host application's models and their field names - and writes plain
//! Python files into the application tree, merging with files left by earlier
//! runs instead of clobbering them.
//!
//! # Layout modes
//!
//! Each application namespace is generated in one of two layouts, probed once
//! per run: **flat** (an existing `auto_serializers.py` means every artifact
//! of a kind is appended to one aggregate file) or **sharded** (one file per
//! model under `auto_serializers/`, `auto_views/` and `auto_urls/`
//! subdirectories, each with an `__init__.py` aggregator).
//!
//! # Architecture
//!
//! The library is organized as a fixed forward pipeline; each stage's output
//! is the next stage's input:
//!
//! 1. [`registry`] - Locates and loads the model registry manifest
//! 2. [`serializer_generator`] - Renders and places serializer classes
//! 3. [`viewset_generator`] - Renders and places viewset classes
//! 4. [`url_generator`] - Renders and places router registrations
//!
//! [`layout`] holds the shared file-placement policy and [`error`] the error
//! taxonomy.
//!
//! # Example Usage
//!
//! ```no_run
//! use drf_scaffold::{
//!     registry,
//!     serializer_generator::SerializerGenerator,
//!     viewset_generator::ViewsetGenerator,
//!     url_generator::UrlGenerator,
//! };
//! use std::path::Path;
//!
//! let root = Path::new("./my-django-project");
//!
//! // Locate and load the model registry
//! let manifest = registry::locate_manifest(root).unwrap();
//! let index = registry::load_manifest(&manifest).unwrap();
//! let index = index.select(&["blog".to_string()]).unwrap();
//!
//! // Generate serializers, then viewsets, then URLs
//! let serializers = SerializerGenerator::new(root, &index).generate_all().unwrap();
//! let viewsets = ViewsetGenerator::new(root, &index, &serializers).generate_all().unwrap();
//! let segments = UrlGenerator::new(root, &viewsets).generate_all().unwrap();
//!
//! println!("Registered {} routes", segments.len());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete
//! CLI application.

pub mod cli;
pub mod registry;
pub mod layout;
pub mod serializer_generator;
pub mod viewset_generator;
pub mod url_generator;
pub mod error;
