//! Ember Core - scene data for the ember path tracer.
//!
//! This crate provides the renderer-agnostic data the tracer consumes:
//!
//! - **Surface samples**: [`Point`] (position, normal, uv)
//! - **Textures**: [`Texture`], an opaque color-by-uv lookup
//! - **Backgrounds**: [`Environment`], a lat-long infinite light
//! - **Scene input contracts**: [`SceneData`], [`MeshData`],
//!   [`MaterialParams`]
//!
//! Scene ingestion (model file parsing) lives outside this workspace; an
//! importer's job is to produce a [`SceneData`] and hand it over.

pub mod environment;
pub mod point;
pub mod scene;
pub mod texture;

pub use environment::Environment;
pub use point::Point;
pub use scene::{MaterialParams, MeshData, SceneData, SceneError};
pub use texture::{Texture, TextureError};
