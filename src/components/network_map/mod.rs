//! Nested-circle network map: circle-pack layout, occlusion-aware edges and
//! interactive selection, filtering and collapse on an HTML canvas.

mod collapse;
mod component;
mod drag;
mod engine;
mod error;
mod filter;
mod geometry;
mod hierarchy;
mod ingest;
mod layout;
mod pack;
mod radial;
mod render;
mod scene;
mod segments;
mod selection;
mod style;
mod types;
mod viewport;

pub use component::NetworkMapCanvas;
pub use engine::{EngineEvent, MapCommand};
pub use ingest::GraphModel;
