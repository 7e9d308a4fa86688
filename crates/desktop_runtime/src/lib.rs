//! Window instance registry for the ryOS desktop core.
//!
//! [`InstanceRegistry`] owns every open application instance, the stacking order and the single
//! foreground instance. It is an owned object handed to whoever needs it; the terminal shares it
//! through `Rc<RefCell<_>>`.

pub mod model;
pub mod persistence;
pub mod registry;

pub use model::*;
pub use persistence::{
    execute_registry_effects, load_window_geometry, persist_window_geometry, WINDOW_GEOMETRY_KEY,
};
pub use registry::InstanceRegistry;
