pub mod audit;
pub mod backlog;
pub mod cac;
pub mod capa;
pub mod checks;
pub mod config;
pub mod docs;
pub mod error;
pub mod input;
pub mod io;
pub mod readability;
pub mod render;
pub mod rice;
pub mod risk;
pub mod rpn;
pub mod scaffold;
pub mod sprint;
pub mod voice;

pub use error::{AdvkitError, Result};
