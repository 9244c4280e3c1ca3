//! Content negotiation: pick a response representation from `Accept` values.
//!
//! - [`mime`]: media-type parsing and compatibility.
//! - [`producible`]: the variants a response can be produced as.
//! - [`resolver`]: the selection rule itself.

pub mod mime;
pub mod producible;
pub mod resolver;

pub use mime::{tokenize, MimeType};
pub use producible::{Producible, Variant, VariantSet};
pub use resolver::resolve;
