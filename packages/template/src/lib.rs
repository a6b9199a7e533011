//! Template model recovered by the decompiler: values, morphs and the
//! document tree, together with their serializer and the parsers for the
//! compiled artifact's textual bits (revisions, opcodes, alias paths).

pub mod element;
pub mod error;
pub mod morph;
pub mod opcode;
pub mod parser;
pub mod types;

pub use element::{Element, Node, RenderOptions};
pub use error::ParseError;
pub use morph::{AttributeMorph, BlockMorph, ElementMorph, Morph};
pub use types::{Hash, HelperCall, Literal, Value};
