mod dest;
mod document;
mod text;

pub use document::Pdf;
pub(crate) use dest::{deref, resolve_page};
pub(crate) use text::decode_text;
