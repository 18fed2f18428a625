//! Field reconciler: the bidirectional mapping between a shape-unknown
//! recognition result and the editable/storage field shape.
//!
//! `split` classifies each recognized entry as editable (scalar) or structured
//! (list/object preview); `merge` re-combines edited scalars with re-serialized
//! structured fields into a flat submit draft; `parse_stored` is the display-time
//! inverse of the serialization, falling back to raw text on malformed input.

pub mod label;
pub mod merge;
pub mod split;
pub mod stored;

pub use label::display_label;
pub use merge::merge;
pub use split::{split, FieldSplit};
pub use stored::{parse_stored, serialize_structured, StoredText};
