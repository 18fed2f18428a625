use formbridge_core::{EditableField, RecognitionResult, StructuredPreview, ValueKind};

/// A recognition result divided into its editable and read-only halves.
///
/// Every key of the input lands in exactly one of the two vectors, in the
/// input's key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSplit {
    pub editable: Vec<EditableField>,
    pub structured: Vec<StructuredPreview>,
}

impl FieldSplit {
    pub fn is_empty(&self) -> bool {
        self.editable.is_empty() && self.structured.is_empty()
    }
}

/// Classify each recognized entry by runtime kind: lists and objects become
/// read-only previews, everything else becomes an editable flat field. A list
/// of scalars is still structured, never promoted to editable.
pub fn split(result: &RecognitionResult) -> FieldSplit {
    let mut out = FieldSplit::default();
    for (name, value) in result {
        if ValueKind::of(value).is_structured() {
            out.structured.push(StructuredPreview {
                name: name.clone(),
                value: value.clone(),
            });
        } else {
            out.editable.push(EditableField {
                name: name.clone(),
                value: value.clone(),
            });
        }
    }
    out
}
