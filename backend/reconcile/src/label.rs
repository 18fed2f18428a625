/// Derive a display label from a camelCase field name: a space goes before each
/// interior uppercase letter and the first character is capitalized. Cosmetic
/// only — storage keys are never touched.
///
/// `"dateOfBirth"` becomes `"Date Of Birth"`.
pub fn display_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if i == 0 {
            label.extend(ch.to_uppercase());
        } else {
            if ch.is_uppercase() {
                label.push(' ');
            }
            label.push(ch);
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_label() {
        assert_eq!(display_label("dateOfBirth"), "Date Of Birth");
        assert_eq!(display_label("patientName"), "Patient Name");
        assert_eq!(display_label("rawOcrText"), "Raw Ocr Text");
    }

    #[test]
    fn test_single_word() {
        assert_eq!(display_label("email"), "Email");
        assert_eq!(display_label("address"), "Address");
    }

    #[test]
    fn test_empty_and_already_capitalized() {
        assert_eq!(display_label(""), "");
        assert_eq!(display_label("Name"), "Name");
    }
}
