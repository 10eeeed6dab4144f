//! Category display names.

/// Display name for an absent category.
pub const UNKNOWN_CATEGORY: &str = "Inconnu";

/// Map a raw category code to its display name.
///
/// The fallback is asymmetric: an absent category renders as
/// "Inconnu", while an unrecognized code is passed through verbatim so
/// the raw value stays visible to whoever reads the document.
pub fn map_category(code: Option<&str>) -> String {
    match code {
        None => UNKNOWN_CATEGORY.to_string(),
        Some("conteneurs") => "Conteneur".to_string(),
        Some("conventionnel") => "Lot".to_string(),
        Some("operations_independantes") => "Independant".to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_map_to_display_names() {
        assert_eq!(map_category(Some("conteneurs")), "Conteneur");
        assert_eq!(map_category(Some("conventionnel")), "Lot");
        assert_eq!(map_category(Some("operations_independantes")), "Independant");
    }

    #[test]
    fn absent_category_renders_as_inconnu() {
        assert_eq!(map_category(None), "Inconnu");
    }

    #[test]
    fn unrecognized_category_passes_through_verbatim() {
        assert_eq!(map_category(Some("transit")), "transit");
        assert_eq!(map_category(Some("")), "");
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(map_category(Some("Conteneurs")), "Conteneurs");
    }
}
