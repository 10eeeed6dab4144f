//! Status descriptors: raw status codes to presentation metadata.

use serde::{Deserialize, Serialize};

/// Badge color consumed by templates and API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Gray,
    Blue,
    Green,
    Red,
    Orange,
    Purple,
}

impl ColorTag {
    /// Hex color for document rendering (PDF styling).
    pub fn hex(&self) -> &'static str {
        match self {
            ColorTag::Gray => "#6b7280",
            ColorTag::Blue => "#3b82f6",
            ColorTag::Green => "#22c55e",
            ColorTag::Red => "#ef4444",
            ColorTag::Orange => "#f97316",
            ColorTag::Purple => "#a855f7",
        }
    }
}

impl std::fmt::Display for ColorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColorTag::Gray => "gray",
            ColorTag::Blue => "blue",
            ColorTag::Green => "green",
            ColorTag::Red => "red",
            ColorTag::Orange => "orange",
            ColorTag::Purple => "purple",
        };
        write!(f, "{}", name)
    }
}

/// Presentation metadata for one raw status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDescriptor {
    pub label: String,
    pub color_tag: ColorTag,
}

/// Describe a raw status code.
///
/// Total over any input: unknown codes fall back to a capitalized copy
/// of the code with a gray tag, so an unmapped status still renders
/// instead of erroring. Lookup is case-sensitive on purpose: stored
/// data mixes lower-case codes with legacy capitalized labels, and each
/// spelling resolves through its own row ("payee" and "Payée" both land
/// on the green "Payée").
pub fn describe_status(code: &str) -> StatusDescriptor {
    let known = match code {
        "brouillon" => Some(("Brouillon", ColorTag::Gray)),
        "envoye" => Some(("Envoyé", ColorTag::Blue)),
        "accepte" => Some(("Accepté", ColorTag::Green)),
        "refuse" => Some(("Refusé", ColorTag::Red)),
        "expire" => Some(("Expiré", ColorTag::Orange)),
        "converti" => Some(("Converti", ColorTag::Purple)),
        "en_cours" => Some(("En cours", ColorTag::Blue)),
        "termine" => Some(("Terminé", ColorTag::Green)),
        "annule" => Some(("Annulé", ColorTag::Red)),
        "payee" | "Payée" => Some(("Payée", ColorTag::Green)),
        "Envoyée" => Some(("Envoyée", ColorTag::Blue)),
        "Annulée" => Some(("Annulée", ColorTag::Red)),
        _ => None,
    };

    match known {
        Some((label, color_tag)) => StatusDescriptor {
            label: label.to_string(),
            color_tag,
        },
        None => StatusDescriptor {
            label: capitalize(code),
            color_tag: ColorTag::Gray,
        },
    }
}

/// Uppercase the first character, leaving the rest untouched.
fn capitalize(code: &str) -> String {
    let mut chars = code.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
