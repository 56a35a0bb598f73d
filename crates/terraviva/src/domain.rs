use serde::{Deserialize, Serialize};

/// A person who owns one or more listed properties. Soft-deleted owners stay
/// in storage with the active flag cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub registered_at: String,
}

/// Mutable owner fields, used for both creation and edits.
#[derive(Debug, Clone, Default)]
pub struct NewOwner {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A real-estate listing with bilingual content. `owner_name` is populated by
/// the owner join on reads; it stays `None` when the owner reference dangles
/// or the query skips the join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: i64,
    pub owner_id: Option<i64>,
    pub title_es: String,
    pub description_es: String,
    pub title_en: String,
    pub description_en: String,
    pub price: String,
    pub location: String,
    pub kind: String,
    pub status: String,
    pub images: Vec<String>,
    pub contact_phone: String,
    pub created_at: String,
    pub owner_name: Option<String>,
}

impl Property {
    pub fn title(&self, language: Language) -> &str {
        match language {
            Language::Espanol => &self.title_es,
            Language::Ingles => &self.title_en,
        }
    }

    pub fn description(&self, language: Language) -> &str {
        match language {
            Language::Espanol => &self.description_es,
            Language::Ingles => &self.description_en,
        }
    }
}

/// Mutable property fields. `images` round-trips through a JSON-encoded text
/// column, preserving order.
#[derive(Debug, Clone, Default)]
pub struct NewProperty {
    pub owner_id: Option<i64>,
    pub title_es: String,
    pub description_es: String,
    pub title_en: String,
    pub description_en: String,
    pub price: String,
    pub location: String,
    pub kind: String,
    pub status: String,
    pub images: Vec<String>,
    pub contact_phone: String,
}

pub const DEFAULT_PROPERTY_KIND: &str = "land";
pub const DEFAULT_PROPERTY_STATUS: &str = "available";

/// A visitor-submitted contact record. Append-only; never edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prospect {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub source: String,
    pub submitted_at: String,
    pub property_label: String,
    pub property_id: Option<i64>,
    pub language: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewProspect {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub source: String,
    pub property_label: String,
    pub property_id: Option<i64>,
    pub language: String,
}

pub const DEFAULT_PROSPECT_SOURCE: &str = "direct";

/// Minimal CRM user record handed back by authentication; the stored
/// password hash never leaves the repository layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmUserView {
    pub id: i64,
    pub username: String,
    pub display_name: String,
}

/// Visitor-facing language selection, sticky per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    Espanol,
    Ingles,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Espanol => "espanol",
            Language::Ingles => "ingles",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "espanol" => Some(Language::Espanol),
            "ingles" => Some(Language::Ingles),
            _ => None,
        }
    }

    /// Spanish unless the Accept-Language header puts English first.
    pub fn from_accept_language(header: &str) -> Self {
        let primary = header.split(',').next().unwrap_or("").trim();
        if primary.len() >= 2 && primary[..2].eq_ignore_ascii_case("en") {
            Language::Ingles
        } else {
            Language::Espanol
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Espanol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_parse_accepts_known_values_only() {
        assert_eq!(Language::parse("espanol"), Some(Language::Espanol));
        assert_eq!(Language::parse("ingles"), Some(Language::Ingles));
        assert_eq!(Language::parse("french"), None);
    }

    #[test]
    fn accept_language_header_maps_to_language() {
        assert_eq!(
            Language::from_accept_language("en-US,en;q=0.9"),
            Language::Ingles
        );
        assert_eq!(
            Language::from_accept_language("es-MX,es;q=0.8,en;q=0.5"),
            Language::Espanol
        );
        assert_eq!(Language::from_accept_language(""), Language::Espanol);
    }

    #[test]
    fn property_exposes_content_per_language() {
        let property = Property {
            id: 1,
            owner_id: None,
            title_es: "Terreno en la costa".to_string(),
            description_es: "Vista al mar".to_string(),
            title_en: "Coastal land".to_string(),
            description_en: "Ocean view".to_string(),
            price: String::new(),
            location: String::new(),
            kind: DEFAULT_PROPERTY_KIND.to_string(),
            status: DEFAULT_PROPERTY_STATUS.to_string(),
            images: Vec::new(),
            contact_phone: String::new(),
            created_at: String::new(),
            owner_name: None,
        };

        assert_eq!(property.title(Language::Espanol), "Terreno en la costa");
        assert_eq!(property.description(Language::Ingles), "Ocean view");
    }
}
