//! Localized application vocabulary.
//!
//! The office runs in Arabic, English, or French; everything here falls back
//! to English for unsupported languages.

use crate::legal::constants::Language;

/// Common legal vocabulary, localized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalTerms {
    pub plaintiff: &'static str,
    pub defendant: &'static str,
    pub third_party: &'static str,
    pub attorney: &'static str,
    pub court: &'static str,
    pub case: &'static str,
    pub matter: &'static str,
    pub lawsuit: &'static str,
    pub filing: &'static str,
    pub appeal: &'static str,
}

/// Localized name of the application menu.
pub fn app_menu_name(language: Language) -> &'static str {
    match language {
        Language::Ar => "القضايا والملفات",
        Language::Fr => "Affaires et dossiers",
        Language::En | Language::Other => "Cases & Matters",
    }
}

/// Localized legal vocabulary for UI labels and generated summaries.
pub fn legal_terms(language: Language) -> LegalTerms {
    match language {
        Language::Ar => LegalTerms {
            plaintiff: "المدعي",
            defendant: "المدعى عليه",
            third_party: "طرف ثالث",
            attorney: "محامٍ",
            court: "محكمة",
            case: "قضية",
            matter: "ملف",
            lawsuit: "دعوى",
            filing: "قيد الدعوى",
            appeal: "استئناف",
        },
        Language::Fr => LegalTerms {
            plaintiff: "Demandeur",
            defendant: "Défendeur",
            third_party: "Tiers",
            attorney: "Avocat",
            court: "Tribunal",
            case: "Affaire",
            matter: "Dossier",
            lawsuit: "Procès",
            filing: "Dépôt",
            appeal: "Appel",
        },
        Language::En | Language::Other => LegalTerms {
            plaintiff: "Plaintiff",
            defendant: "Defendant",
            third_party: "Third Party",
            attorney: "Attorney",
            court: "Court",
            case: "Case",
            matter: "Matter",
            lawsuit: "Lawsuit",
            filing: "Filing",
            appeal: "Appeal",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_name_is_localized_with_english_fallback() {
        assert_eq!(app_menu_name(Language::En), "Cases & Matters");
        assert_eq!(app_menu_name(Language::Other), "Cases & Matters");
        assert_ne!(app_menu_name(Language::Ar), app_menu_name(Language::Fr));
    }

    #[test]
    fn terms_fall_back_to_english_for_other() {
        assert_eq!(legal_terms(Language::Other), legal_terms(Language::En));
        assert_eq!(legal_terms(Language::Fr).court, "Tribunal");
    }
}
