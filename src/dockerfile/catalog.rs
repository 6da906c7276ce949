//! CMU Sphinx speech-model catalog.
//!
//! Offline speech recognition needs per-language acoustic models plus a
//! fixed set of support packages. The catalog is plain immutable data passed
//! into the renderer, so tests can substitute their own.

use std::collections::BTreeMap;

/// Support packages and the locale → model archive table.
#[derive(Debug, Clone)]
pub struct SpeechModelCatalog {
    /// Debian packages required to build and use the models.
    pub apt_packages: Vec<String>,
    /// Python packages required at runtime.
    pub pip_packages: Vec<String>,
    /// Locale code → downloadable model archive URL.
    pub models: BTreeMap<String, String>,
}

impl SpeechModelCatalog {
    /// The built-in catalog.
    ///
    /// Model archives are the ones published for the speech_recognition
    /// project; locales without a published archive are simply absent.
    pub fn builtin() -> Self {
        let models = BTreeMap::from([
            (
                "it-IT".to_string(),
                "https://github.com/Uberi/speech_recognition/files/683258/it-IT.zip".to_string(),
            ),
            ("fr-FR".to_string(), "https://db.tt/tVNcZXao".to_string()),
            ("zh-CN".to_string(), "https://db.tt/2YQVXmEk".to_string()),
        ]);
        Self {
            apt_packages: vec![
                "swig".to_string(),
                "libpulse-dev".to_string(),
                "wget".to_string(),
                "unzip".to_string(),
            ],
            pip_packages: vec!["pocketsphinx".to_string()],
            models,
        }
    }

    /// URL of the model archive for a locale, if the catalog carries one.
    pub fn model_url(&self, locale: &str) -> Option<&str> {
        self.models.get(locale).map(String::as_str)
    }
}
