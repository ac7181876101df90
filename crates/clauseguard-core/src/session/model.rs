//! Session domain model.
//!
//! This module contains the core Session entity that represents one contract
//! analysis run, together with the descriptors of the documents generated
//! from it.

use serde::{Deserialize, Serialize};

/// Language the analysis service detected in the uploaded contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetectedLanguage {
    Ar,
    #[default]
    En,
}

/// A file stored by the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Download URL
    pub url: String,
    /// Identifier of the object in remote storage, when the service reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_id: Option<String>,
    /// File format ("docx", "txt", "pdf")
    pub format: String,
    /// Filename presented to the user
    pub display_filename: String,
}

/// The set of files produced for one generated document.
///
/// A modified contract usually comes as docx and txt; a marked contract
/// and a preview only carry a single rendition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docx: Option<RemoteFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txt: Option<RemoteFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<RemoteFile>,
}

impl ContractArtifacts {
    /// Returns true if no rendition is present.
    pub fn is_empty(&self) -> bool {
        self.docx.is_none() && self.txt.is_none() && self.pdf.is_none()
    }
}

/// One contract analysis run.
///
/// Created when upload+analyze succeeds or when a persisted session id is
/// rehydrated. A new upload replaces it wholesale; it is never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque session identifier assigned by the analysis service
    pub session_id: String,
    /// Filename of the uploaded contract
    pub original_filename: String,
    /// Format of the uploaded contract ("docx", "pdf", ...)
    pub original_format: String,
    pub detected_language: DetectedLanguage,
    /// Timestamp of the analysis (ISO 8601 format)
    pub analysis_timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_contract_info: Option<ContractArtifacts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_contract_info: Option<ContractArtifacts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_preview_info: Option<ContractArtifacts>,
}

impl Session {
    /// Returns the original filename without its extension.
    ///
    /// Used to derive the display names of generated documents.
    pub fn filename_stem(&self) -> &str {
        let name = self.original_filename.as_str();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }
}
