//! Descriptors for generated documents.
//!
//! Display filenames are derived from the original filename:
//! `modified_<stem>.docx`, `modified_<stem>.txt` and `marked_<stem>.docx`.

use clauseguard_core::analysis::{GenerateMarkedResponse, GenerateModifiedResponse};
use clauseguard_core::session::{ContractArtifacts, RemoteFile, Session};

const MODIFIED_PREFIX: &str = "modified";
const MARKED_PREFIX: &str = "marked";

fn remote_file(url: &str, prefix: &str, stem: &str, format: &str) -> RemoteFile {
    RemoteFile {
        url: url.to_string(),
        storage_id: None,
        format: format.to_string(),
        display_filename: format!("{prefix}_{stem}.{format}"),
    }
}

/// Builds the modified-contract descriptors. `None` if no URL came back.
pub fn modified_contract(
    session: &Session,
    response: &GenerateModifiedResponse,
) -> Option<ContractArtifacts> {
    let stem = session.filename_stem();
    let artifacts = ContractArtifacts {
        docx: response
            .docx_url
            .as_deref()
            .map(|url| remote_file(url, MODIFIED_PREFIX, stem, "docx")),
        txt: response
            .txt_url
            .as_deref()
            .map(|url| remote_file(url, MODIFIED_PREFIX, stem, "txt")),
        pdf: None,
    };
    (!artifacts.is_empty()).then_some(artifacts)
}

/// Builds the marked-contract descriptors. `None` if no URL came back.
pub fn marked_contract(
    session: &Session,
    response: &GenerateMarkedResponse,
) -> Option<ContractArtifacts> {
    let stem = session.filename_stem();
    response.docx_url.as_deref().map(|url| ContractArtifacts {
        docx: Some(remote_file(url, MARKED_PREFIX, stem, "docx")),
        txt: None,
        pdf: None,
    })
}
