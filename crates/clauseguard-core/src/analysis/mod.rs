//! Boundary to the remote analysis service.
//!
//! - `client`: the `AnalysisClient` trait implemented by the network layer
//! - `records`: request/response shapes exchanged through it

mod client;
mod records;

pub use client::AnalysisClient;
pub use records::{
    ConfirmResponse, ExpertFeedbackRequest, ExpertFeedbackResponse, GenerateMarkedResponse,
    GenerateModifiedResponse, QuestionRequest, ReviewRequest, ReviewResponse, SessionRecord,
    TermRecord, UploadFile, UploadResponse,
};
