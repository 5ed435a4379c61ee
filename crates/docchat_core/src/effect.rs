use crate::DocumentFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    UploadDocument(DocumentFile),
    PostMessage { session_id: String, message: String },
    ClearSession { session_id: String },
    StartProgress,
    StopProgress,
    FocusInput,
}
