use crate::{ChatReply, DocumentFile, UploadedDocument};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked a document to upload.
    FileSelected(DocumentFile),
    /// Backend answered the upload (or the transport failed).
    UploadFinished(Result<UploadedDocument, String>),
    /// User edited the chat input box.
    InputChanged(String),
    /// User pressed Send (or Enter) with the current input.
    SendClicked,
    /// Backend answered the chat message (or the transport failed).
    ChatFinished(Result<ChatReply, String>),
    /// User asked to drop the current document.
    ClearClicked,
    /// Clear notification settled; its outcome is irrelevant.
    ClearFinished,
    /// Simulated upload progress advanced.
    ProgressTick { increment: f32 },
    /// User closed the error notice.
    DismissError,
}
