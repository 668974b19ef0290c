// src/message.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Body of every `/chat` response, success or failure.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
}
