//! services/viewer/src/bridge/protocol.rs
//!
//! Defines the JSON-lines protocol between a front-end host (the page that
//! draws the PDF) and the viewer process. One JSON object per line each way.

use crate::viewer::ViewState;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

//=========================================================================================
// Messages Sent FROM the Host TO the Viewer
//=========================================================================================

/// UI events and rendering callbacks the host forwards to the viewer.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A PDF file was dropped onto the widget.
    OpenFile { path: PathBuf },

    /// The user submitted a link.
    OpenUrl { url: String },

    /// The user closed the document.
    Clear,

    /// The renderer finished loading and knows the page count.
    DocumentLoaded { num_pages: u32 },

    /// The renderer could not load the document.
    DocumentFailed { message: String },

    NextPage,
    PreviousPage,
    GoToPage { page: u32 },

    ZoomIn,
    ZoomOut,
    ResetZoom,
    SetZoom { scale: f64 },

    SetPageNote { text: String },
    SetGlobalNote { text: String },

    /// The image picker produced a file for the current page.
    AddImage {
        path: PathBuf,
        #[serde(default)]
        mime_type: Option<String>,
        #[serde(default)]
        caption: Option<String>,
    },

    RemoveImage { id: String },
}

//=========================================================================================
// Messages Sent FROM the Viewer TO the Host
//=========================================================================================

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The full state to render, sent after every handled event.
    View { state: ViewState },

    /// An event was rejected; show the message inline.
    Error { message: String },
}
