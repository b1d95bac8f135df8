//! services/viewer/src/bridge/session.rs
//!
//! The event loop for one host connection. Stands in for the browser's UI loop:
//! every event is applied to a single `Viewer` in arrival order, and the new
//! state is written back after each one.

use crate::bridge::file_type::{self, PDF_MIME};
use crate::bridge::protocol::{ClientMessage, ServerMessage};
use crate::error::ViewerError;
use crate::viewer::{Services, Viewer};
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// One viewer driven by host messages.
pub struct BridgeSession {
    viewer: Viewer,
}

impl BridgeSession {
    pub fn new(services: &Services) -> Self {
        Self {
            viewer: Viewer::new(services),
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Applies one message. Identity resolution is awaited inline, so the
    /// state written afterwards already reflects the new document.
    pub async fn handle(&mut self, message: ClientMessage) -> Result<(), ViewerError> {
        match message {
            ClientMessage::OpenFile { path } => {
                let name = file_name(&path);
                let bytes = tokio::fs::read(&path).await?;
                let detected = file_type::detect_content_type(&path, &bytes, None);
                if !file_type::is_pdf(&detected) {
                    debug!(file = %name, detected = %detected, "bridge: dropped file is not a PDF");
                    return Err(ViewerError::UnsupportedFile(format!("{} is not a PDF", name)));
                }
                let pending = self.viewer.open_file(name, PDF_MIME, bytes);
                if let Some(resolved) = pending.resolve().await {
                    self.viewer.apply_identity(resolved).await;
                }
            }
            ClientMessage::OpenUrl { url } => {
                let pending = self.viewer.open_url(&url)?;
                if let Some(resolved) = pending.resolve().await {
                    self.viewer.apply_identity(resolved).await;
                }
            }
            ClientMessage::Clear => self.viewer.clear(),
            ClientMessage::DocumentLoaded { num_pages } => self.viewer.on_document_loaded(num_pages),
            ClientMessage::DocumentFailed { message } => self.viewer.on_document_failed(message),
            ClientMessage::NextPage => {
                self.viewer.next_page();
            }
            ClientMessage::PreviousPage => {
                self.viewer.previous_page();
            }
            ClientMessage::GoToPage { page } => {
                self.viewer.go_to_page(page);
            }
            ClientMessage::ZoomIn => {
                self.viewer.zoom_in();
            }
            ClientMessage::ZoomOut => {
                self.viewer.zoom_out();
            }
            ClientMessage::ResetZoom => {
                self.viewer.reset_zoom();
            }
            ClientMessage::SetZoom { scale } => {
                self.viewer.set_zoom(scale);
            }
            ClientMessage::SetPageNote { text } => self.viewer.set_page_note(&text),
            ClientMessage::SetGlobalNote { text } => self.viewer.set_global_note(&text),
            ClientMessage::AddImage {
                path,
                mime_type,
                caption,
            } => {
                let bytes = tokio::fs::read(&path).await?;
                let detected = file_type::detect_content_type(&path, &bytes, mime_type.as_deref());
                if !file_type::is_image(&detected) {
                    return Err(ViewerError::UnsupportedFile(format!(
                        "{} is not an image",
                        file_name(&path)
                    )));
                }
                self.viewer
                    .add_image(bytes, &detected, caption.as_deref())
                    .await?;
            }
            ClientMessage::RemoveImage { id } => {
                self.viewer.remove_image(&id).await?;
            }
        }
        Ok(())
    }

    pub fn close(&mut self) {
        self.viewer.close();
    }
}

/// Reads messages from `reader` until EOF, writing replies to `writer`.
///
/// Malformed lines and rejected events produce an `error` reply; neither ends
/// the session.
pub async fn run<R, W>(services: &Services, reader: R, mut writer: W) -> Result<(), ViewerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = BridgeSession::new(services);
    let mut lines = reader.lines();
    info!("bridge: session started");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ClientMessage>(line) {
            Ok(message) => {
                debug!(?message, "bridge: event");
                if let Err(e) = session.handle(message).await {
                    if e.is_input_error() {
                        debug!(error = %e, "bridge: event rejected");
                    } else {
                        warn!(error = %e, "bridge: event failed");
                    }
                    send(&mut writer, &ServerMessage::Error { message: e.to_string() }).await?;
                }
            }
            Err(e) => {
                warn!(error = %e, "bridge: malformed message");
                send(
                    &mut writer,
                    &ServerMessage::Error {
                        message: format!("Malformed message: {}", e),
                    },
                )
                .await?;
                continue;
            }
        }
        send(
            &mut writer,
            &ServerMessage::View {
                state: session.viewer().view(),
            },
        )
        .await?;
    }

    session.close();
    info!("bridge: session ended");
    Ok(())
}

async fn send<W>(writer: &mut W, message: &ServerMessage) -> Result<(), ViewerError>
where
    W: AsyncWrite + Unpin,
{
    let mut json = serde_json::to_vec(message)?;
    json.push(b'\n');
    writer.write_all(&json).await?;
    writer.flush().await?;
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
