//! Persistence across process restarts with the file-backed adapters.

use bytes::Bytes;
use pdf_reader_core::domain::Source;
use std::sync::Arc;
use viewer_lib::adapters::{FsBlobStore, JsonFileStringStore, MemoryDisplayHandles, Sha256Hasher};
use viewer_lib::config::Config;
use viewer_lib::viewer::Services;
use viewer_lib::Viewer;

fn file_services(config: &Config) -> Services {
    Services {
        notes: Arc::new(JsonFileStringStore::open(config.notes_file())),
        blobs: Arc::new(FsBlobStore::new(config.blob_dir())),
        display: Arc::new(MemoryDisplayHandles::new()),
        hasher: Arc::new(Sha256Hasher),
    }
}

#[tokio::test]
async fn notes_and_images_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().to_string_lossy().into_owned();
    let config = Config::from_lookup(|name| match name {
        "PDF_READER_DATA_DIR" => Some(data_dir.clone()),
        _ => None,
    })
    .unwrap();

    let source = Source::File {
        bytes: Bytes::from_static(b"%PDF-1.7 persisted"),
        name: "paper.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
    };

    {
        let services = file_services(&config);
        let mut viewer = Viewer::new(&services);
        viewer.open(source.clone()).await;
        viewer.on_document_loaded(12);
        viewer.go_to_page(4);
        viewer.set_page_note("see figure 2");
        viewer
            .add_image(vec![0x89, b'P', b'N', b'G'], "image/png", Some("figure 2"))
            .await
            .unwrap();
    }

    let services = file_services(&config);
    let mut viewer = Viewer::new(&services);
    viewer.open(source).await;

    assert_eq!(viewer.page(), 4);
    assert_eq!(viewer.page_note(), "see figure 2");
    let images: Vec<_> = viewer.images_on_page(4).collect();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].attachment.caption, "figure 2");
    assert!(config.notes_file().exists());
}
