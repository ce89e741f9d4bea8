//! Integration tests for editor crate

use pressroom_editor::{
    render_html, Article, ArticleStatus, BlockKind, BridgeError, Document, EditSession,
    FieldEdit, FileBridge, LocalAssetStore, Location, MemoryBridge, NoticeLevel,
    PersistenceBridge, SyncOutcome,
};
use tempfile::TempDir;

/// Bridge whose saves always fail
struct OfflineBridge;

impl PersistenceBridge for OfflineBridge {
    async fn load(&self, id: &str) -> Result<Article, BridgeError> {
        Err(BridgeError::NotFound(id.to_string()))
    }

    async fn save(&self, _article: &Article) -> Result<(), BridgeError> {
        Err(BridgeError::Unavailable("database unreachable".to_string()))
    }

    async fn list(&self) -> Result<Vec<Article>, BridgeError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_author_publish_lifecycle() -> anyhow::Result<()> {
    let store = TempDir::new()?;
    let bridge = FileBridge::new(store.path().join("articles"));
    let uploads = LocalAssetStore::new(store.path().join("uploads"), "/uploads/");

    let article = Article::new("Summer Reading List", "Culture")?;
    let id = article.id.clone();
    bridge.save(&article).await?;

    let mut session = EditSession::open(&bridge, &id).await?;
    assert!(session.canvas().document().is_empty());

    let heading = session.canvas_mut().add_block(BlockKind::Heading)?;
    session
        .canvas_mut()
        .edit(Location::canvas(heading), FieldEdit::Text("Ten books".to_string()))?;
    let image = session.canvas_mut().add_block(BlockKind::Image)?;

    let url = session
        .upload_image(Location::canvas(image), "cover.png", b"\x89PNG....", &uploads)
        .await?;
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".png"));

    session.publish(&bridge).await?;
    assert!(!session.has_unsaved_changes());
    assert_eq!(session.notices().last().unwrap().level, NoticeLevel::Info);

    let stored = bridge.load(&id).await?;
    assert_eq!(stored.status, ArticleStatus::Published);
    assert!(stored.published_at.is_some());

    let body = Document::parse(&stored.content)?;
    assert_eq!(body, *session.canvas().document());

    let html = render_html(&body);
    assert!(html.contains("<h2>Ten books</h2>"));
    assert!(html.contains(&format!("<img src=\"{}\"", url)));

    Ok(())
}

#[tokio::test]
async fn test_failed_publish_keeps_work() {
    let mut session = EditSession::new(Article::new("Offline", "news").unwrap());
    session.canvas_mut().add_block(BlockKind::Paragraph).unwrap();
    let before = session.canvas().document().clone();

    let result = session.publish(&OfflineBridge).await;

    assert!(result.is_err());
    assert_eq!(*session.canvas().document(), before);
    assert!(session.has_unsaved_changes());
    assert_eq!(session.article().status, ArticleStatus::Draft);

    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.contains("database unreachable"));
}

#[tokio::test]
async fn test_rejected_upload_keeps_tree() {
    let store = TempDir::new().unwrap();
    let uploads = LocalAssetStore::new(store.path(), "/uploads");
    let mut session = EditSession::new(Article::new("Gallery", "style").unwrap());
    session.canvas_mut().add_block(BlockKind::Image).unwrap();
    let before = session.canvas().document().clone();

    let result = session
        .upload_image(Location::canvas(0), "notes.txt", b"hello", &uploads)
        .await;

    assert!(result.is_err());
    assert!(!session.is_uploading(Location::canvas(0)));
    assert_eq!(*session.canvas().document(), before);
    assert_eq!(session.notices()[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_reload_picks_up_external_edits() {
    let bridge = MemoryBridge::new();
    let mut session = EditSession::new(Article::new("Shared", "news").unwrap());
    session.canvas_mut().add_block(BlockKind::Heading).unwrap();
    session.save_draft(&bridge).await.unwrap();

    // Another editor replaces the body
    let mut other = bridge.load(&session.article().id).await.unwrap();
    other.content = r#"{"content": [{"type": "Paragraph", "props": {"text": "rewritten"}}]}"#.to_string();
    bridge.save(&other).await.unwrap();

    assert_eq!(session.reload(&bridge).await.unwrap(), SyncOutcome::Reset);
    assert_eq!(session.canvas().document().content[0].summary(), "rewritten");
    assert!(!session.has_unsaved_changes());
    assert!(!session.canvas().history().can_undo());
}

#[tokio::test]
async fn test_file_bridge_lists_recent_first() {
    let store = TempDir::new().unwrap();
    let bridge = FileBridge::new(store.path());

    let mut older = Article::new("Older", "news").unwrap();
    older.updated_at = older.updated_at - chrono::Duration::hours(1);
    let newer = Article::new("Newer", "news").unwrap();

    bridge.save(&older).await.unwrap();
    bridge.save(&newer).await.unwrap();

    let listed = bridge.list().await.unwrap();
    let titles: Vec<_> = listed.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Newer", "Older"]);

    assert!(matches!(
        bridge.load("nothere").await,
        Err(BridgeError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_file_bridge_missing_dir_lists_empty() {
    let store = TempDir::new().unwrap();
    let bridge = FileBridge::new(store.path().join("never-created"));
    assert!(bridge.list().await.unwrap().is_empty());
}
