use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use devlog_engine::backend::memory::{MemoryStorage, MemoryStore};
use devlog_engine::canvas::{PickedFile, load_post, save_post};
use devlog_engine::{
    BlockKind, BlockUpdate, CanvasController, CanvasInput, CanvasKey, Dimension, Document,
    Navigation, Position, PostList, PostStore, PostViewer, RichTextAdapter, SaveOutcome, Size,
    TextEngine, ViewState,
};
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

type Canvas = CanvasController<()>;

#[tokio::test]
async fn saved_post_reloads_identically() {
    let store = MemoryStore::new();
    let mut canvas = Canvas::open(None, 900.0);
    canvas.set_title("Week 12");
    let text = canvas.add_text_block();
    canvas.on_update(
        &text,
        BlockUpdate::new()
            .with_position(Position::new(120.0, 80.0))
            .with_size(Size::px(320.0, 140.0)),
    );

    let saved_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    let request = canvas.begin_save(saved_at).unwrap();
    let result = save_post(&store, &request).await;
    let outcome = canvas.finish_save(&request, result);
    let SaveOutcome::Saved { id, navigate, .. } = outcome else {
        panic!("save should succeed");
    };
    assert_eq!(navigate, Navigation::Post(id.clone()));

    let mut reopened = Canvas::open(Some(id.clone()), 900.0);
    reopened.finish_load(load_post(&store, &id).await).unwrap();

    assert_eq!(reopened.title(), "Week 12");
    assert_eq!(reopened.blocks(), canvas.blocks());

    let mut viewer = PostViewer::new(id);
    viewer.load(&store).await.unwrap();
    let ViewState::Loaded(document) = viewer.state() else {
        panic!("post should be viewable");
    };
    assert_eq!(document.saved_at, Some(saved_at));
}

#[tokio::test]
async fn stored_json_survives_wire_round_trip() {
    let mut canvas = Canvas::open(None, 900.0);
    canvas.set_title("wire");
    canvas.add_text_block();
    let request = canvas.begin_save(Utc::now()).unwrap();

    let json = serde_json::to_value(&request.document).unwrap();
    assert!(json.get("raw_elements").is_some());
    assert!(json.get("savedAt").is_some());

    let decoded: Document = serde_json::from_value(json).unwrap();
    assert_eq!(decoded.blocks, canvas.blocks());
}

#[tokio::test]
async fn one_failed_upload_leaves_the_others() {
    let storage = MemoryStorage::new("https://cdn.example/images");
    let names = ["a.png", "b.png", "c.png"];
    let files: Vec<PickedFile> = names
        .iter()
        .map(|name| PickedFile {
            name: name.to_string(),
            bytes: vec![0; 4],
        })
        .collect();
    let mut rng = StdRng::seed_from_u64(42);
    let jobs = devlog_engine::canvas::plan_uploads(files, &mut rng, Utc::now());
    let doomed = jobs[1].path.clone();
    let storage = storage.rejecting(move |path| path == doomed);

    let mut canvas = Canvas::open(None, 900.0);
    assert!(canvas.begin_upload_batch());
    let blocks = devlog_engine::canvas::upload_images(&storage, jobs).await;
    canvas.finish_upload_batch(blocks);

    assert_eq!(canvas.blocks().len(), 2);
    assert!(!canvas.is_uploading());
    for block in canvas.blocks() {
        match &block.kind {
            BlockKind::Image { width, height, .. } => {
                assert_eq!(*width, Some(Dimension::Px(400.0)));
                assert_eq!(*height, Some(Dimension::Auto));
            }
            other => panic!("unexpected block {other:?}"),
        }
    }
}

#[test]
fn delete_key_removes_only_the_selection() {
    let mut canvas = Canvas::open(None, 900.0);
    let ids: Vec<_> = (0..3).map(|_| canvas.add_text_block()).collect();

    canvas.on_select(ids[1].clone(), None);
    assert!(canvas.handle_input(CanvasInput::Key(CanvasKey::Delete)));

    let remaining: Vec<_> = canvas.blocks().iter().map(|b| b.id.clone()).collect();
    assert_eq!(remaining, vec![ids[0].clone(), ids[2].clone()]);
    assert!(canvas.selection().is_none());
}

#[test]
fn block_ids_stay_unique_across_adds_and_deletes() {
    let mut canvas = Canvas::open(None, 900.0);
    let mut seen = HashSet::new();

    for round in 0..50 {
        let id = canvas.add_text_block();
        assert!(seen.insert(id.clone()), "id {id} reused");
        if round % 3 == 0 {
            canvas.on_select(id, None);
            canvas.handle_input(CanvasInput::Key(CanvasKey::Delete));
        }
        let live: HashSet<_> = canvas.blocks().iter().map(|b| b.id.clone()).collect();
        assert_eq!(live.len(), canvas.blocks().len());
    }
}

#[tokio::test]
async fn twenty_five_posts_make_three_pages() {
    let store = MemoryStore::new();
    for minute in 0..25 {
        store
            .insert(&Document {
                title: format!("post {minute}"),
                blocks: Vec::new(),
                saved_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap()),
            })
            .await
            .unwrap();
    }

    let mut list = PostList::new(10);
    assert_eq!(list.load_page(&store, 1).await, None);
    assert_eq!(list.total_pages(), 3);
    assert_eq!(list.rows()[0].title, "post 24");

    assert!(list.go_to(3));
    let range = list.begin_load();
    assert_eq!((range.from, range.to), (20, 29));
    let page = store.fetch_page(range).await;
    assert_eq!(list.finish_load(page), None);
    assert_eq!(list.rows().len(), 5);
    assert_eq!(list.rows()[4].title, "post 0");

    assert!(!list.go_to(4));
    assert_eq!(list.page(), 3);
}

#[test]
fn typing_burst_reaches_the_canvas_once() {
    let mut canvas = Canvas::open(None, 900.0);
    let id = canvas.add_text_block();
    let block = canvas.block(&id).unwrap().clone();
    let BlockKind::Text { content, size } = &block.kind else {
        panic!("expected text block");
    };

    let mut engine = TextEngine::new(content, true);
    let mut adapter = RichTextAdapter::new(
        id.clone(),
        true,
        block.position,
        *size,
        Duration::from_millis(300),
    );
    let start = Instant::now();
    for (i, text) in ["H", "He", "Hel", "Hell", "Hello"].into_iter().enumerate() {
        engine.set_text(text).unwrap();
        adapter.on_change(&engine, start + Duration::from_millis(50 * i as u64));
    }

    let mut commits = 0;
    for tick in 0..20 {
        if let Some((id, update)) = adapter.poll(start + Duration::from_millis(50 * tick)) {
            canvas.on_update(&id, update);
            commits += 1;
        }
    }

    assert_eq!(commits, 1);
    let BlockKind::Text { content, .. } = &canvas.block(&id).unwrap().kind else {
        panic!("expected text block");
    };
    assert_eq!(TextEngine::new(content, false).plain_text(), "Hello");
}
