use crate::{
    ClipLoader, LoadSummary, RegistryEntry,
    tests::support::{save_clip, temp_store},
};

use std::fs;

use tokio_stream::StreamExt;

/// WHAT: A missing file is skipped and the rest load in order
/// WHY: One lost recording must not block recovery of the library
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_middle_entry_missing_when_loading_all_then_other_two_yielded_in_order() {
    // Given: Three registered clips, the second of which is deleted
    let (_root, store) = temp_store();
    save_clip(&store, "1.wav", vec![0.1; 100]);
    save_clip(&store, "2.wav", vec![0.2; 200]);
    save_clip(&store, "3.wav", vec![0.3; 300]);
    fs::remove_file(store.recording_dir().join("2.wav")).unwrap();

    // When: Loading everything
    let mut load = ClipLoader::new(store.clone()).load_all();
    let mut clips = Vec::new();
    while let Some(clip) = load.next_clip().await {
        clips.push(clip);
    }
    let summary = load.finish().await.unwrap();

    // Then: Entries 1 and 3, in registry order
    let names: Vec<&str> = clips.iter().map(|c| c.source_entry.filename()).collect();
    assert_eq!(names, ["1.wav", "3.wav"]);
    assert_eq!(clips[0].pcm.frames(), 100);
    assert_eq!(clips[1].pcm.frames(), 300);
    assert_eq!(
        summary,
        LoadSummary {
            loaded: 2,
            skipped: 1,
            cancelled: false
        }
    );
}

/// WHAT: A corrupt file is skipped like a missing one
/// WHY: Malformed containers are recovery errors, not fatal ones
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_corrupt_file_when_loading_all_then_skipped() {
    // Given: A valid clip followed by a registered file of garbage
    let (_root, store) = temp_store();
    save_clip(&store, "good.wav", vec![0.5; 10]);
    fs::write(store.recording_dir().join("bad.wav"), b"garbage").unwrap();
    store
        .registry()
        .append(&RegistryEntry::new("bad.wav").unwrap())
        .unwrap();

    // When: Consuming the load as a stream
    let load = ClipLoader::new(store.clone()).load_all();
    let clips: Vec<_> = load.collect().await;

    // Then: Only the good clip arrives
    assert_eq!(clips.len(), 1);
    assert_eq!(clips[0].source_entry.filename(), "good.wav");
}

/// WHAT: First run yields nothing and creates the registry
/// WHY: Startup with no library must be a quiet no-op
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_no_registry_when_loading_all_then_empty_and_registry_created() {
    let (_root, store) = temp_store();
    assert!(!store.registry().path().exists());

    let mut load = ClipLoader::new(store.clone()).load_all();
    let first = load.next_clip().await;
    let summary = load.finish().await.unwrap();

    assert!(first.is_none());
    assert_eq!(summary, LoadSummary::default());
    assert!(store.registry().path().exists());
}

/// WHAT: Duplicate registry lines load twice
/// WHY: The registry tolerates duplicates rather than deduplicating
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_duplicate_entry_when_loading_all_then_clip_yielded_twice() {
    let (_root, store) = temp_store();
    save_clip(&store, "dup.wav", vec![0.1; 10]);
    store
        .registry()
        .append(&RegistryEntry::new("dup.wav").unwrap())
        .unwrap();

    let clips: Vec<_> = ClipLoader::new(store.clone()).load_all().collect().await;

    assert_eq!(clips.len(), 2);
    assert_eq!(clips[0], clips[1]);
}

/// WHAT: Entries that escape the recording directory are skipped
/// WHY: The recording directory is flat; other paths are never read
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_nested_path_entry_when_loading_all_then_skipped() {
    let (_root, store) = temp_store();
    store
        .registry()
        .append(&RegistryEntry::new("../outside.wav").unwrap())
        .unwrap();
    save_clip(&store, "inside.wav", vec![0.1; 10]);

    let mut load = ClipLoader::new(store.clone()).load_all();
    let mut count = 0;
    while load.next_clip().await.is_some() {
        count += 1;
    }
    let summary = load.finish().await.unwrap();

    assert_eq!(count, 1);
    assert_eq!(summary.skipped, 1);
}

/// WHAT: Cancelling before consumption stops between entries
/// WHY: A future cancel handle must be able to halt the pipeline cleanly
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_cancelled_load_when_finishing_then_summary_reports_cancelled() {
    // Given: A library of five clips
    let (_root, store) = temp_store();
    for i in 0..5 {
        save_clip(&store, &format!("{}.wav", i), vec![0.1; 10]);
    }

    // When: Cancelling before the task has had a chance to run
    let load = ClipLoader::new(store.clone()).load_all();
    load.cancel();
    let summary = load.finish().await.unwrap();

    // Then: Nothing was delivered and the registry is untouched
    assert!(summary.cancelled);
    assert_eq!(summary.loaded, 0);
    assert_eq!(store.registry().load().unwrap().len(), 5);
}

/// WHAT: Each pass snapshots the registry at call time
/// WHY: A restart must observe entries saved since the last load
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_entry_appended_after_first_load_when_loading_again_then_new_entry_seen() {
    let (_root, store) = temp_store();
    save_clip(&store, "a.wav", vec![0.1; 10]);
    let loader = ClipLoader::new(store.clone());

    let first: Vec<_> = loader.load_all().collect().await;
    save_clip(&store, "b.wav", vec![0.1; 10]);
    let second: Vec<_> = loader.load_all().collect().await;

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 2);
    assert_eq!(second[1].source_entry.filename(), "b.wav");
}
