#![allow(clippy::unwrap_used)]

use crate::ClipNamer;

/// WHAT: Tokens are formatted from wall-clock milliseconds
/// WHY: Filenames should sort chronologically and be readable
#[test]
fn given_epoch_millis_when_naming_then_timestamp_token_with_wav_extension() {
    let mut namer = ClipNamer::new();

    let entry = namer.next_entry_at(1_000_123).unwrap();

    assert_eq!(entry.filename(), "19700101T001640123.wav");
}

/// WHAT: Saves within the same millisecond get distinct names
/// WHY: Two saves must never overwrite each other's file
#[test]
fn given_clock_not_advancing_when_naming_twice_then_second_token_bumped() {
    let mut namer = ClipNamer::new();

    let first = namer.next_entry_at(5_000).unwrap();
    let second = namer.next_entry_at(5_000).unwrap();

    assert_eq!(first.filename(), "19700101T000005000.wav");
    assert_eq!(second.filename(), "19700101T000005001.wav");
}

/// WHAT: A clock that steps backwards does not reorder names
/// WHY: Tokens must be monotonic within a session
#[test]
fn given_clock_moving_backwards_when_naming_then_tokens_still_increase() {
    let mut namer = ClipNamer::new();

    let first = namer.next_entry_at(10_000).unwrap();
    let second = namer.next_entry_at(9_000).unwrap();
    let third = namer.next_entry_at(20_000).unwrap();

    assert!(first.filename() < second.filename());
    assert!(second.filename() < third.filename());
    assert_eq!(third.filename(), "19700101T000020000.wav");
}

/// WHAT: Live names come from the current clock
/// WHY: Sanity check of the production path
#[test]
fn given_live_clock_when_naming_then_wav_filename() {
    let mut namer = ClipNamer::new();

    let entry = namer.next_entry().unwrap();

    assert!(entry.filename().ends_with(".wav"));
    assert_eq!(entry.filename().len(), "YYYYMMDDTHHMMSSmmm.wav".len());
}
