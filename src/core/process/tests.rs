// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::io::{read_stream, strip_eol};
use super::options::{SpawnOptions, StdioConfig, StdioMode, command_line};
use super::prefix::LineTagger;
use super::registry::ChildRegistry;

fn tagged(tagger: &mut LineTagger, chunks: &[&str]) -> String {
    let mut out = Vec::new();
    for chunk in chunks {
        out.extend(tagger.push(chunk.as_bytes()));
    }
    out.extend(tagger.finish());
    String::from_utf8(out).unwrap()
}

// =============================================================================
// Stream Reader
// =============================================================================

#[tokio::test]
async fn test_read_stream_strips_single_eol() {
    assert_eq!(read_stream(Some(&b"foo\n"[..])).await.as_deref(), Some("foo"));
    assert_eq!(read_stream(Some(&b"foo\r\n"[..])).await.as_deref(), Some("foo"));
    assert_eq!(read_stream(Some(&b"foo\n\n"[..])).await.as_deref(), Some("foo\n"));
    assert_eq!(read_stream(Some(&b""[..])).await.as_deref(), Some(""));
}

#[tokio::test]
async fn test_read_stream_absent_is_none() {
    assert_eq!(read_stream::<&[u8]>(None).await, None);
}

#[test]
fn test_strip_eol_lone_carriage_return() {
    let mut text = "done\r".to_string();
    strip_eol(&mut text);
    assert_eq!(text, "done");
}

// =============================================================================
// Line Tagger
// =============================================================================

#[test]
fn test_tagger_prefixes_every_line() {
    let mut tagger = LineTagger::new("pkg-a:", false);
    insta::assert_snapshot!(tagged(&mut tagger, &["one\ntwo\n", "three\n"]).trim_end(), @r"
    pkg-a: one
    pkg-a: two
    pkg-a: three
    ");
}

#[test]
fn test_tagger_holds_partial_line_until_newline() {
    let mut tagger = LineTagger::new("pkg:", false);
    assert!(tagger.push(b"hel").is_empty());
    assert_eq!(tagger.push(b"lo\nwor"), b"pkg: hello\n");
    assert_eq!(tagger.finish(), b"pkg: wor\n");
    assert!(tagger.finish().is_empty());
}

#[test]
fn test_tagger_normalizes_crlf_and_empty_lines() {
    let mut tagger = LineTagger::new("pkg:", false);
    assert_eq!(tagged(&mut tagger, &["a\r\n\r\nb\r\n"]), "pkg: a\npkg:\npkg: b\n");
}

#[test]
fn test_tagger_merges_multiline_chunks() {
    let mut tagger = LineTagger::new("pkg:", true);
    assert_eq!(
        tagged(&mut tagger, &["Error: boom\n    at main\n", "next\n"]),
        "pkg: Error: boom\n         at main\npkg: next\n"
    );
}

// =============================================================================
// Options
// =============================================================================

#[test]
fn test_stdio_override_replaces_default() {
    let default = SpawnOptions::new().resolve_stdio(StdioConfig::buffered());
    assert_eq!(
        default,
        StdioConfig::new(StdioMode::Ignore, StdioMode::Ignore, StdioMode::Pipe)
    );

    let piped = SpawnOptions::new().pipe().resolve_stdio(StdioConfig::buffered());
    assert_eq!(piped, StdioConfig::all(StdioMode::Pipe));
}

#[test]
fn test_command_line_quotes_spaced_args() {
    insta::assert_snapshot!(
        command_line("npm", &["run", "build all", "--silent"]),
        @r#"npm run "build all" --silent"#
    );
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn test_registration_finishes_once() {
    let registry = ChildRegistry::new();
    let first = registry.register();
    let second = registry.register();
    assert_eq!(registry.live_count(), 2);

    assert!(!first.finish());
    assert!(!first.finish());
    assert_eq!(registry.live_count(), 1);

    assert!(second.finish());
    drop(second);
    assert_eq!(registry.live_count(), 0);
    assert!(first.is_finished());
}

#[test]
fn test_dropped_registration_is_accounted_for() {
    let registry = ChildRegistry::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    registry.on_all_exited(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    // No runtime here, so the broadcast is immediate
    drop(registry.register());
    assert_eq!(registry.live_count(), 0);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_broadcast_waits_one_tick() {
    let registry = ChildRegistry::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    registry.on_all_exited(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut rx = registry.subscribe();
    let registration = registry.register();
    assert!(registration.finish());
    registry.announce_empty();
    assert_eq!(fired.load(Ordering::SeqCst), 0, "must not fire synchronously");

    rx.recv().await.unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_subscribers_fire_on_every_zero_transition() {
    let registry = ChildRegistry::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    registry.on_all_exited(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let mut rx = registry.subscribe();

    for round in 1..=2 {
        let registration = registry.register();
        assert!(registration.finish());
        registry.announce_empty();
        rx.recv().await.unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), round);
    }
}

#[tokio::test]
async fn test_empty_broadcast_kept_when_child_registered_during_yield() {
    let registry = ChildRegistry::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    registry.on_all_exited(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let first = registry.register();
    assert!(first.finish());
    registry.announce_empty();
    let second = registry.register();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(registry.live_count(), 1);

    assert!(second.finish());
    registry.announce_empty();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_wait_idle_returns_immediately_when_empty() {
    let registry = ChildRegistry::new();
    registry.wait_idle().await;
    assert_eq!(registry.live_count(), 0);
}
