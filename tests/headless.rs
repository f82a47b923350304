//! Headless integration tests for broadcast_review.
//!
//! These tests drive ReviewSession end-to-end without a browser. They cover
//! the full path from detection data to rendered bars, gap designation,
//! audio fetching and the upload handoff.

use broadcast_review::audio::{AudioClient, FetchOutcome};
use broadcast_review::color::{ColorMode, EMPTY_COLOR, SPEECH_COLOR};
use broadcast_review::config::ReviewConfig;
use broadcast_review::gap::RecordingDesignator;
use broadcast_review::notices::NoticeLevel;
use broadcast_review::region::{ClipType, Detection, RegionSet};
use broadcast_review::session::ReviewSession;
use broadcast_review::upload::{DurationProbe, PendingUploads, UploadError, UploadForm};
use broadcast_review::view::MemoryView;
use broadcast_review::ReviewError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn make_session() -> ReviewSession<MemoryView> {
    ReviewSession::new_test()
}

fn morning_show() -> RegionSet {
    serde_json::from_str(
        r#"{
            "broadcast_id": 12,
            "data": [
                {"start_time_seconds": 60.8, "end_time_seconds": 90.2, "clip_type": "ad", "ad_id": 5, "brand": "Acme Tires"},
                {"start_time_seconds": 0, "end_time_seconds": 45, "clip_type": "song", "ad_id": 1, "brand": "Opening Theme"},
                {"start_time_seconds": 90, "end_time_seconds": 120, "clip_type": "ad", "ad_id": 5, "brand": "Acme Tires"},
                {"start_time_seconds": 150, "end_time_seconds": 170, "clip_type": "speech"}
            ]
        }"#,
    )
    .unwrap()
}

// ── Detection data to waveform ────────────────────────────────────────────

#[test]
fn full_review_pipeline() {
    let mut session = make_session();
    let waveform = session.load_broadcast(&morning_show(), 180, "morning.mp3").unwrap();

    let spans: Vec<(u64, u64, ClipType)> = waveform
        .regions()
        .iter()
        .map(|r| (r.start_time_seconds, r.end_time_seconds, r.clip_type))
        .collect();
    assert_eq!(
        spans,
        vec![
            (0, 45, ClipType::Song),
            (46, 59, ClipType::Empty),
            (60, 90, ClipType::Ad),
            (91, 120, ClipType::Ad),
            (121, 149, ClipType::Empty),
            (150, 170, ClipType::Speech),
            (171, 180, ClipType::Empty),
        ]
    );

    // Both Acme spots share an identity and therefore a color.
    let colors = waveform.colors();
    assert_eq!(
        colors.color_for(&waveform.regions()[2]),
        colors.color_for(&waveform.regions()[3])
    );
    assert_eq!(colors.color_for(&waveform.regions()[5]), SPEECH_COLOR);
    assert_eq!(colors.color_for(&waveform.regions()[1]), EMPTY_COLOR);

    let bars = waveform.bars();
    assert_eq!(bars.len(), 18_000);
    assert!(bars[0].tooltip.starts_with("Opening Theme"));
}

#[test]
fn same_seed_reproduces_bar_heights() {
    let mut a = make_session();
    let mut b = make_session();
    let bars_a = a.load_broadcast(&morning_show(), 180, "morning.mp3").unwrap().bars();
    let bars_b = b.load_broadcast(&morning_show(), 180, "morning.mp3").unwrap().bars();
    let heights_a: Vec<f64> = bars_a.iter().map(|b| b.height_px).collect();
    let heights_b: Vec<f64> = bars_b.iter().map(|b| b.height_px).collect();
    assert_eq!(heights_a, heights_b);
}

#[test]
fn deterministic_colors_survive_reload() {
    let config = ReviewConfig {
        color_mode: ColorMode::Deterministic,
        ..ReviewConfig::default()
    };
    let mut session = ReviewSession::new(config, MemoryView::new());
    let first: Vec<String> = session
        .load_broadcast(&morning_show(), 180, "morning.mp3")
        .unwrap()
        .bars()
        .into_iter()
        .map(|b| b.color)
        .collect();
    let second: Vec<String> = session
        .load_broadcast(&morning_show(), 180, "morning.mp3")
        .unwrap()
        .bars()
        .into_iter()
        .map(|b| b.color)
        .collect();
    assert_eq!(first, second);
}

#[test]
fn invalid_detection_data_is_reported() {
    let mut session = make_session();
    let set = RegionSet {
        broadcast_id: 1,
        data: vec![Detection::new(0.0, 400.0, ClipType::Song)],
    };
    let err = session.load_broadcast(&set, 180, "x").unwrap_err();
    assert!(matches!(err, ReviewError::InvalidInterval(_)));
    assert!(session.waveform().is_none());
    let notices = session.get_notices(0);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

// ── Seeking and gaps ──────────────────────────────────────────────────────

#[test]
fn seek_and_designate_gap() {
    let mut session = make_session();
    session.load_broadcast(&morning_show(), 180, "morning.mp3").unwrap();

    assert_eq!(session.seek(1000, Some(12)), Some(10.0));
    assert_eq!(session.seek(1000, Some(99)), None);

    let mut designator = RecordingDesignator::default();
    let markers = session.waveform().unwrap().gap_markers();
    assert_eq!(markers.len(), 3);

    let request = session
        .designate_gap(markers[1].region_index, &mut designator)
        .unwrap();
    assert_eq!(request.broadcast_id, 12);
    assert_eq!(request.start_time_seconds, 121);
    assert_eq!(request.end_time_seconds, 149);

    // Clicking a real ad is refused and reported.
    assert!(session.designate_gap(2, &mut designator).is_err());
    assert_eq!(designator.requests.len(), 1);
    assert_eq!(session.get_notices(0).len(), 1);
}

// ── Audio ─────────────────────────────────────────────────────────────────

async fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 2048];
        let _ = socket.read(&mut buf).await;
        let head = format!(
            "{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status_line,
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(body).await.unwrap();
        socket.shutdown().await.ok();
    });
    format!("http://{}", addr)
}

fn session_for(api_base: &str) -> ReviewSession<MemoryView> {
    let mut config = ReviewConfig::default();
    config.set_api_base(api_base).unwrap();
    ReviewSession::new(config, MemoryView::new())
}

#[tokio::test]
async fn fetch_publishes_audio() {
    let base = serve_once("HTTP/1.1 200 OK", b"fLaC-bytes").await;
    let mut session = session_for(&base);

    let outcome = session.fetch_audio("morning.flac").await.unwrap();
    assert_eq!(outcome, FetchOutcome::Loaded);
    assert!(session.status().audio_ready);

    let handle = session.audio_handle().unwrap();
    assert_eq!(session.view().get(handle), Some(&b"fLaC-bytes"[..]));
}

#[tokio::test]
async fn failed_fetch_disables_playback_and_notifies() {
    let base = serve_once("HTTP/1.1 500 Internal Server Error", b"").await;
    let mut session = session_for(&base);

    assert!(session.fetch_audio("morning.flac").await.is_err());
    assert!(!session.status().audio_ready);
    let notices = session.get_notices(0);
    assert_eq!(notices.len(), 1);
    assert!(notices[0].message.contains("500"));

    let shown = session.view().shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].level, NoticeLevel::Error);
    assert!(shown[0].message.starts_with("Could not load audio"));
}

#[tokio::test]
async fn client_returns_body_on_success() {
    let base = serve_once("HTTP/1.1 200 OK", b"ID3audio").await;
    let bytes = AudioClient::new(&base).fetch("a.mp3").await.unwrap();
    assert_eq!(bytes, b"ID3audio");
}

#[tokio::test]
async fn client_treats_non_2xx_as_failure() {
    let base = serve_once("HTTP/1.1 404 Not Found", b"missing").await;
    let err = AudioClient::new(&base).fetch("a.mp3").await.unwrap_err();
    assert!(matches!(err, ReviewError::AudioFetch(ref m) if m.contains("404")));
}

#[tokio::test]
async fn client_reports_connection_errors() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = AudioClient::new(&format!("http://{}", addr));
    assert!(client.fetch("a.mp3").await.is_err());
}

#[test]
fn superseded_fetch_is_ignored() {
    let mut session = make_session();
    let first = session.begin_audio_fetch();
    let second = session.begin_audio_fetch();

    session.complete_audio_fetch(second, Ok(b"new".to_vec())).unwrap();
    let outcome = session.complete_audio_fetch(first, Ok(b"old".to_vec())).unwrap();
    assert_eq!(outcome, FetchOutcome::Stale);

    let handle = session.audio_handle().unwrap();
    assert_eq!(session.view().get(handle), Some(&b"new"[..]));
    assert_eq!(session.view().live_count(), 1);

    session.clear_audio();
    assert!(!session.status().audio_ready);
    assert_eq!(session.view().live_count(), 0);
}

// ── Upload ────────────────────────────────────────────────────────────────

struct StubProbe(Option<Duration>);

impl DurationProbe for StubProbe {
    fn probe(&self, path: &Path) -> Result<Duration, UploadError> {
        self.0.ok_or_else(|| UploadError::Metadata {
            path: path.to_path_buf(),
            reason: "no audio track".into(),
        })
    }
}

#[test]
fn upload_handoff_workflow() {
    let mut session = make_session();
    let mut pending = PendingUploads::default();
    let mut form = UploadForm::new(
        "KXYZ 101.1",
        "Friday Drive Time",
        Some(PathBuf::from("friday.mp3")),
    );

    let request = session
        .submit_upload(&mut form, &StubProbe(Some(Duration::from_secs_f64(3600.9))), &mut pending)
        .unwrap();
    assert_eq!(request.duration_secs, 3600);
    assert_eq!(pending.requests.len(), 1);
    assert!(form.is_empty());
    assert_eq!(session.get_notices(0)[0].level, NoticeLevel::Info);
    assert!(session.view().shown()[0].message.contains("01:00:00"));
}

#[test]
fn upload_failures_reset_form_and_notify() {
    let mut session = make_session();
    let mut pending = PendingUploads::default();

    let mut form = UploadForm::new("", "Friday Drive Time", Some(PathBuf::from("friday.mp3")));
    let err = session
        .submit_upload(&mut form, &StubProbe(Some(Duration::from_secs(10))), &mut pending)
        .unwrap_err();
    assert!(matches!(err, ReviewError::Upload(UploadError::MissingFields)));
    assert!(form.is_empty());

    let mut form = UploadForm::new("KXYZ", "Friday", Some(PathBuf::from("friday.mp3")));
    session
        .submit_upload(&mut form, &StubProbe(None), &mut pending)
        .unwrap_err();
    assert!(form.is_empty());

    assert!(pending.requests.is_empty());
    let messages: Vec<String> = session.get_notices(0).into_iter().map(|n| n.message).collect();
    assert_eq!(
        messages,
        vec![
            "Please fill in all required fields".to_string(),
            "Upload failed. See console for details.".to_string(),
        ]
    );
}
