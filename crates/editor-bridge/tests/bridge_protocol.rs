//! Timing and cleanup properties of the extraction protocol.
//!
//! All tests run on a paused clock so timeouts and probe delays are exact.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use editor_bridge::{
    BridgeConfig, BridgeEnvelope, CodeExtractor, EditorRuntime, ExtractionBridge, ExtractionError,
    InProcessPage, PageWindow, ProbeConfig, ProbeHandle, ProbeInjector, RuntimeProbe,
    StaticEditorRuntime, EDITOR_UNAVAILABLE,
};
use serde_json::{json, Value};
use tokio::time::Instant;

/// Editor that loads after a fixed number of reads.
struct SlowEditor {
    reads: AtomicU32,
    ready_on: Option<u32>,
}

impl SlowEditor {
    fn ready_on(n: u32) -> Arc<Self> {
        Arc::new(SlowEditor {
            reads: AtomicU32::new(0),
            ready_on: Some(n),
        })
    }

    fn stalled() -> Arc<Self> {
        Arc::new(SlowEditor {
            reads: AtomicU32::new(0),
            ready_on: None,
        })
    }

    fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

impl EditorRuntime for SlowEditor {
    fn read_buffer(&self) -> RuntimeProbe {
        let n = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        match self.ready_on {
            Some(ready) if n >= ready => RuntimeProbe::Ready("class Solution: pass".to_string()),
            _ => RuntimeProbe::NotLoaded,
        }
    }
}

/// Injector whose "probe" posts a fixed list of messages.
struct ScriptedPage {
    window: PageWindow,
    script: Vec<(bool, Value)>,
}

impl ProbeInjector for ScriptedPage {
    fn inject(&self, _config: ProbeConfig) -> ProbeHandle {
        let window = self.window.clone();
        let script = self.script.clone();
        ProbeHandle::spawn(async move {
            for (foreign, data) in script {
                if foreign {
                    window.post_foreign(data);
                } else {
                    window.post_message(data);
                }
            }
            BridgeEnvelope::error("script finished")
        })
    }
}

fn bridge_for(editor: Arc<SlowEditor>, config: BridgeConfig) -> ExtractionBridge<InProcessPage> {
    ExtractionBridge::for_page(InProcessPage::new(PageWindow::new(), editor), config)
}

fn fast_probe(timeout_ms: u64) -> BridgeConfig {
    BridgeConfig {
        caller_timeout: Duration::from_millis(timeout_ms),
        probe: ProbeConfig {
            retries: 50,
            delay: Duration::from_millis(20),
        },
    }
}

// ===========================================================================
// Delivery
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn ready_editor_is_extracted() {
    let page = InProcessPage::new(
        PageWindow::new(),
        Arc::new(StaticEditorRuntime::new("def f(): pass")),
    );
    let bridge = ExtractionBridge::for_page(page, BridgeConfig::default());

    assert_eq!(bridge.extract_code().await.unwrap(), "def f(): pass");
    assert_eq!(bridge.window().listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn editor_loading_within_budget_is_extracted() {
    let editor = SlowEditor::ready_on(3);
    let bridge = bridge_for(editor.clone(), fast_probe(200));

    assert_eq!(bridge.extract().await.unwrap(), "class Solution: pass");
    assert_eq!(editor.reads(), 3);
}

#[tokio::test(start_paused = true)]
async fn foreign_and_untagged_messages_are_ignored() {
    let window = PageWindow::new();
    let page = ScriptedPage {
        window: window.clone(),
        script: vec![
            (false, json!({"type": "webpackHotUpdate"})),
            (false, json!({"source": "react-devtools", "editorValue": "nope"})),
            (true, BridgeEnvelope::editor_value("spoofed").to_json()),
            (false, BridgeEnvelope::editor_value("genuine").to_json()),
        ],
    };
    let bridge = ExtractionBridge::new(window, page, BridgeConfig::default());

    assert_eq!(bridge.extract().await.unwrap(), "genuine");
}

#[tokio::test(start_paused = true)]
async fn reply_survives_a_burst_of_page_noise() {
    // The reply and the noise behind it all land before the listener is polled.
    let window = PageWindow::new();
    let mut script = vec![(false, BridgeEnvelope::editor_value("genuine").to_json())];
    script.extend((0..100).map(|n| (false, json!({"type": "analytics", "seq": n}))));
    let page = ScriptedPage {
        window: window.clone(),
        script,
    };
    let bridge = ExtractionBridge::new(window, page, BridgeConfig::default());

    assert_eq!(bridge.extract().await.unwrap(), "genuine");
    assert_eq!(bridge.window().listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn probe_error_rejects() {
    struct Broken;
    impl EditorRuntime for Broken {
        fn read_buffer(&self) -> RuntimeProbe {
            RuntimeProbe::Failed("Cannot read properties of undefined".to_string())
        }
    }

    let page = InProcessPage::new(PageWindow::new(), Arc::new(Broken));
    let bridge = ExtractionBridge::for_page(page, BridgeConfig::default());

    assert_eq!(
        bridge.extract().await,
        Err(ExtractionError::Probe(
            "Cannot read properties of undefined".to_string()
        ))
    );
}

#[tokio::test(start_paused = true)]
async fn exhausted_probe_rejects_when_caller_outlasts_it() {
    let editor = SlowEditor::stalled();
    let config = BridgeConfig {
        caller_timeout: Duration::from_secs(1),
        probe: ProbeConfig {
            retries: 2,
            delay: Duration::from_millis(10),
        },
    };
    let bridge = bridge_for(editor.clone(), config);

    assert_eq!(
        bridge.extract().await,
        Err(ExtractionError::Probe(EDITOR_UNAVAILABLE.to_string()))
    );
    assert_eq!(editor.reads(), 3);
}

// ===========================================================================
// Timeout
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn stalled_probe_rejects_at_caller_timeout() {
    let bridge = bridge_for(SlowEditor::stalled(), BridgeConfig::default());

    let start = Instant::now();
    let result = bridge.extract().await;
    let elapsed = start.elapsed();

    assert_eq!(result, Err(ExtractionError::Timeout { timeout_ms: 200 }));
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_millis(210));
}

#[tokio::test(start_paused = true)]
async fn default_timeout_cuts_off_a_slow_loading_editor() {
    // Loads on the 3rd read, i.e. 400ms in, after the 200ms caller deadline.
    let editor = SlowEditor::ready_on(3);
    let bridge = bridge_for(editor, BridgeConfig::default());

    assert!(matches!(
        bridge.extract().await,
        Err(ExtractionError::Timeout { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn covering_window_waits_for_a_slow_loading_editor() {
    let editor = SlowEditor::ready_on(3);
    let bridge = bridge_for(editor, BridgeConfig::default().covering_probe_window());

    assert_eq!(bridge.extract().await.unwrap(), "class Solution: pass");
}

// ===========================================================================
// Cleanup
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn listener_is_released_on_every_path() {
    let ok = bridge_for(SlowEditor::ready_on(1), BridgeConfig::default());
    let _ = ok.extract().await;
    assert_eq!(ok.window().listener_count(), 0);

    let timed_out = bridge_for(SlowEditor::stalled(), BridgeConfig::default());
    let _ = timed_out.extract().await;
    assert_eq!(timed_out.window().listener_count(), 0);

    let exhausted = bridge_for(
        SlowEditor::stalled(),
        BridgeConfig {
            caller_timeout: Duration::from_secs(1),
            probe: ProbeConfig {
                retries: 1,
                delay: Duration::from_millis(5),
            },
        },
    );
    let _ = exhausted.extract().await;
    assert_eq!(exhausted.window().listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn probe_stops_polling_after_timeout() {
    let editor = SlowEditor::stalled();
    let bridge = bridge_for(editor.clone(), BridgeConfig::default());

    let _ = bridge.extract().await;
    let reads_at_timeout = editor.reads();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(editor.reads(), reads_at_timeout);
}

#[tokio::test(start_paused = true)]
async fn repeated_extractions_are_independent() {
    let window = PageWindow::new();
    let page = InProcessPage::new(window, Arc::new(StaticEditorRuntime::new("v1")));
    let bridge = ExtractionBridge::for_page(page, BridgeConfig::default());

    assert_eq!(bridge.extract().await.unwrap(), "v1");
    assert_eq!(bridge.extract().await.unwrap(), "v1");
    assert_eq!(bridge.window().listener_count(), 0);
}
