// recast-core/tests/common/mod.rs
//
// Test doubles for the three external steps of a transaction. Each double is
// cheap to clone and shares its call log, so a test can keep a handle after
// moving the double into the transaction.

#![allow(dead_code)]

use recast_core::config::EncodingProfile;
use recast_core::error::{CoreError, CoreResult};
use recast_core::events::{Event, EventDispatcher, EventHandler};
use recast_core::external::{StreamProber, Transcoder};
use recast_core::tagging::{TagSet, Tagger};
use recast_core::transaction::TransactionPaths;

use std::cell::{Cell, RefCell};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

pub const ORIGINAL_BYTES: &[u8] = b"original camera footage";
pub const ENCODED_BYTES: &[u8] = b"re-encoded hevc stream";
pub const TAG_MARKER: &[u8] = b"+tags";

pub const COMPLIANT_PROBE: &str = "codec_name=hevc\n\
                                   pix_fmt=yuv422p10le\n\
                                   color_space=bt709\n\
                                   color_transfer=bt709\n\
                                   color_primaries=bt709\n";

type SideEffect = Rc<dyn Fn()>;

/// Writes the original under `dir` and returns the default path layout.
pub fn seeded_paths(dir: &Path) -> TransactionPaths {
    let paths = TransactionPaths::for_original(dir.join("DJI_20250206165918_0257_D.MP4"));
    fs::write(&paths.original, ORIGINAL_BYTES).unwrap();
    paths
}

/// Puts a non-empty directory at `path`, which makes any rename onto it fail.
pub fn block_path(path: &Path) {
    if path.is_file() {
        fs::remove_file(path).unwrap();
    }
    fs::create_dir_all(path).unwrap();
    fs::write(path.join("occupant"), b"x").unwrap();
}

#[derive(Clone, Default)]
pub struct FakeTranscoder {
    output: Option<Vec<u8>>,
    fails: bool,
    side_effect: Option<SideEffect>,
    /// Input path and the bytes found there, per call.
    pub calls: Rc<RefCell<Vec<(PathBuf, Vec<u8>)>>>,
}

impl FakeTranscoder {
    pub fn producing(bytes: &[u8]) -> Self {
        Self {
            output: Some(bytes.to_vec()),
            ..Default::default()
        }
    }

    /// Fails with a non-zero exit, optionally leaving partial output behind.
    pub fn failing(partial_output: Option<&[u8]>) -> Self {
        Self {
            output: partial_output.map(<[u8]>::to_vec),
            fails: true,
            ..Default::default()
        }
    }

    pub fn with_side_effect(mut self, f: impl Fn() + 'static) -> Self {
        self.side_effect = Some(Rc::new(f));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transcoder for FakeTranscoder {
    fn transcode(&self, input: &Path, output: &Path, _profile: &EncodingProfile) -> CoreResult<()> {
        let seen = fs::read(input).unwrap_or_default();
        self.calls.borrow_mut().push((input.to_path_buf(), seen));

        if let Some(bytes) = &self.output {
            fs::write(output, bytes)?;
        }
        if let Some(effect) = &self.side_effect {
            effect();
        }
        if self.fails {
            return Err(CoreError::Transcode {
                status: ExitStatus::default(),
                diagnostics: "Error while decoding stream #0:0".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct CannedProber {
    output: String,
    pub calls: Rc<Cell<usize>>,
}

impl CannedProber {
    pub fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn compliant() -> Self {
        Self::new(COMPLIANT_PROBE)
    }
}

impl StreamProber for CannedProber {
    fn probe_video_stream(&self, path: &Path, _entries: &[&str]) -> CoreResult<String> {
        self.calls.set(self.calls.get() + 1);
        assert!(path.exists(), "probed a file that does not exist: {}", path.display());
        Ok(self.output.clone())
    }
}

/// Appends [`TAG_MARKER`] to the file it tags, or fails.
#[derive(Clone, Default)]
pub struct FakeTagger {
    fails: bool,
    side_effect: Option<SideEffect>,
    pub calls: Rc<RefCell<Vec<(PathBuf, usize)>>>,
}

impl FakeTagger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fails: true,
            ..Default::default()
        }
    }

    pub fn with_side_effect(mut self, f: impl Fn() + 'static) -> Self {
        self.side_effect = Some(Rc::new(f));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Tagger for FakeTagger {
    fn tag(&self, path: &Path, tags: &TagSet) -> CoreResult<()> {
        self.calls.borrow_mut().push((path.to_path_buf(), tags.len()));

        if let Some(effect) = &self.side_effect {
            effect();
        }
        if self.fails {
            return Err(CoreError::Tag {
                path: path.to_path_buf(),
                reason: "moov atom not found".to_string(),
            });
        }
        let mut file = OpenOptions::new().append(true).open(path)?;
        file.write_all(TAG_MARKER)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<Event>>,
}

impl RecordingHandler {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl EventHandler for RecordingHandler {
    fn handle(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn recording_dispatcher() -> (EventDispatcher, Arc<RecordingHandler>) {
    let handler = Arc::new(RecordingHandler::default());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.add_handler(handler.clone());
    (dispatcher, handler)
}

/// Tagged output a successful fake run leaves at the original path.
pub fn committed_bytes() -> Vec<u8> {
    [ENCODED_BYTES, TAG_MARKER].concat()
}
