// transcoder-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests only.
#![cfg(test)]

use super::ffmpeg::TranscodeCommand;
use super::ffmpeg_executor::{TranscodeProcess, TranscodeSpawner, for_each_diagnostic_line};
use super::ffprobe_executor::MediaProber;
use crate::error::{CoreError, CoreResult};
use crate::media::SourceMedia;

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// What happened to a [`MockProcess`] after it was handed out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockProcessState {
    pub killed: bool,
    pub waited: bool,
}

/// Mock implementation of TranscodeProcess replaying scripted stderr bytes.
#[derive(Clone)]
pub struct MockProcess {
    chunks: Vec<Vec<u8>>,
    exit_code: Option<i32>,
    creates_output: bool,
    state: Rc<RefCell<MockProcessState>>,
}

impl MockProcess {
    /// A process that writes `chunks` to stderr and exits with status 0.
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks,
            exit_code: Some(0),
            creates_output: false,
            state: Rc::default(),
        }
    }

    /// Convenience constructor from text lines; each gets a `\n`.
    pub fn from_lines(lines: &[&str]) -> Self {
        Self::new(lines.iter().map(|l| format!("{l}\n").into_bytes()).collect())
    }

    #[must_use]
    pub fn with_exit_code(mut self, exit_code: Option<i32>) -> Self {
        self.exit_code = exit_code;
        self
    }

    /// Makes the spawner create an empty output file when spawning this process.
    #[must_use]
    pub fn creating_output(mut self) -> Self {
        self.creates_output = true;
        self
    }

    /// Shared handle on the kill/wait bookkeeping.
    pub fn state(&self) -> Rc<RefCell<MockProcessState>> {
        Rc::clone(&self.state)
    }
}

impl TranscodeProcess for MockProcess {
    fn handle_lines<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(&[u8]) -> CoreResult<()>,
    {
        for_each_diagnostic_line(Cursor::new(self.chunks.concat()), handler)
    }

    fn wait(&mut self) -> CoreResult<Option<i32>> {
        self.state.borrow_mut().waited = true;
        Ok(self.exit_code)
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.state.borrow_mut().killed = true;
        Ok(())
    }
}

/// Mock implementation of TranscodeSpawner handing out queued processes.
#[derive(Clone)]
pub struct MockSpawner {
    program: PathBuf,
    processes: Rc<RefCell<VecDeque<MockProcess>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl Default for MockSpawner {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            processes: Rc::default(),
            received_calls: Rc::default(),
        }
    }
}

impl MockSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the process returned by the next spawn.
    pub fn push(&self, process: MockProcess) {
        self.processes.borrow_mut().push_back(process);
    }

    /// Argument vectors of every spawn so far.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }
}

impl TranscodeSpawner for MockSpawner {
    type Process = MockProcess;

    fn program(&self) -> &Path {
        &self.program
    }

    fn spawn(&self, cmd: &TranscodeCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args);

        let process = self.processes.borrow_mut().pop_front().ok_or_else(|| {
            CoreError::OperationFailed(format!("MockSpawner: no process queued for: {cmd}"))
        })?;

        if process.creates_output {
            if let Some(parent) = cmd.output().parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(cmd.output())?;
            log::debug!("MockSpawner created output file: {}", cmd.output().display());
        }
        Ok(process)
    }
}

/// Mock implementation of MediaProber with canned results per path.
#[derive(Clone, Default)]
pub struct MockProber {
    results: Rc<RefCell<HashMap<PathBuf, SourceMedia>>>,
    calls: Rc<Cell<usize>>,
}

impl MockProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers probes of `media.path` with `media`.
    pub fn expect(&self, media: SourceMedia) {
        self.results.borrow_mut().insert(media.path.clone(), media);
    }

    /// Number of probes so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl MediaProber for MockProber {
    fn probe(&self, path: &Path) -> CoreResult<SourceMedia> {
        self.calls.set(self.calls.get() + 1);
        self.results
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| CoreError::Probe(format!("MockProber: no result for {}", path.display())))
    }
}
