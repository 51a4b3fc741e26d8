//! Recording process runner for tests.
//!
//! Records every command line it is asked to run and answers with scripted
//! exit codes, so orchestration can be checked without ssh or rsync.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::ports::{BackgroundProcess, ProcessRunner};
use crate::domain::value_objects::Communication;

type Handler = dyn Fn(&[String]) -> i32 + Send + Sync;

/// One interaction with the runner, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Run(Vec<String>),
    Spawn(Vec<String>),
    Terminate(Vec<String>),
}

impl RecordedCall {
    pub fn args(&self) -> &[String] {
        match self {
            RecordedCall::Run(args) | RecordedCall::Spawn(args) | RecordedCall::Terminate(args) => {
                args
            }
        }
    }
}

/// Test double for [`ProcessRunner`].
///
/// `run` answers from the scripted exit codes first, then from the handler
/// (which defaults to 0). Spawned processes report themselves as running
/// unless [`RecordingRunner::with_exited_background`] was used.
#[derive(Clone)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    exit_codes: Arc<Mutex<VecDeque<i32>>>,
    handler: Arc<Handler>,
    background_exit: Option<i32>,
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            exit_codes: Arc::new(Mutex::new(VecDeque::new())),
            handler: Arc::new(|_| 0),
            background_exit: None,
        }
    }

    /// Answer successive `run` calls with these codes
    pub fn with_exit_codes(codes: Vec<i32>) -> Self {
        let runner = Self::new();
        runner.lock_codes().extend(codes);
        runner
    }

    /// Decide each exit code from the command line
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&[String]) -> i32 + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            ..Self::new()
        }
    }

    /// Spawned processes report that they already exited with `code`
    pub fn with_exited_background(mut self, code: i32) -> Self {
        self.background_exit = Some(code);
        self
    }

    /// Every recorded interaction
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock_calls().clone()
    }

    /// Command lines passed to `run` or `spawn`, in order
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.lock_calls()
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Run(args) | RecordedCall::Spawn(args) => Some(args.clone()),
                RecordedCall::Terminate(_) => None,
            })
            .collect()
    }

    /// Program names of `run` and `spawn` calls, in order
    pub fn programs(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|args| args.into_iter().next())
            .collect()
    }

    fn record(&self, call: RecordedCall) {
        self.lock_calls().push(call);
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_codes(&self) -> std::sync::MutexGuard<'_, VecDeque<i32>> {
        self.exit_codes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, args: &[String], _communication: &Communication) -> io::Result<i32> {
        self.record(RecordedCall::Run(args.to_vec()));
        let scripted = self.lock_codes().pop_front();
        Ok(scripted.unwrap_or_else(|| (self.handler)(args)))
    }

    fn spawn(
        &self,
        args: &[String],
        _communication: &Communication,
    ) -> io::Result<Box<dyn BackgroundProcess>> {
        self.record(RecordedCall::Spawn(args.to_vec()));
        Ok(Box::new(RecordedProcess {
            args: args.to_vec(),
            exit: self.background_exit,
            runner: self.clone(),
        }))
    }
}

struct RecordedProcess {
    args: Vec<String>,
    exit: Option<i32>,
    runner: RecordingRunner,
}

impl BackgroundProcess for RecordedProcess {
    fn try_wait(&mut self) -> io::Result<Option<i32>> {
        Ok(self.exit)
    }

    fn terminate(&mut self) -> io::Result<()> {
        self.runner
            .record(RecordedCall::Terminate(self.args.clone()));
        Ok(())
    }

    fn wait_timeout(&mut self, _timeout: Duration) -> io::Result<bool> {
        self.exit = self.exit.or(Some(0));
        Ok(true)
    }

    fn kill(&mut self) -> io::Result<()> {
        self.exit = self.exit.or(Some(0));
        Ok(())
    }
}
