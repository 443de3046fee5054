use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use unitypipe::command::CommandSpec;
use unitypipe::exec::{ProcessExecutor, ProcessExit};
use unitypipe::types::Stage;

/// A fake executor that:
/// - records every command it was asked to run
/// - answers with a scripted exit per stage (default: exit code 0).
#[derive(Clone, Default)]
pub struct FakeExecutor {
    executed: Arc<Mutex<Vec<CommandSpec>>>,
    scripted: Arc<Mutex<HashMap<Stage, VecDeque<ProcessExit>>>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an exit code for the next run of `stage`.
    pub fn exit_with(self, stage: Stage, code: i32) -> Self {
        self.push(stage, ProcessExit::exited(code));
        self
    }

    /// Make the next run of `stage` time out.
    pub fn time_out(self, stage: Stage) -> Self {
        self.push(stage, ProcessExit::timed_out());
        self
    }

    fn push(&self, stage: Stage, exit: ProcessExit) {
        self.scripted
            .lock()
            .unwrap()
            .entry(stage)
            .or_default()
            .push_back(exit);
    }

    /// Commands run so far, in order.
    pub fn executed(&self) -> Vec<CommandSpec> {
        self.executed.lock().unwrap().clone()
    }

    pub fn executed_stages(&self) -> Vec<Stage> {
        self.executed().iter().map(|c| c.stage).collect()
    }
}

impl ProcessExecutor for FakeExecutor {
    fn run<'a>(
        &'a mut self,
        command: &'a CommandSpec,
    ) -> Pin<Box<dyn Future<Output = ProcessExit> + Send + 'a>> {
        let executed = Arc::clone(&self.executed);
        let scripted = Arc::clone(&self.scripted);

        Box::pin(async move {
            executed.lock().unwrap().push(command.clone());
            scripted
                .lock()
                .unwrap()
                .get_mut(&command.stage)
                .and_then(VecDeque::pop_front)
                .unwrap_or(ProcessExit::exited(0))
        })
    }
}
