use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::utils::process::{CommandOutput, CommandRunner};

type SideEffect = Box<dyn Fn(&[&str], Option<&Path>)>;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Program and arguments joined by spaces.
    pub line: String,
    pub cwd: Option<PathBuf>,
}

/// Scripted [`CommandRunner`]. Commands succeed with empty output unless a
/// response was registered for a prefix of their command line.
#[derive(Default)]
pub struct FakeRunner {
    calls: RefCell<Vec<RecordedCall>>,
    responses: Vec<(String, CommandOutput)>,
    effects: Vec<(String, SideEffect)>,
}

impl FakeRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to commands starting with `prefix` (first registration wins).
    #[must_use]
    pub fn respond(mut self, prefix: &str, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        self.responses.push((
            prefix.to_string(),
            CommandOutput {
                exit_code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        ));
        self
    }

    /// Run `effect` with the arguments of every command starting with `prefix`.
    #[must_use]
    pub fn on(mut self, prefix: &str, effect: impl Fn(&[&str], Option<&Path>) + 'static) -> Self {
        self.effects.push((prefix.to_string(), Box::new(effect)));
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|call| call.line.clone()).collect()
    }

    #[must_use]
    pub fn ran(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|call| call.line.starts_with(prefix))
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.borrow_mut().push(RecordedCall {
            line: line.clone(),
            cwd: cwd.map(Path::to_path_buf),
        });

        for (prefix, effect) in &self.effects {
            if line.starts_with(prefix.as_str()) {
                effect(args, cwd);
            }
        }

        Ok(self
            .responses
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default())
    }
}
