//! Scripted [`CommandRunner`] for tests
//!
//! Responses are registered against a command-line prefix such as
//! `"az account show"`. The first matching rule answers; a rule holding
//! several canned outputs hands them out in order and then keeps repeating
//! the last one. Commands with no matching rule fail to spawn, which is how a
//! missing program looks to callers.

use crate::process::{CommandOutput, CommandRunner};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

type Handler = Box<dyn Fn(&[&str]) -> CommandOutput + Send + Sync>;

enum Response {
    Canned(VecDeque<CommandOutput>),
    Handler(Handler),
}

struct Rule {
    prefix: String,
    response: Response,
}

#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` with `output`
    ///
    /// Calling this again with the same prefix queues another output.
    pub fn on(self, prefix: &str, output: CommandOutput) -> Self {
        {
            let mut rules = self.rules.lock().unwrap();
            let existing = rules.iter_mut().find(|rule| rule.prefix == prefix);
            match existing {
                Some(Rule {
                    response: Response::Canned(queue),
                    ..
                }) => queue.push_back(output),
                _ => rules.push(Rule {
                    prefix: prefix.to_string(),
                    response: Response::Canned(VecDeque::from([output])),
                }),
            }
        }
        self
    }

    /// Answer commands starting with `prefix` by calling `handler` with the
    /// arguments, without the program name
    pub fn on_call<F>(self, prefix: &str, handler: F) -> Self
    where
        F: Fn(&[&str]) -> CommandOutput + Send + Sync + 'static,
    {
        self.rules.lock().unwrap().push(Rule {
            prefix: prefix.to_string(),
            response: Response::Handler(Box::new(handler)),
        });
        self
    }

    /// Every command line run so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether any command line run so far starts with `prefix`
    pub fn was_called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|call| call.starts_with(prefix))
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push(line.clone());

        let mut rules = self.rules.lock().unwrap();
        let Some(rule) = rules.iter_mut().find(|rule| line.starts_with(&rule.prefix)) else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no scripted response for `{}`", line),
            ));
        };

        match &mut rule.response {
            Response::Canned(queue) => {
                let output = if queue.len() > 1 {
                    queue.pop_front().unwrap_or_default()
                } else {
                    queue.front().cloned().unwrap_or_default()
                };
                Ok(output)
            }
            Response::Handler(handler) => Ok(handler(args)),
        }
    }
}
