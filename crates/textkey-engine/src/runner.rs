use log::info;
use textkey_core::models::Script;
use textkey_core::Result;

/// Seam for executing scripts looked up through the engine.
///
/// Actual OS-level execution is host territory; front-ends plug in their
/// own runner, tests plug in a recording one.
pub trait ScriptRunner {
    fn run(&mut self, script: &Script, args: &[String]) -> Result<()>;
}

/// Runner that only records the request in the log.
#[derive(Debug, Default)]
pub struct LogRunner;

impl ScriptRunner for LogRunner {
    fn run(&mut self, script: &Script, args: &[String]) -> Result<()> {
        info!(
            "running script '{}' with {} argument(s)",
            script.description,
            args.len()
        );
        Ok(())
    }
}
