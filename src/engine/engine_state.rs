/// Lifecycle of an engine.
///
/// `Uninitialized -> Ready` on init, `Ready -> Populated` once nodes are loaded,
/// `Populated <-> Running` on start/stop. Loading new data while running keeps
/// the engine running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Uninitialized,
    Ready,
    Populated,
    Running,
}

impl EngineState {
    pub fn name(&self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Ready => "ready",
            EngineState::Populated => "populated",
            EngineState::Running => "running",
        }
    }
}
