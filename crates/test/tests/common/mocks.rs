use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use faultline_scenario::{OperatorSignal, SignalError};

type Action = Box<dyn FnOnce() + Send>;

/// Operator that performs one scripted action per confirmation, in order, and then
/// proceeds.
#[derive(Default)]
pub(crate) struct ScriptedOperator {
    actions: Mutex<VecDeque<Action>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOperator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn then(self, action: impl FnOnce() + Send + 'static) -> Self {
        self.actions.lock().unwrap().push_back(Box::new(action));
        self
    }

    pub(crate) fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl OperatorSignal for ScriptedOperator {
    async fn await_proceed(&self, prompt: &str) -> Result<(), SignalError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let action = self.actions.lock().unwrap().pop_front();
        if let Some(action) = action {
            action();
        }
        Ok(())
    }
}

/// Operator that never confirms.
pub(crate) struct AbsentOperator;

#[async_trait]
impl OperatorSignal for AbsentOperator {
    async fn await_proceed(&self, _prompt: &str) -> Result<(), SignalError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}
