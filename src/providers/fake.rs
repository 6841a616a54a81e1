//! An in-process gateway for exercising code that drives completions

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::chat::Turn;
use crate::persona::SystemInstruction;
use crate::providers::{CompletionGateway, Error, ErrorKind, ModelConfig};

pub(crate) struct Call {
    pub history: Vec<Turn>,
    pub system: SystemInstruction,
    pub config: ModelConfig,
}

/// Replays scripted outcomes and records every call it receives
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    script: Mutex<VecDeque<Result<String, ErrorKind>>>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedGateway {
    pub(crate) fn new(script: Vec<Result<&str, ErrorKind>>) -> ScriptedGateway {
        ScriptedGateway {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|r| r.map(|s| s.to_string()))
                    .collect(),
            ),
            ..ScriptedGateway::default()
        }
    }

    pub(crate) fn calls(&self) -> MutexGuard<'_, Vec<Call>> {
        self.calls.lock().unwrap()
    }

    /// The most calls that were ever outstanding at once
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(
        &self,
        history: &[Turn],
        system: &SystemInstruction,
        config: &ModelConfig,
    ) -> Result<Turn, Error> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.calls.lock().unwrap().push(Call {
            history: history.to_vec(),
            system: *system,
            config: config.clone(),
        });

        tokio::task::yield_now().await;

        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("gateway called more often than scripted");

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        outcome
            .map(|text| Turn::assistant(text))
            .map_err(Error::from_kind)
    }
}
