// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The config processor: the single task that owns the dispatcher

use crate::dispatcher::{Dispatcher, Trigger};
use crate::processor::mgmt_client::{
    ConfigChannelRequest, ConfigClient, ConfigRequest, ConfigResponse,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};
use workload::Workload;

/// Number of requests that may be queued to the processor
const REQUEST_QUEUE_LEN: usize = 32;

/// Receives requests from [`ConfigClient`]s and periodic ticks, turns them into
/// triggers and dispatches them one at a time.
pub struct ConfigProcessor<W: Workload> {
    dispatcher: Dispatcher<W>,
    rx: mpsc::Receiver<ConfigChannelRequest>,
    status_interval: Duration,
}

impl<W: Workload> ConfigProcessor<W> {
    /// Create a processor and the client to talk to it
    #[must_use]
    pub fn new(dispatcher: Dispatcher<W>, status_interval: Duration) -> (Self, ConfigClient) {
        let (tx, rx) = mpsc::channel(REQUEST_QUEUE_LEN);
        let processor = Self {
            dispatcher,
            rx,
            status_interval,
        };
        (processor, ConfigClient::new(tx))
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher<W> {
        &self.dispatcher
    }

    /// Dispatch a trigger nobody waits for
    fn dispatch_logged(&mut self, trigger: Trigger) {
        if let Err(e) = self.dispatcher.dispatch(trigger) {
            error!("Reconciliation failed: {e}");
        }
    }

    fn handle_request(&mut self, req: ConfigChannelRequest) {
        let response = match req.request {
            ConfigRequest::LearnRelation(relation) => {
                let trigger = self.dispatcher.learn_relation(*relation);
                ConfigResponse::LearnRelation(self.dispatcher.dispatch(trigger))
            }
            ConfigRequest::ForgetRelation { name, id } => {
                let trigger = self.dispatcher.forget_relation(&name, id);
                ConfigResponse::ForgetRelation(self.dispatcher.dispatch(trigger))
            }
            ConfigRequest::GetGeneration => {
                ConfigResponse::GetGeneration(self.dispatcher.controller().applied_generation())
            }
            ConfigRequest::GetStatus => {
                ConfigResponse::GetStatus(self.dispatcher.controller().status().clone())
            }
        };
        if req.reply_tx.send(response).is_err() {
            warn!("Requester went away before getting a response");
        }
    }

    /// Run the processor until all clients are dropped.
    pub async fn run(mut self) {
        info!("Starting config processor...");
        self.dispatch_logged(Trigger::ConfigChanged);

        let mut ticker = interval(self.status_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                req = self.rx.recv() => {
                    let Some(req) = req else {
                        info!("All config clients are gone: stopping config processor");
                        break;
                    };
                    self.handle_request(req);
                }
                _ = ticker.tick() => {
                    debug!("Status: {}", self.dispatcher.controller().status());
                    self.dispatch_logged(Trigger::UpdateStatus);
                }
            }
        }
    }
}
