// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Interface to the config processor

use crate::controller::{ReconcileError, Reconciled};
use crate::processor::configdb::GenId;
use crate::status::UnitStatus;
use interfaces::RelationId;
use interfaces::utils::RelationFile;
use thiserror::Error;
use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot;
use tokio::sync::oneshot::Receiver;

/// A request type to the `ConfigProcessor`
#[derive(Debug)]
pub enum ConfigRequest {
    LearnRelation(Box<RelationFile>),
    ForgetRelation { name: String, id: RelationId },
    GetGeneration,
    GetStatus,
}

/// A response from the `ConfigProcessor`
#[derive(Debug)]
pub enum ConfigResponse {
    LearnRelation(Result<Option<Reconciled>, ReconcileError>),
    ForgetRelation(Result<Option<Reconciled>, ReconcileError>),
    GetGeneration(Option<GenId>),
    GetStatus(UnitStatus),
}
type ConfigResponseChannel = oneshot::Sender<ConfigResponse>;

/// A request to the `ConfigProcessor` and the channel to send the response back
pub struct ConfigChannelRequest {
    pub(crate) request: ConfigRequest,
    pub(crate) reply_tx: ConfigResponseChannel,
}
impl ConfigChannelRequest {
    #[must_use]
    pub fn new(request: ConfigRequest) -> (Self, Receiver<ConfigResponse>) {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = Self { request, reply_tx };
        (request, reply_rx)
    }
}

/// The type of errors that can happen when issuing requests to a `ConfigProcessor`
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigProcessorError {
    #[error("Failure sending request to config processor: {0}")]
    SendRequestError(#[from] tokio::sync::mpsc::error::SendError<ConfigChannelRequest>),
    #[error("Failure receiving response from config processor: {0}")]
    RecvResponseError(#[from] tokio::sync::oneshot::error::RecvError),
    #[error("Failure reconciling: {0}")]
    ReconcileError(#[from] ReconcileError),
    #[error("Unexpected response from config processor")]
    UnexpectedResponse,
    #[error("No configuration is applied")]
    NoConfigApplied,
}

/// A cloneable object that allows sending requests to a `ConfigProcessor`.
#[derive(Clone)]
pub struct ConfigClient {
    tx: Sender<ConfigChannelRequest>,
}

impl ConfigClient {
    #[must_use]
    pub fn new(channel_tx: Sender<ConfigChannelRequest>) -> Self {
        Self { tx: channel_tx }
    }

    async fn request(&self, request: ConfigRequest) -> Result<ConfigResponse, ConfigProcessorError> {
        let (req, rx) = ConfigChannelRequest::new(request);
        self.tx.send(req).await?;
        Ok(rx.await?)
    }

    /// Hand a relation read from a file to the processor and wait for the outcome of the
    /// reconciliation it triggered.
    pub async fn learn_relation(
        &self,
        relation: RelationFile,
    ) -> Result<Option<Reconciled>, ConfigProcessorError> {
        match self
            .request(ConfigRequest::LearnRelation(Box::new(relation)))
            .await?
        {
            ConfigResponse::LearnRelation(result) => Ok(result?),
            _ => Err(ConfigProcessorError::UnexpectedResponse),
        }
    }

    /// Tell the processor that relation `id` of endpoint `name` is gone and wait for the
    /// outcome of the reconciliation it triggered.
    pub async fn forget_relation(
        &self,
        name: &str,
        id: RelationId,
    ) -> Result<Option<Reconciled>, ConfigProcessorError> {
        let request = ConfigRequest::ForgetRelation {
            name: name.to_string(),
            id,
        };
        match self.request(request).await? {
            ConfigResponse::ForgetRelation(result) => Ok(result?),
            _ => Err(ConfigProcessorError::UnexpectedResponse),
        }
    }

    /// Get the generation of the configuration currently applied.
    pub async fn get_generation(&self) -> Result<GenId, ConfigProcessorError> {
        match self.request(ConfigRequest::GetGeneration).await? {
            ConfigResponse::GetGeneration(genid) => {
                genid.ok_or(ConfigProcessorError::NoConfigApplied)
            }
            _ => Err(ConfigProcessorError::UnexpectedResponse),
        }
    }

    /// Retrieve the current status of the unit.
    pub async fn get_status(&self) -> Result<UnitStatus, ConfigProcessorError> {
        match self.request(ConfigRequest::GetStatus).await? {
            ConfigResponse::GetStatus(status) => Ok(status),
            _ => Err(ConfigProcessorError::UnexpectedResponse),
        }
    }
}
