// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::sync::mpsc::Sender;
use std::thread;
use tracing::debug;
use warrantrack_api::Client;
use warrantrack_app::{ApiCall, ApiCompletion, ApiOutcome, ApiRequest};
use warrantrack_tui::InternalEvent;

pub struct ApiRuntime {
    client: Client,
}

impl ApiRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn run_call(client: &Client, call: &ApiCall) -> Result<ApiOutcome> {
    let outcome = match call {
        ApiCall::Create(payload) => {
            client.create(payload)?;
            ApiOutcome::Created
        }
        ApiCall::Get(id) => ApiOutcome::Fetched(client.get(id)?),
        ApiCall::ListAll => ApiOutcome::Listed(client.list()?),
        ApiCall::Update(id, payload) => {
            client.update(*id, payload)?;
            ApiOutcome::Updated
        }
        ApiCall::Delete(id) => {
            client.delete(*id)?;
            ApiOutcome::Deleted
        }
    };
    Ok(outcome)
}

impl warrantrack_tui::AppRuntime for ApiRuntime {
    fn execute(&mut self, call: &ApiCall) -> Result<ApiOutcome> {
        run_call(&self.client, call)
    }

    fn spawn_request(&mut self, request: ApiRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        let name = format!("api-{}", request.call.kind().as_str());
        thread::Builder::new()
            .name(name)
            .spawn(move || {
                let outcome = match run_call(&client, &request.call) {
                    Ok(outcome) => outcome,
                    Err(error) => ApiOutcome::Failed(format!("{error:#}")),
                };
                let completion = ApiCompletion::for_request(&request, outcome);
                if tx.send(InternalEvent::ApiCompleted(completion)).is_err() {
                    debug!(
                        screen = request.screen.label(),
                        token = request.token,
                        "ui gone before api call finished"
                    );
                }
            })
            .context("spawn api worker")?;
        Ok(())
    }
}
