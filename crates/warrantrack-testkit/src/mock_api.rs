// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use serde_json::{Value, json};
use std::collections::{BTreeMap, VecDeque};
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Method, Request, Response, Server};
use warrantrack_app::{WarrantyId, WarrantyPayload, WarrantyRecord};

use crate::record_from_payload;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct MockState {
    records: BTreeMap<i64, WarrantyRecord>,
    next_id: i64,
    requests: Vec<RecordedRequest>,
    injected_failures: VecDeque<u16>,
}

impl MockState {
    fn insert(&mut self, payload: WarrantyPayload) -> WarrantyRecord {
        self.next_id += 1;
        let record = record_from_payload(WarrantyId::new(self.next_id), payload);
        self.records.insert(self.next_id, record.clone());
        record
    }
}

pub struct MockWarrantyApi {
    api_root: String,
    state: Arc<Mutex<MockState>>,
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
}

impl MockWarrantyApi {
    pub fn start() -> Result<Self> {
        let server = Server::http("127.0.0.1:0")
            .map_err(|error| anyhow!("start mock warranty api: {error}"))?;
        let api_root = format!("http://{}", server.server_addr());
        let server = Arc::new(server);
        let state = Arc::new(Mutex::new(MockState::default()));

        let handle = {
            let server = Arc::clone(&server);
            let state = Arc::clone(&state);
            thread::spawn(move || {
                while let Ok(request) = server.recv() {
                    serve(&state, request);
                }
            })
        };

        Ok(Self {
            api_root,
            state,
            server,
            handle: Some(handle),
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn seed(&self, payload: WarrantyPayload) -> WarrantyRecord {
        lock(&self.state).insert(payload)
    }

    pub fn records(&self) -> Vec<WarrantyRecord> {
        lock(&self.state).records.values().cloned().collect()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    pub fn fail_next(&self, status: u16) {
        lock(&self.state).injected_failures.push_back(status);
    }
}

impl Drop for MockWarrantyApi {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn serve(state: &Mutex<MockState>, mut request: Request) {
    let mut raw = String::new();
    let body = match request.as_reader().read_to_string(&mut raw) {
        Ok(_) if !raw.trim().is_empty() => serde_json::from_str::<Value>(&raw).ok(),
        _ => None,
    };
    let method = request.method().clone();
    let path = request.url().to_owned();

    let (status, reply) = {
        let mut state = lock(state);
        state.requests.push(RecordedRequest {
            method: method.as_str().to_owned(),
            path: path.clone(),
            body: body.clone(),
        });
        match state.injected_failures.pop_front() {
            Some(status) => (status, json!({ "message": "injected failure" })),
            None => route(&mut state, &method, &path, body),
        }
    };

    let _ = request.respond(json_response(status, &reply));
}

fn route(state: &mut MockState, method: &Method, path: &str, body: Option<Value>) -> (u16, Value) {
    let Some(rest) = path.strip_prefix("/warrantyapi/") else {
        return not_found("no such endpoint");
    };
    let segments: Vec<&str> = rest.split('/').collect();

    match (method, segments.as_slice()) {
        (Method::Post, ["add"]) => match parse_payload(body) {
            Some(payload) => (200, to_value(&state.insert(payload))),
            None => bad_request(),
        },
        (Method::Get, ["all"]) => {
            let records: Vec<&WarrantyRecord> = state.records.values().collect();
            (200, to_value(&records))
        }
        (Method::Get, ["get", id]) => match lookup(state, id) {
            Some(record) => (200, to_value(record)),
            None => not_found("Warranty not found"),
        },
        (Method::Put, ["update", id]) => {
            let Some(payload) = parse_payload(body) else {
                return bad_request();
            };
            let Some(existing) = lookup(state, id) else {
                return not_found("Warranty not found");
            };
            let updated = record_from_payload(existing.id, payload);
            state.records.insert(updated.id.get(), updated.clone());
            (200, to_value(&updated))
        }
        (Method::Delete, ["delete", id]) => {
            match id.parse::<i64>().ok().and_then(|id| state.records.remove(&id)) {
                Some(_) => (200, json!({ "message": "Warranty deleted" })),
                None => not_found("Warranty not found"),
            }
        }
        _ => not_found("no such endpoint"),
    }
}

fn lookup<'a>(state: &'a MockState, id: &str) -> Option<&'a WarrantyRecord> {
    id.parse::<i64>()
        .ok()
        .and_then(|id| state.records.get(&id))
}

fn parse_payload(body: Option<Value>) -> Option<WarrantyPayload> {
    body.and_then(|body| serde_json::from_value(body).ok())
}

fn to_value<T: serde::Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn not_found(message: &str) -> (u16, Value) {
    (404, json!({ "message": message }))
}

fn bad_request() -> (u16, Value) {
    (400, json!({ "message": "invalid warranty body" }))
}

fn json_response(status: u16, body: &Value) -> Response<Cursor<Vec<u8>>> {
    let response = Response::from_string(body.to_string()).with_status_code(status);
    match Header::from_bytes("Content-Type", "application/json") {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
