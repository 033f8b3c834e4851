use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::sync::Arc;

use eframe::egui;
use ehttp::multipart::MultipartBuilder;
use ehttp::{Request, Response};
use flume::{Receiver, Sender};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{
    CalculateRequest, CalculationResponse, DataResponse, Formula, NewFormula, ReportQuery,
    ReportsResponse, Variable, VariablesResponse, formulas_from_map,
};
use super::upload::{UploadError, UploadFile, validate};
use crate::data::model::Row;

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

pub type FetchCallback = Box<dyn FnOnce(ehttp::Result<Response>) + Send + 'static>;

/// Sends one HTTP request and reports back through `on_done`.
pub trait FetchService: Send + Sync + Debug {
    fn fetch(&self, request: Request, on_done: FetchCallback);
}

#[derive(Debug, Default)]
pub struct EhttpFetcher;

impl FetchService for EhttpFetcher {
    fn fetch(&self, request: Request, on_done: FetchCallback) {
        ehttp::fetch(request, on_done)
    }
}

// ---------------------------------------------------------------------------
// Requests & responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    Formulas,
    CreateFormula,
    Variables,
    Data,
    Upload,
    Calculate,
    Reports,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Formulas | Endpoint::CreateFormula => "/api/formulas",
            Endpoint::Variables => "/api/variables",
            Endpoint::Data => "/api/data",
            Endpoint::Upload => "/api/upload",
            Endpoint::Calculate => "/api/calculate",
            Endpoint::Reports => "/api/reports",
        }
    }

    /// Requests that write the same piece of UI state share a slot, so a
    /// late `GET /api/data` cannot overwrite a newer upload.
    fn slot(self) -> Endpoint {
        match self {
            Endpoint::Upload => Endpoint::Data,
            other => other,
        }
    }
}

/// Identifies one issued request. Only the newest token per slot is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Formulas(Vec<Formula>),
    FormulaCreated(Formula),
    Variables(Vec<Variable>),
    Data(DataResponse),
    Calculated(CalculationResponse),
    Reports(ReportsResponse),
}

/// A finished request, delivered by [`ApiClient::poll`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiEvent {
    pub endpoint: Endpoint,
    pub token: RequestToken,
    pub result: Result<Payload, ApiError>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Issues backend calls and hands their results back on the UI thread.
///
/// Callbacks run on the fetcher's thread and only push into a channel;
/// [`poll`](Self::poll) drains it once per frame.
#[derive(Debug)]
pub struct ApiClient {
    base_url: String,
    fetcher: Arc<dyn FetchService>,
    sender: Sender<ApiEvent>,
    receiver: Receiver<ApiEvent>,
    next_token: u64,
    in_flight: HashMap<Endpoint, RequestToken>,
    repaint: Option<egui::Context>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_fetcher(base_url, Arc::new(EhttpFetcher))
    }

    pub fn with_fetcher(base_url: impl Into<String>, fetcher: Arc<dyn FetchService>) -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            fetcher,
            sender,
            receiver,
            next_token: 0,
            in_flight: HashMap::new(),
            repaint: None,
        }
    }

    /// Wake the UI whenever a response lands.
    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.repaint = Some(ctx);
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the newest request for this endpoint's slot is still out.
    pub fn is_pending(&self, endpoint: Endpoint) -> bool {
        self.in_flight.contains_key(&endpoint.slot())
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    fn issue(&mut self, endpoint: Endpoint) -> RequestToken {
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        self.in_flight.insert(endpoint.slot(), token);
        token
    }

    fn dispatch<T, F>(&mut self, endpoint: Endpoint, request: Request, wrap: F) -> RequestToken
    where
        T: DeserializeOwned,
        F: FnOnce(T) -> Payload + Send + 'static,
    {
        let token = self.issue(endpoint);
        let sender = self.sender.clone();
        let repaint = self.repaint.clone();
        log::debug!("{} {} ({token:?})", request.method, request.url);

        self.fetcher.fetch(
            request,
            Box::new(move |result| {
                let result = decode::<T>(result).map(wrap);
                sender
                    .send(ApiEvent {
                        endpoint,
                        token,
                        result,
                    })
                    .unwrap_or(());
                if let Some(ctx) = repaint {
                    ctx.request_repaint();
                }
            }),
        );
        token
    }

    /// Drain finished requests, dropping any that a newer request for the
    /// same slot has superseded.
    pub fn poll(&mut self) -> Vec<ApiEvent> {
        let mut fresh = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            let slot = event.endpoint.slot();
            if self.in_flight.get(&slot) == Some(&event.token) {
                self.in_flight.remove(&slot);
                fresh.push(event);
            } else {
                log::debug!("dropping stale {:?} response {:?}", event.endpoint, event.token);
            }
        }
        fresh
    }

    pub fn fetch_formulas(&mut self) -> RequestToken {
        let request = Request::get(self.url(Endpoint::Formulas));
        self.dispatch(Endpoint::Formulas, request, |map: BTreeMap<String, Formula>| {
            Payload::Formulas(formulas_from_map(map))
        })
    }

    pub fn create_formula(&mut self, formula: &NewFormula) -> Result<RequestToken, ApiError> {
        let request = Request::json(self.url(Endpoint::CreateFormula), formula)
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Ok(self.dispatch(Endpoint::CreateFormula, request, Payload::FormulaCreated))
    }

    pub fn fetch_variables(&mut self) -> RequestToken {
        let request = Request::get(self.url(Endpoint::Variables));
        self.dispatch(Endpoint::Variables, request, |resp: VariablesResponse| {
            Payload::Variables(resp.variables)
        })
    }

    pub fn fetch_data(&mut self) -> RequestToken {
        let request = Request::get(self.url(Endpoint::Data));
        self.dispatch(Endpoint::Data, request, Payload::Data)
    }

    /// Post `file` as multipart field `file`. Validation runs again here so
    /// nothing oversized or mistyped ever reaches the network.
    pub fn upload(&mut self, file: &UploadFile) -> Result<RequestToken, UploadError> {
        validate(file.name(), file.len() as u64)?;
        let mut reader = file.bytes();
        let form = MultipartBuilder::new().add_stream(&mut reader, "file", Some(file.name()), None)?;
        let request = Request::multipart(self.url(Endpoint::Upload), form);
        Ok(self.dispatch(Endpoint::Upload, request, Payload::Data))
    }

    pub fn calculate(&mut self, formula_id: &str, rows: &[Row]) -> Result<RequestToken, ApiError> {
        let body = CalculateRequest {
            formula_id,
            data: rows,
        };
        let request = Request::json(self.url(Endpoint::Calculate), &body)
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Ok(self.dispatch(Endpoint::Calculate, request, Payload::Calculated))
    }

    pub fn fetch_reports(&mut self, query: &ReportQuery) -> RequestToken {
        let url = format!("{}{}", self.url(Endpoint::Reports), query.query_string());
        self.dispatch(Endpoint::Reports, Request::get(url), Payload::Reports)
    }
}

fn decode<T: DeserializeOwned>(result: ehttp::Result<Response>) -> Result<T, ApiError> {
    let response = result.map_err(ApiError::Transport)?;
    if !response.ok {
        return Err(ApiError::from_status(response.status, &response.bytes));
    }
    serde_json::from_slice(&response.bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Holds requests until the test completes them, in any order.
    #[derive(Default)]
    pub(crate) struct MockFetcher {
        pending: Mutex<Vec<(Request, Option<FetchCallback>)>>,
    }

    impl Debug for MockFetcher {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("MockFetcher")
                .field("requests", &self.len())
                .finish()
        }
    }

    impl FetchService for MockFetcher {
        fn fetch(&self, request: Request, on_done: FetchCallback) {
            self.pending.lock().unwrap().push((request, Some(on_done)));
        }
    }

    impl MockFetcher {
        pub(crate) fn len(&self) -> usize {
            self.pending.lock().unwrap().len()
        }

        pub(crate) fn request(&self, index: usize) -> (String, String, Vec<u8>) {
            let pending = self.pending.lock().unwrap();
            let (req, _) = &pending[index];
            (req.method.clone(), req.url.clone(), req.body.clone())
        }

        pub(crate) fn respond(&self, index: usize, status: u16, body: &str) {
            let callback = self.pending.lock().unwrap()[index].1.take();
            let url = self.request(index).1;
            if let Some(on_done) = callback {
                on_done(Ok(Response {
                    url,
                    ok: (200..300).contains(&status),
                    status,
                    status_text: String::new(),
                    headers: Default::default(),
                    bytes: body.as_bytes().to_vec(),
                }));
            }
        }

        pub(crate) fn fail(&self, index: usize, message: &str) {
            let callback = self.pending.lock().unwrap()[index].1.take();
            if let Some(on_done) = callback {
                on_done(Err(message.to_string()));
            }
        }
    }
}
