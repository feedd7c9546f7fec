//! Lookup lifecycle: one request at a time, normalized into [`QueryState`].
//!
//! [`LookupController`] owns the query input and the current [`QueryState`].
//! A lookup is split in two halves so the UI loop never blocks on the network:
//! [`LookupController::begin_initial`] / [`LookupController::begin_submit`]
//! move the state to `Loading` and hand out a single-use [`LookupTicket`], and
//! [`LookupController::complete`] consumes that ticket together with the
//! provider outcome. [`LookupController::load_initial`] and
//! [`LookupController::submit`] chain both halves for callers that are happy
//! to await the provider directly.
//!
//! While a lookup is outstanding, further submits are refused, so there is
//! never more than one response to reconcile.

use crate::api::GeoProvider;
use crate::error::{LookupFailure, ProviderError};
use crate::models::{LocationQuery, LocationResult, ProviderResponse};
use tracing::{error, info, warn};

/// Lifecycle of the current lookup attempt.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryState {
    #[default]
    Idle,
    Loading,
    Resolved(LocationResult),
    Failed(LookupFailure),
}

impl QueryState {
    pub fn resolved(&self) -> Option<&LocationResult> {
        match self {
            QueryState::Resolved(result) => Some(result),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Initial,
    Submit,
}

impl LookupKind {
    fn transport_failure(self) -> LookupFailure {
        match self {
            LookupKind::Initial => LookupFailure::InitialLookupFailed,
            LookupKind::Submit => LookupFailure::SubmitLookupFailed,
        }
    }
}

/// Proof that a lookup was started. Only the controller can mint one, and
/// completing a lookup consumes it, so the loading flag is cleared once.
#[derive(Debug)]
pub struct LookupTicket {
    id: u64,
    kind: LookupKind,
    address: Option<String>,
}

impl LookupTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> LookupKind {
        self.kind
    }

    /// Address to send as `ipAddress`; `None` means the caller's own address.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

#[derive(Debug, Default)]
pub struct LookupController {
    query_input: String,
    state: QueryState,
    in_flight: Option<u64>,
    next_id: u64,
    initial_issued: bool,
}

impl LookupController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn query_input(&self) -> &str {
        &self.query_input
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Replaces the query input. Refused while a lookup is outstanding.
    pub fn set_query_input(&mut self, input: impl Into<String>) -> bool {
        if self.is_loading() {
            return false;
        }
        self.query_input = input.into();
        true
    }

    pub fn push_char(&mut self, c: char) -> bool {
        if self.is_loading() {
            return false;
        }
        self.query_input.push(c);
        true
    }

    pub fn pop_char(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        self.query_input.pop().is_some()
    }

    /// Starts the startup lookup for the caller's own address. Only the first
    /// call yields a ticket.
    pub fn begin_initial(&mut self) -> Option<LookupTicket> {
        if self.initial_issued {
            warn!("Initial lookup already issued; ignoring");
            return None;
        }
        if self.is_loading() {
            warn!("A lookup is already in flight; initial lookup skipped");
            return None;
        }
        self.initial_issued = true;
        Some(self.start(LookupKind::Initial, None))
    }

    /// Starts a lookup for the current query input. An empty input looks up
    /// the caller's own address. Returns `None` while another lookup is
    /// outstanding.
    pub fn begin_submit(&mut self) -> Option<LookupTicket> {
        if self.is_loading() {
            warn!("Submit ignored: a lookup is already in flight");
            return None;
        }
        let query = LocationQuery::new(self.query_input.as_str());
        let address = query.address().map(str::to_owned);
        Some(self.start(LookupKind::Submit, address))
    }

    fn start(&mut self, kind: LookupKind, address: Option<String>) -> LookupTicket {
        self.next_id += 1;
        let id = self.next_id;
        self.in_flight = Some(id);
        self.state = QueryState::Loading;
        info!(
            "Lookup #{} ({:?}) started for {}",
            id,
            kind,
            address.as_deref().unwrap_or("own address")
        );
        LookupTicket { id, kind, address }
    }

    /// Settles the lookup that `ticket` belongs to.
    ///
    /// Returns the newly resolved result so the caller can forward it to the
    /// map. A ticket that is not the outstanding one changes nothing.
    pub fn complete(
        &mut self,
        ticket: LookupTicket,
        outcome: Result<ProviderResponse, ProviderError>,
    ) -> Option<&LocationResult> {
        if self.in_flight != Some(ticket.id) {
            warn!("Discarding stale response for lookup #{}", ticket.id);
            return None;
        }
        self.in_flight = None;

        self.state = match outcome {
            Ok(response) => match LocationResult::from_response(response) {
                Some(result) => {
                    info!(
                        "Lookup #{} resolved {} at {:?}",
                        ticket.id, result.ip, result.coordinate
                    );
                    QueryState::Resolved(result)
                }
                None => {
                    warn!("Lookup #{} returned no usable coordinates", ticket.id);
                    QueryState::Failed(LookupFailure::NoLocationData)
                }
            },
            Err(e) => {
                error!("Lookup #{} failed: {}", ticket.id, e);
                QueryState::Failed(ticket.kind.transport_failure())
            }
        };

        if ticket.kind == LookupKind::Submit {
            self.query_input.clear();
        }

        self.state.resolved()
    }

    /// Startup lookup, awaited in place.
    pub async fn load_initial(&mut self, provider: &GeoProvider) -> &QueryState {
        if let Some(ticket) = self.begin_initial() {
            let outcome = provider.lookup(ticket.address()).await;
            self.complete(ticket, outcome);
        }
        &self.state
    }

    /// Replaces the input with `query` and looks it up, awaited in place.
    pub async fn submit(
        &mut self,
        provider: &GeoProvider,
        query: impl Into<LocationQuery>,
    ) -> &QueryState {
        let query: LocationQuery = query.into();
        if self.set_query_input(query.into_inner()) {
            if let Some(ticket) = self.begin_submit() {
                let outcome = provider.lookup(ticket.address()).await;
                self.complete(ticket, outcome);
            }
        }
        &self.state
    }
}
