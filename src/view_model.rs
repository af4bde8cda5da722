//! The map screen's state machine.
//!
//! [`MapViewModel`] owns the [`ScreenState`] and is the only thing that
//! mutates it. Each user action is split in three steps so that requests can
//! overlap without corrupting state:
//!
//! 1. `begin_*` validates the action, moves the state forward and issues a
//!    [`Ticket`] for the request.
//! 2. `execute_*` performs the I/O. It only borrows the view model shared,
//!    is bounded by the request timeout and aborts on teardown.
//! 3. `complete_*` applies the outcome, unless a newer request of the same
//!    kind has been issued since, in which case it is dropped.
//!
//! `mount`, `retry_location`, `search_nearby` and `select_pharmacy` run the
//! three steps back to back for the common case.

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cancel::{RequestSequence, Teardown, TeardownSignal, Ticket};
use crate::error::{LocatorError, Result};
use crate::notice::Notice;
use crate::polyline::RouteGeometry;
use crate::ranking::rank_by_distance;
use crate::snapshot::MapSnapshot;
use crate::traits::{LocationSource, PharmacyDirectory, RouteProvider};
use crate::types::{Coordinate, DistanceEntry, Pharmacy, PharmacyId};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A list of pharmacies that is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PharmacyList(Vec<Pharmacy>);

impl PharmacyList {
    pub fn new(pharmacies: Vec<Pharmacy>) -> Option<Self> {
        if pharmacies.is_empty() {
            None
        } else {
            Some(Self(pharmacies))
        }
    }

    pub fn as_slice(&self) -> &[Pharmacy] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Pharmacy> {
        self.0
    }

    fn find(&self, id: &PharmacyId) -> Option<&Pharmacy> {
        self.0.iter().find(|pharmacy| &pharmacy.id == id)
    }
}

/// What the located screen is doing right now.
#[derive(Debug, Clone, PartialEq)]
pub enum Activity {
    /// Map only. Markers for the last results, if any, stay visible.
    Browsing { pharmacies: Vec<Pharmacy> },
    /// A nearby search is in flight. The previous results stay on the map
    /// until it resolves.
    Searching { pharmacies: Vec<Pharmacy> },
    /// The selection modal is open.
    ListOpen { pharmacies: PharmacyList },
    /// A route to `destination` is in flight; the modal is closed.
    Routing {
        pharmacies: PharmacyList,
        destination: Pharmacy,
    },
    /// The route to `destination` is drawn over the map.
    RouteShown {
        pharmacies: PharmacyList,
        destination: Pharmacy,
    },
}

impl Activity {
    fn empty() -> Self {
        Self::Browsing {
            pharmacies: Vec::new(),
        }
    }

    fn pharmacies(&self) -> &[Pharmacy] {
        match self {
            Self::Browsing { pharmacies } | Self::Searching { pharmacies } => pharmacies,
            Self::ListOpen { pharmacies }
            | Self::Routing { pharmacies, .. }
            | Self::RouteShown { pharmacies, .. } => pharmacies.as_slice(),
        }
    }

    fn into_pharmacies(self) -> Vec<Pharmacy> {
        match self {
            Self::Browsing { pharmacies } | Self::Searching { pharmacies } => pharmacies,
            Self::ListOpen { pharmacies }
            | Self::Routing { pharmacies, .. }
            | Self::RouteShown { pharmacies, .. } => pharmacies.into_vec(),
        }
    }
}

/// State of a screen whose location has resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub location: Coordinate,
    /// Last successfully fetched route. Only ever replaced, never cleared.
    pub route: Option<RouteGeometry>,
    pub activity: Activity,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenState {
    Idle,
    Locating,
    /// Location could not be resolved; nothing but a retry is possible.
    LocationFailed(Notice),
    Active(Session),
    /// The screen was torn down; every outcome is ignored.
    Closed,
}

impl ScreenState {
    pub fn location(&self) -> Option<Coordinate> {
        match self {
            Self::Active(session) => Some(session.location),
            _ => None,
        }
    }

    pub fn pharmacies(&self) -> &[Pharmacy] {
        match self {
            Self::Active(session) => session.activity.pharmacies(),
            _ => &[],
        }
    }

    pub fn route(&self) -> Option<&RouteGeometry> {
        match self {
            Self::Active(session) => session.route.as_ref(),
            _ => None,
        }
    }

    pub fn is_list_visible(&self) -> bool {
        matches!(self.activity(), Some(Activity::ListOpen { .. }))
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.activity(), Some(Activity::Searching { .. }))
    }

    pub fn is_routing(&self) -> bool {
        matches!(self.activity(), Some(Activity::Routing { .. }))
    }

    pub fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Locating => Phase::Locating,
            Self::LocationFailed(_) => Phase::LocationFailed,
            Self::Closed => Phase::Closed,
            Self::Active(session) => match session.activity {
                Activity::Browsing { .. } => Phase::Located,
                Activity::Searching { .. } => Phase::Searching,
                Activity::ListOpen { .. } => Phase::ListOpen,
                Activity::Routing { .. } => Phase::Routing,
                Activity::RouteShown { .. } => Phase::RouteReady,
            },
        }
    }

    fn activity(&self) -> Option<&Activity> {
        match self {
            Self::Active(session) => Some(&session.activity),
            _ => None,
        }
    }
}

/// Coarse, read-only view of where the screen is in its flow.
///
/// `Located` may still have a route from an earlier pick on the map;
/// `RouteReady` only follows a route that just resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Locating,
    LocationFailed,
    Located,
    Searching,
    ListOpen,
    Routing,
    RouteReady,
    Closed,
}

/// Whether a completed request changed the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// Superseded by a newer request, or the screen was closed.
    Stale,
}

#[derive(Debug)]
pub struct LocateRequest {
    ticket: Ticket,
    signal: TeardownSignal,
}

#[derive(Debug)]
pub struct SearchRequest {
    ticket: Ticket,
    origin: Coordinate,
    credential: String,
    signal: TeardownSignal,
}

#[derive(Debug)]
pub struct RouteRequest {
    ticket: Ticket,
    origin: Coordinate,
    destination: Coordinate,
    signal: TeardownSignal,
}

macro_rules! impl_ticket {
    ($($ty:ty),*) => {
        $(impl $ty {
            pub fn ticket(&self) -> Ticket {
                self.ticket
            }
        })*
    };
}

impl_ticket!(LocateRequest, SearchRequest, RouteRequest);

/// Result of an executed request, tagged with the ticket it was issued under.
#[derive(Debug)]
pub struct Outcome<T> {
    ticket: Ticket,
    result: Result<T>,
}

impl<T> Outcome<T> {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn result(&self) -> &Result<T> {
        &self.result
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.result, Err(LocatorError::Cancelled))
    }
}

pub type LocateOutcome = Outcome<Coordinate>;
pub type SearchOutcome = Outcome<Vec<Pharmacy>>;
pub type RouteOutcome = Outcome<RouteGeometry>;

pub struct MapViewModel<L, P, R> {
    locator: L,
    directory: P,
    router: R,
    request_timeout: Duration,
    state: ScreenState,
    notices: Vec<Notice>,
    locate_seq: RequestSequence,
    search_seq: RequestSequence,
    route_seq: RequestSequence,
    teardown: Arc<Teardown>,
}

impl<L, P, R> MapViewModel<L, P, R>
where
    L: LocationSource,
    P: PharmacyDirectory,
    R: RouteProvider,
{
    pub fn new(locator: L, directory: P, router: R) -> Self {
        Self {
            locator,
            directory,
            router,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            state: ScreenState::Idle,
            notices: Vec::new(),
            locate_seq: RequestSequence::new(),
            search_seq: RequestSequence::new(),
            route_seq: RequestSequence::new(),
            teardown: Arc::new(Teardown::new()),
        }
    }

    /// Bounds every external call. Defaults to [`DEFAULT_REQUEST_TIMEOUT`].
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn location(&self) -> Option<Coordinate> {
        self.state.location()
    }

    pub fn pharmacies(&self) -> &[Pharmacy] {
        self.state.pharmacies()
    }

    pub fn route(&self) -> Option<&RouteGeometry> {
        self.state.route()
    }

    pub fn is_list_visible(&self) -> bool {
        self.state.is_list_visible()
    }

    pub fn is_searching(&self) -> bool {
        self.state.is_searching()
    }

    pub fn is_routing(&self) -> bool {
        self.state.is_routing()
    }

    /// Pharmacies ranked nearest first from the current location.
    ///
    /// Computed on every call, so it always reflects the current list and
    /// location.
    pub fn ranked(&self) -> Vec<DistanceEntry> {
        match self.state.location() {
            Some(origin) => rank_by_distance(origin, self.state.pharmacies()),
            None => Vec::new(),
        }
    }

    pub fn snapshot(&self) -> MapSnapshot<'_> {
        MapSnapshot::capture(&self.state)
    }

    /// Notices raised since the last call, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        mem::take(&mut self.notices)
    }

    /// Resolves the location once, as the screen mounts.
    pub async fn mount(&mut self) -> Completion {
        self.locate().await
    }

    /// Tries the location again after a failure.
    pub async fn retry_location(&mut self) -> Completion {
        self.locate().await
    }

    async fn locate(&mut self) -> Completion {
        let Some(request) = self.begin_locate() else {
            return Completion::Stale;
        };
        let outcome = self.execute_locate(request).await;
        self.complete_locate(outcome)
    }

    /// Runs a nearby search from the current location.
    pub async fn search_nearby(&mut self, credential: Option<&str>) -> Completion {
        let Some(request) = self.begin_search(credential) else {
            return Completion::Stale;
        };
        let outcome = self.execute_search(request).await;
        self.complete_search(outcome)
    }

    /// Picks a pharmacy from the open list and routes to it.
    pub async fn select_pharmacy(&mut self, id: &PharmacyId) -> Completion {
        let Some(request) = self.begin_route(id) else {
            return Completion::Stale;
        };
        let outcome = self.execute_route(request).await;
        self.complete_route(outcome)
    }

    /// `Idle | LocationFailed -> Locating`.
    pub fn begin_locate(&mut self) -> Option<LocateRequest> {
        if self.is_torn_down() {
            return None;
        }
        if !matches!(self.state, ScreenState::Idle | ScreenState::LocationFailed(_)) {
            debug!(phase = ?self.phase(), "location request ignored");
            return None;
        }

        self.state = ScreenState::Locating;
        let ticket = self.locate_seq.issue();
        info!(ticket = ticket.value(), "locating");
        Some(LocateRequest {
            ticket,
            signal: self.teardown.signal(),
        })
    }

    pub async fn execute_locate(&self, request: LocateRequest) -> LocateOutcome {
        let LocateRequest { ticket, signal } = request;
        let result = signal
            .guard(self.request_timeout, self.locator.request_current_location())
            .await;
        Outcome { ticket, result }
    }

    pub fn complete_locate(&mut self, outcome: LocateOutcome) -> Completion {
        if self.is_torn_down() {
            return Completion::Stale;
        }
        if !self.accepts(&self.locate_seq, outcome.ticket, "locate") {
            return Completion::Stale;
        }
        if !matches!(self.state, ScreenState::Locating) {
            return Completion::Stale;
        }

        match outcome.result {
            Ok(location) => {
                info!(lat = location.latitude, lng = location.longitude, "located");
                self.state = ScreenState::Active(Session {
                    location,
                    route: None,
                    activity: Activity::empty(),
                });
            }
            Err(err) => {
                warn!(error = %err, "location failed");
                let notice = Notice::from_location_error(&err);
                self.notices.push(notice.clone());
                self.state = ScreenState::LocationFailed(notice);
            }
        }
        Completion::Applied
    }

    /// `Located -> Searching`. Requires a resolved location and a credential;
    /// otherwise raises a notice and leaves the state alone.
    ///
    /// May be issued while another search is in flight: the earlier one is
    /// superseded. Any in-flight route is superseded as well.
    pub fn begin_search(&mut self, credential: Option<&str>) -> Option<SearchRequest> {
        if self.is_torn_down() {
            return None;
        }
        match self.state {
            ScreenState::Active(_) => {}
            ScreenState::Closed => return None,
            _ => {
                self.notices.push(Notice::LocationNotReady);
                return None;
            }
        }
        let Some(credential) = credential.map(str::trim).filter(|c| !c.is_empty()) else {
            self.notices.push(Notice::NotSignedIn);
            return None;
        };
        let ScreenState::Active(session) = &mut self.state else {
            return None;
        };

        let previous = mem::replace(&mut session.activity, Activity::empty());
        session.activity = Activity::Searching {
            pharmacies: previous.into_pharmacies(),
        };
        let origin = session.location;

        self.route_seq.invalidate();
        let ticket = self.search_seq.issue();
        info!(
            ticket = ticket.value(),
            lat = origin.latitude,
            lng = origin.longitude,
            "searching"
        );
        Some(SearchRequest {
            ticket,
            origin,
            credential: credential.to_string(),
            signal: self.teardown.signal(),
        })
    }

    pub async fn execute_search(&self, request: SearchRequest) -> SearchOutcome {
        let SearchRequest {
            ticket,
            origin,
            credential,
            signal,
        } = request;
        let result = signal
            .guard(
                self.request_timeout,
                self.directory.find_nearby(origin, &credential),
            )
            .await;
        Outcome { ticket, result }
    }

    /// `Searching -> ListOpen` on results, `Searching -> Located` otherwise.
    pub fn complete_search(&mut self, outcome: SearchOutcome) -> Completion {
        if self.is_torn_down() {
            return Completion::Stale;
        }
        if !self.accepts(&self.search_seq, outcome.ticket, "search") {
            return Completion::Stale;
        }
        let ScreenState::Active(session) = &mut self.state else {
            return Completion::Stale;
        };
        if !matches!(session.activity, Activity::Searching { .. }) {
            return Completion::Stale;
        }

        session.activity = match outcome.result {
            Ok(found) => match PharmacyList::new(found) {
                Some(pharmacies) => {
                    info!(count = pharmacies.as_slice().len(), "pharmacies found");
                    Activity::ListOpen { pharmacies }
                }
                None => {
                    info!("no pharmacies nearby");
                    self.notices.push(Notice::NoPharmaciesFound);
                    Activity::empty()
                }
            },
            Err(err) => {
                warn!(error = %err, "search failed");
                self.notices.push(Notice::from_search_error(&err));
                Activity::empty()
            }
        };
        Completion::Applied
    }

    /// `ListOpen -> Routing`. The list closes right away, before the route
    /// resolves.
    pub fn begin_route(&mut self, id: &PharmacyId) -> Option<RouteRequest> {
        if self.is_torn_down() {
            return None;
        }
        let ScreenState::Active(session) = &mut self.state else {
            return None;
        };

        let previous = mem::replace(&mut session.activity, Activity::empty());
        let (pharmacies, destination) = match previous {
            Activity::ListOpen { pharmacies } => {
                let found = pharmacies.find(id).cloned();
                match found {
                    Some(destination) => (pharmacies, destination),
                    None => {
                        warn!(%id, "selected pharmacy is not in the list");
                        session.activity = Activity::ListOpen { pharmacies };
                        return None;
                    }
                }
            }
            other => {
                debug!(activity = ?other, "route request outside the list");
                session.activity = other;
                return None;
            }
        };

        let origin = session.location;
        let target = destination.location;
        session.activity = Activity::Routing {
            pharmacies,
            destination,
        };

        let ticket = self.route_seq.issue();
        info!(ticket = ticket.value(), %id, "routing");
        Some(RouteRequest {
            ticket,
            origin,
            destination: target,
            signal: self.teardown.signal(),
        })
    }

    /// Fetches the route and decodes its geometry.
    pub async fn execute_route(&self, request: RouteRequest) -> RouteOutcome {
        let RouteRequest {
            ticket,
            origin,
            destination,
            signal,
        } = request;
        let result = signal
            .guard(self.request_timeout, async {
                let encoded = self.router.fetch_route(origin, destination).await?;
                Ok(RouteGeometry::decode(&encoded)?)
            })
            .await;
        Outcome { ticket, result }
    }

    /// `Routing -> RouteReady` on success. On failure the list reopens and
    /// the previous route is kept.
    pub fn complete_route(&mut self, outcome: RouteOutcome) -> Completion {
        if self.is_torn_down() {
            return Completion::Stale;
        }
        if !self.accepts(&self.route_seq, outcome.ticket, "route") {
            return Completion::Stale;
        }
        let ScreenState::Active(session) = &mut self.state else {
            return Completion::Stale;
        };
        let previous = mem::replace(&mut session.activity, Activity::empty());
        let (pharmacies, destination) = match previous {
            Activity::Routing {
                pharmacies,
                destination,
            } => (pharmacies, destination),
            other => {
                session.activity = other;
                return Completion::Stale;
            }
        };

        match outcome.result {
            Ok(geometry) => {
                info!(points = geometry.len(), "route ready");
                session.route = Some(geometry);
                session.activity = Activity::RouteShown {
                    pharmacies,
                    destination,
                };
            }
            Err(err) => {
                warn!(error = %err, "route failed");
                self.notices.push(Notice::from_route_error(&err));
                session.activity = Activity::ListOpen { pharmacies };
            }
        }
        Completion::Applied
    }

    /// Closes the selection list without picking anything.
    pub fn dismiss_list(&mut self) {
        if self.is_torn_down() {
            return;
        }
        let ScreenState::Active(session) = &mut self.state else {
            return;
        };
        session.activity = match mem::replace(&mut session.activity, Activity::empty()) {
            Activity::ListOpen { pharmacies } => Activity::Browsing {
                pharmacies: pharmacies.into_vec(),
            },
            other => other,
        };
    }

    /// A handle that cancels in-flight requests without borrowing the view
    /// model, for hosts that tear the screen down from another task.
    ///
    /// Once it fires, no new request is started and the state settles to
    /// [`ScreenState::Closed`] on the next `complete_*` or `begin_*` call.
    pub fn teardown_handle(&self) -> Arc<Teardown> {
        Arc::clone(&self.teardown)
    }

    /// Cancels every in-flight request and closes the screen.
    pub fn teardown(&mut self) {
        info!("map screen torn down");
        self.teardown.cancel();
        self.state = ScreenState::Closed;
    }

    /// Settles the state to `Closed` once the teardown signal has fired.
    fn is_torn_down(&mut self) -> bool {
        if !self.teardown.is_cancelled() {
            return false;
        }
        if !matches!(self.state, ScreenState::Closed) {
            debug!("teardown observed, closing screen");
            self.state = ScreenState::Closed;
        }
        true
    }

    fn accepts(&self, seq: &RequestSequence, ticket: Ticket, kind: &'static str) -> bool {
        if !seq.is_current(ticket) {
            debug!(kind, ticket = ticket.value(), "stale outcome dropped");
            return false;
        }
        true
    }
}
