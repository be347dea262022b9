use crate::error::AppError;
use crate::models::{
    Coordinates, RouteGeometry, RouteQuery, RouteResult, SelectionPoint, SelectionRole,
    VehicleProfile,
};
use crate::services::mapbox::MapboxClient;
use crate::services::synchronizer::FloodSnapshot;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlannerState {
    Idle,
    AwaitingStartSelection,
    AwaitingEndSelection,
    ReadyToQuery,
    Querying,
    RouteShown,
    RouteError,
}

impl fmt::Display for PlannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlannerState::Idle => "idle",
            PlannerState::AwaitingStartSelection => "awaiting_start_selection",
            PlannerState::AwaitingEndSelection => "awaiting_end_selection",
            PlannerState::ReadyToQuery => "ready_to_query",
            PlannerState::Querying => "querying",
            PlannerState::RouteShown => "route_shown",
            PlannerState::RouteError => "route_error",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("a route query is already in flight")]
    QueryInFlight,
    #[error("cannot query in state {0}: select both a start and an end point")]
    NotReady(PlannerState),
    #[error("no query in flight (state {0})")]
    NotQuerying(PlannerState),
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        AppError::Conflict(e.to_string())
    }
}

/// Read-only view handed to the rendering layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlannerView {
    pub state: PlannerState,
    pub start: Option<Coordinates>,
    pub end: Option<Coordinates>,
    pub avoid_flood: bool,
    pub vehicle: VehicleProfile,
    /// Present only in `RouteShown`
    pub route: Option<RouteGeometry>,
    /// Present only in `RouteError`
    pub error: Option<String>,
    /// Whether the query action is enabled
    pub can_query: bool,
}

/// User-facing state machine tying point selection, live flood data, and
/// directions results together.
///
/// A result is only ever shown for the inputs that produced it: changing
/// either point, the vehicle or the avoid-flood flag drops it. Background
/// flood refreshes do not; a displayed route is valid as of query time.
#[derive(Debug, Clone)]
pub struct RouteStateCoordinator {
    state: PlannerState,
    start: Option<Coordinates>,
    end: Option<Coordinates>,
    avoid_flood: bool,
    vehicle: VehicleProfile,
    result: Option<RouteResult>,
}

impl Default for RouteStateCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteStateCoordinator {
    pub fn new() -> Self {
        RouteStateCoordinator {
            state: PlannerState::Idle,
            start: None,
            end: None,
            avoid_flood: true,
            vehicle: VehicleProfile::default(),
            result: None,
        }
    }

    pub fn state(&self) -> PlannerState {
        self.state
    }

    pub fn result(&self) -> Option<&RouteResult> {
        self.result.as_ref()
    }

    pub fn view(&self) -> PlannerView {
        PlannerView {
            state: self.state,
            start: self.start,
            end: self.end,
            avoid_flood: self.avoid_flood,
            vehicle: self.vehicle,
            route: match self.state {
                PlannerState::RouteShown => self.result.as_ref().and_then(|r| r.geometry()).cloned(),
                _ => None,
            },
            error: match self.state {
                PlannerState::RouteError => self
                    .result
                    .as_ref()
                    .and_then(|r| r.error())
                    .map(|f| f.message.clone()),
                _ => None,
            },
            can_query: self.can_query(),
        }
    }

    pub fn can_query(&self) -> bool {
        matches!(
            self.state,
            PlannerState::ReadyToQuery | PlannerState::RouteShown | PlannerState::RouteError
        )
    }

    /// Arm the next map click to set `role`.
    pub fn request_selection(&mut self, role: SelectionRole) -> Result<(), TransitionError> {
        self.ensure_not_querying()?;
        let next = match role {
            SelectionRole::Start => PlannerState::AwaitingStartSelection,
            SelectionRole::End => PlannerState::AwaitingEndSelection,
        };
        self.transition(next);
        Ok(())
    }

    /// Consume a pending selection. Returns the point that was set, or
    /// `None` when no selection was pending (the click is ignored).
    pub fn map_click(&mut self, at: Coordinates) -> Option<SelectionPoint> {
        let role = match self.state {
            PlannerState::AwaitingStartSelection => SelectionRole::Start,
            PlannerState::AwaitingEndSelection => SelectionRole::End,
            _ => return None,
        };

        match role {
            SelectionRole::Start => self.start = Some(at),
            SelectionRole::End => self.end = Some(at),
        }
        self.result = None;
        self.settle();

        Some(SelectionPoint {
            role,
            coordinates: at,
        })
    }

    /// Leave selection mode without picking a point.
    pub fn cancel_selection(&mut self) {
        if matches!(
            self.state,
            PlannerState::AwaitingStartSelection | PlannerState::AwaitingEndSelection
        ) {
            self.settle_keeping_result();
        }
    }

    /// Drop both points and any result, and wait for a new start point.
    pub fn restart_selection(&mut self) -> Result<(), TransitionError> {
        self.ensure_not_querying()?;
        self.start = None;
        self.end = None;
        self.result = None;
        self.transition(PlannerState::AwaitingStartSelection);
        Ok(())
    }

    pub fn set_avoid_flood(&mut self, avoid_flood: bool) -> Result<(), TransitionError> {
        self.ensure_not_querying()?;
        if self.avoid_flood != avoid_flood {
            self.avoid_flood = avoid_flood;
            self.invalidate();
        }
        Ok(())
    }

    pub fn set_vehicle_profile(&mut self, vehicle: VehicleProfile) -> Result<(), TransitionError> {
        self.ensure_not_querying()?;
        if self.vehicle != vehicle {
            self.vehicle = vehicle;
            self.invalidate();
        }
        Ok(())
    }

    /// Enter `Querying` and hand back the query to run. A shown route or
    /// error falls back to `ReadyToQuery` first; the previous result stays
    /// current until [`complete_query`](Self::complete_query) supersedes it.
    pub fn begin_query(&mut self) -> Result<RouteQuery, TransitionError> {
        match self.state {
            PlannerState::Querying => return Err(TransitionError::QueryInFlight),
            PlannerState::RouteShown | PlannerState::RouteError => {
                self.transition(PlannerState::ReadyToQuery)
            }
            PlannerState::ReadyToQuery => {}
            other => return Err(TransitionError::NotReady(other)),
        }

        let query = RouteQuery {
            avoid_flood: self.avoid_flood,
            vehicle: self.vehicle,
            ..RouteQuery::new(self.start, self.end)
        };
        self.transition(PlannerState::Querying);
        Ok(query)
    }

    /// Record the outcome of the in-flight query.
    pub fn complete_query(&mut self, result: RouteResult) -> Result<&RouteResult, TransitionError> {
        if self.state != PlannerState::Querying {
            return Err(TransitionError::NotQuerying(self.state));
        }

        let next = if result.is_success() {
            PlannerState::RouteShown
        } else {
            PlannerState::RouteError
        };
        self.transition(next);
        Ok(self.result.insert(result))
    }

    /// Run one query end to end against the given flood snapshot.
    pub async fn run_query(
        &mut self,
        client: &MapboxClient,
        snapshot: &FloodSnapshot,
    ) -> Result<&RouteResult, TransitionError> {
        let query = self.begin_query()?;
        let result = match snapshot.exclusions_for(&query) {
            Ok(exclusions) => client.request_route(&query, &exclusions).await,
            Err(failure) => RouteResult::Failure(failure),
        };
        self.complete_query(result)
    }

    fn ensure_not_querying(&self) -> Result<(), TransitionError> {
        if self.state == PlannerState::Querying {
            Err(TransitionError::QueryInFlight)
        } else {
            Ok(())
        }
    }

    /// Result no longer matches the inputs.
    fn invalidate(&mut self) {
        if self.result.take().is_some() {
            self.settle();
        }
    }

    /// Ready when both points exist, idle otherwise.
    fn settle(&mut self) {
        let next = if self.start.is_some() && self.end.is_some() {
            PlannerState::ReadyToQuery
        } else {
            PlannerState::Idle
        };
        self.transition(next);
    }

    fn settle_keeping_result(&mut self) {
        match self.result.as_ref() {
            Some(RouteResult::Success(_)) => self.transition(PlannerState::RouteShown),
            Some(RouteResult::Failure(_)) => self.transition(PlannerState::RouteError),
            None => self.settle(),
        }
    }

    fn transition(&mut self, next: PlannerState) {
        if self.state != next {
            tracing::debug!(from = %self.state, to = %next, "Planner transition {} -> {}", self.state, next);
            self.state = next;
        }
    }
}
