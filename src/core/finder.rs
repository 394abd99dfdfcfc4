use crate::core::catalog::Catalog;
use crate::core::resolver::resolve;
use crate::domain::model::{Filter, Location, MapView, RankedResult, METERS_PER_MILE};
use crate::domain::ports::{Geocoder, Renderer};
use crate::utils::error::{FinderError, Result};
use chrono::NaiveDateTime;

pub const NO_MATCHES_NOTICE: &str = "No cooling centers found matching your criteria.";
pub const OVERVIEW_NOTICE: &str =
    "Enter an address or use --use-my-location to find nearby cooling centers.";

/// Where the user is, as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    /// Free text, resolved through the geocoder.
    Address(String),
    Coordinates(Location),
    /// The device position; needs no geocoding credential.
    Device,
}

/// One user request. Nothing here outlives the call.
#[derive(Debug, Clone, PartialEq)]
pub struct FindRequest {
    pub location: LocationQuery,
    pub filter: Filter,
    pub limit: Option<i64>,
    pub max_distance_m: Option<f64>,
    /// Instant used for open/closed status, in local wall-clock time.
    pub reference_time: NaiveDateTime,
}

impl FindRequest {
    pub fn new(location: LocationQuery, reference_time: NaiveDateTime) -> Self {
        Self {
            location,
            filter: Filter::all(),
            limit: None,
            max_distance_m: None,
            reference_time,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn within_miles(mut self, miles: f64) -> Self {
        self.max_distance_m = Some(miles * METERS_PER_MILE);
        self
    }
}

#[derive(Debug)]
pub struct FindOutcome<'a> {
    /// `None` when the location could not be obtained and the whole catalog was shown.
    pub origin: Option<Location>,
    pub ranked: RankedResult<'a>,
    pub notice: Option<String>,
    /// The location failure that triggered the fallback, if any.
    pub degraded: Option<FinderError>,
    pub rendered: String,
}

impl FindOutcome<'_> {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Geocoder → resolver → renderer, over a catalog loaded once.
pub struct CoolFinder<G: Geocoder, R: Renderer> {
    catalog: Catalog,
    geocoder: G,
    renderer: R,
    device_location: Option<Location>,
}

impl<G: Geocoder, R: Renderer> CoolFinder<G, R> {
    pub fn new(catalog: Catalog, geocoder: G, renderer: R) -> Self {
        Self {
            catalog,
            geocoder,
            renderer,
            device_location: None,
        }
    }

    pub fn with_device_location(mut self, location: Location) -> Self {
        self.device_location = Some(location);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub async fn locate(&self, query: &LocationQuery) -> Result<Location> {
        match query {
            LocationQuery::Address(address) => self.geocoder.geocode(address).await,
            LocationQuery::Coordinates(location) => {
                location.validate()?;
                Ok(*location)
            }
            LocationQuery::Device => self
                .device_location
                .ok_or_else(|| FinderError::upstream("device location is not available")),
        }
    }

    /// Runs one request end to end.
    ///
    /// A location that cannot be obtained degrades to the full catalog in
    /// catalog order with an explanatory notice. Invalid arguments and render
    /// failures are returned as errors.
    pub async fn find(&self, request: &FindRequest) -> Result<FindOutcome<'_>> {
        if let Some(limit) = request.limit.filter(|n| *n <= 0) {
            return Err(FinderError::invalid_argument(format!(
                "limit must be positive, got {}",
                limit
            )));
        }

        let origin = match self.locate(&request.location).await {
            Ok(origin) => origin,
            Err(e) if e.is_location_unavailable() => return self.fallback(request, e),
            Err(e) => return Err(e),
        };
        tracing::info!("Searching for cooling centers near {}", origin);

        let mut ranked = resolve(
            &origin,
            self.catalog.centers(),
            Some(&request.filter),
            request.limit,
        )?;
        if let Some(max_m) = request.max_distance_m {
            ranked = ranked.within(max_m);
        }

        let notice = ranked.is_empty().then(|| NO_MATCHES_NOTICE.to_string());
        let mut view = MapView::ranked(origin, &ranked, request.reference_time);
        view.notice = notice.clone();
        let rendered = self.renderer.render(&view)?;

        match ranked.nearest() {
            Some(nearest) => tracing::info!(
                "Found {} centers, nearest is {} at {:.1} mi",
                ranked.len(),
                nearest.center.name,
                nearest.distance_miles()
            ),
            None => tracing::warn!("{}", NO_MATCHES_NOTICE),
        }

        Ok(FindOutcome {
            origin: Some(origin),
            ranked,
            notice,
            degraded: None,
            rendered,
        })
    }

    /// The whole catalog with a prompt, for when no location was given at all.
    pub fn overview(&self, at: NaiveDateTime) -> Result<String> {
        let view =
            MapView::unranked(self.catalog.centers(), at).with_notice(OVERVIEW_NOTICE.to_string());
        self.renderer.render(&view)
    }

    fn fallback(&self, request: &FindRequest, cause: FinderError) -> Result<FindOutcome<'_>> {
        tracing::warn!("Location unavailable, showing full catalog: {}", cause);
        let notice = format!(
            "{}. {}",
            cause.user_friendly_message().trim_end_matches('.'),
            "Showing all cooling centers."
        );
        let view = MapView::unranked(self.catalog.centers(), request.reference_time)
            .with_notice(notice.clone());
        let rendered = self.renderer.render(&view)?;

        Ok(FindOutcome {
            origin: None,
            ranked: RankedResult::default(),
            notice: Some(notice),
            degraded: Some(cause),
            rendered,
        })
    }
}
