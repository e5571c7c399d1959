// Tracked-product state. Every mutation waits for the server to confirm it.
use crate::alerts::AlertConfig;
use crate::api::PriceApi;
use crate::model::{Listing, TrackResponse, TrackerError};
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    Tracked,
    Untracked,
}

#[derive(Debug, Default)]
pub struct TrackerState {
    listings: Vec<Listing>,
    ids: HashSet<String>,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn get(&self, id: &str) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == id)
    }

    pub fn is_tracked(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Replaces local state with the server's tracked list. On error the
    /// previous state is kept.
    pub async fn refresh(&mut self, api: &dyn PriceApi) -> Result<(), TrackerError> {
        let listings = api.tracked().await?;
        self.ids = listings.iter().map(|l| l.id.clone()).collect();
        self.listings = listings;
        info!("Loaded {} tracked products", self.listings.len());
        Ok(())
    }

    /// Tracks an untracked listing, untracks a tracked one.
    pub async fn toggle(
        &mut self,
        api: &dyn PriceApi,
        listing: &Listing,
    ) -> Result<TrackOutcome, TrackerError> {
        if self.is_tracked(&listing.id) {
            self.untrack(api, &listing.id).await?;
            return Ok(TrackOutcome::Untracked);
        }

        let response = api.track(listing).await?;
        confirm(response)?;

        self.ids.insert(listing.id.clone());
        self.listings.push(listing.clone());
        info!("Tracking enabled for {}", listing.id);
        Ok(TrackOutcome::Tracked)
    }

    pub async fn untrack(&mut self, api: &dyn PriceApi, id: &str) -> Result<(), TrackerError> {
        let response = api.untrack(id).await?;
        confirm(response)?;

        self.listings.retain(|l| l.id != id);
        self.ids.remove(id);
        info!("Tracking stopped for {}", id);
        Ok(())
    }

    /// Registers an alert for a tracked product and reloads the tracked list
    /// so the stored threshold shows up locally.
    pub async fn set_alert(
        &mut self,
        api: &dyn PriceApi,
        id: &str,
        alert: &AlertConfig,
    ) -> Result<(), TrackerError> {
        if !self.is_tracked(id) {
            return Err(TrackerError::NotTracked(id.to_string()));
        }
        alert.validate()?;

        let response = api.set_price_alert(id, alert.target_price()).await?;
        confirm(response)?;
        info!("Alert set for {}: {}", id, alert.description());

        if let Err(e) = self.refresh(api).await {
            warn!("Alert saved but tracked list refresh failed: {}", e);
        }
        Ok(())
    }
}

fn confirm(response: TrackResponse) -> Result<(), TrackerError> {
    if response.success {
        Ok(())
    } else {
        Err(TrackerError::Rejected(response.message))
    }
}
