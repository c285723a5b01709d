use anyhow::Result;
use std::sync::{Arc, Mutex, RwLock};

use crate::feeds::{FeedClient, FeedConfig};
use crate::layers::MapOptions;
use crate::render::{render_map, MapSnapshot};
use crate::settings::Settings;

// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Mutex<Settings>>,
    pub client: FeedClient,
    /// Last good render, `None` until the first one succeeds
    pub snapshot: Arc<RwLock<Option<MapSnapshot>>>,
    /// Held for a whole refresh so a slow pass cannot overwrite a newer one
    refresh_guard: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    pub fn new(settings: Settings, client: FeedClient) -> Self {
        Self {
            settings: Arc::new(Mutex::new(settings)),
            client,
            snapshot: Arc::new(RwLock::new(None)),
            refresh_guard: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn render_inputs(&self) -> (FeedConfig, MapOptions) {
        let settings = self.settings.lock().unwrap();
        let options = MapOptions {
            mapbox_token: settings.mapbox_token.clone(),
        };
        (FeedConfig::from(&*settings), options)
    }

    /// Re-fetches both feeds and swaps in the new snapshot. On failure the
    /// previous snapshot stays in place. Concurrent calls run one at a time.
    pub async fn refresh(&self) -> Result<()> {
        let _running = self.refresh_guard.lock().await;
        let (feeds, options) = self.render_inputs();
        let snapshot = render_map(&self.client, &feeds, &options).await?;
        *self.snapshot.write().unwrap() = Some(snapshot);
        Ok(())
    }

    pub fn current(&self) -> Option<MapSnapshot> {
        self.snapshot.read().unwrap().clone()
    }
}
