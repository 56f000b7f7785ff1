//! Quotes state: the in-memory collection and its synchronization with the remote bin.
//!
//! The remote bin is authoritative when a session starts (`load_quotes`); after
//! that the in-memory collection is, and every save replaces the whole bin.
//! Creation and removal are two-phase: the change is staged locally, the
//! collection is saved, and the change is rolled back if the save fails.
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::{
    BinClient, Config, FetchOutcome, KeyValueStore, NewQuote, Quote, QuoteError, Result,
    Settings, BIN_ID_KEY, QUOTES_KEY,
};

/// Prefix of the error message recorded when loading fails.
pub const LOAD_FAILED_PREFIX: &str = "Failed to load quotes";
/// Prefix of the error message recorded when saving fails.
pub const SAVE_FAILED_PREFIX: &str = "Failed to save quotes";

/// Owns the quote collection for one session.
pub struct QuoteStore {
    /// Remote bin client
    client: BinClient,

    /// Bin in use for this session; set by configuration or by the first create
    bin_id: Option<String>,

    /// Local persistence for the bin id and the offline cache
    local: Arc<dyn KeyValueStore>,

    /// Collection, newest first
    quotes: Vec<Quote>,

    /// Whether a remote operation is in flight
    is_loading: bool,

    /// Message describing the last failure, cleared when an operation starts
    error: Option<String>,
}

impl QuoteStore {
    /// Creates the store. The bin id comes from configuration, else from a
    /// previously persisted `binId`. The collection is seeded from the local cache.
    pub fn new(config: &Config, local: Arc<dyn KeyValueStore>) -> Self {
        let bin_id = config.bin_id.clone().or_else(|| {
            let persisted = local.get(BIN_ID_KEY).filter(|id| !id.trim().is_empty());
            if let Some(id) = &persisted {
                debug!("Using persisted bin id {}", id);
            }
            persisted
        });

        let quotes = Self::read_cache(local.as_ref());

        Self {
            client: BinClient::new(config),
            bin_id,
            local,
            quotes,
            is_loading: false,
            error: None,
        }
    }

    fn read_cache(local: &dyn KeyValueStore) -> Vec<Quote> {
        match local.get(QUOTES_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable quote cache: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        }
    }

    fn write_cache(&self) {
        let result = serde_json::to_string(&self.quotes)
            .map_err(QuoteError::from)
            .and_then(|json| self.local.set(QUOTES_KEY, &json));
        if let Err(e) = result {
            warn!("Failed to update local quote cache: {}", e);
        }
    }

    /// The collection as last written to the local cache.
    pub fn cached_quotes(&self) -> Vec<Quote> {
        Self::read_cache(self.local.as_ref())
    }

    /// Discards the collection so the next save starts a bin from scratch.
    pub fn start_empty(&mut self) {
        self.quotes.clear();
        self.error = None;
    }

    /// Read-only view of the collection, newest first.
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn bin_id(&self) -> Option<&str> {
        self.bin_id.as_deref()
    }

    /// Replaces the collection with the remote copy.
    ///
    /// Never fails outright: problems are recorded in [`QuoteStore::error`] and
    /// an empty collection is returned. A bin that does not exist yet is not
    /// an error.
    pub async fn load_quotes(&mut self) -> Vec<Quote> {
        let bin_id = match (self.client.has_access_key(), self.bin_id.clone()) {
            (false, _) => return self.configuration_missing_on_load("access key"),
            (true, None) => return self.configuration_missing_on_load("bin id"),
            (true, Some(bin_id)) => bin_id,
        };

        self.is_loading = true;
        self.error = None;
        let outcome = self.client.fetch_latest(&bin_id).await;
        self.is_loading = false;

        match outcome {
            Ok(FetchOutcome::Found(quotes)) => {
                info!("Loaded {} quotes from bin {}", quotes.len(), bin_id);
                self.quotes = quotes;
                self.write_cache();
                self.quotes.clone()
            }
            Ok(FetchOutcome::NotFound) => {
                self.quotes.clear();
                self.write_cache();
                Vec::new()
            }
            Err(e) => {
                let message = format!("{}: {}", LOAD_FAILED_PREFIX, e);
                error!("{}", message);
                self.error = Some(message);
                self.quotes.clear();
                Vec::new()
            }
        }
    }

    fn configuration_missing_on_load(&mut self, setting: &str) -> Vec<Quote> {
        let e = QuoteError::ConfigurationMissing {
            setting: setting.to_string(),
        };
        warn!("{}", e);
        self.error = Some(e.to_string());
        self.quotes.clear();
        Vec::new()
    }

    /// Writes the whole collection to the remote bin, creating the bin if none is known.
    pub async fn save_quotes(&mut self) -> Result<()> {
        if !self.client.has_access_key() {
            let e = QuoteError::ConfigurationMissing {
                setting: "access key".to_string(),
            };
            warn!("{}", e);
            self.error = Some(e.to_string());
            return Err(e);
        }

        self.is_loading = true;
        self.error = None;
        let result = self.push().await;
        self.is_loading = false;

        match result {
            Ok(()) => {
                self.write_cache();
                Ok(())
            }
            Err(e) => {
                let message = format!("{}: {}", SAVE_FAILED_PREFIX, e);
                error!("{}", message);
                self.error = Some(message.clone());
                Err(QuoteError::SaveFailed { message })
            }
        }
    }

    async fn push(&mut self) -> Result<()> {
        match self.bin_id.clone() {
            Some(bin_id) => {
                self.client.replace(&bin_id, &self.quotes).await?;
                debug!("Saved {} quotes to bin {}", self.quotes.len(), bin_id);
            }
            None => {
                let metadata = self.client.create(&self.quotes).await?;
                if let Some(new_id) = metadata.id {
                    info!("Using newly created bin {}", new_id);
                    if let Err(e) = self.local.set(BIN_ID_KEY, &new_id) {
                        // The save itself succeeded; only the next session loses the bin.
                        let message = format!(
                            "Bin {} created but not stored locally ({}); set bin_id to reuse it",
                            new_id, e
                        );
                        warn!("{}", message);
                        self.error = Some(message);
                    }
                    self.bin_id = Some(new_id);
                }
            }
        }
        Ok(())
    }

    /// Phase one of creation: builds the quote and prepends it locally.
    pub fn stage_quote(&mut self, draft: NewQuote, settings: &Settings) -> Result<Quote> {
        let quote = Quote::new(draft, settings)?;
        debug!("Staged quote {}", quote.id);
        self.quotes.insert(0, quote.clone());
        Ok(quote)
    }

    /// Undoes a staged quote. Returns it if it was still present.
    pub fn rollback_quote(&mut self, id: &str) -> Option<Quote> {
        let index = self.quotes.iter().position(|quote| quote.id == id)?;
        debug!("Rolling back quote {}", id);
        Some(self.quotes.remove(index))
    }

    /// Adds a quote and saves the collection. The quote is only kept if the save succeeds.
    pub async fn add_quote(&mut self, draft: NewQuote, settings: &Settings) -> Result<Quote> {
        let quote = self.stage_quote(draft, settings)?;

        if let Err(e) = self.save_quotes().await {
            self.rollback_quote(&quote.id);
            return Err(e);
        }

        info!("Added quote {} ({})", quote.id, quote.slug);
        Ok(quote)
    }

    /// Removes a quote and saves the collection, restoring it in place if the save fails.
    pub async fn remove_quote(&mut self, id: &str) -> Result<Quote> {
        let index = self
            .quotes
            .iter()
            .position(|quote| quote.id == id)
            .ok_or_else(|| QuoteError::QuoteNotFound { id: id.to_string() })?;
        let removed = self.quotes.remove(index);

        if let Err(e) = self.save_quotes().await {
            self.quotes.insert(index, removed);
            return Err(e);
        }

        info!("Removed quote {}", id);
        Ok(removed)
    }

    pub fn get_quote_by_id(&self, id: &str) -> Option<&Quote> {
        self.quotes.iter().find(|quote| quote.id == id)
    }

    /// First quote with this slug. Slugs are not guaranteed unique.
    pub fn get_quote_by_slug(&self, slug: &str) -> Option<&Quote> {
        self.quotes.iter().find(|quote| quote.slug == slug)
    }

    /// The quote after `current_id`, wrapping to the first.
    pub fn get_next_quote(&self, current_id: &str) -> Option<&Quote> {
        let index = self.position(current_id)?;
        self.quotes.get((index + 1) % self.quotes.len())
    }

    /// The quote before `current_id`, wrapping to the last.
    pub fn get_previous_quote(&self, current_id: &str) -> Option<&Quote> {
        let index = self.position(current_id)?;
        let len = self.quotes.len();
        self.quotes.get((index + len - 1) % len)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.quotes.iter().position(|quote| quote.id == id)
    }
}
