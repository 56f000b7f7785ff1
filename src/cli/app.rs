//! CLI module for the quotebin application
//!
//! This module handles the command-line interface for capturing and browsing
//! quotes through the quotes and settings state.
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::Mutex;

use crate::{Commands, NewQuote, Quote, QuoteError, QuoteStore, Result, SettingsStore};

/// CLI Application handler - processes CLI commands against the state containers
pub struct App {
    /// Quotes state
    quotes: Arc<Mutex<QuoteStore>>,

    /// Settings state
    settings: Arc<Mutex<SettingsStore>>,

    /// Use the local cache instead of the remote bin
    offline: bool,
}

impl App {
    /// Create a new CLI application over the given state containers
    pub fn new(
        quotes: Arc<Mutex<QuoteStore>>,
        settings: Arc<Mutex<SettingsStore>>,
        offline: bool,
    ) -> Self {
        Self {
            quotes,
            settings,
            offline,
        }
    }

    /// Run the CLI application with the given command
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Add {
                text,
                author,
                font,
                size,
            } => self.add_quote(text, author, font, size).await?,

            Commands::List { limit, json } => self.list_quotes(limit, json).await?,

            Commands::Show { key, json } => self.show_quote(&key, json).await?,

            Commands::Next { id } => self.navigate(&id, true).await?,

            Commands::Prev { id } => self.navigate(&id, false).await?,

            Commands::Remove { id } => self.remove_quote(&id).await?,

            Commands::Sync => self.sync().await?,

            Commands::Settings {
                font,
                size,
                dark_mode,
                reset,
                fonts,
            } => self.handle_settings(font, size, dark_mode, reset, fonts).await?,
        }

        Ok(())
    }

    /// Loads the remote bin unless running offline. A failed load is an error here.
    async fn refresh(&self, store: &mut QuoteStore) -> Result<()> {
        if self.offline {
            debug!("Offline mode, using {} cached quotes", store.quotes().len());
            return Ok(());
        }

        store.load_quotes().await;
        match store.error() {
            Some(message) => Err(QuoteError::ApplicationError {
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn require_online(&self, action: &str) -> Result<()> {
        if self.offline {
            return Err(QuoteError::ApplicationError {
                message: format!("Cannot {} while offline", action),
            });
        }
        Ok(())
    }

    async fn add_quote(
        &self,
        text: String,
        author: String,
        font: Option<String>,
        size: Option<u32>,
    ) -> Result<()> {
        self.require_online("add a quote")?;

        // Resolve the font against the catalog before touching the remote bin.
        let font = match font {
            Some(name) => Some(
                crate::find_font(&name)
                    .ok_or_else(|| QuoteError::InvalidSetting {
                        message: format!("unknown font: {}", name),
                    })?
                    .family
                    .to_string(),
            ),
            None => None,
        };

        let draft = NewQuote {
            text,
            author,
            font,
            size,
        };
        let settings = self.settings.lock().await.settings().clone();

        let mut store = self.quotes.lock().await;
        if store.bin_id().is_some() {
            self.refresh(&mut store).await?;
        } else {
            // No bin yet: the first save creates one.
            info!("No bin configured, a new bin will be created");
            store.start_empty();
        }
        let quote = store.add_quote(draft, &settings).await?;

        println!("Quote saved with ID: {}", quote.id);
        println!("Slug: {}", quote.slug);
        if let Some(bin_id) = store.bin_id() {
            println!("Bin: {}", bin_id);
        }
        if let Some(warning) = store.error() {
            eprintln!("{} {}", console::style("Warning:").yellow(), warning);
        }
        Ok(())
    }

    async fn list_quotes(&self, limit: usize, json: bool) -> Result<()> {
        let mut store = self.quotes.lock().await;
        self.refresh(&mut store).await?;

        let quotes = store.quotes();
        let shown = if limit > 0 && quotes.len() > limit {
            &quotes[..limit]
        } else {
            quotes
        };

        if json {
            println!("{}", serde_json::to_string_pretty(shown)?);
            return Ok(());
        }

        if shown.is_empty() {
            println!("No quotes yet. Add one with `quotebin add`.");
            return Ok(());
        }

        self.display_quotes_text(shown);
        println!(
            "\nShowing {} of {} quote{}",
            shown.len(),
            quotes.len(),
            if quotes.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    async fn show_quote(&self, key: &str, json: bool) -> Result<()> {
        let mut store = self.quotes.lock().await;
        self.refresh(&mut store).await?;

        let quote = store
            .get_quote_by_id(key)
            .or_else(|| store.get_quote_by_slug(key))
            .ok_or_else(|| QuoteError::QuoteNotFound {
                id: key.to_string(),
            })?;

        if json {
            println!("{}", serde_json::to_string_pretty(quote)?);
        } else {
            self.display_quote(quote);
        }
        Ok(())
    }

    async fn navigate(&self, current_id: &str, forward: bool) -> Result<()> {
        let mut store = self.quotes.lock().await;
        self.refresh(&mut store).await?;

        let neighbour = if forward {
            store.get_next_quote(current_id)
        } else {
            store.get_previous_quote(current_id)
        };
        let quote = neighbour.ok_or_else(|| QuoteError::QuoteNotFound {
            id: current_id.to_string(),
        })?;

        self.display_quote(quote);
        Ok(())
    }

    async fn remove_quote(&self, id: &str) -> Result<()> {
        self.require_online("remove a quote")?;

        let mut store = self.quotes.lock().await;
        self.refresh(&mut store).await?;
        let removed = store.remove_quote(id).await?;

        println!("Removed quote {}: \"{}\"", removed.id, removed.text);
        Ok(())
    }

    async fn sync(&self) -> Result<()> {
        self.require_online("sync")?;

        let mut store = self.quotes.lock().await;
        self.refresh(&mut store).await?;

        let bin_id = store.bin_id().unwrap_or("?");
        match store.quotes().len() {
            0 => println!("Bin {} has no quotes yet", bin_id),
            n => println!(
                "Synced {} quote{} from bin {}",
                n,
                if n == 1 { "" } else { "s" },
                bin_id
            ),
        }
        Ok(())
    }

    async fn handle_settings(
        &self,
        font: Option<String>,
        size: Option<u32>,
        dark_mode: Option<bool>,
        reset: bool,
        fonts: bool,
    ) -> Result<()> {
        let mut settings = self.settings.lock().await;

        if reset {
            settings.reset_settings()?;
        }
        if let Some(font) = font {
            settings.set_font_family(&font)?;
        }
        if let Some(size) = size {
            settings.set_font_size(size)?;
        }
        if let Some(dark_mode) = dark_mode {
            settings.set_dark_mode(dark_mode)?;
        }
        info!("Settings now {:?}", settings.settings());

        if fonts {
            println!("{}", console::style("Available fonts").bold());
            for option in settings.available_fonts() {
                let marker = if option.family == settings.settings().font_family {
                    "*"
                } else {
                    " "
                };
                println!(" {} {}", marker, option.name);
            }
            println!();
        }

        let current = settings.settings();
        println!("Font:      {}", current.font_family);
        println!("Font size: {}px", current.font_size);
        println!("Dark mode: {}", if current.dark_mode { "on" } else { "off" });
        for (name, value) in settings.css_variables() {
            println!("{}", console::style(format!("{}: {};", name, value)).dim());
        }
        Ok(())
    }

    fn display_quotes_text(&self, quotes: &[Quote]) {
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, quote) in quotes.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }
            self.display_quote(quote);
        }
    }

    fn display_quote(&self, quote: &Quote) {
        let created_at = quote
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        println!("ID: {} | Created: {}", quote.id, created_at);
        println!("\"{}\"", console::style(&quote.text).italic());
        println!("  - {}", console::style(&quote.author).bold());

        let mut display = Vec::new();
        if let Some(font) = &quote.font {
            display.push(font.clone());
        }
        if let Some(size) = quote.size {
            display.push(format!("{}px", size));
        }
        if !display.is_empty() {
            println!("{}", console::style(display.join(", ")).cyan());
        }
        if !quote.slug.is_empty() {
            println!("Slug: {}", quote.slug);
        }
    }
}
