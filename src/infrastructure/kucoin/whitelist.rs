//! Tradable-symbol whitelist per KuCoin market segment.
//!
//! The order-construction path consults this before touching the
//! exchange, so unknown symbols short-circuit early. Symbols are kept
//! in bot format. The backing file is read once at construction and
//! never written back: `add_symbol`/`remove_symbol` changes last for
//! the process lifetime only. Mutations serialize behind a writer lock
//! and readers only ever see snapshots.

use crate::domain::trading::types::MarketSegment;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{error, info, warn};

/// Optional descriptive fields kept alongside a whitelisted symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SymbolDetails {
    pub base_currency: Option<String>,
    pub quote_currency: Option<String>,
    pub spot_symbol: Option<String>,
    pub futures_symbol: Option<String>,
}

/// On-disk shape of the whitelist file. Every section may be absent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WhitelistFile {
    #[serde(default)]
    pub spot: Vec<String>,
    #[serde(default)]
    pub futures: Vec<String>,
    #[serde(default)]
    pub details: HashMap<String, SymbolDetails>,
}

#[derive(Debug, Default)]
struct WhitelistState {
    /// Union of every category list.
    all: HashSet<String>,
    spot: Vec<String>,
    futures: Vec<String>,
    details: HashMap<String, SymbolDetails>,
}

/// The set of symbols the bot may trade, split by market segment.
#[derive(Debug, Default)]
pub struct SymbolWhitelist {
    state: RwLock<WhitelistState>,
}

impl SymbolWhitelist {
    /// Whitelist permitting nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_model(file: WhitelistFile) -> Self {
        let mut all = HashSet::new();
        all.extend(file.spot.iter().cloned());
        all.extend(file.futures.iter().cloned());
        Self {
            state: RwLock::new(WhitelistState {
                all,
                spot: file.spot,
                futures: file.futures,
                details: file.details,
            }),
        }
    }

    /// Load the whitelist file from disk.
    ///
    /// Never fails: a missing or unparseable file is logged and the
    /// whitelist starts empty, so the rest of the bot keeps running
    /// with every symbol gated off.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(file) => {
                info!(
                    "Loaded whitelist from {:?} ({} spot, {} futures)",
                    path,
                    file.spot.len(),
                    file.futures.len()
                );
                Self::from_model(file)
            }
            Err(err) => {
                warn!("Whitelist unavailable ({err:#}), continuing with empty whitelist");
                Self::empty()
            }
        }
    }

    fn try_load(path: &Path) -> Result<WhitelistFile> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read whitelist from {:?}", path))?;
        serde_json::from_str(&content).context("Failed to parse whitelist JSON")
    }

    fn read_state(&self) -> RwLockReadGuard<'_, WhitelistState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("SymbolWhitelist: state lock poisoned during read, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, WhitelistState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("SymbolWhitelist: state lock poisoned during write, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Whether the bot may trade this symbol at all.
    ///
    /// Fail-closed: support requires an explicit details entry, so a
    /// symbol missing from the file reads as not tradable.
    pub fn is_symbol_supported(&self, symbol: &str) -> bool {
        self.read_state().details.contains_key(symbol)
    }

    pub fn is_spot_symbol(&self, symbol: &str) -> bool {
        self.read_state().spot.iter().any(|s| s == symbol)
    }

    pub fn is_futures_symbol(&self, symbol: &str) -> bool {
        self.read_state().futures.iter().any(|s| s == symbol)
    }

    /// Snapshot of the spot category in file order.
    pub fn spot_symbols(&self) -> Vec<String> {
        self.read_state().spot.clone()
    }

    /// Snapshot of the futures category in file order.
    pub fn futures_symbols(&self) -> Vec<String> {
        self.read_state().futures.clone()
    }

    /// Sorted snapshot of every symbol in any category.
    pub fn all_symbols(&self) -> Vec<String> {
        let state = self.read_state();
        let mut symbols: Vec<String> = state.all.iter().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn symbol_details(&self, symbol: &str) -> Option<SymbolDetails> {
        self.read_state().details.get(symbol).cloned()
    }

    pub fn len(&self) -> usize {
        self.read_state().all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().all.is_empty()
    }

    /// Add a symbol to one market segment for the process lifetime.
    ///
    /// Returns whether anything changed. A symbol new to the whitelist
    /// also gains an empty details entry so it reads as supported.
    pub fn add_symbol(&self, symbol: &str, segment: MarketSegment) -> bool {
        let mut state = self.write_state();
        let changed = match segment {
            MarketSegment::Spot => push_unique(&mut state.spot, symbol),
            MarketSegment::Futures => push_unique(&mut state.futures, symbol),
        };
        if changed {
            state.all.insert(symbol.to_string());
            state.details.entry(symbol.to_string()).or_default();
            info!("Added {symbol} to the {segment} whitelist");
        }
        changed
    }

    /// Remove a symbol from one market segment.
    ///
    /// Returns whether anything changed. The aggregate set and the
    /// details entry only drop once no category lists the symbol.
    pub fn remove_symbol(&self, symbol: &str, segment: MarketSegment) -> bool {
        let mut state = self.write_state();
        let changed = match segment {
            MarketSegment::Spot => remove_first(&mut state.spot, symbol),
            MarketSegment::Futures => remove_first(&mut state.futures, symbol),
        };
        if changed {
            let listed_elsewhere = state.spot.iter().any(|s| s == symbol)
                || state.futures.iter().any(|s| s == symbol);
            if !listed_elsewhere {
                state.all.remove(symbol);
                state.details.remove(symbol);
            }
            info!("Removed {symbol} from the {segment} whitelist");
        }
        changed
    }
}

fn push_unique(list: &mut Vec<String>, symbol: &str) -> bool {
    if list.iter().any(|s| s == symbol) {
        return false;
    }
    list.push(symbol.to_string());
    true
}

fn remove_first(list: &mut Vec<String>, symbol: &str) -> bool {
    match list.iter().position(|s| s == symbol) {
        Some(index) => {
            list.remove(index);
            true
        }
        None => false,
    }
}
