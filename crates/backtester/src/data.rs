use chrono::{Days, NaiveDate};
use core_types::PriceBar;
use std::collections::HashMap;

/// Boundary trait for historical market data.
///
/// Implementations return ascending, deduplicated daily bars covering
/// `[start, end]`, possibly empty. Acquisition, caching, and retry policy
/// all live behind this trait — the simulator only ever sees resolved
/// in-memory data.
pub trait HistoricalPriceProvider {
    fn price_series(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar>;
}

/// A provider backed by pre-loaded series, keyed by symbol. The standard
/// implementation for tests and for callers that resolve data up front.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceProvider {
    series: HashMap<String, Vec<PriceBar>>,
}

impl InMemoryPriceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a symbol's bars. Bars must be ascending by date.
    pub fn insert(&mut self, symbol: &str, bars: Vec<PriceBar>) {
        self.series.insert(symbol.to_uppercase(), bars);
    }
}

impl HistoricalPriceProvider for InMemoryPriceProvider {
    fn price_series(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
        self.series
            .get(&symbol.to_uppercase())
            .map(|bars| {
                bars.iter()
                    .filter(|bar| bar.date >= start && bar.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One retained symbol's bars for a run, covering the lookback window and
/// the simulated range.
#[derive(Debug, Clone)]
pub struct SymbolSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

/// Fetches every pool symbol's series for `[start - lookback, end]` and
/// drops the ones with no usable data. Symbols are loaded in sorted order
/// so the run is independent of pool ordering.
pub fn load_series(
    provider: &dyn HistoricalPriceProvider,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
    lookback_days: u64,
) -> Vec<SymbolSeries> {
    let mut sorted: Vec<String> = symbols.to_vec();
    sorted.sort();
    sorted.dedup();

    let fetch_start = start
        .checked_sub_days(Days::new(lookback_days))
        .unwrap_or(start);

    let mut loaded = Vec::with_capacity(sorted.len());
    for symbol in sorted {
        let bars = provider.price_series(&symbol, fetch_start, end);
        if bars.is_empty() {
            tracing::debug!(%symbol, "no market data, dropping symbol from run");
            continue;
        }
        loaded.push(SymbolSeries { symbol, bars });
    }
    loaded
}
