use serde::Serialize;

/// Known tickers and their display names, in selector order.
pub const STOCK_CATALOG: &[(&str, &str)] = &[
    ("RELIANCE.BO", "Reliance Industries"),
    ("TCS.BO", "Tata Consultancy Services"),
    ("INFY.BO", "Infosys"),
    ("HDFCBANK.BO", "HDFC Bank"),
    ("HINDUNILVR.BO", "Hindustan Unilever"),
    ("BAJFINANCE.BO", "Bajaj Finance"),
    ("ITC.BO", "ITC Limited"),
    ("ICICIBANK.BO", "ICICI Bank"),
    ("KOTAKBANK.BO", "Kotak Mahindra Bank"),
    ("LT.BO", "Larsen & Toubro"),
    ("ASIANPAINT.BO", "Asian Paints"),
    ("HCLTECH.BO", "HCL Technologies"),
    ("WIPRO.BO", "Wipro"),
    ("SUNPHARMA.BO", "Sun Pharmaceutical"),
    ("ONGC.BO", "Oil and Natural Gas Corporation"),
    ("ULTRACEMCO.BO", "UltraTech Cement"),
    ("MARUTI.BO", "Maruti Suzuki"),
    ("POWERGRID.BO", "Power Grid Corporation"),
    ("TITAN.BO", "Titan Company"),
    ("NTPC.BO", "National Thermal Power Corporation"),
    ("BHARTIARTL.BO", "Bharti Airtel"),
    ("SBIN.BO", "State Bank of India"),
    ("TATAMOTORS.BO", "Tata Motors"),
];

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SymbolOption {
    pub symbol: String,
    pub name: String,
}

/// Display name for a ticker, falling back to the ticker itself.
pub fn display_name(symbol: &str) -> &str {
    STOCK_CATALOG
        .iter()
        .find(|(sym, _)| *sym == symbol)
        .map(|(_, name)| *name)
        .unwrap_or(symbol)
}

pub fn symbol_options() -> Vec<SymbolOption> {
    STOCK_CATALOG
        .iter()
        .map(|(symbol, _)| SymbolOption {
            symbol: symbol.to_string(),
            name: display_name(symbol).to_string(),
        })
        .collect()
}

pub fn default_symbol() -> &'static str {
    STOCK_CATALOG[0].0
}
