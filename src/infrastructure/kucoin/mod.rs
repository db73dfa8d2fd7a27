pub mod precision;
pub mod symbols;
pub mod whitelist;

pub use precision::{PrecisionTable, SymbolPrecisionRule};
pub use whitelist::{SymbolDetails, SymbolWhitelist, WhitelistFile};
