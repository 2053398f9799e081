//! API service modules for Axiom Trade endpoints.
//!
//! Each service provides methods for interacting with a specific
//! subset of the API.

mod balances;
mod portfolio;
mod tokens;
mod trending;

pub use balances::BalancesService;
pub use portfolio::PortfolioService;
pub use tokens::TokensService;
pub use trending::TrendingService;
