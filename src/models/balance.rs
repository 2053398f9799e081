//! Wallet balance models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::primitives::WalletAddress;

/// Number of lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// SOL balance of a single wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    /// Wallet the balance belongs to
    pub wallet: WalletAddress,
    /// Balance in SOL
    pub sol: Decimal,
    /// Balance in lamports
    pub lamports: u64,
}

impl WalletBalance {
    /// Build a balance from a raw lamport amount.
    pub fn from_lamports(wallet: WalletAddress, lamports: u64) -> Self {
        Self {
            wallet,
            sol: lamports_to_sol(lamports),
            lamports,
        }
    }
}

/// Convert lamports to SOL without floating point rounding.
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_lamports_to_sol() {
        assert_eq!(lamports_to_sol(1_500_000_000), dec!(1.5));
        assert_eq!(lamports_to_sol(1), dec!(0.000000001));
        assert_eq!(lamports_to_sol(0), Decimal::ZERO);
    }
}
