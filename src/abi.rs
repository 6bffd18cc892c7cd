//! Minimal ABI for the settlement contract.
//!
//! Only the event this feed subscribes to is declared; the subscription
//! filter selects it by contract address and signature hash, so nothing
//! else from the contract ABI is needed.

alloy::sol! {
    /// Emitted once per settled position, carrying the margin the
    /// trader entered with and the margin returned at close.
    #[derive(Debug)]
    event MarginSettled(
        address indexed trader,
        uint256 openMargin,
        uint256 closeMargin,
        uint256 profit,
        bool traderWon
    );
}
