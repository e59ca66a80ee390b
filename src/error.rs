use crate::model::Rarity;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TradeupError {
    #[error("a trade-up takes exactly {expected} inputs, got {got}")]
    WrongInputCount { expected: usize, got: usize },
    #[error("trade-up inputs mix rarities: {first} and {other}")]
    MixedRarity { first: Rarity, other: Rarity },
    #[error("{0} is the top rarity and cannot be traded up")]
    TerminalRarity(Rarity),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid rarity: {0}")]
    InvalidRarity(String),
    #[error("Invalid wear: {0}")]
    InvalidWear(String),
}
