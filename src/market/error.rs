use thiserror::Error;

use crate::{store::StoreError, tokens::TokenId};

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Can't send negative LBC.")]
    NegativeAmount,
    #[error("Recipient does not exist.")]
    RecipientNotFound,
    #[error("Insufficient balance")]
    InsufficientBalance { balance: i64, needed: i64 },
    #[error("Token does not exist.")]
    TokenNotFound(TokenId),
    #[error("You can't send tokens to yourself.")]
    SendToOwner,
    #[error("You don't own this item.")]
    NotOwner,
    #[error("You can't send a token listed for sale.")]
    TokenListed,
    #[error("Can't list for negative LBC.")]
    NegativePrice,
    #[error("Must list for less than {max} LBC.")]
    PriceTooHigh { max: i64 },
    #[error("Token is already for sale.")]
    AlreadyListed,
    #[error("Token is not for sale.")]
    NotListed,
    #[error("You already own this item.")]
    AlreadyOwned,
    #[error("Token {0} has no owner.")]
    Unowned(TokenId),
    #[error(transparent)]
    Store(#[from] StoreError),
}
