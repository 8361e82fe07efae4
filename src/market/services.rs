use tracing::{info, instrument, warn};

use crate::{
    auth::{User, UserId},
    config::MarketConfig,
    db::Database,
    market::{
        dto::Purchase,
        error::MarketError,
        repo_types::{Listing, Transaction, Transfer},
    },
    tokens::TokenId,
};

fn recipient(db: &Database, username: &str) -> Result<UserId, MarketError> {
    let username = username.trim().to_lowercase();
    db.user_by_username(&username)
        .map(|u| u.id)
        .ok_or(MarketError::RecipientNotFound)
}

fn ensure_token(db: &Database, token: TokenId) -> Result<(), MarketError> {
    match db.token(token) {
        Some(_) => Ok(()),
        None => Err(MarketError::TokenNotFound(token)),
    }
}

#[instrument(skip(db, from), fields(from = from.id))]
pub fn send_lbc(
    db: &mut Database,
    from: &User,
    to_username: &str,
    amount: i64,
) -> Result<Transaction, MarketError> {
    if amount < 0 {
        warn!(amount, "negative send rejected");
        return Err(MarketError::NegativeAmount);
    }
    let to = recipient(db, to_username)?;
    let balance = db.balance(from.id);
    if amount > balance {
        warn!(amount, balance, "send exceeds balance");
        return Err(MarketError::InsufficientBalance { balance, needed: amount });
    }

    let tx = db.write_transaction(from.id, to, Transfer::Currency(amount))?;
    info!(tx_id = tx.id, to, amount, "lbc sent");
    Ok(tx)
}

#[instrument(skip(db, from), fields(from = from.id))]
pub fn send_token(
    db: &mut Database,
    from: &User,
    to_username: &str,
    token: TokenId,
) -> Result<Transaction, MarketError> {
    ensure_token(db, token)?;
    let to = recipient(db, to_username)?;
    let owner = db.ledger().owner(token);
    if owner == Some(to) {
        return Err(MarketError::SendToOwner);
    }
    if owner != Some(from.id) {
        warn!(token, ?owner, "send of token not owned");
        return Err(MarketError::NotOwner);
    }
    if db.ledger().is_listed(token) {
        return Err(MarketError::TokenListed);
    }

    let tx = db.write_transaction(from.id, to, Transfer::Token(token))?;
    info!(tx_id = tx.id, to, token, "token sent");
    Ok(tx)
}

#[instrument(skip(db, config, seller), fields(seller = seller.id))]
pub fn list(
    db: &mut Database,
    config: &MarketConfig,
    seller: &User,
    token: TokenId,
    price: i64,
) -> Result<Listing, MarketError> {
    if price < 0 {
        return Err(MarketError::NegativePrice);
    }
    if price > config.max_listing_amount {
        return Err(MarketError::PriceTooHigh {
            max: config.max_listing_amount,
        });
    }
    ensure_token(db, token)?;
    if db.ledger().is_listed(token) {
        return Err(MarketError::AlreadyListed);
    }
    if !db.ledger().owns(seller.id, token) {
        warn!(token, "listing of token not owned");
        return Err(MarketError::NotOwner);
    }

    let listing = db.write_listing(seller.id, token, Some(price))?;
    info!(listing_id = listing.id, token, price, "token listed");
    Ok(listing)
}

#[instrument(skip(db, seller), fields(seller = seller.id))]
pub fn unlist(db: &mut Database, seller: &User, token: TokenId) -> Result<Listing, MarketError> {
    ensure_token(db, token)?;
    if !db.ledger().is_listed(token) {
        return Err(MarketError::NotListed);
    }
    if !db.ledger().owns(seller.id, token) {
        warn!(token, "unlist of token not owned");
        return Err(MarketError::NotOwner);
    }

    let listing = db.write_listing(seller.id, token, None)?;
    info!(listing_id = listing.id, token, "token unlisted");
    Ok(listing)
}

/// Pays the current owner, moves the token, then clears the listing.
///
/// The three appends are independent writes; a failure part way leaves the
/// earlier rows in place.
#[instrument(skip(db, buyer), fields(buyer = buyer.id))]
pub fn buy(db: &mut Database, buyer: &User, token: TokenId) -> Result<Purchase, MarketError> {
    ensure_token(db, token)?;
    let price = db
        .ledger()
        .listing(token)
        .map(|l| l.price)
        .ok_or(MarketError::NotListed)?;
    let owner = db.ledger().owner(token).ok_or(MarketError::Unowned(token))?;
    if owner == buyer.id {
        return Err(MarketError::AlreadyOwned);
    }
    if price < 0 {
        return Err(MarketError::NegativePrice);
    }
    let balance = db.balance(buyer.id);
    if balance < price {
        warn!(token, price, balance, "purchase exceeds balance");
        return Err(MarketError::InsufficientBalance { balance, needed: price });
    }

    let payment = db.write_transaction(buyer.id, owner, Transfer::Currency(price))?;
    let delivery = db.write_transaction(owner, buyer.id, Transfer::Token(token))?;
    let delisting = db.write_listing(crate::auth::SYSTEM_USER_ID, token, None)?;
    info!(token, price, seller = owner, "token bought");
    Ok(Purchase {
        payment,
        delivery,
        delisting,
    })
}
