use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use chrono::{DateTime, Utc};

/// A price or monetary amount in the smallest currency unit (cents).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    #[inline]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, cents / 100, cents % 100)
    }
}

impl Add for Price {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Price {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * i64::from(rhs))
    }
}

impl AddAssign for Price {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Price {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// Unique order identifier, assigned from a process-wide counter at
/// creation. Later orders always carry larger ids, which makes the id the
/// arrival-order tie-break for every priority policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct OrderId(u64);

static ORDER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

impl OrderId {
    #[inline]
    pub fn next() -> Self {
        Self(ORDER_ID_COUNTER.fetch_add(1, AtomicOrdering::Relaxed))
    }

    #[inline]
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    #[inline]
    pub fn is_buy(self) -> bool {
        matches!(self, Side::Buy)
    }

    #[inline]
    pub fn is_sell(self) -> bool {
        matches!(self, Side::Sell)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Market orders execute as soon as the exchange is open; stop orders wait
/// in a per-symbol queue until the market price crosses their trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    Market,
    Stop(Price),
}

impl OrderKind {
    #[inline]
    pub fn trigger(&self) -> Option<Price> {
        match self {
            OrderKind::Market => None,
            OrderKind::Stop(price) => Some(*price),
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Market => write!(f, "MARKET"),
            OrderKind::Stop(price) => write!(f, "STOP@{}", price),
        }
    }
}

/// A request to buy or sell shares of a symbol. Immutable once constructed;
/// the execution price is reported to the account, never written back here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    account: String,
    symbol: String,
    shares: u32,
    side: Side,
    kind: OrderKind,
    placed_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn market(account: impl Into<String>, symbol: impl Into<String>, side: Side, shares: u32) -> Self {
        Self {
            id: OrderId::next(),
            account: account.into(),
            symbol: symbol.into(),
            shares,
            side,
            kind: OrderKind::Market,
            placed_at: Utc::now(),
        }
    }

    #[inline]
    pub fn stop(
        account: impl Into<String>,
        symbol: impl Into<String>,
        side: Side,
        shares: u32,
        trigger: Price,
    ) -> Self {
        Self {
            id: OrderId::next(),
            account: account.into(),
            symbol: symbol.into(),
            shares,
            side,
            kind: OrderKind::Stop(trigger),
            placed_at: Utc::now(),
        }
    }

    #[inline]
    pub fn id(&self) -> OrderId {
        self.id
    }

    #[inline]
    pub fn account(&self) -> &str {
        &self.account
    }

    #[inline]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[inline]
    pub fn shares(&self) -> u32 {
        self.shares
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    #[inline]
    pub fn trigger_price(&self) -> Option<Price> {
        self.kind.trigger()
    }

    #[inline]
    pub fn is_market(&self) -> bool {
        matches!(self.kind, OrderKind::Market)
    }

    #[inline]
    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "order {}: {} {} {} x{} [{}]",
            self.id, self.side, self.kind, self.symbol, self.shares, self.account
        )
    }
}
