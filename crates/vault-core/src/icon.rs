//! # Icons
//!
//! The closed set of icons the cart and checkout views draw.
//!
//! Keys are the kebab-case names the storefront uses (`"trash-2"`). An unknown
//! key is a parse error, never a silent fallback glyph.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    ShoppingBag,
    X,
    Plus,
    Minus,
    #[serde(rename = "trash-2")]
    Trash2,
    ChevronRight,
    ChevronLeft,
    CreditCard,
    Truck,
    CheckCircle,
    Shield,
    Lock,
    Heart,
    Search,
    Loader,
    User,
    Moon,
    Sun,
    Menu,
}

impl Icon {
    pub const ALL: [Icon; 19] = [
        Icon::ShoppingBag,
        Icon::X,
        Icon::Plus,
        Icon::Minus,
        Icon::Trash2,
        Icon::ChevronRight,
        Icon::ChevronLeft,
        Icon::CreditCard,
        Icon::Truck,
        Icon::CheckCircle,
        Icon::Shield,
        Icon::Lock,
        Icon::Heart,
        Icon::Search,
        Icon::Loader,
        Icon::User,
        Icon::Moon,
        Icon::Sun,
        Icon::Menu,
    ];

    pub const fn key(&self) -> &'static str {
        match self {
            Icon::ShoppingBag => "shopping-bag",
            Icon::X => "x",
            Icon::Plus => "plus",
            Icon::Minus => "minus",
            Icon::Trash2 => "trash-2",
            Icon::ChevronRight => "chevron-right",
            Icon::ChevronLeft => "chevron-left",
            Icon::CreditCard => "credit-card",
            Icon::Truck => "truck",
            Icon::CheckCircle => "check-circle",
            Icon::Shield => "shield",
            Icon::Lock => "lock",
            Icon::Heart => "heart",
            Icon::Search => "search",
            Icon::Loader => "loader",
            Icon::User => "user",
            Icon::Moon => "moon",
            Icon::Sun => "sun",
            Icon::Menu => "menu",
        }
    }

    /// Text rendering for terminals.
    pub const fn glyph(&self) -> &'static str {
        match self {
            Icon::ShoppingBag => "🛍",
            Icon::X => "✕",
            Icon::Plus => "+",
            Icon::Minus => "−",
            Icon::Trash2 => "🗑",
            Icon::ChevronRight => "›",
            Icon::ChevronLeft => "‹",
            Icon::CreditCard => "💳",
            Icon::Truck => "🚚",
            Icon::CheckCircle => "✔",
            Icon::Shield => "🛡",
            Icon::Lock => "🔒",
            Icon::Heart => "♥",
            Icon::Search => "🔍",
            Icon::Loader => "…",
            Icon::User => "👤",
            Icon::Moon => "☾",
            Icon::Sun => "☀",
            Icon::Menu => "☰",
        }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

impl FromStr for Icon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Icon::ALL
            .into_iter()
            .find(|icon| icon.key() == s)
            .ok_or_else(|| format!("unknown icon: {}", s))
    }
}
