//! Closed vocabularies of user-facing choices.
//!
//! Every choice carries two fixed projections: the label shown on a control
//! and the callback token the transport hands back when the control is
//! pressed. They are never derived from each other at the call site.

use crate::settings::SettingsError;
use pokerbot_engine::player::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

const RAISE_TOKEN_PREFIX: &str = "raise:";

/// What a player can do on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Fold,
    Call,
    Check,
    AllIn,
    Raise,
}

impl PlayerAction {
    pub const ALL: [PlayerAction; 5] = [
        PlayerAction::Fold,
        PlayerAction::Call,
        PlayerAction::Check,
        PlayerAction::AllIn,
        PlayerAction::Raise,
    ];

    pub fn display_label(self) -> &'static str {
        match self {
            PlayerAction::Fold => "fold",
            PlayerAction::Call => "call",
            PlayerAction::Check => "check",
            PlayerAction::AllIn => "all in",
            PlayerAction::Raise => "raise",
        }
    }

    pub fn callback_token(self) -> &'static str {
        match self {
            PlayerAction::Fold => "fold",
            PlayerAction::Call => "call",
            PlayerAction::Check => "check",
            PlayerAction::AllIn => "all_in",
            PlayerAction::Raise => "raise",
        }
    }

    /// Whether this action can fill the state-dependent slot of a turn menu.
    pub fn is_contextual(self) -> bool {
        matches!(self, PlayerAction::Call | PlayerAction::Check)
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

/// Preset quick-raise stake tiers, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaiseTier {
    Small,
    Normal,
    Big,
}

impl RaiseTier {
    pub const ASCENDING: [RaiseTier; 3] = [RaiseTier::Small, RaiseTier::Normal, RaiseTier::Big];

    pub fn default_amount(self) -> Money {
        match self {
            RaiseTier::Small => 10,
            RaiseTier::Normal => 25,
            RaiseTier::Big => 50,
        }
    }
}

/// Stake amount for each [`RaiseTier`].
///
/// Amounts are positive and strictly increasing, which keeps both the
/// labels and the callback tokens of the raise row unique. Every way of
/// building one ([`RaiseSchedule::new`], deserialization) checks this, so a
/// schedule in hand is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RaiseAmounts")]
pub struct RaiseSchedule {
    small: Money,
    normal: Money,
    big: Money,
}

/// Unchecked wire form of a [`RaiseSchedule`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RaiseAmounts {
    small: Money,
    normal: Money,
    big: Money,
}

impl TryFrom<RaiseAmounts> for RaiseSchedule {
    type Error = SettingsError;

    fn try_from(raw: RaiseAmounts) -> Result<Self, Self::Error> {
        RaiseSchedule::new(raw.small, raw.normal, raw.big)
    }
}

impl Default for RaiseSchedule {
    fn default() -> Self {
        Self {
            small: RaiseTier::Small.default_amount(),
            normal: RaiseTier::Normal.default_amount(),
            big: RaiseTier::Big.default_amount(),
        }
    }
}

impl RaiseSchedule {
    pub fn new(small: Money, normal: Money, big: Money) -> Result<Self, SettingsError> {
        let schedule = Self { small, normal, big };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.small == 0 {
            return Err(SettingsError::InvalidValue(
                "raise.small must be greater than 0".to_string(),
            ));
        }
        if self.small >= self.normal || self.normal >= self.big {
            return Err(SettingsError::InvalidValue(format!(
                "raise amounts must increase strictly: small={} normal={} big={}",
                self.small, self.normal, self.big
            )));
        }
        Ok(())
    }

    pub fn amount(&self, tier: RaiseTier) -> Money {
        match tier {
            RaiseTier::Small => self.small,
            RaiseTier::Normal => self.normal,
            RaiseTier::Big => self.big,
        }
    }

    /// Callback token of the control that raises by `tier`'s amount.
    pub fn callback_token(&self, tier: RaiseTier) -> String {
        format!("{RAISE_TOKEN_PREFIX}{}", self.amount(tier))
    }

    pub fn tier_for(&self, amount: Money) -> Option<RaiseTier> {
        RaiseTier::ASCENDING
            .into_iter()
            .find(|&tier| self.amount(tier) == amount)
    }
}

/// A decoded callback token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackData {
    Action(PlayerAction),
    Raise(Money),
}

impl CallbackData {
    pub fn decode(token: &str) -> Option<CallbackData> {
        if let Some(amount) = token.strip_prefix(RAISE_TOKEN_PREFIX) {
            // digits only: `u32::from_str` would also take a leading '+'
            if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            return amount.parse().ok().map(CallbackData::Raise);
        }
        PlayerAction::ALL
            .into_iter()
            .find(|action| action.callback_token() == token)
            .map(CallbackData::Action)
    }

    pub fn encode(&self) -> String {
        match self {
            CallbackData::Action(action) => action.callback_token().to_string(),
            CallbackData::Raise(amount) => format!("{RAISE_TOKEN_PREFIX}{amount}"),
        }
    }
}
