use crate::actions::{PlayerAction, RaiseSchedule, RaiseTier};
use crate::errors::ViewError;
use pokerbot_engine::cards::Card;
use serde::Serialize;

/// A single pressable control: what the user sees and what comes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Control {
    pub label: String,
    pub callback_token: String,
}

impl Control {
    pub fn new(label: impl Into<String>, callback_token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_token: callback_token.into(),
        }
    }

    fn action(action: PlayerAction) -> Self {
        Self::new(action.display_label(), action.callback_token())
    }
}

/// Presentation hints for keyboard-style menus. The transport applies them;
/// the view only passes them through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyboardHints {
    /// Show the keyboard only to the user the message addresses
    pub selective: bool,
    /// Let the client shrink the keyboard to fit its buttons
    pub resize: bool,
    /// Hide the keyboard after one press
    pub one_time: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MenuStyle {
    /// Controls attached to the message; presses come back as callback tokens
    Inline,
    /// Controls replacing the user's keyboard; presses come back as the label text
    Keyboard(KeyboardHints),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuLayout {
    pub style: MenuStyle,
    pub rows: Vec<Vec<Control>>,
}

impl MenuLayout {
    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.rows.iter().flatten()
    }

    pub fn find_by_token(&self, token: &str) -> Option<&Control> {
        self.controls().find(|c| c.callback_token == token)
    }
}

/// Builds the control layouts attached to game messages.
#[derive(Debug, Clone)]
pub struct MenuBuilder {
    raise: RaiseSchedule,
    currency_marker: String,
}

impl Default for MenuBuilder {
    fn default() -> Self {
        Self::new(RaiseSchedule::default(), "$")
    }
}

impl MenuBuilder {
    pub fn new(raise: RaiseSchedule, currency_marker: impl Into<String>) -> Self {
        Self {
            raise,
            currency_marker: currency_marker.into(),
        }
    }

    /// Turn menu: `fold`, `all in` and the contextual action on the first
    /// row, one quick-raise per tier (ascending) on the second.
    pub fn build_turn_menu(&self, contextual_action: PlayerAction) -> Result<MenuLayout, ViewError> {
        if !contextual_action.is_contextual() {
            return Err(ViewError::PreconditionViolation(format!(
                "'{contextual_action}' cannot fill the contextual slot (expected call or check)"
            )));
        }

        let actions = vec![
            Control::action(PlayerAction::Fold),
            Control::action(PlayerAction::AllIn),
            Control::action(contextual_action),
        ];
        let raises = RaiseTier::ASCENDING
            .into_iter()
            .map(|tier| {
                Control::new(
                    format!("{}{}", self.raise.amount(tier), self.currency_marker),
                    self.raise.callback_token(tier),
                )
            })
            .collect();

        Ok(MenuLayout {
            style: MenuStyle::Inline,
            rows: vec![actions, raises],
        })
    }

    /// One-row keyboard with the player's cards, shown only to that player.
    pub fn build_card_selection_menu(&self, cards: &[Card]) -> Result<MenuLayout, ViewError> {
        if cards.is_empty() {
            return Err(ViewError::PreconditionViolation(
                "card selection menu needs at least one card".to_string(),
            ));
        }
        let row = cards
            .iter()
            .map(|card| {
                let text = card.to_string();
                Control::new(text.clone(), text)
            })
            .collect();

        Ok(MenuLayout {
            style: MenuStyle::Keyboard(KeyboardHints {
                selective: true,
                resize: true,
                one_time: true,
            }),
            rows: vec![row],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::CallbackData;
    use pokerbot_engine::cards::parse_cards;
    use std::collections::HashSet;

    fn labels(row: &[Control]) -> Vec<&str> {
        row.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn turn_menu_has_fixed_shape() {
        let menu = MenuBuilder::default()
            .build_turn_menu(PlayerAction::Call)
            .expect("menu");
        assert_eq!(menu.style, MenuStyle::Inline);
        assert_eq!(menu.rows.len(), 2);
        assert_eq!(labels(&menu.rows[0]), vec!["fold", "all in", "call"]);
        assert_eq!(labels(&menu.rows[1]), vec!["10$", "25$", "50$"]);
    }

    #[test]
    fn contextual_slot_follows_resolved_action() {
        let menu = MenuBuilder::default()
            .build_turn_menu(PlayerAction::Check)
            .expect("menu");
        assert_eq!(menu.rows[0][2], Control::new("check", "check"));
    }

    #[test]
    fn non_contextual_actions_are_rejected() {
        for action in [PlayerAction::Fold, PlayerAction::AllIn, PlayerAction::Raise] {
            let err = MenuBuilder::default().build_turn_menu(action).unwrap_err();
            assert!(matches!(err, ViewError::PreconditionViolation(_)));
        }
    }

    #[test]
    fn each_raise_control_carries_its_own_tier() {
        let schedule = RaiseSchedule::new(5, 20, 100).expect("schedule");
        let builder = MenuBuilder::new(schedule, "€");
        let menu = builder.build_turn_menu(PlayerAction::Call).expect("menu");

        for (control, tier) in menu.rows[1].iter().zip(RaiseTier::ASCENDING) {
            let amount = schedule.amount(tier);
            assert_eq!(control.label, format!("{amount}€"));
            assert_eq!(
                CallbackData::decode(&control.callback_token),
                Some(CallbackData::Raise(amount))
            );
        }
    }

    #[test]
    fn colliding_raise_amounts_never_reach_the_builder() {
        assert!(RaiseSchedule::new(0, 0, 0).is_err());
        assert!(RaiseSchedule::new(10, 10, 10).is_err());
        assert!(
            serde_json::from_str::<RaiseSchedule>(r#"{"small": 0, "normal": 0, "big": 0}"#)
                .is_err()
        );

        // the tightest schedule accepted still yields three distinct raises
        let schedule = RaiseSchedule::new(1, 2, 3).expect("schedule");
        let menu = MenuBuilder::new(schedule, "$")
            .build_turn_menu(PlayerAction::Call)
            .expect("menu");
        let tokens: HashSet<_> = menu.rows[1].iter().map(|c| &c.callback_token).collect();
        assert_eq!(tokens.len(), 3);
        for tier in RaiseTier::ASCENDING {
            assert_eq!(schedule.tier_for(schedule.amount(tier)), Some(tier));
        }
    }

    #[test]
    fn labels_and_tokens_are_unique_within_menu() {
        for action in [PlayerAction::Call, PlayerAction::Check] {
            let menu = MenuBuilder::default().build_turn_menu(action).expect("menu");
            let labels: HashSet<_> = menu.controls().map(|c| &c.label).collect();
            let tokens: HashSet<_> = menu.controls().map(|c| &c.callback_token).collect();
            assert_eq!(labels.len(), 6);
            assert_eq!(tokens.len(), 6);
        }
    }

    #[test]
    fn card_selection_menu_is_one_selective_row() {
        let cards = parse_cards("AS KD").expect("cards");
        let menu = MenuBuilder::default()
            .build_card_selection_menu(&cards)
            .expect("menu");
        assert_eq!(menu.rows.len(), 1);
        assert_eq!(labels(&menu.rows[0]), vec!["AS", "KD"]);
        assert_eq!(
            menu.style,
            MenuStyle::Keyboard(KeyboardHints {
                selective: true,
                resize: true,
                one_time: true,
            })
        );
    }

    #[test]
    fn card_selection_menu_needs_cards() {
        let err = MenuBuilder::default()
            .build_card_selection_menu(&[])
            .unwrap_err();
        assert!(matches!(err, ViewError::PreconditionViolation(_)));
    }

    #[test]
    fn finds_controls_by_token() {
        let menu = MenuBuilder::default()
            .build_turn_menu(PlayerAction::Call)
            .expect("menu");
        assert_eq!(
            menu.find_by_token("raise:25").map(|c| c.label.as_str()),
            Some("25$")
        );
        assert!(menu.find_by_token("raise:30").is_none());
    }
}
