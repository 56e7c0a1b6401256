use crate::actions::PlayerAction;
use crate::errors::ViewError;
use pokerbot_engine::game::Game;
use pokerbot_engine::player::Player;

/// Decides whether the contextual control reads `check` or `call`.
///
/// A player who has already matched the table's highest round rate owes
/// nothing and may check; anyone below it must call. A round rate above
/// the maximum means the snapshot is inconsistent and is rejected.
pub fn resolve_contextual_action(game: &Game, player: &Player) -> Result<PlayerAction, ViewError> {
    let owed = game.max_round_rate();
    let committed = player.round_rate();
    if committed > owed {
        return Err(ViewError::PreconditionViolation(format!(
            "player round rate {committed} exceeds table max round rate {owed}"
        )));
    }
    if committed == owed {
        Ok(PlayerAction::Check)
    } else {
        Ok(PlayerAction::Call)
    }
}
