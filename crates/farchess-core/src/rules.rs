//! Game rules: the configuration surface a variant generator supplies.

use crate::player::Player;

/// A win condition assignable per player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WinCondition {
    Checkmate,
    RoyalCapture,
    AllRoyalsCaptured,
    ThreeCheck,
    KingOfTheHill,
    Stalemate,
}

/// The full configurable rule set for a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRules {
    /// Ordered sequence of players who take turns; index 0 moves first.
    pub turn_order: Vec<Player>,
    /// Win conditions active for each player (checked against the *opponent*
    /// delivering them, per the usual chess convention).
    pub win_conditions: Vec<(Player, Vec<WinCondition>)>,
    /// Ranks (`y` coordinates) on which each player's pawns promote.
    pub promotion_ranks: Vec<(Player, Vec<i64>)>,
    /// Raw types each player may promote into.
    pub promotions_allowed: Vec<(Player, Vec<crate::raw_type::RawType>)>,
    /// Move-rule (50-move-rule analogue) threshold in halfmoves; 0 disables it.
    pub move_rule: u32,
}

impl GameRules {
    /// Standard two-player chess rules: alternating turns, checkmate only,
    /// promotion on the far rank to any of N/B/R/Q, 50-move rule.
    pub fn standard_chess() -> GameRules {
        use crate::raw_type::RawType;
        GameRules {
            turn_order: vec![Player::White, Player::Black],
            win_conditions: vec![
                (Player::White, vec![WinCondition::Checkmate]),
                (Player::Black, vec![WinCondition::Checkmate]),
            ],
            promotion_ranks: vec![(Player::White, vec![8]), (Player::Black, vec![1])],
            promotions_allowed: vec![
                (Player::White, vec![RawType::Knight, RawType::Bishop, RawType::Rook, RawType::Queen]),
                (Player::Black, vec![RawType::Knight, RawType::Bishop, RawType::Rook, RawType::Queen]),
            ],
            move_rule: 100,
        }
    }

    pub fn win_conditions_for(&self, player: Player) -> &[WinCondition] {
        self.win_conditions
            .iter()
            .find(|(p, _)| *p == player)
            .map(|(_, wc)| wc.as_slice())
            .unwrap_or(&[])
    }

    pub fn uses_checkmate(&self, player: Player) -> bool {
        self.win_conditions_for(player).contains(&WinCondition::Checkmate)
    }

    pub fn promotion_ranks_for(&self, player: Player) -> &[i64] {
        self.promotion_ranks
            .iter()
            .find(|(p, _)| *p == player)
            .map(|(_, r)| r.as_slice())
            .unwrap_or(&[])
    }

    pub fn promotions_allowed_for(&self, player: Player) -> &[crate::raw_type::RawType] {
        self.promotions_allowed
            .iter()
            .find(|(p, _)| *p == player)
            .map(|(_, r)| r.as_slice())
            .unwrap_or(&[])
    }

    /// The player immediately after `player` in turn order, wrapping around.
    pub fn next_turn(&self, player: Player) -> Player {
        let pos = self.turn_order.iter().position(|&p| p == player).unwrap_or(0);
        self.turn_order[(pos + 1) % self.turn_order.len()]
    }
}
