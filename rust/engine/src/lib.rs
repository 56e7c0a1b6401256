//! # pokerbot-engine: table snapshots
//!
//! Value types the game engine hands to presentation layers at each
//! decision point. Everything here is an immutable snapshot: building one
//! validates it, and nothing mutates it afterwards.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and its textual form
//! - [`game`] - Table snapshot (community cards, highest round rate, street)
//! - [`player`] - Player snapshot (round rate, chat mention) and [`player::Money`]
//! - [`errors`] - Snapshot validation errors
//!
//! ## Quick Start
//!
//! ```rust
//! use pokerbot_engine::cards::parse_cards;
//! use pokerbot_engine::game::{Game, Street};
//! use pokerbot_engine::player::Player;
//!
//! let flop = parse_cards("AS KD 7H").unwrap();
//! let game = Game::new(flop, 100).unwrap();
//! let player = Player::new("@alice", 40);
//!
//! assert_eq!(game.street(), Street::Flop);
//! assert!(player.round_rate() < game.max_round_rate());
//! ```

pub mod cards;
pub mod errors;
pub mod game;
pub mod player;
