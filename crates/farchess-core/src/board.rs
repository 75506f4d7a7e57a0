//! The board model: piece placement, organized lines, rights, and turn state.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::chess_move::Move;
use crate::coord::Coord;
use crate::moveset::{moveset_for, VicinityTables};
use crate::piece::Piece;
use crate::piece_type::PieceType;
use crate::player::Player;
use crate::raw_type::RawType;
use crate::rules::GameRules;
use crate::zobrist;

/// The en-passant record: the square an enemy pawn may move onto to capture,
/// and the coordinate of the pawn that capture removes (distinct from the
/// target square in the standard "pawn sits one rank behind its push" sense).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnPassantState {
    pub square: Coord,
    pub pawn: Coord,
}

/// A piece attacking a royal square, as recorded by the check detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attacker {
    pub coords: Coord,
    pub sliding_check: bool,
    pub path: Option<Vec<Coord>>,
}

/// Canonical key for an organized line: a primitive direction and the
/// perpendicular offset identifying which parallel line it is.
pub type LineKey = (Coord, i64);

/// The mutable game position. Every other component (C2-C8) is a stateless
/// function over a `&Board` (or, for C6, a `&mut Board` during simulation).
#[derive(Debug, Clone)]
pub struct Board {
    pieces: HashMap<Coord, Piece>,
    next_slot: u32,
    organized_lines: HashMap<LineKey, BTreeMap<i64, Coord>>,
    active_directions: Vec<Coord>,
    special_rights: HashSet<Coord>,
    en_passant: Option<EnPassantState>,
    turn: Player,
    move_index: u64,
    move_list: Vec<Move>,
    in_check: bool,
    attackers: Vec<Attacker>,
    move_rule_counter: u32,
    rules: GameRules,
    hash: u64,
    vicinity: VicinityTables,
}

impl Board {
    /// Build a board from an initial placement. `special_right_coords` marks
    /// which starting squares retain their special right (castling rooks and
    /// kings, pawns eligible for a double push).
    pub fn new(
        placement: Vec<(Coord, PieceType)>,
        special_right_coords: HashSet<Coord>,
        rules: GameRules,
    ) -> Board {
        let active_types: Vec<RawType> = {
            let mut set: HashSet<RawType> = HashSet::new();
            for &(_, pt) in &placement {
                set.insert(pt.get_raw());
            }
            set.into_iter().collect()
        };
        let active_directions = {
            let mut dirs: HashSet<Coord> = HashSet::new();
            for &raw in &active_types {
                let descriptor = moveset_for(PieceType::build(raw, Player::White));
                for d in descriptor.sliding {
                    dirs.insert(d);
                }
            }
            dirs.into_iter().collect::<Vec<_>>()
        };
        let vicinity = VicinityTables::build(&active_types);

        let mut board = Board {
            pieces: HashMap::new(),
            next_slot: 0,
            organized_lines: HashMap::new(),
            active_directions,
            special_rights: special_right_coords,
            en_passant: None,
            turn: rules.turn_order.first().copied().unwrap_or(Player::White),
            move_index: 0,
            move_list: Vec::new(),
            in_check: false,
            attackers: Vec::new(),
            move_rule_counter: 0,
            rules,
            hash: 0,
            vicinity,
        };

        for (coord, piece_type) in placement {
            board.insert_piece_initial(coord, piece_type);
        }
        board.hash = board.hash_from_scratch();
        board
    }

    /// The standard 8x8 chess starting position, for tests and as the
    /// engine's default when no variant generator supplies one.
    pub fn starting_position() -> Board {
        use RawType::*;
        let back_rank = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        let mut placement = Vec::with_capacity(32);
        let mut special_rights = HashSet::new();
        for (i, &raw) in back_rank.iter().enumerate() {
            let x = i as i64 + 1;
            placement.push((Coord::new(x, 1), PieceType::build(raw, Player::White)));
            placement.push((Coord::new(x, 8), PieceType::build(raw, Player::Black)));
            placement.push((Coord::new(x, 2), PieceType::build(Pawn, Player::White)));
            placement.push((Coord::new(x, 7), PieceType::build(Pawn, Player::Black)));
            if matches!(raw, Rook | King) {
                special_rights.insert(Coord::new(x, 1));
                special_rights.insert(Coord::new(x, 8));
            }
        }
        for x in 1..=8 {
            special_rights.insert(Coord::new(x, 2));
            special_rights.insert(Coord::new(x, 7));
        }
        Board::new(placement, special_rights, GameRules::standard_chess())
    }

    // -- accessors --------------------------------------------------------

    pub fn piece_at(&self, coord: Coord) -> Option<&Piece> {
        self.pieces.get(&coord)
    }

    pub fn is_empty(&self, coord: Coord) -> bool {
        !self.pieces.contains_key(&coord)
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn move_index(&self) -> u64 {
        self.move_index
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn in_check(&self) -> bool {
        self.in_check
    }

    pub fn attackers(&self) -> &[Attacker] {
        &self.attackers
    }

    pub fn has_special_right(&self, coord: Coord) -> bool {
        self.special_rights.contains(&coord)
    }

    pub fn en_passant(&self) -> Option<EnPassantState> {
        self.en_passant
    }

    pub fn move_rule_counter(&self) -> u32 {
        self.move_rule_counter
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn vicinity(&self) -> &VicinityTables {
        &self.vicinity
    }

    pub fn active_directions(&self) -> &[Coord] {
        &self.active_directions
    }

    pub fn move_list(&self) -> &[Move] {
        &self.move_list
    }

    pub fn royals_of(&self, player: Player) -> Vec<Coord> {
        self.pieces
            .values()
            .filter(|p| p.piece_type.is_royal() && p.piece_type.get_color() == player)
            .map(|p| p.coords)
            .collect()
    }

    pub fn all_pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    pub fn pieces_of(&self, player: Player) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.values().filter(move |p| p.piece_type.get_color() == player)
    }

    /// The organized line through `coord` in direction `d`, if any pieces
    /// occupy it (including `coord` itself, when occupied).
    pub fn line_through(&self, d: Coord, coord: Coord) -> Option<&BTreeMap<i64, Coord>> {
        let key = coord.line_key(d);
        self.organized_lines.get(&key)
    }

    pub fn line_key_of(coord: Coord, d: Coord) -> LineKey {
        coord.line_key(d)
    }

    /// Monotonic ordering key along `d` used to sort an organized line.
    pub fn dot_along(coord: Coord, d: Coord) -> i64 {
        coord.x * d.x + coord.y * d.y
    }

    // -- mutation (pub(crate): only the executor mutates a board) ---------

    fn insert_piece_initial(&mut self, coord: Coord, piece_type: PieceType) {
        let slot = self.next_slot;
        self.next_slot += 1;
        let piece = Piece::new(piece_type, coord, slot);
        self.pieces.insert(coord, piece);
        for &d in &self.active_directions.clone() {
            let key = coord.line_key(d);
            self.organized_lines.entry(key).or_default().insert(Self::dot_along(coord, d), coord);
        }
    }

    pub(crate) fn insert_piece(&mut self, coord: Coord, piece_type: PieceType) -> Piece {
        let slot = self.next_slot;
        self.next_slot += 1;
        let piece = Piece::new(piece_type, coord, slot);
        self.pieces.insert(coord, piece);
        for &d in &self.active_directions {
            let key = coord.line_key(d);
            self.organized_lines.entry(key).or_default().insert(Self::dot_along(coord, d), coord);
        }
        self.hash ^= zobrist::piece_square_key(piece_type, coord);
        piece
    }

    pub(crate) fn remove_piece(&mut self, coord: Coord) -> Option<Piece> {
        let piece = self.pieces.remove(&coord)?;
        for &d in &self.active_directions {
            let key = coord.line_key(d);
            if let Some(line) = self.organized_lines.get_mut(&key) {
                line.remove(&Self::dot_along(coord, d));
                if line.is_empty() {
                    self.organized_lines.remove(&key);
                }
            }
        }
        self.hash ^= zobrist::piece_square_key(piece.piece_type, coord);
        Some(piece)
    }

    pub(crate) fn set_en_passant(&mut self, new: Option<EnPassantState>) {
        if let Some(old) = self.en_passant {
            self.hash ^= zobrist::en_passant_key(old.square);
        }
        if let Some(new_state) = new {
            self.hash ^= zobrist::en_passant_key(new_state.square);
        }
        self.en_passant = new;
    }

    pub(crate) fn revoke_special_right(&mut self, coord: Coord) -> bool {
        let had = self.special_rights.remove(&coord);
        if had {
            self.hash ^= zobrist::special_right_key(coord);
        }
        had
    }

    pub(crate) fn grant_special_right(&mut self, coord: Coord) {
        if self.special_rights.insert(coord) {
            self.hash ^= zobrist::special_right_key(coord);
        }
    }

    pub(crate) fn set_move_rule_counter(&mut self, value: u32) {
        self.move_rule_counter = value;
    }

    pub(crate) fn set_turn(&mut self, player: Player) {
        self.hash ^= zobrist::side_to_move_key(self.turn);
        self.turn = player;
        self.hash ^= zobrist::side_to_move_key(self.turn);
    }

    pub(crate) fn set_in_check(&mut self, in_check: bool, attackers: Vec<Attacker>) {
        self.in_check = in_check;
        self.attackers = attackers;
    }

    pub(crate) fn push_move(&mut self, mv: Move) {
        self.move_list.push(mv);
        self.move_index += 1;
    }

    pub(crate) fn pop_move(&mut self) -> Option<Move> {
        self.move_index = self.move_index.saturating_sub(1);
        self.move_list.pop()
    }

    /// Recompute the full hash from scratch. Used by `new` and by tests that
    /// check the incrementally-maintained hash never drifts.
    pub fn hash_from_scratch(&self) -> u64 {
        let mut hash = 0u64;
        for piece in self.pieces.values() {
            hash ^= zobrist::piece_square_key(piece.piece_type, piece.coords);
        }
        hash ^= zobrist::side_to_move_key(self.turn);
        for &coord in &self.special_rights {
            hash ^= zobrist::special_right_key(coord);
        }
        if let Some(ep) = self.en_passant {
            hash ^= zobrist::en_passant_key(ep.square);
        }
        hash
    }
}
