//! Game registry and move orchestration

use fiar_core::{
    Game, GameId, GameStatus, InvalidRequest, MAX_BOARD_CELLS, Result, check_win, is_board_full,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, info};

/// Registry of active games.
///
/// The map lock only guards structure (insert, clear, snapshot). Each game
/// sits behind its own mutex, so moves on different games never contend and
/// at most one move per game is in flight.
pub struct GameRegistry {
    games: RwLock<HashMap<GameId, Arc<Mutex<Game>>>>,
    rng: Mutex<StdRng>,
}

impl GameRegistry {
    /// Create an empty registry seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an empty registry with a reproducible starting-player sequence
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Create an empty registry drawing starting players from `rng`
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            rng: Mutex::new(rng),
        }
    }

    /// Create and store a new game
    pub fn create_game(
        &self,
        player_one: &str,
        player_two: &str,
        width: i64,
        height: i64,
    ) -> Result<Game> {
        let (columns, rows) = board_size(width, height)
            .ok_or(InvalidRequest::BadDimensions { width, height })?;
        if player_one.is_empty() || player_two.is_empty() {
            return Err(InvalidRequest::EmptyPlayerName.into());
        }

        let game = {
            let mut rng = lock(&self.rng);
            Game::new(player_one, player_two, columns, rows, &mut *rng)
        };

        self.games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(game.id, Arc::new(Mutex::new(game.clone())));

        info!(
            "Created game {} ({} vs {}, {}x{}), {} starts",
            game.id, game.player_one, game.player_two, width, height, game.current_player
        );
        Ok(game)
    }

    /// Snapshot of a stored game
    pub fn get_game(&self, id: &GameId) -> Result<Game> {
        let entry = self.entry(id)?;
        let game = lock(&entry).clone();
        Ok(game)
    }

    /// Drop `player`'s marker into `column` and advance the game.
    ///
    /// All checks run before the board is touched, so a rejected move leaves
    /// the game unchanged.
    pub fn make_move(&self, id: &GameId, player: &str, column: i64) -> Result<Game> {
        if player.is_empty() {
            return Err(InvalidRequest::EmptyPlayerName.into());
        }

        let entry = self.entry(id)?;
        let mut game = lock(&entry);

        if game.status.is_terminal() {
            return Err(InvalidRequest::GameOver(*id).into());
        }
        let marker = game
            .marker_for(player)
            .ok_or_else(|| InvalidRequest::UnknownPlayer(player.to_string()))?;
        if game.current_player != player {
            return Err(InvalidRequest::NotYourTurn(player.to_string()).into());
        }
        let col = usize::try_from(column)
            .ok()
            .filter(|&c| c < game.board.width())
            .ok_or(InvalidRequest::InvalidColumn(column))?;
        if game.board.is_column_full(col) {
            return Err(InvalidRequest::ColumnFull(col).into());
        }
        let row = game
            .board
            .lowest_empty_row(col)
            .ok_or(InvalidRequest::ColumnFull(col))?;

        game.board.set(row, col, marker.into());
        debug!(
            "Game {}: {} (player {}) dropped into column {}, landed on row {}",
            id,
            player,
            marker.number(),
            col,
            row
        );

        let status = check_win(marker, &game.board);
        if status.is_terminal() {
            game.status = status;
            info!("Game {} won by {} ({})", id, player, status);
        } else if is_board_full(&game.board) {
            game.status = GameStatus::Draw;
            info!("Game {} ended in a draw", id);
        } else {
            game.current_player = game.opponent_of(marker).to_string();
        }

        Ok(game.clone())
    }

    /// Snapshot of every stored game, in no particular order
    pub fn list_games(&self) -> Vec<Game> {
        let entries: Vec<Arc<Mutex<Game>>> = self
            .games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        entries.iter().map(|entry| lock(entry).clone()).collect()
    }

    /// Remove every game
    pub fn reset(&self) {
        let mut games = self.games.write().unwrap_or_else(PoisonError::into_inner);
        let removed = games.len();
        games.clear();
        info!("Game store reset, {} games removed", removed);
    }

    /// Number of stored games
    pub fn count(&self) -> usize {
        self.games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn entry(&self, id: &GameId) -> Result<Arc<Mutex<Game>>> {
        self.games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| InvalidRequest::GameNotFound(id.to_string()).into())
    }
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Positive dimensions whose cell count stays within `MAX_BOARD_CELLS`
fn board_size(width: i64, height: i64) -> Option<(usize, usize)> {
    let columns = usize::try_from(width).ok().filter(|&w| w > 0)?;
    let rows = usize::try_from(height).ok().filter(|&h| h > 0)?;
    columns
        .checked_mul(rows)
        .filter(|&cells| cells <= MAX_BOARD_CELLS)
        .map(|_| (columns, rows))
}

/// Every critical section validates before mutating, so a poisoned game is
/// still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fiar_core::{Cell, FiarError};
    use uuid::Uuid;

    fn invalid(result: Result<Game>) -> InvalidRequest {
        match result {
            Err(FiarError::InvalidRequest(reason)) => reason,
            other => panic!("Expected InvalidRequest, got {:?}", other),
        }
    }

    /// Registry whose first game starts with player one
    fn registry_where_alice_starts() -> (GameRegistry, Game) {
        for seed in 0..64 {
            let registry = GameRegistry::with_seed(seed);
            let game = registry.create_game("Alice", "Bob", 7, 6).unwrap();
            if game.current_player == "Alice" {
                return (registry, game);
            }
        }
        panic!("No seed in range lets Alice start");
    }

    fn play(registry: &GameRegistry, id: &GameId, moves: &[(&str, i64)]) -> Game {
        let mut last = None;
        for &(player, column) in moves {
            last = Some(registry.make_move(id, player, column).unwrap());
        }
        last.unwrap()
    }

    #[test]
    fn test_create_game() {
        let registry = GameRegistry::with_seed(1);
        let game = registry.create_game("Alice", "Bob", 7, 6).unwrap();

        assert_eq!(game.player_one, "Alice");
        assert_eq!(game.player_two, "Bob");
        assert_eq!(game.status, GameStatus::InProgress);
        assert_eq!(game.board.height(), 6);
        assert_eq!(game.board.width(), 7);
        assert!(game.board.rows().iter().flatten().all(|&c| c == Cell::Empty));
        assert!(game.current_player == "Alice" || game.current_player == "Bob");
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_create_game_rejects_bad_dimensions() {
        let registry = GameRegistry::with_seed(1);
        assert!(matches!(
            invalid(registry.create_game("Alice", "Bob", 0, 7)),
            InvalidRequest::BadDimensions { .. }
        ));
        assert!(matches!(
            invalid(registry.create_game("Alice", "Bob", 6, -1)),
            InvalidRequest::BadDimensions { .. }
        ));
        assert!(matches!(
            invalid(registry.create_game("Alice", "Bob", -5, -5)),
            InvalidRequest::BadDimensions { .. }
        ));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_create_game_rejects_oversized_boards() {
        let registry = GameRegistry::with_seed(1);
        for (width, height) in [
            (1, i64::MAX),
            (i64::MAX, 1),
            (1 << 40, 1),
            (i64::MAX, i64::MAX),
            (MAX_BOARD_CELLS as i64 + 1, 1),
            (1 << 9, 1 << 8),
        ] {
            assert_eq!(
                invalid(registry.create_game("Alice", "Bob", width, height)),
                InvalidRequest::BadDimensions { width, height }
            );
        }
        assert_eq!(registry.count(), 0);

        let largest = registry
            .create_game("Alice", "Bob", MAX_BOARD_CELLS as i64, 1)
            .unwrap();
        assert_eq!(largest.board.width(), MAX_BOARD_CELLS);
    }

    #[test]
    fn test_create_game_rejects_empty_names() {
        let registry = GameRegistry::with_seed(1);
        assert_eq!(
            invalid(registry.create_game("", "Bob", 6, 7)),
            InvalidRequest::EmptyPlayerName
        );
        assert_eq!(
            invalid(registry.create_game("Alice", "", 6, 7)),
            InvalidRequest::EmptyPlayerName
        );
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_tiny_board_is_allowed() {
        let registry = GameRegistry::with_seed(1);
        let game = registry.create_game("Alice", "Bob", 1, 1).unwrap();
        let starter = game.current_player.clone();
        let game = registry.make_move(&game.id, &starter, 0).unwrap();
        assert_eq!(game.status, GameStatus::Draw);
        assert_eq!(game.current_player, starter);
    }

    #[test]
    fn test_get_game_is_stable() {
        let registry = GameRegistry::with_seed(1);
        let created = registry.create_game("Alice", "Bob", 7, 6).unwrap();

        let first = registry.get_game(&created.id).unwrap();
        let second = registry.get_game(&created.id).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, created);
    }

    #[test]
    fn test_get_game_unknown_id() {
        let registry = GameRegistry::with_seed(1);
        assert!(matches!(
            invalid(registry.get_game(&Uuid::new_v4())),
            InvalidRequest::GameNotFound(_)
        ));
    }

    #[test]
    fn test_first_move_lands_on_bottom_row() {
        let registry = GameRegistry::with_seed(5);
        let game = registry.create_game("Alice", "Bob", 7, 6).unwrap();
        let mover = game.current_player.clone();
        let marker = game.marker_for(&mover).unwrap();

        let updated = registry.make_move(&game.id, &mover, 3).unwrap();

        assert_eq!(updated.status, GameStatus::InProgress);
        assert_eq!(updated.board.get(5, 3), Some(marker.into()));
        assert_ne!(updated.current_player, mover);
    }

    #[test]
    fn test_turns_alternate_and_stack_upwards() {
        let (registry, game) = registry_where_alice_starts();
        let mut expected_player = "Alice";

        for k in 0..6 {
            let updated = registry.make_move(&game.id, expected_player, 2).unwrap();
            let row = 5 - k;
            let cell = if expected_player == "Alice" {
                Cell::PlayerOne
            } else {
                Cell::PlayerTwo
            };
            assert_eq!(updated.board.get(row, 2), Some(cell));
            expected_player = if expected_player == "Alice" { "Bob" } else { "Alice" };
            assert_eq!(updated.current_player, expected_player);
        }
    }

    #[test]
    fn test_rejects_wrong_turn_and_unknown_player() {
        let (registry, game) = registry_where_alice_starts();

        assert_eq!(
            invalid(registry.make_move(&game.id, "Bob", 3)),
            InvalidRequest::NotYourTurn("Bob".into())
        );
        assert_eq!(
            invalid(registry.make_move(&game.id, "Charlie", 3)),
            InvalidRequest::UnknownPlayer("Charlie".into())
        );
        assert_eq!(
            invalid(registry.make_move(&game.id, "", 3)),
            InvalidRequest::EmptyPlayerName
        );
        assert_eq!(registry.get_game(&game.id).unwrap(), game);
    }

    #[test]
    fn test_rejects_out_of_range_column() {
        let (registry, game) = registry_where_alice_starts();

        assert_eq!(
            invalid(registry.make_move(&game.id, "Alice", -1)),
            InvalidRequest::InvalidColumn(-1)
        );
        assert_eq!(
            invalid(registry.make_move(&game.id, "Alice", 7)),
            InvalidRequest::InvalidColumn(7)
        );
        assert_eq!(registry.get_game(&game.id).unwrap(), game);
    }

    #[test]
    fn test_rejects_full_column() {
        let registry = GameRegistry::with_seed(9);
        let game = registry.create_game("Alice", "Bob", 7, 6).unwrap();
        for _ in 0..6 {
            let current = registry.get_game(&game.id).unwrap().current_player;
            registry.make_move(&game.id, &current, 0).unwrap();
        }

        let before = registry.get_game(&game.id).unwrap();
        assert_eq!(
            invalid(registry.make_move(&game.id, &before.current_player, 0)),
            InvalidRequest::ColumnFull(0)
        );
        assert_eq!(registry.get_game(&game.id).unwrap(), before);
    }

    #[test]
    fn test_rejects_unknown_game() {
        let registry = GameRegistry::with_seed(1);
        assert!(matches!(
            invalid(registry.make_move(&Uuid::new_v4(), "Alice", 3)),
            InvalidRequest::GameNotFound(_)
        ));
    }

    #[test]
    fn test_horizontal_win_freezes_game() {
        let (registry, game) = registry_where_alice_starts();
        let finished = play(
            &registry,
            &game.id,
            &[
                ("Alice", 0),
                ("Bob", 0),
                ("Alice", 1),
                ("Bob", 0),
                ("Alice", 2),
                ("Bob", 1),
                ("Alice", 3),
            ],
        );

        assert_eq!(finished.status, GameStatus::PlayerOneWon);
        assert_eq!(finished.current_player, "Alice");

        assert_eq!(
            invalid(registry.make_move(&game.id, "Alice", 4)),
            InvalidRequest::GameOver(game.id)
        );
        assert_eq!(
            invalid(registry.make_move(&game.id, "Bob", 4)),
            InvalidRequest::GameOver(game.id)
        );
        assert_eq!(registry.get_game(&game.id).unwrap(), finished);
    }

    #[test]
    fn test_vertical_win_for_player_two() {
        let (registry, game) = registry_where_alice_starts();
        let finished = play(
            &registry,
            &game.id,
            &[
                ("Alice", 0),
                ("Bob", 1),
                ("Alice", 0),
                ("Bob", 1),
                ("Alice", 2),
                ("Bob", 1),
                ("Alice", 3),
                ("Bob", 1),
            ],
        );
        // Alice's bottom row only reaches columns 0, 2 and 3
        assert_eq!(finished.status, GameStatus::PlayerTwoWon);
        assert_eq!(finished.current_player, "Bob");
    }

    #[test]
    fn test_diagonal_win() {
        let (registry, game) = registry_where_alice_starts();
        let finished = play(
            &registry,
            &game.id,
            &[
                ("Alice", 0),
                ("Bob", 1),
                ("Alice", 1),
                ("Bob", 2),
                ("Alice", 2),
                ("Bob", 3),
                ("Alice", 2),
                ("Bob", 3),
                ("Alice", 3),
                ("Bob", 6),
                ("Alice", 3),
            ],
        );
        assert_eq!(finished.status, GameStatus::PlayerOneWon);
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let registry = GameRegistry::with_seed(11);
        let game = registry.create_game("Alice", "Bob", 3, 2).unwrap();
        let mut last = game.clone();
        for column in [0, 0, 1, 1, 2, 2] {
            let current = last.current_player.clone();
            last = registry.make_move(&game.id, &current, column).unwrap();
        }
        assert_eq!(last.status, GameStatus::Draw);
        assert!(matches!(
            invalid(registry.make_move(&game.id, &last.current_player, 0)),
            InvalidRequest::GameOver(_)
        ));
    }

    #[test]
    fn test_list_and_reset() {
        let registry = GameRegistry::with_seed(1);
        let a = registry.create_game("Alice", "Bob", 7, 6).unwrap();
        let b = registry.create_game("Carol", "Dave", 5, 4).unwrap();

        let mut ids: Vec<GameId> = registry.list_games().iter().map(|g| g.id).collect();
        ids.sort();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(ids, expected);

        registry.reset();
        assert!(registry.list_games().is_empty());
        assert!(registry.get_game(&a.id).is_err());
    }

    #[test]
    fn test_concurrent_moves_on_one_game() {
        let (registry, game) = registry_where_alice_starts();

        let results: Vec<bool> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let registry = &registry;
                    let id = game.id;
                    s.spawn(move || registry.make_move(&id, "Alice", i % 7).is_ok())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|&&ok| ok).count(), 1);
        let after = registry.get_game(&game.id).unwrap();
        let placed = after
            .board
            .rows()
            .iter()
            .flatten()
            .filter(|&&c| c != Cell::Empty)
            .count();
        assert_eq!(placed, 1);
        assert_eq!(after.current_player, "Bob");
    }

    #[test]
    fn test_games_progress_independently_across_threads() {
        let registry = GameRegistry::with_seed(2);
        let ids: Vec<GameId> = (0..4)
            .map(|i| {
                registry
                    .create_game(&format!("p{}a", i), &format!("p{}b", i), 7, 6)
                    .unwrap()
                    .id
            })
            .collect();

        std::thread::scope(|s| {
            for id in &ids {
                let registry = &registry;
                s.spawn(move || {
                    for column in 0..6 {
                        let current = registry.get_game(id).unwrap().current_player;
                        registry.make_move(id, &current, column).unwrap();
                    }
                });
            }
        });

        for id in &ids {
            let game = registry.get_game(id).unwrap();
            assert_eq!(game.status, GameStatus::InProgress);
            assert_eq!(
                game.board.rows()[5].iter().filter(|&&c| c != Cell::Empty).count(),
                6
            );
        }
    }
}
