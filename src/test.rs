#[cfg(test)]
pub mod test {
    use anyhow::Result;

    use std::collections::VecDeque;

    use crate::board::*;
    use crate::config::*;
    use crate::controller::*;
    use crate::evaluator::*;
    use crate::movegen::*;
    use crate::solver::*;

    fn sq(row: i8, col: i8) -> Square {
        Square::new(row, col)
    }

    /// Replays a fixed list of events, then quits
    struct Script(VecDeque<Event>);

    impl Script {
        fn new(events: &[Event]) -> Self {
            Self(events.iter().copied().collect())
        }
    }

    impl Input for Script {
        fn next_event(&mut self) -> Result<Event> {
            Ok(self.0.pop_front().unwrap_or(Event::Quit))
        }
    }

    fn quiet_settings() -> Settings {
        let mut settings = Settings::default();
        settings.bot.delay_ms = 0;
        settings.bot.no_random = true;
        settings.bot.white_bot = false;
        settings.bot.black_bot = false;
        settings
    }

    fn bot_settings(depth: usize) -> BotSettings {
        let mut settings = quiet_settings().bot;
        settings.white_level = depth;
        settings.black_level = depth;
        settings
    }

    /// Every complete turn `side` can play, following capture chains
    fn all_turns(board: &Board, side: Side) -> Vec<Turn> {
        fn expand(board: &Board, turn: Turn, out: &mut Vec<Turn>) {
            let step = advance(board, turn.last());
            if !step.chain_open {
                out.push(turn);
                return;
            }
            for m in piece_moves(&step.board, turn.last().to).iter() {
                expand(&step.board, turn.then(*m), out);
            }
        }
        let mut turns = Vec::new();
        for m in side_moves(board, side).iter() {
            expand(board, Turn::new(*m), &mut turns);
        }
        turns
    }

    fn assert_legal(board: &Board, side: Side, turn: &Turn) {
        let mut board = *board;
        for (i, m) in turn.moves().iter().enumerate() {
            let legal = if i == 0 {
                side_moves(&board, side)
            } else {
                piece_moves(&board, m.from)
            };
            let generated = legal.find(m.from, m.to).expect("move is not legal");
            assert_eq!(generated.captured, m.captured);
            board = board.apply(m);
        }
        if turn.last().is_capture() {
            // the last capture must close the chain
            assert!(!piece_moves(&board, turn.last().to).captures);
        }
    }

    #[test]
    pub fn starting_position() {
        let board = Board::starting();
        assert_eq!(board.material(Side::White), (12, 0));
        assert_eq!(board.material(Side::Black), (12, 0));
        assert_eq!(board.get(sq(0, 1)), Cell::BlackMan);
        assert_eq!(board.get(sq(7, 0)), Cell::WhiteMan);
        assert_eq!(board.get(sq(3, 2)), Cell::Empty);

        let moves = side_moves(&board, Side::White);
        assert_eq!(moves.len(), 7);
        assert!(!moves.captures);
        assert!(moves.iter().all(|m| m.from.row == 5 && m.to.row == 4));
    }

    #[test]
    pub fn cell_encoding() {
        for &side in [Side::White, Side::Black].iter() {
            let man = Cell::man(side);
            let king = Cell::king(side);
            assert_eq!(man.value() % 2, king.value() % 2);
            assert!(!man.is_king() && king.is_king());
            assert_eq!(man.side(), Some(side));
            assert_eq!(man.promoted(), king);
            assert_eq!(king.promoted(), king);
        }
        assert_eq!(Cell::Empty.side(), None);
    }

    #[test]
    pub fn board_parsing() -> Result<()> {
        let board = Board::from_rows(&[
            ". b . . . . . .",
            ". . . . . . . .",
            ". . . . . . . .",
            ". . . . . . . .",
            ". . . . . . . .",
            ". . . . . . W .",
            ". . . . . . . .",
            "w . . . . . . .",
        ])?;
        assert_eq!(board.get(sq(0, 1)), Cell::BlackMan);
        assert_eq!(board.get(sq(5, 6)), Cell::WhiteKing);
        assert_eq!(board.get(sq(7, 0)), Cell::WhiteMan);
        assert_eq!(board.pieces().count(), 3);

        assert!(Board::from_rows(&["........"]).is_err());
        let mut rows = vec!["........"; 8];
        rows[0] = "b.......";
        assert!(Board::from_rows(&rows[..]).is_err());
        rows[0] = ".x......";
        assert!(Board::from_rows(&rows[..]).is_err());
        Ok(())
    }

    #[test]
    pub fn move_equality_ignores_capture() {
        let plain = Move::new(sq(2, 3), sq(4, 5));
        let capture = Move::capture(sq(2, 3), sq(4, 5), sq(3, 4));
        assert_eq!(plain, capture);
        assert_ne!(plain, Move::new(sq(2, 3), sq(4, 1)));
    }

    #[test]
    pub fn turn_chaining_rules() {
        let first = Move::capture(sq(5, 0), sq(3, 2), sq(4, 1));
        let second = Move::capture(sq(3, 2), sq(1, 4), sq(2, 3));
        let turn = Turn::from_moves(vec![first, second]).unwrap();
        assert_eq!(turn.len(), 2);
        assert_eq!(turn.captures(), 2);
        assert!(!turn.is_simple());

        assert!(Turn::from_moves(vec![]).is_err());
        // broken chain
        assert!(Turn::from_moves(vec![first, Move::capture(sq(1, 0), sq(3, 2), sq(2, 1))]).is_err());
        // plain moves cannot be continued
        let plain = Move::new(sq(5, 0), sq(4, 1));
        assert!(Turn::from_moves(vec![plain, Move::capture(sq(4, 1), sq(2, 3), sq(3, 2))]).is_err());
        assert!(Turn::new(plain).is_simple());
    }

    #[test]
    pub fn single_capture_scenario() -> Result<()> {
        let board = Board::from_rows(&[
            "........",
            "........",
            "...w....",
            "....b...",
            "........",
            "........",
            "........",
            "........",
        ])?;
        let moves = side_moves(&board, Side::White);
        assert!(moves.captures);
        assert_eq!(moves.len(), 1);
        let m = moves.moves[0];
        assert_eq!((m.from, m.to, m.captured), (sq(2, 3), sq(4, 5), Some(sq(3, 4))));
        Ok(())
    }

    #[test]
    pub fn mandatory_capture() -> Result<()> {
        // only one white man can capture, the others may not move at all
        let board = Board::from_rows(&[
            "........",
            "........",
            "........",
            "........",
            ".b......",
            "..w...w.",
            ".......w",
            "........",
        ])?;
        let moves = side_moves(&board, Side::White);
        assert!(moves.captures);
        assert!(moves.iter().all(|m| m.is_capture()));
        assert_eq!(moves.len(), 1);
        assert_eq!(moves.moves[0].from, sq(5, 2));

        // the same holds for a single piece
        let own = piece_moves(&board, sq(5, 2));
        assert!(own.captures && own.len() == 1);
        let other = piece_moves(&board, sq(5, 6));
        assert!(!other.captures && other.len() == 2);
        Ok(())
    }

    #[test]
    pub fn men_move_forward_and_capture_backward() -> Result<()> {
        let board = Board::from_rows(&[
            "........",
            "........",
            "........",
            "..w.....",
            "...b....",
            "........",
            "........",
            "........",
        ])?;
        let white = side_moves(&board, Side::White);
        assert_eq!(white.len(), 1);
        assert_eq!(white.moves[0], Move::new(sq(3, 2), sq(5, 4)));

        let empty = Board::from_rows(&[
            "........",
            "........",
            "........",
            "..w.....",
            "........",
            "........",
            "........",
            "........",
        ])?;
        let plain = side_moves(&empty, Side::White);
        assert!(plain.iter().all(|m| m.to.row == 2));
        assert_eq!(plain.len(), 2);
        Ok(())
    }

    #[test]
    pub fn generation_for_wrong_or_empty_square() {
        let board = Board::starting();
        let mut generator = MoveGenerator::from_seed(0);
        assert!(generator.generate_square(&board, Side::White, sq(3, 2)).is_empty());
        assert!(generator.generate_square(&board, Side::White, sq(2, 1)).is_empty());
        assert!(!generator.generate_square(&board, Side::Black, sq(2, 1)).is_empty());
        assert!(piece_moves(&board, sq(4, 3)).is_empty());
    }

    #[test]
    pub fn king_line_of_sight() -> Result<()> {
        // the king sees the black man on the long diagonal and may land on
        // any empty square behind it up to the next piece
        let board = Board::from_rows(&[
            "........",
            "......b.",
            "........",
            "........",
            "...b....",
            "........",
            ".W......",
            "........",
        ])?;
        let moves = piece_moves(&board, sq(6, 1));
        assert!(moves.captures);
        let landings: Vec<Square> = moves.iter().map(|m| m.to).collect();
        assert_eq!(landings.len(), 2);
        assert!(landings.contains(&sq(3, 4)));
        assert!(landings.contains(&sq(2, 5)));
        assert!(moves.iter().all(|m| m.captured == Some(sq(4, 3))));

        // two pieces in a row cannot be jumped
        let blocked = Board::from_rows(&[
            "........",
            "........",
            "........",
            "....b...",
            "...b....",
            "........",
            ".W......",
            "........",
        ])?;
        assert!(!piece_moves(&blocked, sq(6, 1)).captures);

        // a friendly piece in between blocks the capture
        let friendly = Board::from_rows(&[
            "........",
            "........",
            "........",
            "....b...",
            "........",
            "..w.....",
            ".W......",
            "........",
        ])?;
        assert!(!side_moves(&friendly, Side::White).captures);
        Ok(())
    }

    #[test]
    pub fn king_moves_until_blocked() -> Result<()> {
        let board = Board::from_rows(&[
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            ".W......",
            "........",
        ])?;
        let moves = piece_moves(&board, sq(6, 1));
        assert!(!moves.captures);
        // six squares up the long diagonal, one up-left, one down each way
        assert_eq!(moves.len(), 9);
        Ok(())
    }

    #[test]
    pub fn promotion() -> Result<()> {
        let board = Board::from_rows(&[
            "........",
            "..w.....",
            "........",
            "........",
            "........",
            "........",
            ".....b..",
            "........",
        ])?;
        let white = board.apply(&Move::new(sq(1, 2), sq(0, 1)));
        assert_eq!(white.get(sq(0, 1)), Cell::WhiteKing);
        let black = board.apply(&Move::new(sq(6, 5), sq(7, 6)));
        assert_eq!(black.get(sq(7, 6)), Cell::BlackKing);

        // kings stay kings when moving back
        let back = white.apply(&Move::new(sq(0, 1), sq(3, 4)));
        assert_eq!(back.get(sq(3, 4)), Cell::WhiteKing);
        Ok(())
    }

    #[test]
    pub fn chain_continuity() -> Result<()> {
        let board = Board::from_rows(&[
            "........",
            "........",
            "...b....",
            "........",
            ".b......",
            "w.......",
            "........",
            "........",
        ])?;
        let first = side_moves(&board, Side::White).moves[0];
        let step = advance(&board, &first);
        assert!(step.chain_open);
        let second = piece_moves(&step.board, first.to).moves[0];
        let closed = advance(&step.board, &second);
        assert!(!closed.chain_open);
        assert_eq!(closed.board.material(Side::Black), (0, 0));

        // a plain move never opens a chain
        let plain = advance(&Board::starting(), &Move::new(sq(5, 0), sq(4, 1)));
        assert!(!plain.chain_open);
        Ok(())
    }

    #[test]
    pub fn deterministic_generation() {
        let board = Board::starting();
        let first = MoveGenerator::new(true).generate(&board, Side::White);
        let second = MoveGenerator::new(true).generate(&board, Side::White);
        assert_eq!(first.moves, second.moves);

        // the list is a permutation of the unshuffled one
        let plain = side_moves(&board, Side::White);
        assert_eq!(first.len(), plain.len());
        assert!(plain.iter().all(|m| first.moves.contains(m)));
    }

    #[test]
    pub fn evaluator_sentinels() -> Result<()> {
        let only_white = Board::from_rows(&[
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            ".w......",
            "........",
        ])?;
        for &mode in [ScoringMode::Number, ScoringMode::NumberAndPotential].iter() {
            assert_eq!(score(&only_white, Side::Black, mode), LOST_SCORE);
            assert_eq!(score(&only_white, Side::White, mode), WON_SCORE);

            let start = score(&Board::starting(), Side::White, mode);
            assert!(start > 0.0 && start < LOST_SCORE);
        }
        assert_eq!(score(&Board::starting(), Side::White, ScoringMode::Number), 1.0);
        Ok(())
    }

    #[test]
    pub fn evaluator_weights() -> Result<()> {
        let board = Board::from_rows(&[
            "........",
            "........",
            "...b....",
            "........",
            "........",
            "........",
            "........",
            "W.......",
        ])?;
        assert_eq!(score(&board, Side::White, ScoringMode::Number), 0.25);
        assert_eq!(score(&board, Side::Black, ScoringMode::Number), 4.0);
        // the black man has advanced two rows
        let potential = score(&board, Side::White, ScoringMode::NumberAndPotential);
        assert!((potential - 1.1 / 5.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    pub fn opening_turn_is_simple() {
        let mut solver = Solver::new(Board::starting(), Side::White, 1, &bot_settings(1), 0)
            .with_scoring(ScoringMode::Number);
        let turn = solver.best_turn().unwrap();
        assert!(turn.is_simple());
        let m = turn.first();
        assert_eq!(Board::starting().get(m.from), Cell::WhiteMan);
        assert_eq!(m.to.row, m.from.row - 1);
        assert_eq!((m.to.col - m.from.col).abs(), 1);
    }

    #[test]
    pub fn solver_follows_capture_chain() -> Result<()> {
        let board = Board::from_rows(&[
            "........",
            "........",
            "...b....",
            "........",
            ".b......",
            "w.......",
            "........",
            "......b.",
        ])?;
        let (score, turn) = Solver::new(board, Side::White, 2, &bot_settings(2), 0)
            .solve()
            .unwrap();
        assert_eq!(turn.len(), 2);
        assert_eq!(turn.captures(), 2);
        assert_eq!(turn.last().to, sq(1, 4));
        assert_eq!(board.apply_turn(&turn).material(Side::Black), (1, 0));
        assert!(score < LOST_SCORE);
        assert_legal(&board, Side::White, &turn);
        Ok(())
    }

    #[test]
    pub fn solver_avoids_losing_a_piece() -> Result<()> {
        // moving to (4,3) hands black a capture, (4,1) is safe
        let board = Board::from_rows(&[
            "........",
            "........",
            "........",
            "....b...",
            "........",
            "..w.....",
            "........",
            "........",
        ])?;
        for &parallel in [false, true].iter() {
            let mut settings = bot_settings(2);
            settings.parallel = parallel;
            let turn = Solver::new(board, Side::White, 2, &settings, 7)
                .best_turn()
                .unwrap();
            assert_eq!(turn.first().to, sq(4, 1));
        }
        Ok(())
    }

    #[test]
    pub fn stuck_side_has_no_turn() -> Result<()> {
        let board = Board::from_rows(&[
            ".b......",
            "w.......",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
        ])?;
        assert!(side_moves(&board, Side::White).is_empty());
        assert!(Solver::new(board, Side::White, 3, &bot_settings(3), 0)
            .best_turn()
            .is_none());
        Ok(())
    }

    #[test]
    pub fn search_legality() -> Result<()> {
        let boards = vec![
            Board::starting(),
            Board::from_rows(&[
                ".b.b.b.b",
                "b.b.....",
                "...b.b..",
                "..w.....",
                "...w.B..",
                "w.....w.",
                ".w.W.w..",
                "w.......",
            ])?,
        ];
        for board in boards {
            for &side in [Side::White, Side::Black].iter() {
                let legal = all_turns(&board, side);
                for &optimization in [Optimization::Exhaustive, Optimization::Pruned].iter() {
                    let mut solver = Solver::new(board, side, 3, &bot_settings(3), 11)
                        .with_optimization(optimization);
                    let turn = solver.best_turn().unwrap();
                    assert!(legal.contains(&turn), "{} is not a legal turn", turn);
                    assert_legal(&board, side, &turn);
                }
            }
        }
        Ok(())
    }

    #[test]
    pub fn pruned_root_drops_worse_turns() -> Result<()> {
        // the king's only move leaves the score as it is while both man
        // moves gain an advancement bonus
        let board = Board::from_rows(&[
            "........",
            "........",
            "........",
            "........",
            "........",
            "....b...",
            ".w...b..",
            "......W.",
        ])?;
        let settings = bot_settings(1);

        let mut exhaustive = Solver::new(board, Side::White, 1, &settings, 5)
            .with_optimization(Optimization::Exhaustive);
        let all = exhaustive.candidates();
        assert_eq!(all.len(), 3);
        assert!(all.iter().any(|(turn, _)| turn.first().from == sq(7, 6)));

        let mut pruned = Solver::new(board, Side::White, 1, &settings, 5)
            .with_optimization(Optimization::Pruned);
        let kept = pruned.candidates();
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|(turn, _)| turn.first().from != sq(7, 6)));

        for &parallel in [false, true].iter() {
            let mut exhaustive = Solver::new(board, Side::White, 1, &settings, 5)
                .with_optimization(Optimization::Exhaustive)
                .with_parallel(parallel);
            let mut pruned = Solver::new(board, Side::White, 1, &settings, 5)
                .with_optimization(Optimization::Pruned)
                .with_parallel(parallel);
            let (exhaustive_score, _) = exhaustive.solve().unwrap();
            let (pruned_score, turn) = pruned.solve().unwrap();
            assert_ne!(turn.first().from, sq(7, 6));
            assert_eq!(pruned_score, exhaustive_score);
            assert!(pruned.node_count < exhaustive.node_count);
        }
        Ok(())
    }

    #[test]
    pub fn parallel_and_sequential_agree() {
        let board = Board::starting().apply(&Move::new(sq(5, 2), sq(4, 3)));
        for seed in 0..4 {
            let mut sequential = Solver::new(board, Side::Black, 3, &bot_settings(3), seed)
                .with_parallel(false);
            let mut parallel = Solver::new(board, Side::Black, 3, &bot_settings(3), seed)
                .with_parallel(true);
            let (a_score, a_turn) = sequential.solve().unwrap();
            let (b_score, b_turn) = parallel.solve().unwrap();
            assert_eq!(a_turn, b_turn);
            assert_eq!(a_score, b_score);
        }
    }

    #[test]
    pub fn config_parsing() -> Result<()> {
        let settings = Settings::from_toml(
            r#"
            [game]
            max_turns = 40

            [bot]
            white_bot = true
            black_level = 2
            scoring = "number"
            optimization = "pruned"
            no_random = true
            "#,
        )?;
        assert_eq!(settings.game.max_turns, 40);
        assert!(settings.is_bot(Side::White));
        assert!(settings.is_bot(Side::Black));
        assert_eq!(settings.depth(Side::Black), 2);
        assert_eq!(settings.depth(Side::White), 5);
        assert_eq!(settings.bot.scoring, ScoringMode::Number);
        assert_eq!(settings.bot.optimization, Optimization::Pruned);
        assert!(settings.log_file.is_none());

        assert!(Settings::from_toml("[bot]\nscoring = \"material\"").is_err());
        assert!(Settings::from_file("does/not/exist.toml").is_err());
        Ok(())
    }

    #[test]
    pub fn turn_cap_is_a_draw() -> Result<()> {
        let mut settings = quiet_settings();
        settings.game.max_turns = 4;
        settings.bot.white_bot = true;
        settings.bot.black_bot = true;
        settings.bot.white_level = 1;
        settings.bot.black_level = 1;

        let mut controller = Controller::new(MemoryTable::new(), NoInput, settings);
        assert_eq!(controller.play_game()?, GameExit::Over(GameResult::Draw));
        assert_eq!(controller.settings().game.max_turns, 4);
        assert_eq!(controller.session().turn, 4);
        assert_eq!(controller.table().history_len(), 5);
        Ok(())
    }

    #[test]
    pub fn stuck_side_loses() -> Result<()> {
        let board = Board::from_rows(&[
            ".b......",
            "w.......",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
        ])?;
        let table = MemoryTable::with_start(board);
        let mut controller = Controller::new(table, NoInput, quiet_settings());
        assert_eq!(controller.play()?, Some(GameResult::Winner(Side::Black)));
        assert_eq!(controller.table().result, Some(GameResult::Winner(Side::Black)));
        Ok(())
    }

    #[test]
    pub fn bot_games_finish() -> Result<()> {
        let mut settings = quiet_settings();
        settings.game.max_turns = 30;
        settings.bot.white_bot = true;
        settings.bot.black_bot = true;
        settings.bot.white_level = 2;
        settings.bot.black_level = 1;

        let mut controller = Controller::new(MemoryTable::new(), NoInput, settings).with_seed(3);
        let exit = controller.play_game()?;
        assert!(matches!(exit, GameExit::Over(_)));
        assert_eq!(controller.table().history_len(), controller.session().turn + 1);
        Ok(())
    }

    /// A table that remembers every committed move
    struct Recorder {
        table: MemoryTable,
        commits: Vec<(Move, usize)>,
    }

    impl Table for Recorder {
        fn board(&self) -> Board {
            self.table.board()
        }

        fn reset(&mut self) -> Result<()> {
            self.commits.clear();
            self.table.reset()
        }

        fn commit(&mut self, m: &Move, beat_series: usize) -> Result<()> {
            self.commits.push((*m, beat_series));
            self.table.commit(m, beat_series)
        }

        fn push_history(&mut self) -> Result<()> {
            self.table.push_history()
        }

        fn rollback(&mut self) -> Result<()> {
            self.table.rollback()
        }

        fn history_len(&self) -> usize {
            self.table.history_len()
        }
    }

    #[test]
    pub fn bot_capture_chain() -> Result<()> {
        let board = Board::from_rows(&[
            "........",
            "........",
            "...b....",
            "........",
            ".b......",
            "w.......",
            "........",
            "......b.",
        ])?;
        let mut settings = quiet_settings();
        settings.game.max_turns = 1;
        settings.bot.white_bot = true;
        settings.bot.white_level = 2;

        let table = Recorder {
            table: MemoryTable::with_start(board),
            commits: Vec::new(),
        };
        let mut controller = Controller::new(table, NoInput, settings);
        assert_eq!(controller.play_game()?, GameExit::Over(GameResult::Draw));

        let table = controller.table();
        let committed: Vec<(Square, Square, usize)> = table
            .commits
            .iter()
            .map(|(m, beat_series)| (m.from, m.to, *beat_series))
            .collect();
        assert_eq!(
            committed,
            vec![(sq(5, 0), sq(3, 2), 1), (sq(3, 2), sq(1, 4), 2)]
        );
        assert_eq!(table.table.beat_series, 2);
        assert_eq!(table.board().get(sq(1, 4)), Cell::WhiteMan);
        assert_eq!(table.board().material(Side::Black), (1, 0));
        assert_eq!(table.history_len(), 2);
        Ok(())
    }

    #[test]
    pub fn human_capture_chain() -> Result<()> {
        let board = Board::from_rows(&[
            "........",
            "........",
            "...b....",
            "........",
            ".b......",
            "w.......",
            "........",
            "........",
        ])?;
        let script = Script::new(&[
            // not a white piece, ignored
            Event::Cell(sq(4, 1)),
            Event::Cell(sq(5, 0)),
            // not a legal destination, selection resets
            Event::Cell(sq(4, 1)),
            Event::Cell(sq(5, 0)),
            Event::Cell(sq(3, 2)),
            // the chain cannot be abandoned or undone
            Event::Cell(sq(4, 1)),
            Event::Undo,
            Event::Cell(sq(1, 4)),
        ]);
        let mut controller = Controller::new(MemoryTable::with_start(board), script, quiet_settings());
        assert_eq!(controller.play()?, Some(GameResult::Winner(Side::White)));

        let table = controller.table();
        assert_eq!(table.board().get(sq(1, 4)), Cell::WhiteMan);
        assert_eq!(table.board().material(Side::Black), (0, 0));
        assert_eq!(table.beat_series, 2);
        Ok(())
    }

    #[test]
    pub fn quit_in_the_middle_of_a_chain() -> Result<()> {
        let board = Board::from_rows(&[
            "........",
            "........",
            "...b....",
            "........",
            ".b......",
            "w.......",
            "........",
            "........",
        ])?;
        let script = Script::new(&[Event::Cell(sq(5, 0)), Event::Cell(sq(3, 2)), Event::Quit]);
        let mut controller = Controller::new(MemoryTable::with_start(board), script, quiet_settings());
        assert_eq!(controller.play_game()?, GameExit::Quit);
        assert_eq!(controller.session().turn, 0);
        assert_eq!(controller.table().board().get(sq(3, 2)), Cell::WhiteMan);
        Ok(())
    }

    #[test]
    pub fn undo_skips_bot_turn() -> Result<()> {
        let mut settings = quiet_settings();
        settings.bot.black_bot = true;
        settings.bot.black_level = 1;

        let script = Script::new(&[
            Event::Cell(sq(5, 0)),
            Event::Cell(sq(4, 1)),
            // black replies, then white takes its move back
            Event::Undo,
        ]);
        let mut controller = Controller::new(MemoryTable::new(), script, settings);
        assert_eq!(controller.play_game()?, GameExit::Quit);
        assert_eq!(controller.session().turn, 0);
        assert_eq!(controller.table().board(), Board::starting());
        assert_eq!(controller.table().history_len(), 1);
        Ok(())
    }

    #[test]
    pub fn undo_between_humans() -> Result<()> {
        let script = Script::new(&[
            Event::Cell(sq(5, 0)),
            Event::Cell(sq(4, 1)),
            Event::Cell(sq(2, 1)),
            Event::Cell(sq(3, 2)),
            // white undoes black's reply
            Event::Undo,
        ]);
        let mut controller = Controller::new(MemoryTable::new(), script, quiet_settings());
        assert_eq!(controller.play_game()?, GameExit::Quit);

        let expected = Board::starting().apply(&Move::new(sq(5, 0), sq(4, 1)));
        assert_eq!(controller.session().turn, 1);
        assert_eq!(controller.table().board(), expected);
        Ok(())
    }

    #[test]
    pub fn undo_refused_without_history() -> Result<()> {
        let script = Script::new(&[Event::Undo, Event::Undo]);
        let mut controller = Controller::new(MemoryTable::new(), script, quiet_settings());
        assert_eq!(controller.play_game()?, GameExit::Quit);
        assert_eq!(controller.session().turn, 0);
        assert_eq!(controller.table().board(), Board::starting());
        Ok(())
    }

    #[test]
    pub fn replay_resets_the_board() -> Result<()> {
        let script = Script::new(&[
            Event::Cell(sq(5, 0)),
            Event::Cell(sq(4, 1)),
            Event::Replay,
            Event::Cell(sq(5, 2)),
        ]);
        let mut controller = Controller::new(MemoryTable::new(), script, quiet_settings());
        assert_eq!(controller.play()?, None);
        assert_eq!(controller.session().turn, 0);
        assert_eq!(controller.table().board(), Board::starting());
        // the selection made after the replay is still active
        assert_eq!(controller.table().active, Some(sq(5, 2)));
        Ok(())
    }

    #[test]
    pub fn replay_after_game_over() -> Result<()> {
        let board = Board::from_rows(&[
            ".b......",
            "w.......",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
        ])?;
        let script = Script::new(&[Event::Cell(sq(3, 3)), Event::Replay]);
        let mut controller = Controller::new(MemoryTable::with_start(board), script, quiet_settings());
        // two games end the same way, the second one is left by quitting
        assert_eq!(controller.play()?, Some(GameResult::Winner(Side::Black)));
        Ok(())
    }
}
