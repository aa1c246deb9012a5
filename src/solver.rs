//! An agent to find the best turn in a Checkers position

use log::debug;
use rayon::prelude::*;
use serde::Deserialize;

use crate::{board::*, config::BotSettings, evaluator::*, movegen::*};

/// Which root moves the search expands
#[derive(Copy, Clone, Eq, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Optimization {
    /// Every legal root turn is searched to full depth
    Exhaustive,
    /// Only root turns whose immediate score is no worse than the median
    /// are searched further
    Pruned,
}

impl Default for Optimization {
    fn default() -> Self {
        Optimization::Exhaustive
    }
}

/// An agent to search Checkers positions
///
/// # Notes
/// The search is a fixed depth minimax with alpha-beta pruning where one
/// level of the tree is one complete turn of a side. Capture chains are
/// followed at the same depth, the opponent only gets to move once the
/// capturing piece has nothing left to take.
///
/// # Position Scoring
/// Leaves are scored with [`score`] from the searching side's point of
/// view, so the searching side minimises and its opponent maximises. A
/// side without any legal move loses: [`LOST_SCORE`] if it is the
/// searching side, [`WON_SCORE`] otherwise.
#[derive(Clone)]
pub struct Solver {
    board: Board,
    side: Side,
    depth: usize,
    scoring: ScoringMode,
    optimization: Optimization,
    parallel: bool,
    generator: MoveGenerator,

    /// The number of nodes searched by this `Solver` so far (for diagnostics only)
    pub node_count: usize,
}

impl Solver {
    /// Creates a new `Solver` for `side` to move on `board`
    ///
    /// `depth` is the number of turns to look ahead and is at least 1.
    pub fn new(board: Board, side: Side, depth: usize, settings: &BotSettings, seed: u64) -> Self {
        Self {
            board,
            side,
            depth: depth.max(1),
            scoring: settings.scoring,
            optimization: settings.optimization,
            parallel: settings.parallel,
            generator: MoveGenerator::from_seed(seed),
            node_count: 0,
        }
    }

    pub fn with_scoring(mut self, scoring: ScoringMode) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_optimization(mut self, optimization: Optimization) -> Self {
        self.optimization = optimization;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn evaluate(&self, board: &Board) -> f64 {
        score(board, self.side, self.scoring)
    }

    /// Performs game tree search
    ///
    /// `chain` is set while the piece on that square is in the middle of
    /// a capture chain, only its captures are playable then.
    fn search(
        &mut self,
        board: &Board,
        side: Side,
        depth: usize,
        chain: Option<Square>,
        mut alpha: f64,
        mut beta: f64,
    ) -> f64 {
        self.node_count += 1;

        if depth == 0 {
            return self.evaluate(board);
        }

        let moves = match chain {
            Some(square) => self.generator.generate_square(board, side, square),
            None => self.generator.generate(board, side),
        };
        if moves.is_empty() {
            // the side to move is stuck, which loses the game
            return if side == self.side { LOST_SCORE } else { WON_SCORE };
        }

        let minimising = side == self.side;
        let mut best = if minimising {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        };
        for m in moves.iter() {
            let step = advance(board, m);
            let score = if step.chain_open {
                self.search(&step.board, side, depth, Some(m.to), alpha, beta)
            } else {
                self.search(&step.board, side.opponent(), depth - 1, None, alpha, beta)
            };

            if minimising {
                best = best.min(score);
                beta = beta.min(best);
            } else {
                best = best.max(score);
                alpha = alpha.max(best);
            }
            // an ancestor already has a better alternative than this node
            if alpha >= beta {
                break;
            }
        }
        best
    }

    /// Expands the legal moves at the root into complete turns, following
    /// every capture chain to its end
    fn root_turns(&mut self) -> Vec<(Turn, Board)> {
        let mut turns = Vec::new();
        let moves = self.generator.generate(&self.board, self.side);
        for m in moves.iter() {
            let step = advance(&self.board, m);
            self.expand_chain(Turn::new(*m), step, &mut turns);
        }
        turns
    }

    fn expand_chain(&mut self, turn: Turn, step: Step, turns: &mut Vec<(Turn, Board)>) {
        if !step.chain_open {
            turns.push((turn, step.board));
            return;
        }
        let square = turn.last().to;
        let continuations = self.generator.generate_square(&step.board, self.side, square);
        for m in continuations.iter() {
            let next = advance(&step.board, m);
            self.expand_chain(turn.then(*m), next, turns);
        }
    }

    /// Drops the root turns whose immediate score is worse than the median
    ///
    /// When every root turn scores the same, as in most quiet positions,
    /// nothing is dropped.
    fn prune_root(&self, turns: Vec<(Turn, Board)>) -> Vec<(Turn, Board)> {
        if turns.len() < 3 {
            return turns;
        }
        let scores: Vec<f64> = turns.iter().map(|(_, board)| self.evaluate(board)).collect();
        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let median = sorted[(sorted.len() - 1) / 2];

        turns
            .into_iter()
            .zip(scores)
            .filter(|(_, score)| *score <= median)
            .map(|(candidate, _)| candidate)
            .collect()
    }

    /// The root turns the search expands, with the boards they lead to
    pub(crate) fn candidates(&mut self) -> Vec<(Turn, Board)> {
        let turns = self.root_turns();
        match self.optimization {
            Optimization::Exhaustive => turns,
            Optimization::Pruned => self.prune_root(turns),
        }
    }

    /// A copy of this solver used to search one root branch
    fn branch(&self, seed: u64) -> Solver {
        let mut next = self.clone();
        next.generator = MoveGenerator::from_seed(seed);
        next.node_count = 0;
        next
    }

    /// Calculates the best turn for the side to move and its score
    ///
    /// Returns `None` only when the side to move has no legal move.
    pub fn solve(&mut self) -> Option<(f64, Turn)> {
        let mut candidates = self.candidates();
        debug_assert!(
            !candidates.is_empty() || side_moves(&self.board, self.side).is_empty(),
            "legal moves exist but no root turn was generated"
        );

        // draw every branch seed up front so the result does not depend on
        // how the branches are scheduled
        let seeds: Vec<u64> = candidates.iter().map(|_| self.generator.next_seed()).collect();
        let opponent = self.side.opponent();
        let depth = self.depth - 1;

        let mut best: Option<(f64, usize)> = None;
        if self.parallel {
            let this = &*self;
            let results: Vec<(f64, usize)> = candidates
                .par_iter()
                .zip(seeds.par_iter())
                .map(|((_, board), &seed)| {
                    let mut branch = this.branch(seed);
                    let score = branch.search(
                        board,
                        opponent,
                        depth,
                        None,
                        f64::NEG_INFINITY,
                        f64::INFINITY,
                    );
                    (score, branch.node_count)
                })
                .collect();

            for (index, (score, nodes)) in results.into_iter().enumerate() {
                self.node_count += nodes;
                if best.map_or(true, |(best_score, _)| score < best_score) {
                    best = Some((score, index));
                }
            }
        } else {
            for (index, ((_, board), &seed)) in candidates.iter().zip(seeds.iter()).enumerate() {
                let mut branch = self.branch(seed);
                // a branch that cannot beat the best score so far is cut off
                let beta = best.map_or(f64::INFINITY, |(best_score, _)| best_score);
                let score = branch.search(board, opponent, depth, None, f64::NEG_INFINITY, beta);
                self.node_count += branch.node_count;
                if score < beta {
                    best = Some((score, index));
                }
            }
        }

        let (score, index) = best?;
        let (turn, _) = candidates.swap_remove(index);
        debug!(
            "{} searched {} nodes at depth {}, best turn {} scores {:.3}",
            self.side, self.node_count, self.depth, turn, score
        );
        Some((score, turn))
    }

    /// Calculates the best turn for the side to move
    pub fn best_turn(&mut self) -> Option<Turn> {
        self.solve().map(|(_, turn)| turn)
    }
}
