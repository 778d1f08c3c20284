use crate::ticker::{TickHandle, TickScheduler};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Pos {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl Pos {
    pub(crate) fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn shifted(self, dir: Direction) -> Pos {
        let (dx, dy) = dir.delta();
        Pos::new(self.x + dx, self.y + dy)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub(crate) fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Board {
    pub(crate) width: i32,
    pub(crate) height: i32,
}

impl Board {
    pub(crate) const DEFAULT: Board = Board {
        width: 20,
        height: 15,
    };

    pub(crate) fn contains(&self, p: Pos) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    pub(crate) fn spawn(&self) -> Pos {
        Pos::new(self.width / 2, self.height / 2)
    }

    fn cells(&self) -> usize {
        (self.width.max(0) * self.height.max(0)) as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Crash {
    Wall,
    Tail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Moved,
    Ate,
    Crashed(Crash),
    /// Ate the last free cell; nowhere left to put food.
    Filled,
    /// The game is already over; nothing changed.
    Frozen,
}

/// Grid snake with growing-tail semantics.
///
/// Invariants kept by every method:
/// - `segments` is head-first, non-empty, pairwise distinct and inside `board`
/// - `food` is never on a segment (it is `None` only once the board is full)
/// - the snake never reverses onto itself within one tick
#[derive(Clone, Debug)]
pub(crate) struct Snake {
    board: Board,
    segments: VecDeque<Pos>,
    direction: Direction,
    last_moved: Direction,
    food: Option<Pos>,
    score: u32,
    over: bool,
}

impl Snake {
    pub(crate) fn new<R: Rng + ?Sized>(board: Board, rng: &mut R) -> Self {
        let mut s = Self {
            board,
            segments: VecDeque::new(),
            direction: Direction::Right,
            last_moved: Direction::Right,
            food: None,
            score: 0,
            over: false,
        };
        s.reset(rng);
        s
    }

    pub(crate) fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.segments.clear();
        self.segments.push_back(self.board.spawn());
        self.direction = Direction::Right;
        self.last_moved = Direction::Right;
        self.score = 0;
        self.over = false;
        self.food = self.free_cell(rng);
    }

    pub(crate) fn board(&self) -> Board {
        self.board
    }

    pub(crate) fn segments(&self) -> impl Iterator<Item = Pos> + '_ {
        self.segments.iter().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.segments.len()
    }

    pub(crate) fn head(&self) -> Pos {
        // never empty: reset() always seeds the head
        self.segments.front().copied().unwrap_or_else(|| self.board.spawn())
    }

    pub(crate) fn direction(&self) -> Direction {
        self.direction
    }

    pub(crate) fn food(&self) -> Option<Pos> {
        self.food
    }

    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn is_over(&self) -> bool {
        self.over
    }

    pub(crate) fn occupies(&self, p: Pos) -> bool {
        self.segments.contains(&p)
    }

    /// Requests a new heading. Reversals are ignored and reported as `false`.
    pub(crate) fn turn(&mut self, dir: Direction) -> bool {
        if self.over {
            return false;
        }
        if dir == self.direction.opposite() || dir == self.last_moved.opposite() {
            return false;
        }
        self.direction = dir;
        true
    }

    /// Advances one cell in the current direction.
    pub(crate) fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Step {
        if self.over {
            return Step::Frozen;
        }

        let next = self.head().shifted(self.direction);
        if !self.board.contains(next) {
            self.over = true;
            return Step::Crashed(Crash::Wall);
        }
        if self.occupies(next) {
            self.over = true;
            return Step::Crashed(Crash::Tail);
        }

        self.segments.push_front(next);
        self.last_moved = self.direction;

        if self.food == Some(next) {
            self.score += 1;
            self.food = self.free_cell(rng);
            if self.food.is_none() {
                self.over = true;
                return Step::Filled;
            }
            Step::Ate
        } else {
            self.segments.pop_back();
            Step::Moved
        }
    }

    /// Uniformly random cell not covered by the snake.
    fn free_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Pos> {
        if self.segments.len() >= self.board.cells() {
            return None;
        }
        let free: Vec<Pos> = (0..self.board.height)
            .flat_map(|y| (0..self.board.width).map(move |x| Pos::new(x, y)))
            .filter(|p| !self.occupies(*p))
            .collect();
        free.choose(rng).copied()
    }

    #[cfg(test)]
    pub(crate) fn with_body(board: Board, body: &[Pos], direction: Direction, food: Option<Pos>) -> Self {
        Self {
            board,
            segments: body.iter().copied().collect(),
            direction,
            last_moved: direction,
            food,
            score: 0,
            over: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn respawn_food<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.food = self.free_cell(rng);
    }
}

/// A live game: the snake, its own rng, and the timer that drives it.
///
/// The timer exists only while the game runs. It is dropped on game over and
/// re-armed on restart; dropping the runner releases it too.
pub(crate) struct SnakeRunner {
    snake: Snake,
    rng: StdRng,
    timer: Option<TickHandle>,
    scheduler: TickScheduler,
    interval: Duration,
}

impl SnakeRunner {
    pub(crate) fn start(
        board: Board,
        interval: Duration,
        seed: u64,
        scheduler: &TickScheduler,
        now: Instant,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let snake = Snake::new(board, &mut rng);
        let timer = scheduler.schedule(interval, now);
        tracing::info!(
            width = board.width,
            height = board.height,
            tick_ms = timer.interval().as_millis() as u64,
            "snake started"
        );
        Self {
            snake,
            rng,
            timer: Some(timer),
            scheduler: scheduler.clone(),
            interval,
        }
    }

    pub(crate) fn snake(&self) -> &Snake {
        &self.snake
    }

    pub(crate) fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Polls the timer and advances the snake when a tick is due.
    pub(crate) fn tick(&mut self, now: Instant) -> Option<Step> {
        let due = self.timer.as_mut().map(|t| t.poll(now)).unwrap_or(false);
        if !due {
            return None;
        }
        let step = self.snake.step(&mut self.rng);
        if self.snake.is_over() {
            if let Some(t) = self.timer.take() {
                t.stop();
            }
            tracing::info!(score = self.snake.score(), ?step, "snake over");
        }
        Some(step)
    }

    pub(crate) fn steer(&mut self, dir: Direction) -> bool {
        self.snake.turn(dir)
    }

    /// Starts a fresh round. Only valid once the current one is over.
    pub(crate) fn restart(&mut self, now: Instant) -> bool {
        if !self.snake.is_over() {
            return false;
        }
        self.snake.reset(&mut self.rng);
        self.timer = Some(self.scheduler.schedule(self.interval, now));
        tracing::info!("snake restarted");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn board() -> Board {
        Board::DEFAULT
    }

    #[test]
    fn starts_with_single_head_at_spawn() {
        let mut r = rng();
        let s = Snake::new(board(), &mut r);
        assert_eq!(s.segments().collect::<Vec<_>>(), vec![Pos::new(10, 7)]);
        assert_eq!(s.direction(), Direction::Right);
        assert_eq!(s.score(), 0);
        assert!(!s.is_over());
        let food = s.food().unwrap();
        assert!(board().contains(food));
        assert_ne!(food, s.head());
    }

    #[test]
    fn food_never_spawns_on_the_body() {
        let mut r = rng();
        let body: Vec<Pos> = (0..20).map(|x| Pos::new(x, 3)).chain((0..20).map(|x| Pos::new(x, 4))).collect();
        let mut s = Snake::with_body(board(), &body, Direction::Right, None);
        for _ in 0..1000 {
            s.respawn_food(&mut r);
            let food = s.food().unwrap();
            assert!(!s.occupies(food), "food landed on {food:?}");
            assert!(board().contains(food));
        }
    }

    #[test]
    fn moving_without_food_keeps_length() {
        let mut r = rng();
        let mut s = Snake::with_body(board(), &[Pos::new(5, 5), Pos::new(4, 5)], Direction::Right, Some(Pos::new(0, 0)));
        assert_eq!(s.step(&mut r), Step::Moved);
        assert_eq!(s.segments().collect::<Vec<_>>(), vec![Pos::new(6, 5), Pos::new(5, 5)]);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn eating_grows_by_one_and_scores_one() {
        let mut r = rng();
        let mut s = Snake::with_body(board(), &[Pos::new(5, 5), Pos::new(4, 5)], Direction::Right, Some(Pos::new(6, 5)));
        assert_eq!(s.step(&mut r), Step::Ate);
        assert_eq!(s.len(), 3);
        assert_eq!(s.score(), 1);
        assert_eq!(s.head(), Pos::new(6, 5));
        let food = s.food().unwrap();
        assert!(!s.occupies(food));
    }

    #[test]
    fn wall_ends_the_game_and_freezes_it() {
        let mut r = rng();
        let mut s = Snake::with_body(board(), &[Pos::new(19, 2)], Direction::Right, Some(Pos::new(0, 0)));
        assert_eq!(s.step(&mut r), Step::Crashed(Crash::Wall));
        assert!(s.is_over());
        let before: Vec<Pos> = s.segments().collect();
        assert_eq!(s.step(&mut r), Step::Frozen);
        assert_eq!(s.segments().collect::<Vec<_>>(), before);
        assert!(!s.turn(Direction::Up));
    }

    #[test]
    fn walls_on_every_side() {
        let mut r = rng();
        let cases = [
            (Pos::new(0, 3), Direction::Left),
            (Pos::new(3, 0), Direction::Up),
            (Pos::new(3, 14), Direction::Down),
            (Pos::new(19, 3), Direction::Right),
        ];
        for (head, dir) in cases {
            let mut s = Snake::with_body(board(), &[head], dir, Some(Pos::new(10, 10)));
            assert_eq!(s.step(&mut r), Step::Crashed(Crash::Wall), "{dir:?}");
        }
    }

    #[test]
    fn running_into_the_body_ends_the_game() {
        let mut r = rng();
        // head at (5,5) moving down into (5,6), which is part of the body
        let body = [Pos::new(5, 5), Pos::new(6, 5), Pos::new(6, 6), Pos::new(5, 6), Pos::new(4, 6)];
        let mut s = Snake::with_body(board(), &body, Direction::Down, Some(Pos::new(0, 0)));
        assert_eq!(s.step(&mut r), Step::Crashed(Crash::Tail));
        assert!(s.is_over());
        assert_eq!(s.segments().collect::<Vec<_>>(), body.to_vec());
    }

    #[test]
    fn reversal_is_rejected_and_turns_succeed() {
        let mut r = rng();
        let mut s = Snake::new(board(), &mut r);
        assert!(!s.turn(Direction::Left));
        assert_eq!(s.direction(), Direction::Right);
        assert!(s.turn(Direction::Up));
        assert_eq!(s.direction(), Direction::Up);

        let mut s = Snake::new(board(), &mut r);
        assert!(s.turn(Direction::Down));
        assert_eq!(s.direction(), Direction::Down);
    }

    #[test]
    fn two_quick_turns_cannot_reverse_within_a_tick() {
        let mut r = rng();
        let mut s = Snake::with_body(board(), &[Pos::new(5, 5), Pos::new(4, 5)], Direction::Right, Some(Pos::new(0, 0)));
        assert!(s.turn(Direction::Up));
        assert!(!s.turn(Direction::Left));
        assert_eq!(s.step(&mut r), Step::Moved);
        assert_eq!(s.head(), Pos::new(5, 4));
        assert!(s.turn(Direction::Left));
    }

    #[test]
    fn filling_the_board_ends_the_game() {
        let mut r = rng();
        let tiny = Board { width: 2, height: 1 };
        let mut s = Snake::with_body(tiny, &[Pos::new(0, 0)], Direction::Right, Some(Pos::new(1, 0)));
        assert_eq!(s.step(&mut r), Step::Filled);
        assert!(s.is_over());
        assert_eq!(s.food(), None);
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn runner_releases_its_timer_on_game_over() {
        let sched = TickScheduler::new();
        let t0 = Instant::now();
        let tick = Duration::from_millis(150);
        let mut run = SnakeRunner::start(board(), tick, 1, &sched, t0);
        assert_eq!(sched.live(), 1);
        assert!(run.is_running());

        // not due yet
        assert_eq!(run.tick(t0), None);

        // straight right from x=10 hits the wall after 10 moves
        let mut now = t0;
        let mut last = None;
        for _ in 0..40 {
            now += tick;
            if let Some(step) = run.tick(now) {
                last = Some(step);
            }
            if !run.is_running() {
                break;
            }
        }
        assert!(run.snake().is_over());
        assert!(matches!(last, Some(Step::Crashed(Crash::Wall)) | Some(Step::Filled)));
        assert_eq!(sched.live(), 0);

        let frozen: Vec<Pos> = run.snake().segments().collect();
        assert_eq!(run.tick(now + tick), None);
        assert_eq!(run.snake().segments().collect::<Vec<_>>(), frozen);
    }

    #[test]
    fn restart_only_after_game_over() {
        let sched = TickScheduler::new();
        let t0 = Instant::now();
        let mut run = SnakeRunner::start(board(), Duration::from_millis(10), 3, &sched, t0);
        assert!(!run.restart(t0));
        assert_eq!(sched.live(), 1);

        let mut now = t0;
        while run.is_running() {
            now += Duration::from_millis(10);
            run.tick(now);
        }
        assert_eq!(sched.live(), 0);

        assert!(run.restart(now));
        assert_eq!(sched.live(), 1);
        assert_eq!(run.snake().len(), 1);
        assert_eq!(run.snake().score(), 0);
        assert_eq!(run.snake().head(), board().spawn());
        assert!(!run.snake().is_over());

        drop(run);
        assert_eq!(sched.live(), 0);
    }

    fn dir_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_for_random_play(seed in any::<u64>(), moves in proptest::collection::vec(proptest::option::of(dir_strategy()), 1..300)) {
            let mut r = StdRng::seed_from_u64(seed);
            let mut s = Snake::new(Board { width: 8, height: 6 }, &mut r);
            for mv in moves {
                let before_len = s.len();
                let before_score = s.score();
                if let Some(d) = mv {
                    let prev = s.direction();
                    let accepted = s.turn(d);
                    if d == prev.opposite() {
                        prop_assert!(!accepted);
                        prop_assert_eq!(s.direction(), prev);
                    }
                }
                let step = s.step(&mut r);

                let cells: Vec<Pos> = s.segments().collect();
                let unique: HashSet<Pos> = cells.iter().copied().collect();
                prop_assert_eq!(unique.len(), cells.len());
                prop_assert!(cells.iter().all(|p| s.board().contains(*p)));
                if let Some(f) = s.food() {
                    prop_assert!(!s.occupies(f));
                    prop_assert!(s.board().contains(f));
                }
                match step {
                    Step::Ate | Step::Filled => {
                        prop_assert_eq!(s.len(), before_len + 1);
                        prop_assert_eq!(s.score(), before_score + 1);
                    }
                    _ => {
                        prop_assert_eq!(s.len(), before_len);
                        prop_assert_eq!(s.score(), before_score);
                    }
                }
                if s.is_over() {
                    break;
                }
            }
        }
    }
}
