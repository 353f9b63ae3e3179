#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
use rand::Rng;

/// Default population size.
pub const DEFAULT_BOID_COUNT: usize = 100;

/// A 2D vector used for position and velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn magnitude(&self) -> f64 {
        #[cfg(feature = "std")]
        {
            (self.x * self.x + self.y * self.y).sqrt()
        }
        #[cfg(not(feature = "std"))]
        {
            libm::sqrt(self.x * self.x + self.y * self.y)
        }
    }

    pub fn distance(&self, other: &Vec2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        #[cfg(feature = "std")]
        {
            (dx * dx + dy * dy).sqrt()
        }
        #[cfg(not(feature = "std"))]
        {
            libm::sqrt(dx * dx + dy * dy)
        }
    }
}

impl core::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl core::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl core::ops::Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl core::ops::Div<f64> for Vec2 {
    type Output = Self;

    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl core::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl core::ops::SubAssign for Vec2 {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

/// Tuning constants for one simulation run, fixed at flock construction.
///
/// `Default` yields the standard 800x600 canvas tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlockConfig {
    /// Simulation area width in pixels
    pub width: f64,
    /// Simulation area height in pixels
    pub height: f64,
    /// Neighbor detection radius; separation kicks in below half of it
    pub visual_range: f64,
    /// Cohesion strength
    pub centering_factor: f64,
    /// Alignment strength
    pub matching_factor: f64,
    /// Separation strength
    pub avoid_factor: f64,
    /// Boundary steering strength
    pub turn_factor: f64,
    /// Lower speed clamp
    pub min_speed: f64,
    /// Upper speed clamp
    pub max_speed: f64,
    /// Width of the boundary band along each edge; the area must be wider
    /// than twice this for boundary steering to leave an interior
    pub margin: f64,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            visual_range: 50.0,
            centering_factor: 0.005,
            matching_factor: 0.05,
            avoid_factor: 0.05,
            turn_factor: 1.0,
            min_speed: 2.0,
            max_speed: 4.0,
            margin: 50.0,
        }
    }
}

impl FlockConfig {
    /// Standard tuning over a custom simulation area
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

/// Render-facing snapshot of one boid: position plus heading in radians
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

/// A single boid entity
#[derive(Debug, Clone)]
pub struct Boid {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Boid {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    /// Position uniform over the area, velocity uniform in [-2, 2] per axis.
    ///
    /// The initial speed may fall outside the clamp range; the first
    /// `update` corrects it.
    #[cfg(feature = "std")]
    pub fn random<R: Rng>(rng: &mut R, config: &FlockConfig) -> Self {
        let position = Vec2::new(
            rng.gen_range(0.0..config.width),
            rng.gen_range(0.0..config.height),
        );
        let velocity = Vec2::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0));
        Self::new(position, velocity)
    }

    /// Advance this boid one frame against its neighbor candidates.
    ///
    /// `others` must yield every other boid in the flock, self excluded.
    /// One pass accumulates the cohesion/alignment averages over boids
    /// within `visual_range` and the separation push-away from boids within
    /// half of it; boundary steering and the speed clamp then apply
    /// unconditionally, and the position advances one Euler step.
    ///
    /// A boid at exactly zero speed has no heading to rescale, so the clamp
    /// leaves it at rest instead of dividing by zero.
    pub fn update<'a, I>(&mut self, others: I, config: &FlockConfig)
    where
        I: Iterator<Item = &'a Boid>,
    {
        let mut position_sum = Vec2::zero();
        let mut velocity_sum = Vec2::zero();
        let mut close = Vec2::zero();
        let mut neighbors = 0u32;

        for other in others {
            let offset = other.position - self.position;
            let distance = offset.magnitude();

            if distance < config.visual_range {
                // Separation: push away from very close neighbors. Raw
                // offsets accumulate unnormalized, so closer neighbors
                // weigh in harder.
                if distance < config.visual_range / 2.0 {
                    close -= offset;
                }

                position_sum += other.position;
                velocity_sum += other.velocity;
                neighbors += 1;
            }
        }

        if neighbors > 0 {
            let position_avg = position_sum / neighbors as f64;
            let velocity_avg = velocity_sum / neighbors as f64;

            // Cohesion toward the neighborhood center of mass, alignment
            // toward its average velocity
            self.velocity += (position_avg - self.position) * config.centering_factor
                + (velocity_avg - self.velocity) * config.matching_factor;

            self.velocity += close * config.avoid_factor;
        }

        // Each edge check is independent, so a corner applies two
        // corrections at once
        if self.position.y < config.margin {
            self.velocity.y += config.turn_factor;
        }
        if self.position.x > config.width - config.margin {
            self.velocity.x -= config.turn_factor;
        }
        if self.position.x < config.margin {
            self.velocity.x += config.turn_factor;
        }
        if self.position.y > config.height - config.margin {
            self.velocity.y -= config.turn_factor;
        }

        let speed = self.velocity.magnitude();
        if speed > 0.0 {
            if speed < config.min_speed {
                self.velocity = self.velocity * (config.min_speed / speed);
            } else if speed > config.max_speed {
                self.velocity = self.velocity * (config.max_speed / speed);
            }
        }

        self.position += self.velocity;
    }

    /// Heading angle in radians, measured from the positive x axis
    pub fn heading(&self) -> f64 {
        #[cfg(feature = "std")]
        {
            self.velocity.y.atan2(self.velocity.x)
        }
        #[cfg(not(feature = "std"))]
        {
            libm::atan2(self.velocity.y, self.velocity.x)
        }
    }

    pub fn pose(&self) -> Pose {
        Pose {
            x: self.position.x,
            y: self.position.y,
            heading: self.heading(),
        }
    }
}

/// One simulation frame over a slice of boids, in slice order.
///
/// Boids mutate in place as the pass proceeds: boid `i` reads the
/// already-updated state of boids `0..i` and the pre-update state of boids
/// `i+1..`. Snapshotting all positions upfront would be a different update
/// rule with different emergent trajectories.
fn step_boids(boids: &mut [Boid], config: &FlockConfig) {
    for i in 0..boids.len() {
        let (before, rest) = boids.split_at_mut(i);
        if let Some((boid, after)) = rest.split_first_mut() {
            boid.update(before.iter().chain(after.iter()), config);
        }
    }
}

/// A fixed-capacity flock for no-alloc environments
pub struct StaticFlock<const N: usize> {
    pub boids: heapless::Vec<Boid, N>,
    pub config: FlockConfig,
}

impl<const N: usize> StaticFlock<N> {
    pub fn new(config: FlockConfig) -> Self {
        Self {
            boids: heapless::Vec::new(),
            config,
        }
    }

    /// Returns the boid back on capacity overflow
    pub fn add_boid(&mut self, boid: Boid) -> Result<(), Boid> {
        self.boids.push(boid)
    }

    pub fn step(&mut self) {
        step_boids(&mut self.boids, &self.config);
    }

    pub fn poses(&self) -> heapless::Vec<Pose, N> {
        self.boids.iter().map(Boid::pose).collect()
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }
}

/// The owning boid collection for std environments
#[cfg(feature = "std")]
pub struct Flock {
    pub boids: Vec<Boid>,
    pub config: FlockConfig,
}

#[cfg(feature = "std")]
impl Flock {
    /// Randomized flock from the thread-local RNG
    pub fn new(config: FlockConfig, count: usize) -> Self {
        let mut rng = rand::thread_rng();
        Self::with_rng(config, count, &mut rng)
    }

    /// Randomized flock from a caller-supplied RNG; with a seeded RNG the
    /// whole run is reproducible
    pub fn with_rng<R: Rng>(config: FlockConfig, count: usize, rng: &mut R) -> Self {
        let boids = (0..count).map(|_| Boid::random(rng, &config)).collect();
        Self { boids, config }
    }

    /// Flock over explicitly placed boids, in the given order
    pub fn from_boids(config: FlockConfig, boids: Vec<Boid>) -> Self {
        Self { boids, config }
    }

    /// Advance the whole flock one frame.
    ///
    /// Sequential in creation order; see [`Boid::update`] for the per-boid
    /// rules and [`step_boids`]'s in-place read semantics.
    pub fn step(&mut self) {
        step_boids(&mut self.boids, &self.config);
    }

    /// Render-facing poses, one per boid, in stable creation order
    pub fn poses(&self) -> Vec<Pose> {
        self.boids.iter().map(Boid::pose).collect()
    }

    pub fn add_boid(&mut self, boid: Boid) {
        self.boids.push(boid);
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_new() {
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(v.x, 3.0);
        assert_eq!(v.y, 4.0);
    }

    #[test]
    fn test_vec2_magnitude() {
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(v.magnitude(), 5.0);
    }

    #[test]
    fn test_vec2_distance() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 6.0);
        assert_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn test_vec2_operations() {
        let v1 = Vec2::new(1.0, 2.0);
        let v2 = Vec2::new(3.0, 4.0);

        let sum = v1 + v2;
        assert_eq!(sum.x, 4.0);
        assert_eq!(sum.y, 6.0);

        let diff = v2 - v1;
        assert_eq!(diff.x, 2.0);
        assert_eq!(diff.y, 2.0);

        let scaled = v1 * 2.0;
        assert_eq!(scaled.x, 2.0);
        assert_eq!(scaled.y, 4.0);

        let halved = v2 / 2.0;
        assert_eq!(halved.x, 1.5);
        assert_eq!(halved.y, 2.0);
    }

    #[test]
    fn test_boid_creation() {
        let boid = Boid::new(Vec2::new(10.0, 20.0), Vec2::new(1.0, 1.0));
        assert_eq!(boid.position.x, 10.0);
        assert_eq!(boid.position.y, 20.0);
        assert_eq!(boid.velocity.x, 1.0);
        assert_eq!(boid.velocity.y, 1.0);
    }

    #[test]
    fn test_isolated_boid_keeps_velocity() {
        let config = FlockConfig::default();
        // Interior of the area, in-range speed: no rule fires, only the
        // Euler step happens
        let mut boid = Boid::new(Vec2::new(400.0, 300.0), Vec2::new(3.0, 0.0));

        boid.update(core::iter::empty(), &config);

        assert_eq!(boid.velocity, Vec2::new(3.0, 0.0));
        assert_eq!(boid.position, Vec2::new(403.0, 300.0));
    }

    #[test]
    fn test_slow_boid_rescaled_to_min_speed() {
        let config = FlockConfig::default();
        let mut boid = Boid::new(Vec2::new(400.0, 300.0), Vec2::new(1.0, 0.0));

        boid.update(core::iter::empty(), &config);

        assert!((boid.velocity.magnitude() - config.min_speed).abs() < 1e-12);
        assert_eq!(boid.velocity.y, 0.0);
        assert!(boid.velocity.x > 0.0);
    }

    #[test]
    fn test_fast_boid_rescaled_to_max_speed() {
        let config = FlockConfig::default();
        let mut boid = Boid::new(Vec2::new(400.0, 300.0), Vec2::new(6.0, 8.0));

        boid.update(core::iter::empty(), &config);

        assert!((boid.velocity.magnitude() - config.max_speed).abs() < 1e-12);
        // Direction preserved
        assert!((boid.velocity.y / boid.velocity.x - 8.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_speed_boid_stays_at_rest() {
        let config = FlockConfig::default();
        let mut boid = Boid::new(Vec2::new(400.0, 300.0), Vec2::zero());

        boid.update(core::iter::empty(), &config);

        assert_eq!(boid.velocity, Vec2::zero());
        assert_eq!(boid.position, Vec2::new(400.0, 300.0));
        assert!(boid.velocity.x.is_finite() && boid.velocity.y.is_finite());
    }

    #[test]
    fn test_heading() {
        let boid = Boid::new(Vec2::zero(), Vec2::new(0.0, 2.0));
        assert!((boid.heading() - core::f64::consts::FRAC_PI_2).abs() < 1e-12);

        let boid = Boid::new(Vec2::zero(), Vec2::new(-2.0, 0.0));
        assert!((boid.heading() - core::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_flock_creation() {
        let flock = Flock::new(FlockConfig::default(), 50);
        assert_eq!(flock.len(), 50);
        for boid in &flock.boids {
            assert!(boid.position.x >= 0.0 && boid.position.x < 800.0);
            assert!(boid.position.y >= 0.0 && boid.position.y < 600.0);
            assert!(boid.velocity.x >= -2.0 && boid.velocity.x < 2.0);
            assert!(boid.velocity.y >= -2.0 && boid.velocity.y < 2.0);
        }
    }

    #[test]
    fn test_flock_update_moves_boids() {
        let mut flock = Flock::new(FlockConfig::default(), 10);
        let initial: Vec<_> = flock.boids.iter().map(|b| b.position).collect();

        flock.step();

        let moved = flock
            .boids
            .iter()
            .zip(initial.iter())
            .any(|(b, &p)| b.position != p);
        assert!(moved);
    }

    #[test]
    fn test_empty_flock_step() {
        let mut flock = Flock::from_boids(FlockConfig::default(), Vec::new());
        flock.step();
        assert!(flock.is_empty());
        assert!(flock.poses().is_empty());
    }

    #[test]
    fn test_flock_add_boid() {
        let mut flock = Flock::new(FlockConfig::default(), 10);
        flock.add_boid(Boid::new(Vec2::new(1.0, 2.0), Vec2::new(0.5, 0.5)));
        assert_eq!(flock.len(), 11);
    }

    #[test]
    fn test_static_flock_capacity() {
        let mut flock: StaticFlock<2> = StaticFlock::new(FlockConfig::default());
        assert!(flock
            .add_boid(Boid::new(Vec2::new(100.0, 100.0), Vec2::new(2.0, 0.0)))
            .is_ok());
        assert!(flock
            .add_boid(Boid::new(Vec2::new(500.0, 400.0), Vec2::new(0.0, 2.0)))
            .is_ok());
        assert!(flock
            .add_boid(Boid::new(Vec2::new(300.0, 300.0), Vec2::zero()))
            .is_err());
        assert_eq!(flock.len(), 2);
    }

    #[test]
    fn test_static_flock_matches_flock() {
        let config = FlockConfig::default();
        let seed = [
            Boid::new(Vec2::new(100.0, 300.0), Vec2::new(2.0, 1.0)),
            Boid::new(Vec2::new(120.0, 310.0), Vec2::new(-1.0, 2.0)),
            Boid::new(Vec2::new(400.0, 200.0), Vec2::new(0.0, -3.0)),
        ];

        let mut fixed: StaticFlock<8> = StaticFlock::new(config);
        for boid in &seed {
            let _ = fixed.add_boid(boid.clone());
        }
        let mut heap = Flock::from_boids(config, seed.to_vec());

        for _ in 0..20 {
            fixed.step();
            heap.step();
        }

        for (a, b) in fixed.poses().iter().zip(heap.poses().iter()) {
            assert_eq!(a, b);
        }
    }
}
