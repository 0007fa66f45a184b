//! Damped harmonic oscillator, in two flavors: a closed-form animation
//! evaluated at arbitrary times (transitions), and a step-integrated chase
//! spring (follow mode).

/// Spring feel: tension (stiffness), friction (damping), mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub tension: f64,
    pub friction: f64,
    pub mass: f64,
}

impl SpringParams {
    pub fn new(tension: f64, friction: f64, mass: f64) -> Self {
        Self {
            tension: tension.max(1e-4),
            friction: friction.max(0.0),
            mass: mass.max(1e-4),
        }
    }

    pub fn smooth() -> Self {
        Self::new(120.0, 22.0, 1.0)
    }

    pub fn snappy() -> Self {
        Self::new(260.0, 24.0, 1.0)
    }

    pub fn gentle() -> Self {
        Self::new(80.0, 20.0, 1.0)
    }

    pub fn stiff() -> Self {
        Self::new(400.0, 40.0, 1.0)
    }

    /// Undamped angular frequency.
    pub fn omega(self) -> f64 {
        (self.tension / self.mass).sqrt()
    }

    /// Damping ratio: <1 oscillatory, =1 critical, >1 overdamped.
    pub fn zeta(self) -> f64 {
        self.friction / (2.0 * (self.tension * self.mass).sqrt())
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self::smooth()
    }
}

/// Analytical spring motion from `from` to `to`.
#[derive(Debug, Clone, Copy)]
pub struct SpringAnimation {
    params: SpringParams,
    from: f64,
    to: f64,
    initial_velocity: f64,
}

impl SpringAnimation {
    pub fn new(params: SpringParams, from: f64, to: f64) -> Self {
        Self {
            params,
            from,
            to,
            initial_velocity: 0.0,
        }
    }

    pub fn with_velocity(params: SpringParams, from: f64, to: f64, velocity: f64) -> Self {
        Self {
            params,
            from,
            to,
            initial_velocity: velocity,
        }
    }

    /// Position and velocity `at` seconds after release.
    pub fn position_velocity(&self, at: f64) -> (f64, f64) {
        if at <= 0.0 {
            return (self.from, self.initial_velocity);
        }

        let omega = self.params.omega();
        let zeta = self.params.zeta();
        let x0 = self.from - self.to;
        let v0 = self.initial_velocity;

        let (displacement, velocity) = if (zeta - 1.0).abs() < 1e-6 {
            critically_damped(x0, v0, omega, at)
        } else if zeta < 1.0 {
            under_damped(x0, v0, omega, zeta, at)
        } else {
            over_damped(x0, v0, omega, zeta, at)
        };

        (self.to + displacement, velocity)
    }

    pub fn position(&self, at: f64) -> f64 {
        self.position_velocity(at).0
    }

    pub fn velocity(&self, at: f64) -> f64 {
        self.position_velocity(at).1
    }

    /// Normalized 0→1 motion curve of this spring's parameters.
    pub fn progress(&self, at: f64) -> f64 {
        let span = self.to - self.from;
        if span.abs() < 1e-12 {
            return 1.0;
        }
        (self.position(at) - self.from) / span
    }

    /// True once both position and normalized velocity are within small
    /// thresholds of the target.
    pub fn is_settled(&self, at: f64) -> bool {
        let span = (self.to - self.from).abs().max(1e-12);
        let (position, velocity) = self.position_velocity(at);
        (position - self.to).abs() / span < 1e-3 && velocity.abs() / span < 1e-3
    }
}

fn under_damped(x0: f64, v0: f64, omega: f64, zeta: f64, t: f64) -> (f64, f64) {
    let omega_d = omega * (1.0 - zeta * zeta).sqrt();
    let decay = zeta * omega;
    let envelope = (-decay * t).exp();

    let a = x0;
    let b = (v0 + decay * x0) / omega_d;
    let (sin, cos) = (omega_d * t).sin_cos();

    let displacement = envelope * (a * cos + b * sin);
    let velocity = envelope * ((b * omega_d - a * decay) * cos - (a * omega_d + b * decay) * sin);
    (displacement, velocity)
}

fn critically_damped(x0: f64, v0: f64, omega: f64, t: f64) -> (f64, f64) {
    let envelope = (-omega * t).exp();
    let b = v0 + omega * x0;

    let displacement = envelope * (x0 + b * t);
    let velocity = envelope * (b - omega * (x0 + b * t));
    (displacement, velocity)
}

fn over_damped(x0: f64, v0: f64, omega: f64, zeta: f64, t: f64) -> (f64, f64) {
    let root = omega * (zeta * zeta - 1.0).sqrt();
    let r1 = -omega * zeta + root;
    let r2 = -omega * zeta - root;

    let c1 = (v0 - r2 * x0) / (r1 - r2);
    let c2 = x0 - c1;

    let e1 = (r1 * t).exp();
    let e2 = (r2 * t).exp();
    (c1 * e1 + c2 * e2, c1 * r1 * e1 + c2 * r2 * e2)
}

/// Step-integrated spring that keeps chasing a moving target. Semi-implicit
/// Euler: stable at the fixed small steps follow mode uses.
#[derive(Debug, Clone, Copy)]
pub struct ChaseSpring {
    pub current: f64,
    pub target: f64,
    pub velocity: f64,
    stiffness: f64,
    damping: f64,
    mass: f64,
}

impl ChaseSpring {
    pub fn new(current: f64, stiffness: f64, damping: f64, mass: f64) -> Self {
        Self {
            current,
            target: current,
            velocity: 0.0,
            stiffness: stiffness.max(1e-4),
            damping: damping.max(0.0),
            mass: mass.max(1e-4),
        }
    }

    pub fn critical_damping(stiffness: f64, mass: f64) -> f64 {
        2.0 * (stiffness.max(1e-4) * mass.max(1e-4)).sqrt()
    }

    pub fn tick(&mut self, dt: f64) -> f64 {
        let safe_dt = dt.max(1e-6);
        let acceleration =
            (self.stiffness * (self.target - self.current) - self.damping * self.velocity)
                / self.mass;
        self.velocity += acceleration * safe_dt;
        self.current += self.velocity * safe_dt;
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_from_and_converges_to_target() {
        for params in [
            SpringParams::smooth(),
            SpringParams::snappy(),
            SpringParams::gentle(),
            SpringParams::stiff(),
        ] {
            let spring = SpringAnimation::new(params, 0.2, 0.8);
            assert_eq!(spring.position(0.0), 0.2);
            assert!((spring.position(10.0) - 0.8).abs() < 1e-4);
            assert!(spring.is_settled(10.0));
        }
    }

    #[test]
    fn under_damped_overshoots_critical_does_not() {
        let oscillatory = SpringParams::new(170.0, 5.0, 1.0);
        assert!(oscillatory.zeta() < 1.0);
        let spring = SpringAnimation::new(oscillatory, 0.0, 1.0);
        let overshoot = (0..400)
            .map(|i| spring.position(i as f64 * 0.01))
            .fold(f64::MIN, f64::max);
        assert!(overshoot > 1.0);

        let stiffness = 170.0;
        let critical = SpringParams::new(stiffness, 2.0 * stiffness.sqrt(), 1.0);
        assert!((critical.zeta() - 1.0).abs() < 1e-9);
        let spring = SpringAnimation::new(critical, 0.0, 1.0);
        for i in 0..400 {
            assert!(spring.position(i as f64 * 0.01) <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn over_damped_approaches_monotonically_and_slower() {
        let heavy = SpringParams::new(100.0, 60.0, 1.0);
        assert!(heavy.zeta() > 1.0);
        let spring = SpringAnimation::new(heavy, 0.0, 1.0);

        let mut previous = 0.0;
        for i in 1..200 {
            let position = spring.position(i as f64 * 0.02);
            assert!(position >= previous - 1e-9);
            assert!(position <= 1.0 + 1e-9);
            previous = position;
        }
    }

    #[test]
    fn initial_velocity_is_honored() {
        let spring = SpringAnimation::with_velocity(SpringParams::smooth(), 0.0, 1.0, 3.0);
        assert_eq!(spring.velocity(0.0), 3.0);
        // a push toward the target arrives earlier than a standing start
        let still = SpringAnimation::new(SpringParams::smooth(), 0.0, 1.0);
        assert!(spring.position(0.05) > still.position(0.05));
    }

    #[test]
    fn progress_normalizes_and_degenerate_span_is_done() {
        let spring = SpringAnimation::new(SpringParams::smooth(), 2.0, 4.0);
        assert_eq!(spring.progress(0.0), 0.0);
        assert!((spring.progress(10.0) - 1.0).abs() < 1e-4);

        let flat = SpringAnimation::new(SpringParams::smooth(), 1.0, 1.0);
        assert_eq!(flat.progress(0.5), 1.0);
    }

    #[test]
    fn velocity_is_consistent_with_position_derivative() {
        let spring = SpringAnimation::new(SpringParams::new(170.0, 12.0, 1.0), 0.0, 1.0);
        let h = 1e-6;
        for &t in &[0.05, 0.2, 0.5, 1.0] {
            let numeric = (spring.position(t + h) - spring.position(t - h)) / (2.0 * h);
            assert!((spring.velocity(t) - numeric).abs() < 1e-4);
        }
    }

    #[test]
    fn chase_spring_follows_moving_target() {
        let stiffness = 170.0;
        let mut spring = ChaseSpring::new(
            0.0,
            stiffness,
            ChaseSpring::critical_damping(stiffness, 1.0),
            1.0,
        );
        spring.target = 1.0;
        for _ in 0..500 {
            spring.tick(0.01);
        }
        assert!((spring.current - 1.0).abs() < 1e-3);
    }
}
