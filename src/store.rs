//! Ordered, owned collection of entities.
//!
//! The store pairs the entity list with the spawn rule that creates entities
//! and the RNG that feeds it. Entities are never freed one by one in a
//! [`Population::Fixed`] store: dead ones are reset in place. A
//! [`Population::Bounded`] store can grow up to its capacity and drops dead
//! entries.

use crate::entity::Entity;
use crate::spawn::SpawnContext;
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Spawn rule: builds one entity from a [`SpawnContext`].
pub type SpawnRule<E> = Box<dyn Fn(&mut SpawnContext) -> E>;

/// How the population size behaves over a store's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Population {
    /// Size set by `initialize` and never changed; dead entities recycle.
    #[default]
    Fixed,
    /// Growable list, never longer than `capacity`.
    Bounded { capacity: usize },
}

/// Values forced onto an entity after its spawn rule ran.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub position: Option<Vec2>,
    pub velocity: Option<Vec2>,
}

impl Overrides {
    /// Spawn at a given point, e.g. the pointer.
    pub fn at(position: Vec2) -> Self {
        Self {
            position: Some(position),
            velocity: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = Some(velocity);
        self
    }
}

/// Entity list plus the spawn rule and seeded RNG that populate it.
pub struct EntityStore<E: Entity> {
    entities: Vec<E>,
    rng: SmallRng,
    spawner: SpawnRule<E>,
    population: Population,
    bounds: Vec2,
}

impl<E: Entity> EntityStore<E> {
    /// Create an empty store. Call [`initialize`](Self::initialize) once the
    /// surface size is known.
    pub fn new<F>(seed: u64, spawner: F) -> Self
    where
        F: Fn(&mut SpawnContext) -> E + 'static,
    {
        Self {
            entities: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
            spawner: Box::new(spawner),
            population: Population::Fixed,
            bounds: Vec2::ZERO,
        }
    }

    pub fn with_population(mut self, population: Population) -> Self {
        self.population = population;
        self
    }

    /// Restart the RNG stream. The next `initialize` is reproducible from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// Replace the whole population with `count` fresh entities.
    ///
    /// A bounded store never holds more than its capacity.
    pub fn initialize(&mut self, count: usize, bounds: Vec2) {
        let count = match self.population {
            Population::Fixed => count,
            Population::Bounded { capacity } => count.min(capacity),
        };
        self.bounds = bounds;
        self.entities.clear();
        self.entities.reserve(count);
        for index in 0..count {
            let entity = self.make(index, count, Overrides::default());
            self.entities.push(entity);
        }
        log::debug!("initialized {} entities in {}x{}", count, bounds.x, bounds.y);
    }

    /// Reinitialise one entity in place. Returns `false` for an index out of
    /// range.
    pub fn reset(&mut self, index: usize, overrides: Overrides) -> bool {
        if index >= self.entities.len() {
            return false;
        }
        let entity = self.make(index, self.entities.len(), overrides);
        self.entities[index] = entity;
        true
    }

    /// Bring one new entity into the population.
    ///
    /// Fixed populations reuse the first dead slot; bounded ones push while
    /// under capacity. Returns the slot used, or `None` when refused.
    pub fn spawn(&mut self, overrides: Overrides) -> Option<usize> {
        match self.population {
            Population::Fixed => {
                let index = self.entities.iter().position(|e| !e.is_alive())?;
                self.reset(index, overrides);
                Some(index)
            }
            Population::Bounded { capacity } => {
                if self.entities.len() >= capacity {
                    return None;
                }
                let index = self.entities.len();
                let entity = self.make(index, index + 1, overrides);
                self.entities.push(entity);
                Some(index)
            }
        }
    }

    /// Handle entities reported by a step, `dead` in ascending order.
    ///
    /// Fixed populations reset each one in place; bounded ones splice them
    /// out.
    pub fn recycle(&mut self, dead: &[usize]) {
        match self.population {
            Population::Fixed => {
                for &index in dead {
                    self.reset(index, Overrides::default());
                }
            }
            Population::Bounded { .. } => self.remove_sorted(dead),
        }
    }

    /// Remove the given indices (ascending), keeping survivor order.
    fn remove_sorted(&mut self, indices: &[usize]) {
        if indices.is_empty() {
            return;
        }
        let mut next = indices.iter().peekable();
        let mut index = 0;
        self.entities.retain(|_| {
            let drop = next.peek().is_some_and(|&&i| i == index);
            if drop {
                next.next();
            }
            index += 1;
            !drop
        });
    }

    /// Remove every entity.
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Splice dead entities out, keeping the order of the survivors.
    pub fn retain_alive(&mut self) {
        self.entities.retain(|e| e.is_alive());
    }

    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [E] {
        &mut self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn population(&self) -> Population {
        self.population
    }

    fn make(&mut self, index: usize, count: usize, overrides: Overrides) -> E {
        let mut ctx =
            SpawnContext::new(index, count, self.bounds, &mut self.rng).at(overrides.position);
        let mut entity = (self.spawner)(&mut ctx);
        if let Some(position) = overrides.position {
            entity.set_position(position);
        }
        if let Some(velocity) = overrides.velocity {
            entity.set_velocity(velocity);
        }
        entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AgedParticle, Point2D};

    fn dots(seed: u64) -> EntityStore<Point2D> {
        EntityStore::new(seed, |ctx| {
            let p = ctx.random_in_bounds();
            Point2D::new(p, ctx.random_velocity(1.0))
        })
    }

    #[test]
    fn test_initialize_count_and_bounds() {
        let mut store = dots(3);
        store.initialize(200, Vec2::new(64.0, 32.0));
        assert_eq!(store.len(), 200);
        for e in store.entities() {
            assert!(e.position.x >= 0.0 && e.position.x < 64.0);
            assert!(e.position.y >= 0.0 && e.position.y < 32.0);
        }
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let mut a = dots(42);
        let mut b = dots(42);
        a.initialize(10, Vec2::splat(100.0));
        b.initialize(10, Vec2::splat(100.0));
        assert_eq!(a.entities(), b.entities());
    }

    #[test]
    fn test_reset_applies_overrides() {
        let mut store = dots(1);
        store.initialize(3, Vec2::splat(50.0));
        let target = Vec2::new(5.0, 6.0);
        assert!(store.reset(1, Overrides::at(target).with_velocity(Vec2::X)));
        assert_eq!(store.entities()[1].position, target);
        assert_eq!(store.entities()[1].velocity, Vec2::X);
        assert!(!store.reset(3, Overrides::default()));
    }

    #[test]
    fn test_spawn_origin_visible_to_rule() {
        let mut store = EntityStore::new(0, |ctx| {
            let p = ctx.origin.unwrap_or(Vec2::ZERO);
            Point2D::new(p, Vec2::ZERO).with_home(p + Vec2::ONE)
        })
        .with_population(Population::Bounded { capacity: 2 });
        store.initialize(0, Vec2::splat(10.0));
        let slot = store.spawn(Overrides::at(Vec2::splat(4.0)));
        assert_eq!(slot, Some(0));
        assert_eq!(store.entities()[0].home, Vec2::splat(5.0));
    }

    #[test]
    fn test_bounded_refuses_at_capacity() {
        let mut store = dots(0).with_population(Population::Bounded { capacity: 2 });
        store.initialize(5, Vec2::splat(10.0));
        assert_eq!(store.len(), 2);
        assert_eq!(store.spawn(Overrides::default()), None);
    }

    #[test]
    fn test_fixed_spawn_reuses_dead_slot() {
        let mut store = EntityStore::new(0, |ctx| {
            AgedParticle::new(ctx.random_in_bounds(), Vec2::ZERO, 10.0)
        });
        store.initialize(3, Vec2::splat(10.0));
        assert_eq!(store.spawn(Overrides::default()), None);

        store.entities_mut()[2].life = 0.0;
        assert_eq!(store.spawn(Overrides::default()), Some(2));
        assert!(store.entities()[2].is_alive());
        assert_eq!(store.len(), 3);
    }

    fn spark(ctx: &mut SpawnContext) -> AgedParticle {
        AgedParticle::new(ctx.random_in_bounds(), Vec2::ZERO, 5.0)
    }

    #[test]
    fn test_recycle_by_population() {
        let mut fixed = EntityStore::new(0, spark);
        fixed.initialize(4, Vec2::splat(10.0));
        fixed.entities_mut()[1].life = -1.0;
        fixed.recycle(&[1]);
        assert_eq!(fixed.len(), 4);
        assert!(fixed.entities().iter().all(|e| e.is_alive()));

        let mut bounded =
            EntityStore::new(0, spark).with_population(Population::Bounded { capacity: 8 });
        bounded.initialize(4, Vec2::splat(10.0));
        bounded.entities_mut()[1].life = -1.0;
        bounded.recycle(&[1]);
        assert_eq!(bounded.len(), 3);
    }
}
