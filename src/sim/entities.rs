//! Entity types and factories
//!
//! Every entity is plain data. Behaviour lives in the update pass and the
//! collision resolver, which dispatch on `EnemyKind` with a `match`.

use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Aabb, Dome};
use crate::consts::*;

/// Enemy categories (wave parts, score table and kill counters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Missile,
    Mirv,
    SmartBomb,
    Plane,
    /// Released by planes, never spawned by a wave directly
    PlaneBomb,
    ShieldBomb,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 6] = [
        EnemyKind::Missile,
        EnemyKind::Mirv,
        EnemyKind::SmartBomb,
        EnemyKind::Plane,
        EnemyKind::PlaneBomb,
        EnemyKind::ShieldBomb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Missile => "missile",
            EnemyKind::Mirv => "mirv",
            EnemyKind::SmartBomb => "smartBomb",
            EnemyKind::Plane => "plane",
            EnemyKind::PlaneBomb => "planeBomb",
            EnemyKind::ShieldBomb => "shieldBomb",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['_', '-'], "").as_str() {
            "missile" => Some(EnemyKind::Missile),
            "mirv" => Some(EnemyKind::Mirv),
            "smartbomb" | "smart" => Some(EnemyKind::SmartBomb),
            "plane" => Some(EnemyKind::Plane),
            "planebomb" => Some(EnemyKind::PlaneBomb),
            "shieldbomb" | "shielded" => Some(EnemyKind::ShieldBomb),
            _ => None,
        }
    }

    /// Points for destroying one of these (before multiplier)
    pub fn base_points(&self) -> u32 {
        match self {
            EnemyKind::Plane => PLANE_POINTS,
            EnemyKind::PlaneBomb => PLANE_BOMB_POINTS,
            _ => MISSILE_POINTS,
        }
    }
}

/// Why an entity stopped being alive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fate {
    /// Destroyed by an explosion or area denial (earns a kill credit)
    Intercepted { by_player: bool },
    /// Reached the ground or its target
    Impacted,
    /// Replaced by its warheads
    Split,
    /// Flew out of the field (planes)
    Escaped,
    /// Removed by a forced wave completion
    Cleared,
}

/// Result of one hit on a shielded bomb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmorHit {
    /// Current layer took the hit and held
    Absorbed,
    /// A layer broke; `layers_left` remain
    LayerBroken { layers_left: u8 },
    /// Last layer broke
    Depleted,
}

/// Layered armor carried by shielded bombs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldArmor {
    pub layers: u8,
    pub hits_per_layer: u8,
    pub current_layer_hits: u8,
}

impl Default for ShieldArmor {
    fn default() -> Self {
        Self {
            layers: SHIELD_BOMB_LAYERS,
            hits_per_layer: SHIELD_BOMB_HITS_PER_LAYER,
            current_layer_hits: 0,
        }
    }
}

impl ShieldArmor {
    /// Apply one hit. Layers drop by exactly one per `hits_per_layer` hits.
    pub fn hit(&mut self) -> ArmorHit {
        if self.layers == 0 {
            return ArmorHit::Depleted;
        }
        self.current_layer_hits += 1;
        if self.current_layer_hits < self.hits_per_layer {
            return ArmorHit::Absorbed;
        }
        self.current_layer_hits = 0;
        self.layers -= 1;
        if self.layers == 0 {
            ArmorHit::Depleted
        } else {
            ArmorHit::LayerBroken {
                layers_left: self.layers,
            }
        }
    }
}

/// An enemy projectile (missile, MIRV, smart bomb, plane bomb, shielded bomb)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub target: Vec2,
    pub speed: f32,
    /// Recent positions (newest first)
    #[serde(skip)]
    pub trail: Vec<Vec2>,
    pub alive: bool,
    pub has_split: bool,
    /// Spawned by a split; detonates at reduced size
    pub split_child: bool,
    /// The detonation blast does not damage other enemies
    pub ignore_defenders_on_detonate: bool,
    /// Kill counter already bumped for this entity
    pub counted_as_destroyed: bool,
    pub fate: Option<Fate>,
    /// Present only on shielded bombs
    pub armor: Option<ShieldArmor>,
}

impl Projectile {
    /// Projectile at `pos` flying toward `target` at `speed` pixels/tick
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, target: Vec2, speed: f32) -> Self {
        let armor = (kind == EnemyKind::ShieldBomb).then(ShieldArmor::default);
        Self {
            id,
            kind,
            pos,
            vel: (target - pos).normalize_or(Vec2::Y) * speed,
            target,
            speed,
            trail: Vec::with_capacity(TRAIL_LENGTH),
            alive: true,
            has_split: false,
            split_child: false,
            ignore_defenders_on_detonate: false,
            counted_as_destroyed: false,
            fate: None,
            armor,
        }
    }

    /// Warhead released by a MIRV or smart bomb split
    pub fn split_child(id: u32, pos: Vec2, target: Vec2, speed: f32) -> Self {
        Self {
            split_child: true,
            ignore_defenders_on_detonate: true,
            ..Self::new(id, EnemyKind::Missile, pos, target, speed)
        }
    }

    /// Re-aim at a new target keeping the current speed
    pub fn retarget(&mut self, target: Vec2) {
        self.target = target;
        self.vel = (target - self.pos).normalize_or(Vec2::Y) * self.speed;
    }

    /// Record current position to trail
    pub fn record_trail(&mut self) {
        self.trail.insert(0, self.pos);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop();
        }
    }

    pub fn kill(&mut self, fate: Fate) {
        self.alive = false;
        self.fate = Some(fate);
    }

    /// Dead by interception and not yet counted
    pub fn pending_kill_credit(&self) -> bool {
        !self.alive
            && !self.counted_as_destroyed
            && matches!(self.fate, Some(Fate::Intercepted { .. }))
    }
}

/// A bomber crossing the field horizontally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plane {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub bombs_left: u8,
    pub drop_timer: u32,
    pub alive: bool,
    pub counted_as_destroyed: bool,
    pub fate: Option<Fate>,
}

impl Plane {
    /// Plane entering from the left (`from_left`) or right edge at `altitude`
    pub fn new(id: u32, from_left: bool, altitude: f32, speed: f32, drop_timer: u32) -> Self {
        let (x, dir) = if from_left {
            (-20.0, 1.0)
        } else {
            (FIELD_WIDTH + 20.0, -1.0)
        };
        Self {
            id,
            pos: Vec2::new(x, altitude),
            vel: Vec2::new(dir * speed, 0.0),
            bombs_left: PLANE_BOMBS,
            drop_timer,
            alive: true,
            counted_as_destroyed: false,
            fate: None,
        }
    }

    pub fn kill(&mut self, fate: Fate) {
        self.alive = false;
        self.fate = Some(fate);
    }

    pub fn pending_kill_credit(&self) -> bool {
        !self.alive
            && !self.counted_as_destroyed
            && matches!(self.fate, Some(Fate::Intercepted { .. }))
    }
}

/// Interceptor fired by the defender
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerMissile {
    pub id: u32,
    pub pos: Vec2,
    pub target: Vec2,
    pub vel: Vec2,
    /// Blast radius locked in at launch
    pub blast_radius: f32,
    pub alive: bool,
}

impl PlayerMissile {
    pub fn new(id: u32, origin: Vec2, target: Vec2, speed: f32, blast_radius: f32) -> Self {
        Self {
            id,
            pos: origin,
            target,
            vel: (target - origin).normalize_or(Vec2::NEG_Y) * speed,
            blast_radius,
            alive: true,
        }
    }
}

/// Expanding blast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub id: u32,
    pub center: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub duration: u32,
    pub frame: u32,
    /// Caused by the defender (earns streak, combo and accuracy)
    pub player: bool,
    /// Cosmetic: never damages enemies
    pub ignore_defenders: bool,
    pub kill_count: u32,
    /// Projectiles already resolved by this blast
    #[serde(skip)]
    pub hit_projectiles: HashSet<u32>,
    /// Planes already resolved by this blast
    #[serde(skip)]
    pub hit_planes: HashSet<u32>,
}

impl Explosion {
    pub fn new(id: u32, center: Vec2, max_radius: f32, duration: u32) -> Self {
        Self {
            id,
            center,
            radius: 0.0,
            max_radius,
            duration: duration.max(1),
            frame: 0,
            player: false,
            ignore_defenders: false,
            kill_count: 0,
            hit_projectiles: HashSet::new(),
            hit_planes: HashSet::new(),
        }
    }

    pub fn player(id: u32, center: Vec2, max_radius: f32, duration: u32) -> Self {
        Self {
            player: true,
            ..Self::new(id, center, max_radius, duration)
        }
    }

    /// Blast that draws but never resolves collisions
    pub fn cosmetic(id: u32, center: Vec2, max_radius: f32, duration: u32) -> Self {
        Self {
            ignore_defenders: true,
            ..Self::new(id, center, max_radius, duration)
        }
    }

    /// Radius at a given frame: linear growth over the first 60%, then decay
    pub fn radius_at(&self, frame: u32) -> f32 {
        if frame >= self.duration {
            return 0.0;
        }
        let t = frame as f32 / self.duration as f32;
        if t <= 0.6 {
            self.max_radius * (t / 0.6)
        } else {
            (self.max_radius * (1.0 - (t - 0.6) / 0.4)).max(0.0)
        }
    }

    /// Step one frame
    pub fn advance(&mut self) {
        self.frame += 1;
        self.radius = self.radius_at(self.frame);
    }

    pub fn is_done(&self) -> bool {
        self.frame >= self.duration
    }
}

/// Energy shield on a base or satellite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    pub strength: f32,
    pub flash_ticks: u32,
}

impl Default for Shield {
    fn default() -> Self {
        Self {
            strength: SHIELD_STRENGTH,
            flash_ticks: 0,
        }
    }
}

impl Shield {
    /// Absorb a hit; returns true when the shield breaks
    pub fn absorb(&mut self, damage: f32) -> bool {
        self.strength -= damage;
        self.flash_ticks = SHIELD_FLASH_TICKS;
        self.strength <= 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    /// Center of the hit box
    pub pos: Vec2,
    pub alive: bool,
}

impl City {
    pub fn new(x: f32) -> Self {
        Self {
            pos: Vec2::new(x, GROUND_Y - CITY_HEIGHT / 2.0),
            alive: true,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(CITY_WIDTH, CITY_HEIGHT)).inflate(IMPACT_MARGIN)
    }
}

/// Ground launch site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Base {
    pub pos: Vec2,
    pub alive: bool,
    pub ammo: u32,
    pub shield: Option<Shield>,
}

impl Base {
    pub fn new(x: f32, ammo: u32) -> Self {
        Self {
            pos: Vec2::new(x, GROUND_Y - BASE_HEIGHT / 2.0),
            alive: true,
            ammo,
            shield: None,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(BASE_WIDTH, BASE_HEIGHT)).inflate(IMPACT_MARGIN)
    }

    /// Where interceptors leave the silo
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x, GROUND_Y - BASE_HEIGHT)
    }

    pub fn dome(&self) -> Dome {
        Dome {
            center_x: self.pos.x,
            base_y: GROUND_Y,
            radius: BASE_SHIELD_RADIUS,
            height: BASE_SHIELD_HEIGHT,
        }
    }
}

/// Orbital launch site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Satellite {
    pub pos: Vec2,
    pub alive: bool,
    pub ammo: u32,
    pub shield: Option<Shield>,
}

impl Satellite {
    pub fn new(pos: Vec2, ammo: u32) -> Self {
        Self {
            pos,
            alive: true,
            ammo,
            shield: None,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(SATELLITE_WIDTH, SATELLITE_HEIGHT))
    }
}

/// Which structures an enemy may aim at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPreference {
    /// Any alive city, base or satellite
    Any,
    /// Alive cities and bases only
    Ground,
}

/// Everything the defender protects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Structures {
    pub cities: Vec<City>,
    pub bases: Vec<Base>,
    pub satellites: Vec<Satellite>,
}

impl Structures {
    /// Standard layout: six cities between three bases, no satellites
    pub fn standard(ammo: u32) -> Self {
        Self {
            cities: CITY_XS.iter().map(|&x| City::new(x)).collect(),
            bases: BASE_XS.iter().map(|&x| Base::new(x, ammo)).collect(),
            satellites: Vec::new(),
        }
    }

    pub fn cities_alive(&self) -> usize {
        self.cities.iter().filter(|c| c.alive).count()
    }

    pub fn bases_alive(&self) -> usize {
        self.bases.iter().filter(|b| b.alive).count()
    }

    pub fn satellites_alive(&self) -> usize {
        self.satellites.iter().filter(|s| s.alive).count()
    }

    /// Aim points of alive structures matching the preference
    pub fn aim_points(&self, pref: TargetPreference) -> Vec<Vec2> {
        let mut points: Vec<Vec2> = self
            .cities
            .iter()
            .filter(|c| c.alive)
            .map(|c| c.pos)
            .chain(self.bases.iter().filter(|b| b.alive).map(|b| b.pos))
            .collect();
        if pref == TargetPreference::Any {
            points.extend(self.satellites.iter().filter(|s| s.alive).map(|s| s.pos));
        }
        points
    }

    /// Pick a random alive target, or a random ground point when none remain
    pub fn pick_target<R: Rng + ?Sized>(&self, pref: TargetPreference, rng: &mut R) -> Vec2 {
        let points = self.aim_points(pref);
        if points.is_empty() {
            Vec2::new(rng.random_range(0.0..FIELD_WIDTH), GROUND_Y)
        } else {
            points[rng.random_range(0..points.len())]
        }
    }
}

/// Lingering zone that destroys enemy projectiles entering it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaDenial {
    pub center: Vec2,
    pub radius: f32,
    pub ticks_left: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_armor_breaks_one_layer_per_three_hits() {
        let mut armor = ShieldArmor::default();
        assert_eq!(armor.hit(), ArmorHit::Absorbed);
        assert_eq!(armor.hit(), ArmorHit::Absorbed);
        assert_eq!(armor.hit(), ArmorHit::LayerBroken { layers_left: 2 });
        assert_eq!(armor.current_layer_hits, 0);
        for _ in 0..2 {
            armor.hit();
        }
        assert_eq!(armor.hit(), ArmorHit::LayerBroken { layers_left: 1 });
        armor.hit();
        armor.hit();
        assert_eq!(armor.hit(), ArmorHit::Depleted);
        assert_eq!(armor.layers, 0);
    }

    #[test]
    fn test_explosion_radius_curve() {
        let mut ex = Explosion::player(1, Vec2::ZERO, 60.0, 100);
        assert_eq!(ex.radius_at(0), 0.0);
        assert!((ex.radius_at(30) - 30.0).abs() < 1e-4);
        assert!((ex.radius_at(60) - 60.0).abs() < 1e-4);
        assert!((ex.radius_at(80) - 30.0).abs() < 1e-4);
        assert_eq!(ex.radius_at(100), 0.0);
        for _ in 0..100 {
            ex.advance();
        }
        assert!(ex.is_done());
        assert_eq!(ex.radius, 0.0);
    }

    #[test]
    fn test_projectile_trail_is_bounded() {
        let mut p = Projectile::new(1, EnemyKind::Missile, Vec2::ZERO, Vec2::new(0.0, 500.0), 1.0);
        for i in 0..(TRAIL_LENGTH + 5) {
            p.pos.y = i as f32;
            p.record_trail();
        }
        assert_eq!(p.trail.len(), TRAIL_LENGTH);
        assert_eq!(p.trail[0].y, (TRAIL_LENGTH + 4) as f32);
    }

    #[test]
    fn test_split_child_flags() {
        let child = Projectile::split_child(9, Vec2::ZERO, Vec2::new(10.0, 570.0), 2.0);
        assert!(child.split_child);
        assert!(child.ignore_defenders_on_detonate);
        assert!(child.armor.is_none());
        assert!((child.vel.length() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_dead_structures_are_not_targets() {
        let mut structures = Structures::standard(10);
        for city in &mut structures.cities {
            city.alive = false;
        }
        structures.bases[0].alive = false;
        structures.bases[2].alive = false;
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..20 {
            let target = structures.pick_target(TargetPreference::Ground, &mut rng);
            assert_eq!(target, structures.bases[1].pos);
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(EnemyKind::from_str("smart_bomb"), Some(EnemyKind::SmartBomb));
        assert_eq!(EnemyKind::from_str("shieldBomb"), Some(EnemyKind::ShieldBomb));
        assert_eq!(EnemyKind::from_str("ufo"), None);
    }
}
