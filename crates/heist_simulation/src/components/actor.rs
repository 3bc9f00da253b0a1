//! Базовые компоненты акторов: Actor, Health, EyeHeight, маркеры

use bevy::prelude::*;

use super::movement::PhysicsBody;

/// Актор (NPC, игрок-грабитель): базовый компонент для живых существ
///
/// Автоматически добавляет Health, EyeHeight, PhysicsBody через Required Components.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Health, EyeHeight, PhysicsBody, Transform)]
pub struct Actor;

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }

    /// Доля оставшегося здоровья [0, 1]
    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }
}

/// Высота глаз над origin актора (origin = ступни)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct EyeHeight {
    pub standing: f32,
    pub crouching: f32,
}

impl Default for EyeHeight {
    fn default() -> Self {
        Self {
            standing: 1.6,
            crouching: 0.8,
        }
    }
}

impl EyeHeight {
    pub fn eye_position(&self, origin: Vec3, crouching: bool) -> Vec3 {
        let height = if crouching { self.crouching } else { self.standing };
        origin + Vec3::Y * height
    }
}

/// Маркер: враждебный для охраны актор (игрок-грабитель)
///
/// NPC сканируют только Intruder'ов; остальные цели появляются через урон
/// или debug-команды.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Intruder;

/// Маркер: актор присел (глаза ниже, охрана замечает медленнее)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Crouching;

/// Маркер: entity мертв (Health == 0)
///
/// Деспавн не автоматический: трупы остаются на месте.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Dead;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_fraction() {
        let mut health = Health::new(80);
        health.take_damage(60);
        assert_eq!(health.current, 20);
        assert!((health.fraction() - 0.25).abs() < 1e-6);

        health.take_damage(100);
        assert!(!health.is_alive());
        assert_eq!(health.fraction(), 0.0);
        assert_eq!(Health { current: 0, max: 0 }.fraction(), 0.0);
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut health = Health::new(100);
        health.take_damage(40);
        health.heal(15);
        assert_eq!(health.current, 75);

        health.heal(u32::MAX);
        assert_eq!(health.current, 100);
    }

    #[test]
    fn test_eye_position_drops_when_crouching() {
        let eyes = EyeHeight::default();
        let origin = Vec3::new(1.0, 0.0, 2.0);
        assert_eq!(eyes.eye_position(origin, false), Vec3::new(1.0, 1.6, 2.0));
        assert_eq!(eyes.eye_position(origin, true), Vec3::new(1.0, 0.8, 2.0));
    }
}
