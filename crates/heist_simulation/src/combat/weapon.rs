//! Оружие NPC
//!
//! AI видит оружие только через `WeaponCapability`. Reload: countdown,
//! который тикает каждый FixedUpdate (`tick_weapons`), без корутин.

use bevy::prelude::*;

/// Capability оружия для firing policy
pub trait WeaponCapability {
    fn can_primary_attack(&self) -> bool;
    fn attack_primary(&mut self);
    fn can_reload(&self) -> bool;
    fn reload(&mut self);
    fn ammo_clip(&self) -> u32;
    fn clip_size(&self) -> u32;
    fn automatic(&self) -> bool;
    fn time_since_primary_attack(&self) -> f32;
}

/// Огнестрельное оружие NPC
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct NpcWeapon {
    /// Выстрелов/сек (жёсткий лимит самого оружия)
    pub primary_rate: f32,
    pub reload_time: f32,
    pub clip_size: u32,
    pub automatic: bool,
    pub damage: u32,
    /// Разброс направления (доля, ~tan угла)
    pub spread: f32,
    /// Дальность трейса пули (m)
    pub range: f32,

    pub ammo_clip: u32,
    pub time_since_primary_attack: f32,
    /// Some(оставшееся время) во время перезарядки
    pub reload_remaining: Option<f32>,
    /// Выстрелы этого тика, ещё не превращённые в WeaponFired
    pub shots_pending: u32,
}

impl NpcWeapon {
    fn with_stats(primary_rate: f32, reload_time: f32, clip_size: u32, automatic: bool, damage: u32, spread: f32) -> Self {
        Self {
            primary_rate,
            reload_time,
            clip_size,
            automatic,
            damage,
            spread,
            range: 100.0,
            ammo_clip: clip_size,
            time_since_primary_attack: f32::MAX,
            reload_remaining: None,
            shots_pending: 0,
        }
    }

    /// Пистолет охраны: полуавтомат, 16 патронов
    pub fn pistol() -> Self {
        Self::with_stats(3.0, 2.5, 16, false, 5, 0.1)
    }

    /// Автомат: 30 патронов, ~13 выстрелов/сек
    pub fn rifle() -> Self {
        Self::with_stats(13.3, 2.0, 30, true, 5, 0.1)
    }

    pub fn is_reloading(&self) -> bool {
        self.reload_remaining.is_some()
    }

    /// Продвигает таймеры на dt; завершает перезарядку
    pub fn tick(&mut self, dt: f32) {
        self.time_since_primary_attack += dt;
        if let Some(remaining) = self.reload_remaining {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.reload_remaining = None;
                self.ammo_clip = self.clip_size;
            } else {
                self.reload_remaining = Some(remaining);
            }
        }
    }

    pub fn take_pending_shots(&mut self) -> u32 {
        std::mem::take(&mut self.shots_pending)
    }
}

impl Default for NpcWeapon {
    fn default() -> Self {
        Self::pistol()
    }
}

impl WeaponCapability for NpcWeapon {
    fn can_primary_attack(&self) -> bool {
        if self.is_reloading() || self.ammo_clip == 0 {
            return false;
        }
        self.primary_rate <= 0.0 || self.time_since_primary_attack > 1.0 / self.primary_rate
    }

    fn attack_primary(&mut self) {
        self.time_since_primary_attack = 0.0;
        if self.ammo_clip == 0 {
            return;
        }
        self.ammo_clip -= 1;
        self.shots_pending += 1;
    }

    fn can_reload(&self) -> bool {
        !self.is_reloading()
    }

    fn reload(&mut self) {
        if !self.is_reloading() {
            self.reload_remaining = Some(self.reload_time);
        }
    }

    fn ammo_clip(&self) -> u32 {
        self.ammo_clip
    }

    fn clip_size(&self) -> u32 {
        self.clip_size
    }

    fn automatic(&self) -> bool {
        self.automatic
    }

    fn time_since_primary_attack(&self) -> f32 {
        self.time_since_primary_attack
    }
}

/// Событие: NPC выстрелил
#[derive(Event, Debug, Clone, PartialEq)]
pub struct WeaponFired {
    pub shooter: Entity,
    pub origin: Vec3,
    pub direction: Vec3,
    pub damage: u32,
    pub spread: f32,
    pub range: f32,
}

/// Система: таймеры оружия (cooldown + reload countdown)
pub fn tick_weapons(mut weapons: Query<&mut NpcWeapon>, time: Res<Time<Fixed>>) {
    let dt = time.delta_secs();
    for mut weapon in weapons.iter_mut() {
        weapon.tick(dt);
    }
}
