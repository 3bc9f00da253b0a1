//! Память о целях NPC: кого видели, кто стрелял, кого преследуем
//!
//! Записи хранятся по ключу Entity в `BTreeMap` (стабильный порядок обхода).
//! Запись: owned значение, меняется только через методы `TargetMemory`.
//!
//! Соглашение по `time_since_reappear`: таймер растёт вверх от отрицательного
//! значения. Отрицательная часть: grace (время реакции), стрелять можно,
//! когда таймер дошёл до `NpcParams::reaction_time`.

use std::collections::BTreeMap;

use bevy::prelude::*;

/// Grace при смене текущей цели / первом обнаружении
pub const SWITCH_GRACE: f32 = 1.0;

/// Время "невидимости" новой записи, созданной не по прямому наблюдению
const UNSEEN_TIME: f32 = 1.0;

/// Что NPC знает об одной цели
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct TargetRecord {
    pub entity: Entity,
    pub last_position: Vec3,
    /// Накопленный приоритет (урон от цели); не убывает
    pub enmity: f32,
    pub time_since_visible: f32,
    pub time_since_reappear: f32,
}

impl TargetRecord {
    pub fn new(entity: Entity, position: Vec3) -> Self {
        Self {
            entity,
            last_position: position,
            enmity: 1.0,
            time_since_visible: 0.0,
            time_since_reappear: 0.0,
        }
    }
}

/// Grace после повторного появления цели, которую не видели `unseen` секунд
pub fn reappear_grace(unseen: f32) -> f32 {
    ((unseen - 1.0) / 3.0).clamp(0.0, 1.0)
}

#[derive(Component, Debug, Clone, Default)]
pub struct TargetMemory {
    records: BTreeMap<Entity, TargetRecord>,
    current: Option<Entity>,
}

impl TargetMemory {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.records.contains_key(&entity)
    }

    pub fn get(&self, entity: Entity) -> Option<&TargetRecord> {
        self.records.get(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetRecord> {
        self.records.values()
    }

    pub fn current(&self) -> Option<Entity> {
        self.current
    }

    pub fn current_record(&self) -> Option<&TargetRecord> {
        self.current.and_then(|e| self.records.get(&e))
    }

    fn current_record_mut(&mut self) -> Option<&mut TargetRecord> {
        self.current.and_then(|e| self.records.get_mut(&e))
    }

    /// Прямое наблюдение. Новая запись получает grace `grace` (положительное число).
    ///
    /// Возвращает true, если запись создана.
    pub fn record_sighting(&mut self, entity: Entity, position: Vec3, grace: f32) -> bool {
        match self.records.get_mut(&entity) {
            Some(record) => {
                record.last_position = position;
                record.time_since_visible = 0.0;
                false
            }
            None => {
                let mut record = TargetRecord::new(entity, position);
                record.time_since_reappear = -grace;
                self.records.insert(entity, record);
                true
            }
        }
    }

    /// Цель снова видна в этом тике (visibility pass)
    ///
    /// Если цель была текущей и пропадала, взводим grace повторного появления.
    pub fn mark_visible(&mut self, entity: Entity, position: Vec3) {
        let is_current = self.current == Some(entity);
        if let Some(record) = self.records.get_mut(&entity) {
            if is_current && record.time_since_visible > 0.0 {
                let grace = reappear_grace(record.time_since_visible);
                if grace > 0.0 {
                    record.time_since_reappear = record.time_since_reappear.min(-grace);
                }
            }
            record.last_position = position;
            record.time_since_visible = 0.0;
        }
    }

    /// "Неизвестная" цель: знаем, что она есть, но не где точно
    ///
    /// Ничего не делает для уже известной цели. Новая запись становится
    /// текущей, только если текущей нет. Возвращает true, если запись создана.
    pub fn record_unknown(&mut self, entity: Entity, guessed_position: Vec3) -> bool {
        let created = if self.records.contains_key(&entity) {
            false
        } else {
            let mut record = TargetRecord::new(entity, guessed_position);
            record.time_since_visible = UNSEEN_TIME;
            record.time_since_reappear = -SWITCH_GRACE;
            self.records.insert(entity, record);
            true
        };

        if self.current.is_none() {
            self.current = Some(entity);
        }
        created
    }

    /// Урон от `attacker`: enmity растёт, позиция атакующего раскрыта
    ///
    /// Неизвестный атакующий получает запись с enmity = amount.
    pub fn record_damage(&mut self, attacker: Entity, amount: f32, attacker_position: Vec3) -> bool {
        let amount = amount.max(0.0);
        match self.records.get_mut(&attacker) {
            Some(record) => {
                record.enmity += amount;
                record.last_position = attacker_position;
                false
            }
            None => {
                let mut record = TargetRecord::new(attacker, attacker_position);
                record.enmity = amount;
                record.time_since_visible = UNSEEN_TIME;
                record.time_since_reappear = -SWITCH_GRACE;
                self.records.insert(attacker, record);
                true
            }
        }
    }

    /// Делает известную цель текущей; неизвестную: игнорирует
    pub fn set_current(&mut self, entity: Entity) -> bool {
        if self.records.contains_key(&entity) {
            self.current = Some(entity);
            true
        } else {
            false
        }
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    /// Удаляет записи о невалидных (уничтоженных/мёртвых) целях
    pub fn prune(&mut self, mut is_valid: impl FnMut(Entity) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|entity, _| is_valid(*entity));
        if self.current.is_some_and(|e| !self.records.contains_key(&e)) {
            self.current = None;
        }
        before - self.records.len()
    }

    /// Выбор лучшей цели по `score` (по умолчанию: enmity)
    ///
    /// Равный score: оставляем текущую цель; иначе меньший Entity.
    /// Смена цели взводит grace `SWITCH_GRACE`.
    pub fn evaluate_best(
        &mut self,
        is_valid: impl FnMut(Entity) -> bool,
        score: impl Fn(&TargetRecord) -> f32,
    ) -> Option<Entity> {
        self.prune(is_valid);

        let mut best: Option<(Entity, f32)> = self
            .current_record()
            .map(|record| (record.entity, score(record)));

        for record in self.records.values() {
            let value = score(record);
            let better = match best {
                None => true,
                Some((_, best_value)) => value > best_value,
            };
            if better {
                best = Some((record.entity, value));
            }
        }

        let best = best.map(|(entity, _)| entity);
        if best.is_some() && best != self.current {
            self.current = best;
            if let Some(record) = self.current_record_mut() {
                record.time_since_reappear = -SWITCH_GRACE;
            }
        }
        self.current
    }

    pub fn forget(&mut self, entity: Entity) -> Option<TargetRecord> {
        let removed = self.records.remove(&entity);
        if self.current == Some(entity) {
            self.current = None;
        }
        removed
    }

    pub fn forget_current(&mut self) -> Option<TargetRecord> {
        self.current.and_then(|entity| self.forget(entity))
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.current = None;
    }

    /// Таймеры всех записей растут на dt
    pub fn advance(&mut self, dt: f32) {
        for record in self.records.values_mut() {
            record.time_since_visible += dt;
            record.time_since_reappear += dt;
        }
    }

    /// Последняя известная позиция текущей цели; `Vec3::ZERO`: "неизвестно"
    pub fn last_target_position(&self) -> Vec3 {
        self.current_record()
            .map(|r| r.last_position)
            .unwrap_or(Vec3::ZERO)
    }

    pub fn set_last_target_position(&mut self, position: Vec3) {
        if let Some(record) = self.current_record_mut() {
            record.last_position = position;
        }
    }

    /// Без цели: `f32::MAX` (давно не видели)
    pub fn time_since_target_visible(&self) -> f32 {
        self.current_record()
            .map(|r| r.time_since_visible)
            .unwrap_or(f32::MAX)
    }

    /// Без цели: 0
    pub fn time_since_target_reappear(&self) -> f32 {
        self.current_record()
            .map(|r| r.time_since_reappear)
            .unwrap_or(0.0)
    }
}
