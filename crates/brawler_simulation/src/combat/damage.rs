//! Правила урона: блок, результат take_damage

/// Результат одного вызова take_damage
///
/// Используется тестами и resolver'ом; для presentation всё равно
/// эмитятся отдельные события.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable, мёртв или урон 0: ничего не изменилось
    Ignored,
    /// Блок сработал, прошла только часть урона
    Blocked { applied: u32 },
    /// Полный урон, актор в HURT/STUNNED
    Hurt { applied: u32 },
    /// Health дошёл до 0
    Killed { applied: u32 },
}

impl DamageOutcome {
    pub fn applied(&self) -> u32 {
        match self {
            DamageOutcome::Ignored => 0,
            DamageOutcome::Blocked { applied }
            | DamageOutcome::Hurt { applied }
            | DamageOutcome::Killed { applied } => *applied,
        }
    }

    pub fn is_kill(&self) -> bool {
        matches!(self, DamageOutcome::Killed { .. })
    }
}

/// Урон после блока: floor(damage × factor)
///
/// - Player блок: factor 0.1
/// - Enemy блок: factor 0.3
pub fn blocked_damage(damage: u32, factor: f32) -> u32 {
    (damage as f32 * factor).floor() as u32
}
