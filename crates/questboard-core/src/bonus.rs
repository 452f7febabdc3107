//! Perk-driven bonus XP for a single task completion.
//!
//! Every unlocked perk is checked independently and the qualifying bonuses
//! are summed. Nothing here mutates state.

use crate::skill::Perk;
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Hour (local, exclusive) before which Early Bird applies.
pub const MORNING_CUTOFF_HOUR: u32 = 12;
/// Hour (local, inclusive) from which Night Owl applies.
pub const NIGHT_START_HOUR: u32 = 20;

/// Facts about a completion that perks are evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct CompletionContext {
    /// Completion instant in the user-facing local offset.
    pub now: DateTime<FixedOffset>,
    pub due_date: Option<DateTime<Utc>>,
    /// Tasks this member completed on `now`'s local calendar day,
    /// counting the one being completed.
    pub completed_today: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerkBonus {
    pub perk: Perk,
    pub xp: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusBreakdown {
    pub bonuses: Vec<PerkBonus>,
}

impl BonusBreakdown {
    pub fn total(&self) -> u64 {
        self.bonuses.iter().map(|b| b.xp).sum()
    }

    pub fn perks(&self) -> impl Iterator<Item = Perk> + '_ {
        self.bonuses.iter().map(|b| b.perk)
    }
}

/// Bonus XP earned on top of `base_xp` by the perks in `unlocked`.
pub fn bonus_xp(base_xp: u64, unlocked: &BTreeSet<Perk>, ctx: &CompletionContext) -> BonusBreakdown {
    let bonuses = Perk::all()
        .iter()
        .copied()
        .filter(|p| unlocked.contains(p))
        .filter_map(|perk| perk_bonus(perk, base_xp, ctx).map(|xp| PerkBonus { perk, xp }))
        .collect();
    BonusBreakdown { bonuses }
}

fn perk_bonus(perk: Perk, base_xp: u64, ctx: &CompletionContext) -> Option<u64> {
    let hour = ctx.now.hour();
    match perk {
        Perk::EarlyBird => (hour < MORNING_CUTOFF_HOUR).then_some(3),
        Perk::NightOwl => (hour >= NIGHT_START_HOUR).then_some(3),
        Perk::FastFinisher => Some(2),
        Perk::DeadlineMaster => ctx
            .due_date
            .filter(|due| ctx.now.with_timezone(&Utc) < *due)
            .map(|_| base_xp),
        Perk::TaskStreaker => (ctx.completed_today >= 3).then_some(5),
        Perk::Multitasker => (ctx.completed_today >= 2).then_some(4),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
