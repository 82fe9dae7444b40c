//! The persisted game-progress record
//!
//! Field names follow the JSON written by earlier game builds, so existing
//! `user.json` files keep loading.

use std::fmt;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Big-number currency wrapper, stored as `{ "value": "<decimal>" }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySave {
    #[serde(with = "big_decimal")]
    pub value: BigInt,
}

impl CurrencySave {
    pub fn new(value: impl Into<BigInt>) -> Self {
        Self { value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSave {
    pub id: i32,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSave {
    pub id: i32,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuneSave {
    pub id: i32,
    pub level: i32,
    pub equipped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestSave {
    pub id: i32,
    pub progress: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    #[serde(rename = "goldSave")]
    pub gold: Option<CurrencySave>,
    #[serde(rename = "soulstoneSave")]
    pub soulstone: Option<CurrencySave>,
    pub diamond: i64,

    #[serde(rename = "StageLevel")]
    pub stage_level: i32,
    #[serde(rename = "nextMidBossKm")]
    pub next_mid_boss_km: i64,
    #[serde(rename = "nextBossKm")]
    pub next_boss_km: i64,
    #[serde(rename = "curAchievementKm")]
    pub cur_achievement_km: i64,
    #[serde(rename = "maxAchievementKmEver")]
    pub max_achievement_km_ever: i64,

    #[serde(rename = "charSaveDatas")]
    pub characters: Vec<CharacterSave>,
    #[serde(rename = "artifactSaveDatas")]
    pub artifacts: Vec<ArtifactSave>,
    #[serde(rename = "runeSaveDatas")]
    pub runes: Vec<RuneSave>,
    #[serde(rename = "questSaveDatas")]
    pub quests: Vec<QuestSave>,
    #[serde(rename = "activeQuestSaveDatas")]
    pub active_quests: Vec<QuestSave>,
}

impl Default for SaveRecord {
    /// A brand-new player: stage 1, empty wallets and collections
    fn default() -> Self {
        Self {
            gold: Some(CurrencySave::default()),
            soulstone: Some(CurrencySave::default()),
            diamond: 0,
            stage_level: 1,
            next_mid_boss_km: 0,
            next_boss_km: 0,
            cur_achievement_km: 0,
            max_achievement_km_ever: 0,
            characters: Vec::new(),
            artifacts: Vec::new(),
            runes: Vec::new(),
            quests: Vec::new(),
            active_quests: Vec::new(),
        }
    }
}

impl SaveRecord {
    /// Gold balance; a missing wallet counts as zero
    pub fn gold_value(&self) -> BigInt {
        self.gold.as_ref().map(|c| c.value.clone()).unwrap_or_default()
    }

    pub fn soulstone_value(&self) -> BigInt {
        self.soulstone.as_ref().map(|c| c.value.clone()).unwrap_or_default()
    }

    pub fn snapshot(&self) -> RecordSnapshot {
        RecordSnapshot {
            gold: self.gold_value(),
            soulstone: self.soulstone_value(),
            diamond: self.diamond,
            stage_level: self.stage_level,
            cur_km: self.cur_achievement_km,
            max_km: self.max_achievement_km_ever,
            next_mid_boss_km: self.next_mid_boss_km,
            next_boss_km: self.next_boss_km,
            characters: self.characters.len(),
            artifacts: self.artifacts.len(),
            runes: self.runes.len(),
            quests: self.quests.len(),
            active_quests: self.active_quests.len(),
        }
    }
}

/// One-line summary of the fields that matter when diagnosing a bad save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSnapshot {
    pub gold: BigInt,
    pub soulstone: BigInt,
    pub diamond: i64,
    pub stage_level: i32,
    pub cur_km: i64,
    pub max_km: i64,
    pub next_mid_boss_km: i64,
    pub next_boss_km: i64,
    pub characters: usize,
    pub artifacts: usize,
    pub runes: usize,
    pub quests: usize,
    pub active_quests: usize,
}

impl fmt::Display for RecordSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gold:{} soulstone:{} diamond:{} stage:{} curKm:{} maxKm:{} nextMid:{} nextBoss:{} \
             chars:{} artifacts:{} runes:{} quests:{} activeQuests:{}",
            self.gold,
            self.soulstone,
            self.diamond,
            self.stage_level,
            self.cur_km,
            self.max_km,
            self.next_mid_boss_km,
            self.next_boss_km,
            self.characters,
            self.artifacts,
            self.runes,
            self.quests,
            self.active_quests
        )
    }
}

/// Serde adapter writing a `BigInt` as a decimal string. Reads either a string
/// or a plain JSON integer.
mod big_decimal {
    use std::fmt;

    use num_bigint::BigInt;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        deserializer.deserialize_any(BigDecimalVisitor)
    }

    struct BigDecimalVisitor;

    impl Visitor<'_> for BigDecimalVisitor {
        type Value = BigInt;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a decimal integer string or an integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<BigInt, E> {
            v.trim()
                .parse::<BigInt>()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigInt, E> {
            Ok(BigInt::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigInt, E> {
            Ok(BigInt::from(v))
        }
    }
}
