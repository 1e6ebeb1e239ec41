//! Plot inspection: what is planted, how it is doing, and which neighbours
//! are helping it.

use std::fmt;

use crate::session::FarmSession;
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStage {
    Seedling,
    Sprout,
    Maturing,
    Ready,
}

impl GrowthStage {
    pub fn label(self) -> &'static str {
        match self {
            GrowthStage::Seedling => "Seedling",
            GrowthStage::Sprout => "Sprout",
            GrowthStage::Maturing => "Maturing",
            GrowthStage::Ready => "Ready",
        }
    }
}

pub fn growth_stage(progress: u32, growth_time: u32) -> GrowthStage {
    if growth_time == 0 || progress >= growth_time {
        return GrowthStage::Ready;
    }
    let pct = progress as f32 / growth_time as f32;
    if pct < 0.33 {
        GrowthStage::Seedling
    } else if pct < 0.66 {
        GrowthStage::Sprout
    } else {
        GrowthStage::Maturing
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlantingInfo {
    pub name: String,
    pub emoji: String,
    pub family: Option<Family>,
    pub growth_progress: u32,
    pub growth_time: u32,
    pub health: u32,
    pub watered: bool,
    pub stage: GrowthStage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotInfo {
    pub pos: GridPosition,
    pub tilled: bool,
    pub planting: Option<PlantingInfo>,
    pub bonus: CompanionBonus,
}

impl fmt::Display for PlotInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.planting {
            None if self.tilled => write!(f, "Plot {}: tilled soil", self.pos),
            None => write!(f, "Plot {}: untilled", self.pos),
            Some(p) => {
                write!(
                    f,
                    "Plot {}: {} {} ({}) {}/{} days, health {}%, {}",
                    self.pos,
                    p.emoji,
                    p.name,
                    p.stage.label(),
                    p.growth_progress,
                    p.growth_time,
                    p.health,
                    if p.watered { "watered" } else { "needs water" },
                )?;
                if !self.bonus.is_neutral() {
                    write!(f, ", {} companion(s)", self.bonus.sources.len())?;
                }
                Ok(())
            }
        }
    }
}

pub fn plot_info(session: &FarmSession, pos: GridPosition) -> Result<PlotInfo, ActionError> {
    let plot = session.grid().get(pos)?;
    let bonus = session.companion_bonus(pos)?;

    let planting = plot.occupant.as_ref().map(|planting| {
        match session.catalog().get(&planting.species) {
            Some(species) => PlantingInfo {
                name: species.name.clone(),
                emoji: species.emoji.clone(),
                family: Some(species.family),
                growth_progress: planting.growth_progress,
                growth_time: species.growth_time,
                health: planting.health,
                watered: planting.watered,
                stage: growth_stage(planting.growth_progress, species.growth_time),
            },
            // Unknown species only survive until the next tick or load.
            None => PlantingInfo {
                name: planting.species.clone(),
                emoji: String::from("?"),
                family: None,
                growth_progress: planting.growth_progress,
                growth_time: planting.growth_progress.max(1),
                health: planting.health,
                watered: planting.watered,
                stage: GrowthStage::Seedling,
            },
        }
    });

    Ok(PlotInfo {
        pos,
        tilled: plot.tilled,
        planting,
        bonus,
    })
}

/// Tooltip text listing each companion bonus on the plot, or `None`
/// when nothing helps it.
pub fn companion_tooltip(
    session: &FarmSession,
    pos: GridPosition,
) -> Result<Option<String>, ActionError> {
    let bonus = session.companion_bonus(pos)?;
    if bonus.is_neutral() {
        return Ok(None);
    }

    let mut lines = vec![format!(
        "Companion bonus: growth x{:.2}, yield x{:.2}, pest resistance x{:.2}",
        bonus.growth_speed, bonus.yield_multiplier, bonus.pest_resistance
    )];
    for source in &bonus.sources {
        let name = session
            .catalog()
            .get(&source.neighbor_species)
            .map_or(source.neighbor_species.as_str(), |s| s.name.as_str());
        lines.push(format!(
            "  +{:.0}% from {} ({}) at {}",
            source.factor * 100.0,
            name,
            source.neighbor_family,
            source.pos
        ));
    }
    Ok(Some(lines.join("\n")))
}
