use std::{collections::BTreeMap, fmt::Write as _};

use building_hints_core::{CellHighlight, HighlightSink, RuleTable, TownId, TownState};

use crate::Palette;

const ANSI_RESET: &str = "\x1b[0m";

/// Decoration applied to highlighted cells when rendering text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellStyle {
    /// Suffix markers: `+` upgrade, `!` blocked by special, `-` downgrade.
    Markers,
    /// Terminal background colours taken from the palette.
    Ansi(Palette),
}

/// In-memory replica of the building overview table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverviewTable {
    rows: BTreeMap<TownId, BTreeMap<String, CellHighlight>>,
}

impl OverviewTable {
    /// Creates a table without any highlighted cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlight currently applied to the cell.
    #[must_use]
    pub fn cell(&self, town: TownId, building: &str) -> CellHighlight {
        self.rows
            .get(&town)
            .and_then(|row| row.get(building))
            .copied()
            .unwrap_or_default()
    }

    /// Number of highlighted cells in the town row.
    #[must_use]
    pub fn styled_cells(&self, town: TownId) -> usize {
        self.rows.get(&town).map_or(0, BTreeMap::len)
    }

    /// Renders the table as text, one line per town and one column per rule.
    #[must_use]
    pub fn render(
        &self,
        towns: &BTreeMap<TownId, TownState>,
        rules: RuleTable<'_>,
        style: CellStyle,
    ) -> String {
        const TOWN_HEADER: &str = "town";

        let town_width = towns
            .keys()
            .map(|town| town.get().to_string().len())
            .max()
            .unwrap_or(0)
            .max(TOWN_HEADER.len());

        let mut out = String::new();
        let _ = write!(out, "{TOWN_HEADER:<town_width$}");
        for rule in rules.iter() {
            let _ = write!(out, " | {}", rule.id());
        }
        out.push('\n');

        for (town, state) in towns {
            let _ = write!(out, "{:<town_width$}", town.get());
            for rule in rules.iter() {
                let width = rule.id().len();
                let level = state.level(rule.id());
                let highlight = self.cell(*town, rule.id());
                out.push_str(" | ");
                out.push_str(&format_cell(level, highlight, width, style));
            }
            out.push('\n');
        }
        out
    }
}

fn format_cell(level: u32, highlight: CellHighlight, width: usize, style: CellStyle) -> String {
    match style {
        CellStyle::Markers => {
            let marker = match highlight {
                CellHighlight::None => "",
                CellHighlight::UpgradeNeeded => "+",
                CellHighlight::DowngradeBlockedBySpecial => "!",
                CellHighlight::DowngradeNeeded => "-",
            };
            format!("{:>width$}", format!("{level}{marker}"))
        }
        CellStyle::Ansi(palette) => match palette.color(highlight) {
            Some(color) => format!("{}{level:>width$}{ANSI_RESET}", color.ansi_background()),
            None => format!("{level:>width$}"),
        },
    }
}

impl HighlightSink for OverviewTable {
    fn clear_town(&mut self, town: TownId) {
        let _ = self.rows.remove(&town);
    }

    fn highlight(&mut self, town: TownId, building: &str, highlight: CellHighlight) {
        let row = self.rows.entry(town).or_default();
        if highlight == CellHighlight::None {
            let _ = row.remove(building);
        } else {
            let _ = row.insert(building.to_owned(), highlight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use building_hints_core::BuildingRule;

    const RULES: &[BuildingRule] = &[
        BuildingRule::new("farm", 45, &[]),
        BuildingRule::new("main", 25, &[]),
    ];

    #[test]
    fn clearing_a_town_removes_its_highlights() {
        let mut table = OverviewTable::new();
        table.highlight(TownId::new(1), "main", CellHighlight::UpgradeNeeded);
        table.highlight(TownId::new(2), "main", CellHighlight::DowngradeNeeded);

        table.clear_town(TownId::new(1));

        assert_eq!(table.cell(TownId::new(1), "main"), CellHighlight::None);
        assert_eq!(
            table.cell(TownId::new(2), "main"),
            CellHighlight::DowngradeNeeded
        );
    }

    #[test]
    fn markers_follow_cell_levels() {
        let mut table = OverviewTable::new();
        table.highlight(TownId::new(7), "main", CellHighlight::UpgradeNeeded);
        let towns: BTreeMap<_, _> = [(
            TownId::new(7),
            [("farm", 30), ("main", 12)].into_iter().collect::<TownState>(),
        )]
        .into_iter()
        .collect();

        let rendered = table.render(&towns, RuleTable::new(RULES), CellStyle::Markers);

        assert_eq!(rendered, "town | farm | main\n7    |   30 |  12+\n");
    }

    #[test]
    fn ansi_style_wraps_highlighted_cells() {
        let mut table = OverviewTable::new();
        table.highlight(TownId::new(7), "farm", CellHighlight::DowngradeNeeded);
        let towns: BTreeMap<_, _> = [(TownId::new(7), TownState::new())].into_iter().collect();

        let rendered = table.render(
            &towns,
            RuleTable::new(RULES),
            CellStyle::Ansi(Palette::default()),
        );

        assert!(rendered.contains("\x1b[48;2;255;165;0m   0\x1b[0m"));
    }
}
