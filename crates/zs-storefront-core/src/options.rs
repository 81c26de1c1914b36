//! Option groups of the product modal and their selection rules.
//!
//! Single groups behave like radio buttons. Multi groups allow up to `max`
//! selections; once the cap is hit the remaining items are disabled.

use zs_order_types::{OptionChoice, SelectedOptions};

const REQUIRED_MARKERS: [&str; 2] = ["Bắt buộc", "Required"];
const FALLBACK_GROUP_TITLE: &str = "tùy chọn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Single,
    Multi,
}

impl OptionKind {
    /// Value of the `data-option-type` attribute.
    pub fn from_attr(raw: &str) -> Option<Self> {
        match raw {
            "single" => Some(Self::Single),
            "multi" => Some(Self::Multi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionItem {
    pub label: String,
    pub price: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    /// `data-option-group` key.
    pub name: String,
    /// Section header shown to the shopper.
    pub title: String,
    pub kind: OptionKind,
    /// Multi-choice cap; `None` is unlimited.
    pub max: Option<usize>,
    pub required: bool,
    pub items: Vec<OptionItem>,
}

impl OptionGroup {
    /// Build a group from its section markup texts.
    ///
    /// `instructions` is the small sub-heading, e.g. "Bắt buộc, chọn tối đa 2".
    pub fn from_section(
        name: impl Into<String>,
        title: &str,
        kind: OptionKind,
        instructions: &str,
        items: Vec<OptionItem>,
    ) -> Self {
        let title = title.trim();
        Self {
            name: name.into(),
            title: if title.is_empty() {
                FALLBACK_GROUP_TITLE.to_owned()
            } else {
                title.to_owned()
            },
            kind,
            max: match kind {
                OptionKind::Single => Some(1),
                OptionKind::Multi => parse_max_select(instructions),
            },
            required: is_required(instructions),
            items,
        }
    }
}

/// First run of digits in the instruction text; absent or zero means no cap.
pub fn parse_max_select(instructions: &str) -> Option<usize> {
    let digits: String = instructions
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok().filter(|&max| max > 0)
}

pub fn is_required(instructions: &str) -> bool {
    REQUIRED_MARKERS
        .iter()
        .any(|marker| instructions.contains(marker))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Selected,
    Deselected,
    /// Cap reached, or the item does not exist.
    Ignored,
}

/// Selection state for every group in one open modal.
#[derive(Debug, Clone, Default)]
pub struct OptionBoard {
    groups: Vec<OptionGroup>,
    selected: Vec<Vec<bool>>,
}

impl OptionBoard {
    pub fn new(groups: Vec<OptionGroup>) -> Self {
        let selected = groups.iter().map(|g| vec![false; g.items.len()]).collect();
        Self { groups, selected }
    }

    pub fn groups(&self) -> &[OptionGroup] {
        &self.groups
    }

    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }

    pub fn item_index(&self, group: usize, label: &str) -> Option<usize> {
        self.groups
            .get(group)?
            .items
            .iter()
            .position(|item| item.label == label)
    }

    pub fn is_selected(&self, group: usize, item: usize) -> bool {
        self.selected
            .get(group)
            .and_then(|g| g.get(item))
            .copied()
            .unwrap_or(false)
    }

    pub fn selected_count(&self, group: usize) -> usize {
        self.selected
            .get(group)
            .map_or(0, |g| g.iter().filter(|&&on| on).count())
    }

    fn at_cap(&self, group: usize) -> bool {
        match self.groups.get(group).and_then(|g| g.max) {
            Some(max) => self.selected_count(group) >= max,
            None => false,
        }
    }

    /// Unselected multi-choice items are disabled once their group is full.
    pub fn is_disabled(&self, group: usize, item: usize) -> bool {
        let Some(g) = self.groups.get(group) else {
            return false;
        };
        g.kind == OptionKind::Multi && !self.is_selected(group, item) && self.at_cap(group)
    }

    pub fn toggle(&mut self, group: usize, item: usize) -> Toggle {
        let Some(kind) = self
            .groups
            .get(group)
            .filter(|g| item < g.items.len())
            .map(|g| g.kind)
        else {
            return Toggle::Ignored;
        };

        match kind {
            OptionKind::Single => {
                let row = &mut self.selected[group];
                row.iter_mut().for_each(|on| *on = false);
                row[item] = true;
                Toggle::Selected
            }
            OptionKind::Multi => {
                if self.selected[group][item] {
                    self.selected[group][item] = false;
                    Toggle::Deselected
                } else if self.at_cap(group) {
                    Toggle::Ignored
                } else {
                    self.selected[group][item] = true;
                    Toggle::Selected
                }
            }
        }
    }

    pub fn clear(&mut self) {
        for row in &mut self.selected {
            row.iter_mut().for_each(|on| *on = false);
        }
    }

    /// First required group with nothing selected.
    pub fn first_missing_required(&self) -> Option<&OptionGroup> {
        self.groups
            .iter()
            .enumerate()
            .find(|(i, g)| g.required && self.selected_count(*i) == 0)
            .map(|(_, g)| g)
    }

    pub fn selected_options(&self) -> SelectedOptions {
        let mut options = SelectedOptions::default();
        for (g, group) in self.groups.iter().enumerate() {
            let picked = group
                .items
                .iter()
                .enumerate()
                .filter(|(i, _)| self.is_selected(g, *i))
                .map(|(_, item)| OptionChoice::new(item.label.clone(), item.price));
            match group.kind {
                OptionKind::Single => {
                    if let Some(choice) = picked.last() {
                        options.single.insert(group.name.clone(), choice);
                    }
                }
                OptionKind::Multi => {
                    let picked: Vec<_> = picked.collect();
                    if !picked.is_empty() {
                        options.multi.insert(group.name.clone(), picked);
                    }
                }
            }
        }
        options
    }

    /// Restore selections from a saved line (edit flow). Unknown labels are skipped.
    pub fn apply(&mut self, options: &SelectedOptions) {
        self.clear();
        for (name, choice) in &options.single {
            self.select_label(name, &choice.label);
        }
        for (name, choices) in &options.multi {
            for choice in choices {
                self.select_label(name, &choice.label);
            }
        }
    }

    fn select_label(&mut self, group: &str, label: &str) {
        let Some(g) = self.group_index(group) else {
            return;
        };
        if let Some(i) = self.item_index(g, label) {
            if !self.is_selected(g, i) {
                self.toggle(g, i);
            }
        }
    }
}
